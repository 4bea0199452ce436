use std::io;

use appsync_books::{
    api::{function_handler, BooksApi},
    config::Config,
    transport::SignedHttpTransport,
    utils::{announce_log_level, setup_sdk_config, setup_tracing},
};
use lambda_runtime::{service_fn, LambdaEvent};
use serde_json::Value;
use tracing::info;

type E = lambda_runtime::Error;

#[tokio::main]
async fn main() -> Result<(), E> {
    let config = Config::from_env()?;
    setup_tracing(config.effective_level());
    if let Some(level) = config.log_level {
        announce_log_level(level);
    }

    let sdk_config = setup_sdk_config().await;
    let transport = SignedHttpTransport::from_sdk_config(config.endpoint.clone(), &sdk_config)?;
    let api = BooksApi::new(transport, config.schema_fetch.into());
    let api = &api;

    info!("execution started");
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        function_handler(api, event, &mut io::stdout()).await
    }))
    .await?;

    Ok(())
}
