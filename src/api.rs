use std::{io::Write, sync::Arc};

use lambda_runtime::LambdaEvent;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};

use crate::client::{fetch_schema, AppSyncClient};
use crate::config::SchemaFetch;
use crate::errors::Error;
use crate::event::{CreateBookInput, Operation};
use crate::graphql::Schema;
use crate::transport::Transport;
use crate::utils::{deadline, print_json};

type E = lambda_runtime::Error;

/// Where a freshly built client gets its schema from.
pub enum SchemaSource {
    /// Introspect on every invocation.
    Fetch,
    /// Introspect once, then reuse.
    Cached(OnceCell<Arc<Schema>>),
    Static(Arc<Schema>),
    Disabled,
}

impl From<SchemaFetch> for SchemaSource {
    fn from(value: SchemaFetch) -> Self {
        match value {
            SchemaFetch::Always => SchemaSource::Fetch,
            SchemaFetch::Once => SchemaSource::Cached(OnceCell::new()),
            SchemaFetch::Never => SchemaSource::Disabled,
        }
    }
}

/// Dispatches book events to AppSync.
pub struct BooksApi<T> {
    transport: T,
    schema: SchemaSource,
}

impl<T> BooksApi<T>
where
    T: Transport,
{
    pub fn new(transport: T, schema: SchemaSource) -> Self {
        BooksApi { transport, schema }
    }

    async fn client(&self) -> Result<AppSyncClient<'_, T>, Error> {
        match &self.schema {
            SchemaSource::Fetch => AppSyncClient::connect(&self.transport).await,
            SchemaSource::Cached(cell) => {
                let schema = cell
                    .get_or_try_init(|| async {
                        fetch_schema(&self.transport).await.map(Arc::new)
                    })
                    .await?;
                Ok(AppSyncClient::with_schema(&self.transport, schema.clone()))
            }
            SchemaSource::Static(schema) => {
                Ok(AppSyncClient::with_schema(&self.transport, schema.clone()))
            }
            SchemaSource::Disabled => Ok(AppSyncClient::new(&self.transport)),
        }
    }

    #[instrument(skip(self))]
    pub async fn create_book(&self, input: CreateBookInput) -> Result<Value, Error> {
        let client = self.client().await?;
        client.execute(&Operation::Create(input)).await
    }

    #[instrument(skip(self))]
    pub async fn get_book(&self, id: Value) -> Result<Value, Error> {
        let client = self.client().await?;
        client.execute(&Operation::Get { id }).await
    }

    /// Runs the operation named by `event` and returns the response data.
    ///
    /// `Ok(None)` means the event named no known operation and nothing was sent.
    pub async fn handle(&self, event: &Value) -> Result<Option<Value>, Error> {
        info!(event = %event, "request received");

        let data = match Operation::from_event(event)? {
            Some(Operation::Create(input)) => self.create_book(input).await?,
            Some(Operation::Get { id }) => self.get_book(id).await?,
            None => {
                warn!("event has no recognized op, skipping");
                return Ok(None);
            }
        };
        Ok(Some(data))
    }
}

/// Lambda entry point: handles one event and prints the result to `out`.
#[instrument(skip_all, fields(request_id = %event.context.request_id))]
pub async fn function_handler<T, W>(
    api: &BooksApi<T>,
    event: LambdaEvent<Value>,
    out: &mut W,
) -> Result<(), E>
where
    T: Transport,
    W: Write + Send,
{
    if let Some(deadline) = deadline(&event.context) {
        debug!(deadline = %deadline.to_rfc3339(), "invocation deadline");
    }
    if let Some(data) = api.handle(&event.payload).await? {
        print_json(out, &data)?;
    }
    Ok(())
}
