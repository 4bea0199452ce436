use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::errors::Error;
use crate::event::Operation;
use crate::graphql::{GraphqlRequest, Schema};
use crate::transport::Transport;

/// Introspects the schema served behind `transport`.
#[instrument(skip(transport))]
pub async fn fetch_schema<T>(transport: &T) -> Result<Schema, Error>
where
    T: Transport + ?Sized,
{
    info!("fetching schema from transport");
    let data = transport
        .execute(&GraphqlRequest::introspection())
        .await?
        .into_data()?;
    Schema::from_introspection(data)
}

/// GraphQL client bound to one transport for the span of an invocation.
pub struct AppSyncClient<'a, T: ?Sized> {
    transport: &'a T,
    schema: Option<Arc<Schema>>,
}

impl<'a, T> AppSyncClient<'a, T>
where
    T: Transport + ?Sized,
{
    /// Client that sends operations without checking them.
    pub fn new(transport: &'a T) -> Self {
        AppSyncClient {
            transport,
            schema: None,
        }
    }

    pub fn with_schema(transport: &'a T, schema: Arc<Schema>) -> Self {
        AppSyncClient {
            transport,
            schema: Some(schema),
        }
    }

    /// Builds a client after introspecting the remote schema.
    pub async fn connect(transport: &'a T) -> Result<AppSyncClient<'a, T>, Error> {
        let schema = fetch_schema(transport).await?;
        Ok(AppSyncClient::with_schema(transport, Arc::new(schema)))
    }

    /// Runs `operation` and returns the response `data`.
    pub async fn execute(&self, operation: &Operation) -> Result<Value, Error> {
        if let Some(schema) = &self.schema {
            schema.validate(&operation.shape())?;
        }

        let request = operation.to_request()?;
        debug!(variables = %request.variables, "executing {}", operation.root_field());
        self.transport.execute(&request).await?.into_data()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::graphql::{
        books_schema_data, books_schema_without, GraphqlResponse, INTROSPECTION_QUERY,
    };
    use crate::testing::MockTransport;

    fn get_42() -> Operation {
        Operation::Get { id: json!("42") }
    }

    #[tokio::test]
    async fn connect_introspects_before_executing() {
        let transport = MockTransport::new()
            .respond_data(books_schema_data())
            .respond_data(json!({ "getBook": { "id": "42" } }));

        let client = AppSyncClient::connect(&transport).await.unwrap();
        let data = client.execute(&get_42()).await.unwrap();

        assert_eq!(data, json!({ "getBook": { "id": "42" } }));
        let sent = transport.requests();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].query, INTROSPECTION_QUERY);
        assert_eq!(sent[1].variables, json!({ "id": "42" }));
    }

    #[tokio::test]
    async fn unknown_root_field_is_not_sent() {
        let transport = MockTransport::new().respond_data(json!({
            "__schema": {
                "queryType": { "name": "Query" },
                "mutationType": null,
                "types": [{ "name": "Query", "fields": [{ "name": "listBooks" }] }]
            }
        }));

        let client = AppSyncClient::connect(&transport).await.unwrap();
        let err = client.execute(&get_42()).await.unwrap_err();

        assert!(matches!(err, Error::Schema(_)));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn missing_book_field_blocks_the_call() {
        let transport = MockTransport::new()
            .respond_data(books_schema_without("Book", "shortdescription"));

        let client = AppSyncClient::connect(&transport).await.unwrap();
        let err = client.execute(&get_42()).await.unwrap_err();

        assert!(matches!(err, Error::Schema(_)));
        assert!(err.to_string().contains("shortdescription"));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn introspection_errors_abort_connect() {
        let transport = MockTransport::new().respond(GraphqlResponse {
            data: None,
            errors: Some(vec![json!({ "message": "introspection disabled" })]),
        });

        let result = AppSyncClient::connect(&transport).await;

        assert!(matches!(result, Err(Error::Graphql(_))));
    }

    #[tokio::test]
    async fn unchecked_client_sends_directly() {
        let transport = MockTransport::new().respond_data(json!({ "getBook": null }));

        let client = AppSyncClient::new(&transport);
        let data = client.execute(&get_42()).await.unwrap();

        assert_eq!(data, json!({ "getBook": null }));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn graphql_errors_are_raised() {
        let transport = MockTransport::new().respond(GraphqlResponse {
            data: Some(json!({ "getBook": null })),
            errors: Some(vec![json!({ "message": "boom" })]),
        });

        let client = AppSyncClient::new(&transport);
        let err = client.execute(&get_42()).await.unwrap_err();

        assert!(matches!(err, Error::Graphql(_)));
    }
}
