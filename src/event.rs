use serde::Serialize;
use serde_json::{json, Value};

use crate::errors::Error;
use crate::ext::EventValueExt;
use crate::graphql::{
    GraphqlRequest, OperationKind, OperationShape, BOOK_FIELDS, CREATE_BOOK_INPUT_FIELDS,
    CREATE_BOOK_MUTATION, GET_BOOK_QUERY,
};

/// Input object of the `createBook` mutation.
///
/// Values are copied from the event untouched; AppSync owns any validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateBookInput {
    pub title: Value,
    pub shortdescription: Value,
    pub price: Value,
    pub rating: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Create(CreateBookInput),
    Get { id: Value },
}

impl Operation {
    /// Reads the operation named by the event's `op` field.
    ///
    /// Returns `Ok(None)` when `op` is missing or not one of `create`/`get`.
    /// Such events are dropped without a call or an error. Whether that is a
    /// health-check convention or an oversight is unknown, so the behaviour is
    /// kept as is and the caller logs it.
    pub fn from_event(event: &Value) -> Result<Option<Operation>, Error> {
        let op = match event.get_s("op") {
            Some(op) => op,
            None => return Ok(None),
        };

        match op {
            "create" => Ok(Some(Operation::Create(CreateBookInput {
                title: event.require("title")?,
                shortdescription: event.require("shortdescription")?,
                price: event.require("price")?,
                rating: event.require("rating")?,
            }))),
            "get" => Ok(Some(Operation::Get {
                id: event.require("id")?,
            })),
            _ => Ok(None),
        }
    }

    pub fn kind(&self) -> OperationKind {
        self.shape().kind
    }

    /// Name of the field selected on the root type.
    pub fn root_field(&self) -> &'static str {
        self.shape().root_field
    }

    /// What the operation's document needs from the schema.
    pub fn shape(&self) -> OperationShape {
        match self {
            Operation::Create(_) => OperationShape {
                kind: OperationKind::Mutation,
                root_field: "createBook",
                argument: "input",
                selection: BOOK_FIELDS,
                input: Some(("CreateBookInput", CREATE_BOOK_INPUT_FIELDS)),
            },
            Operation::Get { .. } => OperationShape {
                kind: OperationKind::Query,
                root_field: "getBook",
                argument: "id",
                selection: BOOK_FIELDS,
                input: None,
            },
        }
    }

    pub fn to_request(&self) -> Result<GraphqlRequest, Error> {
        let request = match self {
            Operation::Create(input) => GraphqlRequest::new(
                CREATE_BOOK_MUTATION,
                Some("createBook"),
                json!({ "input": serde_json::to_value(input)? }),
            ),
            Operation::Get { id } => {
                GraphqlRequest::new(GET_BOOK_QUERY, Some("bookQuery"), json!({ "id": id }))
            }
        };
        Ok(request)
    }
}
