//! In-memory transport used by the unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::Error;
use crate::graphql::{GraphqlRequest, GraphqlResponse};
use crate::transport::Transport;

/// Records every request and replays queued responses in order.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<GraphqlResponse, Error>>>,
    requests: Mutex<Vec<GraphqlRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        MockTransport::default()
    }

    pub fn respond(self, response: GraphqlResponse) -> Self {
        self.responses.lock().unwrap().push_back(Ok(response));
        self
    }

    pub fn respond_data(self, data: Value) -> Self {
        self.respond(GraphqlResponse {
            data: Some(data),
            errors: None,
        })
    }

    pub fn fail(self, error: Error) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn requests(&self) -> Vec<GraphqlRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: &GraphqlRequest) -> Result<GraphqlResponse, Error> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("no response queued for {:?}", request.operation_name))
    }
}
