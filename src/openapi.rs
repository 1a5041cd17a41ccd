//! Attaching generated examples to OpenAPI operations.

use aide::openapi::{MediaType, Operation, ReferenceOr, Response, Responses, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const JSON_CONTENT_TYPE: &str = "application/json";

/// One example response: final status and serialized payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleResponse {
    pub status: u16,
    pub content: String,
}

impl ExampleResponse {
    pub fn new(status: u16, content: impl Into<String>) -> Self {
        Self {
            status,
            content: content.into(),
        }
    }

    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.content)
    }

    /// Set this example on the operation's `application/json` response.
    ///
    /// Creates the response if the status is not documented yet; an existing
    /// description is kept. Referenced responses are left untouched.
    pub fn apply(&self, operation: &mut Operation) {
        let example = self
            .json()
            .unwrap_or_else(|_| Value::String(self.content.clone()));

        let responses = operation.responses.get_or_insert_with(Responses::default);
        let entry = responses
            .responses
            .entry(StatusCode::Code(self.status))
            .or_insert_with(|| {
                ReferenceOr::Item(Response {
                    description: default_description(self.status),
                    ..Default::default()
                })
            });

        if let ReferenceOr::Item(response) = entry {
            response
                .content
                .entry(JSON_CONTENT_TYPE.to_string())
                .or_insert_with(MediaType::default)
                .example = Some(example);
        }
    }
}

/// Apply every example to the operation
pub fn apply_examples(operation: &mut Operation, examples: &[ExampleResponse]) {
    for example in examples {
        example.apply(operation);
    }
}

fn default_description(status: u16) -> String {
    axum::http::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("Example response")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn json_example(operation: &Operation, status: u16) -> Option<Value> {
        let responses = operation.responses.as_ref()?;
        match responses.responses.get(&StatusCode::Code(status))? {
            ReferenceOr::Item(response) => response.content.get(JSON_CONTENT_TYPE)?.example.clone(),
            _ => None,
        }
    }

    #[test]
    fn inserts_new_response_with_example() {
        let mut operation = Operation::default();
        ExampleResponse::new(201, r#"{"data":{"id":1}}"#).apply(&mut operation);

        assert_eq!(json_example(&operation, 201), Some(json!({"data": {"id": 1}})));
        let responses = operation.responses.as_ref().unwrap();
        match &responses.responses[&StatusCode::Code(201)] {
            ReferenceOr::Item(response) => assert_eq!(response.description, "Created"),
            _ => panic!("expected an inline response"),
        }
    }

    #[test]
    fn keeps_existing_description() {
        let mut operation = Operation::default();
        operation
            .responses
            .get_or_insert_with(Responses::default)
            .responses
            .insert(
                StatusCode::Code(200),
                ReferenceOr::Item(Response {
                    description: "The user".into(),
                    ..Default::default()
                }),
            );

        apply_examples(&mut operation, &[ExampleResponse::new(200, "not json")]);

        assert_eq!(json_example(&operation, 200), Some(json!("not json")));
        match &operation.responses.as_ref().unwrap().responses[&StatusCode::Code(200)] {
            ReferenceOr::Item(response) => assert_eq!(response.description, "The user"),
            _ => panic!("expected an inline response"),
        }
    }

    #[test]
    fn unknown_status_gets_generic_description() {
        assert_eq!(default_description(299), "Example response");
        assert_eq!(default_description(404), "Not Found");
    }
}
