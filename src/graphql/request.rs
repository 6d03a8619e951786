use crate::error::QueryOrigin;
use crate::{Error, Result};
use serde::Serialize;
use serde_json::{Map, Value};

/// Request envelope sent as the POST body.
///
/// Optional keys are left out of the serialized body entirely; some servers
/// reject an explicit `"variables": null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphQLRequest {
    query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    variables: Option<Map<String, Value>>,
    #[serde(rename = "operationName", skip_serializing_if = "Option::is_none")]
    operation_name: Option<String>,
}

impl GraphQLRequest {
    /// Create a request for `query`. Fails with `EmptyQuery` when the text is
    /// blank after trimming.
    pub fn new(query: impl Into<String>) -> Result<Self> {
        let query = query.into();
        if query.trim().is_empty() {
            return Err(Error::empty_query(QueryOrigin::Argument));
        }
        Ok(Self {
            query,
            variables: None,
            operation_name: None,
        })
    }

    pub fn with_variables(mut self, variables: Option<Map<String, Value>>) -> Self {
        self.variables = variables;
        self
    }

    pub fn with_operation_name(mut self, name: Option<String>) -> Self {
        self.operation_name = name.filter(|n| !n.trim().is_empty());
        self
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn variables(&self) -> Option<&Map<String, Value>> {
        self.variables.as_ref()
    }

    pub fn operation_name(&self) -> Option<&str> {
        self.operation_name.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blank_query_is_rejected() {
        let err = GraphQLRequest::new("  \n\t ").unwrap_err();
        assert!(matches!(
            err,
            Error::EmptyQuery {
                origin: QueryOrigin::Argument
            }
        ));
    }

    #[test]
    fn absent_variables_are_omitted_from_body() {
        let req = GraphQLRequest::new("{ viewer { id } }").unwrap();
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body, json!({ "query": "{ viewer { id } }" }));
    }

    #[test]
    fn variables_and_operation_name_are_serialized() {
        let mut vars = Map::new();
        vars.insert("id".to_string(), json!("x"));
        let req = GraphQLRequest::new("query Issue($id: String!) { issue(id: $id) { id } }")
            .unwrap()
            .with_variables(Some(vars))
            .with_operation_name(Some("Issue".to_string()));

        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["variables"], json!({ "id": "x" }));
        assert_eq!(body["operationName"], json!("Issue"));
    }

    #[test]
    fn blank_operation_name_is_dropped() {
        let req = GraphQLRequest::new("{ a }")
            .unwrap()
            .with_operation_name(Some("  ".to_string()));
        assert_eq!(req.operation_name(), None);
    }
}
