//! Response bodies.

use serde::Serialize;

use crate::domain::order::CoffeeOrder;

/// Body of the list endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListResponse {
    /// Matching orders in key order. Serialized as `[]` when empty.
    pub data: Vec<CoffeeOrder>,
    /// Go-style duration until the next monthly sweep.
    pub time_until_deletion: String,
}

/// Body of error responses.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    /// Human-readable message.
    pub err: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_serializes_as_array() {
        let body = OrderListResponse {
            data: Vec::new(),
            time_until_deletion: "1h0m0s".to_string(),
        };

        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"data":[],"timeUntilDeletion":"1h0m0s"}"#
        );
    }

    #[test]
    fn error_body_shape() {
        let body = ErrorBody {
            err: "Malformed JSON".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"err":"Malformed JSON"}"#
        );
    }
}
