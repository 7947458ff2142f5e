//! Order endpoint handlers.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};

use super::AppState;
use super::error::ApiError;
use super::response::OrderListResponse;
use crate::application::ports::RecordStore;
use crate::domain::order::{CoffeeOrder, OrderDraft};
use crate::infrastructure::metrics::{self, DeleteReason};

/// Hint shown at `/`.
pub const ROOT_HINT: &str = "Try /coffeeorders";

/// `GET /`
pub async fn root_handler() -> &'static str {
    ROOT_HINT
}

/// `GET /coffeeorders`
pub async fn list_orders<S: RecordStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<OrderListResponse>, ApiError> {
    let data = state.orders.list_all()?;
    Ok(Json(OrderListResponse {
        data,
        time_until_deletion: state.time_until_deletion(),
    }))
}

/// `GET /coffeeorders/{email}`
pub async fn list_orders_by_email<S: RecordStore>(
    State(state): State<AppState<S>>,
    Path(email): Path<String>,
) -> Result<Json<OrderListResponse>, ApiError> {
    let data = state.orders.list_by_email(&email)?;
    Ok(Json(OrderListResponse {
        data,
        time_until_deletion: state.time_until_deletion(),
    }))
}

/// `POST /coffeeorders`
pub async fn create_order<S: RecordStore>(
    State(state): State<AppState<S>>,
    body: Bytes,
) -> Result<Json<Vec<CoffeeOrder>>, ApiError> {
    let draft = parse_draft(&body)?;
    let order = state.orders.insert(draft)?;
    metrics::record_order_created();
    tracing::info!(order_id = %order.id, "Order created");

    Ok(Json(state.orders.list_all()?))
}

/// `PUT /coffeeorders/{email}`
///
/// The body is parsed before anything is deleted.
pub async fn replace_order<S: RecordStore>(
    State(state): State<AppState<S>>,
    Path(email): Path<String>,
    body: Bytes,
) -> Result<Json<Vec<CoffeeOrder>>, ApiError> {
    let draft = parse_draft(&body)?;
    let replacement = state.orders.replace_newest_for_email(&email, draft)?;

    if replacement.removed.is_some() {
        metrics::record_orders_deleted(DeleteReason::Replace, 1);
    }
    metrics::record_order_created();
    tracing::info!(
        order_id = %replacement.order.id,
        replaced = replacement.removed.is_some(),
        "Order replaced"
    );

    Ok(Json(state.orders.list_all()?))
}

/// `DELETE /coffeeorders/{email}`
pub async fn delete_newest_order<S: RecordStore>(
    State(state): State<AppState<S>>,
    Path(email): Path<String>,
) -> Result<Json<Vec<CoffeeOrder>>, ApiError> {
    if state.orders.delete_newest_for_email(&email)?.is_some() {
        metrics::record_orders_deleted(DeleteReason::Newest, 1);
        tracing::info!("Newest order deleted");
    }

    Ok(Json(state.orders.list_all()?))
}

/// `DELETE /coffeeorders`
pub async fn delete_all_orders<S: RecordStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<CoffeeOrder>>, ApiError> {
    let outcome = state.orders.delete_all()?;
    metrics::record_orders_deleted(DeleteReason::Bulk, outcome.deleted as u64);
    tracing::info!(
        deleted = outcome.deleted,
        failed = outcome.failed,
        "All orders deleted"
    );

    Ok(Json(Vec::new()))
}

/// Decode a request body into a draft.
///
/// The body must be a JSON object. Content-Type is not checked.
fn parse_draft(body: &[u8]) -> Result<OrderDraft, ApiError> {
    let value: serde_json::Value = serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "Rejected order body");
        ApiError::MalformedJson
    })?;

    if !value.is_object() {
        tracing::debug!("Rejected non-object order body");
        return Err(ApiError::MalformedJson);
    }

    serde_json::from_value(value).map_err(|e| {
        tracing::debug!(error = %e, "Rejected order body");
        ApiError::MalformedJson
    })
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test]
    fn parses_full_order() {
        let draft = parse_draft(
            br#"{"coffee":"latte","emailAddress":"a@x.com","flavor":"vanilla","strength":3}"#,
        )
        .unwrap();

        assert_eq!(
            draft,
            OrderDraft {
                coffee: "latte".to_string(),
                email_address: "a@x.com".to_string(),
                flavor: "vanilla".to_string(),
                strength: 3,
            }
        );
    }

    #[test]
    fn ignores_client_id_and_unknown_fields() {
        let draft =
            parse_draft(br#"{"_id":"not-hex","coffee":"drip","size":"large"}"#).unwrap();
        assert_eq!(draft.coffee, "drip");
    }

    #[test]
    fn nulls_count_as_missing() {
        let draft = parse_draft(br#"{"coffee":null,"strength":null}"#).unwrap();
        assert_eq!(draft, OrderDraft::default());
    }

    #[test_case(b"not json" ; "not json")]
    #[test_case(b"" ; "empty body")]
    #[test_case(b"[]" ; "array")]
    #[test_case(b"\"latte\"" ; "string")]
    #[test_case(br#"{"strength":300}"# ; "strength out of range")]
    #[test_case(br#"{"strength":"strong"}"# ; "strength wrong type")]
    #[test_case(br#"{"coffee":5}"# ; "coffee wrong type")]
    fn rejects_malformed(body: &[u8]) {
        assert!(matches!(parse_draft(body), Err(ApiError::MalformedJson)));
    }
}
