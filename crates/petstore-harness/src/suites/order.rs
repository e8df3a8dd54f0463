// crates/petstore-harness/src/suites/order.rs
// ============================================================================
// Module: Order Suite
// Description: Place, re-post, read, and delete a store order.
// Purpose: Contract scenario for the `/store` endpoints.
// Dependencies: serde_json
// ============================================================================

use std::num::NonZeroU32;

use serde_json::json;

use super::SuiteOptions;
use super::field_is_var;
use crate::error::HarnessError;
use crate::fixtures::OrderOverrides;
use crate::fixtures::build_order;
use crate::fixtures::to_json;
use crate::scenario::BodyMatcher;
use crate::scenario::Expectation;
use crate::scenario::RequestTemplate;
use crate::scenario::Scenario;
use crate::scenario::Step;

/// Quantity sent when re-posting the order.
const UPDATED_QUANTITY: NonZeroU32 = NonZeroU32::MIN.saturating_add(5);

/// Builds the order scenario.
///
/// # Errors
///
/// Returns [`HarnessError::Fixture`] when a fixture cannot be serialized or
/// the order id equals the id expected to be missing.
pub fn order_scenario(options: &SuiteOptions) -> Result<Scenario, HarnessError> {
    let order = build_order(options.order.clone());
    if order.id == options.missing_order_id {
        return Err(HarnessError::Fixture(format!(
            "order id {} is also the missing order id",
            order.id
        )));
    }
    let updated = build_order(OrderOverrides {
        quantity: Some(UPDATED_QUANTITY),
        ..options.order.clone()
    });
    let created_body = to_json(&order)?;
    let updated_body = to_json(&updated)?;

    let steps = vec![
        Step::new("create order", RequestTemplate::post("/store/order").with_body(created_body))
            .expect_status(200)
            .expect_body(BodyMatcher::Subset(json!({
                "id": order.id,
                "quantity": order.quantity,
                "status": order.status.as_str(),
                "complete": order.complete,
            })))
            .capture("order_id", "/id"),
        Step::new(
            "update order by re-posting",
            RequestTemplate::post("/store/order").with_body(updated_body).bind("/id", "order_id"),
        )
        .expect_status(200)
        .expect_body(field_is_var("/id", "order_id"))
        .expect_body(BodyMatcher::Subset(json!({"quantity": UPDATED_QUANTITY}))),
        Step::new("read inventory", RequestTemplate::get("/store/inventory"))
            .expect_status(200)
            .expect_body(BodyMatcher::HasKeys(vec!["available".to_string()])),
        Step::new(
            "ensure missing order is absent",
            RequestTemplate::delete("/store/order/{missing_order_id}"),
        )
        .expect(Expectation::StatusIn(vec![200, 404])),
        Step::new("read missing order", RequestTemplate::get("/store/order/{missing_order_id}"))
            .expect_status(404)
            .expect_body(BodyMatcher::MessageContains("Order not found".to_string())),
        Step::new("read order by id", RequestTemplate::get("/store/order/{order_id}"))
            .expect_status(200)
            .expect_body(field_is_var("/id", "order_id")),
        Step::new("delete order", RequestTemplate::delete("/store/order/{order_id}"))
            .expect_status(200),
        Step::new("deleted order is gone", RequestTemplate::get("/store/order/{order_id}"))
            .eventually_gone(options.gone_policy),
    ];

    Ok(Scenario::new("order", steps).with_var("missing_order_id", json!(options.missing_order_id)))
}
