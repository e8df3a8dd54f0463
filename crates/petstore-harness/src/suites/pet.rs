// crates/petstore-harness/src/suites/pet.rs
// ============================================================================
// Module: Pet Suite
// Description: Create, update, read, search, and delete a pet.
// Purpose: Contract scenario for the `/pet` endpoints.
// Dependencies: serde_json
// ============================================================================

use serde_json::json;

use super::SuiteOptions;
use super::field_is_var;
use crate::error::HarnessError;
use crate::fixtures::PetOverrides;
use crate::fixtures::build_pet;
use crate::fixtures::to_json;
use crate::scenario::BodyMatcher;
use crate::scenario::Expectation;
use crate::scenario::RequestTemplate;
use crate::scenario::Scenario;
use crate::scenario::Step;

/// Builds the pet scenario.
///
/// # Errors
///
/// Returns [`HarnessError::Fixture`] when a fixture cannot be serialized or
/// the pet id equals the id expected to be missing.
pub fn pet_scenario(options: &SuiteOptions) -> Result<Scenario, HarnessError> {
    let pet = build_pet(options.pet.clone());
    if pet.id == options.missing_pet_id {
        return Err(HarnessError::Fixture(format!("pet id {} is also the missing pet id", pet.id)));
    }
    let updated = build_pet(PetOverrides {
        name: Some("cat".to_string()),
        ..options.pet.clone()
    });
    let created_body = to_json(&pet)?;
    let updated_body = to_json(&updated)?;
    let api_key = options.api_key.as_str();

    let steps = vec![
        Step::new("create pet", RequestTemplate::post("/pet").with_body(created_body.clone()))
            .expect_status(200)
            .expect_body(BodyMatcher::Subset(created_body))
            .capture("pet_id", "/id"),
        Step::new(
            "update pet name",
            RequestTemplate::put("/pet").with_body(updated_body.clone()).bind("/id", "pet_id"),
        )
        .expect_status(200)
        .expect_body(BodyMatcher::Subset(without_id(&updated_body)))
        .expect_body(field_is_var("/id", "pet_id")),
        Step::new("get pet", RequestTemplate::get("/pet/{pet_id}").with_header("api_key", api_key))
            .expect_status(200)
            .expect_body(BodyMatcher::Subset(without_id(&updated_body)))
            .expect_body(field_is_var("/id", "pet_id"))
            .capture("pet_snapshot", ""),
        Step::new("get pet again", RequestTemplate::get("/pet/{pet_id}").with_header("api_key", api_key))
            .expect_status(200)
            .expect_body(BodyMatcher::EqualsVar("pet_snapshot".to_string())),
        Step::new(
            "ensure missing pet is absent",
            RequestTemplate::delete("/pet/{missing_pet_id}").with_header("api_key", api_key),
        )
        .expect(Expectation::StatusIn(vec![200, 404])),
        Step::new(
            "get missing pet",
            RequestTemplate::get("/pet/{missing_pet_id}").with_header("api_key", api_key),
        )
        .expect_status(404)
        .expect_body(BodyMatcher::MessageContains("Pet not found".to_string())),
        Step::new(
            "find pets by status",
            RequestTemplate::get("/pet/findByStatus")
                .with_header("api_key", api_key)
                .with_query("status", "available"),
        )
        .expect_status(200)
        .expect_body(BodyMatcher::EachItem(vec![
            BodyMatcher::HasKeys(vec!["id".to_string()]),
            BodyMatcher::Subset(json!({"status": "available"})),
        ])),
        Step::new(
            "delete missing pet",
            RequestTemplate::delete("/pet/{missing_pet_id}").with_header("api_key", api_key),
        )
        .expect_status(404),
        Step::new("delete pet", RequestTemplate::delete("/pet/{pet_id}").with_header("api_key", api_key))
            .expect_status(200),
        Step::new(
            "deleted pet is gone",
            RequestTemplate::get("/pet/{pet_id}").with_header("api_key", api_key),
        )
        .eventually_gone(options.gone_policy),
    ];

    Ok(Scenario::new("pet", steps).with_var("missing_pet_id", json!(options.missing_pet_id)))
}

/// Copies a fixture body without its `id`, which is checked via capture.
fn without_id(body: &serde_json::Value) -> serde_json::Value {
    let mut body = body.clone();
    if let Some(object) = body.as_object_mut() {
        object.remove("id");
    }
    body
}
