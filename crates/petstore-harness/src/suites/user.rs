// crates/petstore-harness/src/suites/user.rs
// ============================================================================
// Module: User Suite
// Description: Create two users, update, read, log in, and delete.
// Purpose: Contract scenario for the `/user` endpoints.
// Dependencies: serde_json
// ============================================================================

use serde_json::json;

use super::SuiteOptions;
use crate::error::HarnessError;
use crate::fixtures::build_users;
use crate::fixtures::to_json;
use crate::scenario::BodyMatcher;
use crate::scenario::Expectation;
use crate::scenario::RequestTemplate;
use crate::scenario::Scenario;
use crate::scenario::Step;

/// Builds the user scenario.
///
/// # Errors
///
/// Returns [`HarnessError::Fixture`] when a fixture cannot be serialized or
/// a fixture username equals the username expected to be missing.
pub fn user_scenario(options: &SuiteOptions) -> Result<Scenario, HarnessError> {
    let users = build_users(vec![options.first_user.clone(), options.second_user.clone()]);
    let (first, second) = match users.as_slice() {
        [first, second] => (first.clone(), second.clone()),
        _ => return Err(HarnessError::Fixture("expected two users".to_string())),
    };
    if let Some(user) = users.iter().find(|user| user.username == options.missing_username) {
        return Err(HarnessError::Fixture(format!(
            "username {} is also the missing username",
            user.username
        )));
    }
    let mut updated_second = second.clone();
    updated_second.last_name = format!("{}-updated", second.last_name);
    let users_body = to_json(&users)?;
    let updated_body = to_json(&updated_second)?;

    let steps = vec![
        Step::new("create users with list", RequestTemplate::post("/user/createWithList").with_body(users_body))
            .expect_status(200),
        Step::new("update second user", RequestTemplate::put("/user/{second_username}").with_body(updated_body))
            .expect_status(200),
        Step::new("read first user", RequestTemplate::get("/user/{first_username}"))
            .expect_status(200)
            .expect_body(BodyMatcher::Subset(json!({"username": first.username}))),
        Step::new("ensure missing user is absent", RequestTemplate::delete("/user/{missing_username}"))
            .expect(Expectation::StatusIn(vec![200, 404])),
        Step::new("read missing user", RequestTemplate::get("/user/{missing_username}"))
            .expect_status(404)
            .expect_body(BodyMatcher::MessageContains("User not found".to_string())),
        Step::new("delete first user", RequestTemplate::delete("/user/{first_username}"))
            .expect_status(200)
            .expect_body(BodyMatcher::Subset(json!({"message": first.username}))),
        Step::new("deleted user is gone", RequestTemplate::get("/user/{first_username}"))
            .eventually_gone(options.gone_policy),
        Step::new(
            "log in as second user",
            RequestTemplate::get("/user/login")
                .with_query("username", "{second_username}")
                .with_query("password", "{second_password}"),
        )
        .expect_status(200),
        Step::new("clean up second user", RequestTemplate::delete("/user/{second_username}"))
            .expect(Expectation::StatusIn(vec![200, 404])),
    ];

    Ok(Scenario::new("user", steps)
        .with_var("first_username", json!(first.username))
        .with_var("second_username", json!(second.username))
        .with_var("second_password", json!(second.password))
        .with_var("missing_username", json!(options.missing_username)))
}
