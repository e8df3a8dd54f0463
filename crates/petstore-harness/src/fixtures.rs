// crates/petstore-harness/src/fixtures.rs
// ============================================================================
// Module: Fixture Builders
// Description: Fresh pet, order, and user payloads with caller overrides.
// Purpose: Keep every scenario on its own fixture values.
// Dependencies: serde_json, time
// ============================================================================

//! ## Overview
//! Builders return owned values built from baseline defaults merged with
//! caller overrides. There is no shared fixture state: two scenarios calling
//! the same builder get independent values.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::num::NonZeroU32;

use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;
use time::macros::datetime;

use crate::error::HarnessError;
use crate::model::Category;
use crate::model::Order;
use crate::model::OrderStatus;
use crate::model::Pet;
use crate::model::PetStatus;
use crate::model::Tag;
use crate::model::User;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Quantity of the baseline order.
pub const BASELINE_ORDER_QUANTITY: NonZeroU32 = NonZeroU32::MIN.saturating_add(2);

// ============================================================================
// SECTION: Overrides
// ============================================================================

/// Optional replacements for the baseline pet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetOverrides {
    /// Replacement identifier.
    pub id: Option<i64>,
    /// Replacement category.
    pub category: Option<Category>,
    /// Replacement name.
    pub name: Option<String>,
    /// Replacement photo URLs.
    pub photo_urls: Option<Vec<String>>,
    /// Replacement tags.
    pub tags: Option<Vec<Tag>>,
    /// Replacement status.
    pub status: Option<PetStatus>,
}

/// Optional replacements for the baseline order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderOverrides {
    /// Replacement identifier.
    pub id: Option<i64>,
    /// Replacement pet identifier.
    pub pet_id: Option<i64>,
    /// Replacement quantity.
    pub quantity: Option<NonZeroU32>,
    /// Replacement ship date.
    pub ship_date: Option<OffsetDateTime>,
    /// Replacement status.
    pub status: Option<OrderStatus>,
    /// Replacement completion flag.
    pub complete: Option<bool>,
}

/// Optional replacements for the baseline user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserOverrides {
    /// Replacement identifier.
    pub id: Option<i64>,
    /// Replacement username.
    pub username: Option<String>,
    /// Replacement first name.
    pub first_name: Option<String>,
    /// Replacement last name.
    pub last_name: Option<String>,
    /// Replacement email.
    pub email: Option<String>,
    /// Replacement password.
    pub password: Option<String>,
    /// Replacement phone.
    pub phone: Option<String>,
    /// Replacement user status.
    pub user_status: Option<i32>,
}

impl UserOverrides {
    /// Overrides describing the second baseline user (`secondTest`).
    #[must_use]
    pub fn second_user() -> Self {
        Self {
            id: Some(2),
            username: Some("secondTest".to_string()),
            first_name: Some("Second".to_string()),
            email: Some("secondTest@example.com".to_string()),
            password: Some("secondTestPass".to_string()),
            user_status: Some(1),
            ..Self::default()
        }
    }
}

// ============================================================================
// SECTION: Builders
// ============================================================================

/// Builds a pet from the baseline `doggie` fixture.
#[must_use]
pub fn build_pet(overrides: PetOverrides) -> Pet {
    Pet {
        id: overrides.id.unwrap_or(1),
        category: overrides.category,
        name: overrides.name.unwrap_or_else(|| "doggie".to_string()),
        photo_urls: overrides.photo_urls.unwrap_or_default(),
        tags: overrides.tags.unwrap_or_else(|| {
            vec![Tag {
                id: 0,
                name: "some tag 1".to_string(),
            }]
        }),
        status: overrides.status.unwrap_or(PetStatus::Available),
    }
}

/// Builds an order from the baseline placed order for pet 10.
#[must_use]
pub fn build_order(overrides: OrderOverrides) -> Order {
    Order {
        id: overrides.id.unwrap_or(10),
        pet_id: overrides.pet_id.unwrap_or(10),
        quantity: overrides.quantity.unwrap_or(BASELINE_ORDER_QUANTITY),
        ship_date: overrides.ship_date.unwrap_or(datetime!(2024-09-25 13:25:10.521 UTC)),
        status: overrides.status.unwrap_or(OrderStatus::Placed),
        complete: overrides.complete.unwrap_or(true),
    }
}

/// Builds a user from the baseline `firstTest` fixture.
#[must_use]
pub fn build_user(overrides: UserOverrides) -> User {
    User {
        id: overrides.id.unwrap_or(1),
        username: overrides.username.unwrap_or_else(|| "firstTest".to_string()),
        first_name: overrides.first_name.unwrap_or_else(|| "First".to_string()),
        last_name: overrides.last_name.unwrap_or_else(|| "test".to_string()),
        email: overrides.email.unwrap_or_else(|| "firstTest@example.com".to_string()),
        password: overrides.password.unwrap_or_else(|| "firstTestPass".to_string()),
        phone: overrides.phone.unwrap_or_else(|| "040000000".to_string()),
        user_status: overrides.user_status.unwrap_or(0),
    }
}

/// Builds one user per override set.
#[must_use]
pub fn build_users(overrides: Vec<UserOverrides>) -> Vec<User> {
    overrides.into_iter().map(build_user).collect()
}

/// Serializes a fixture into a JSON request body.
///
/// # Errors
///
/// Returns [`HarnessError::Fixture`] when serialization fails.
pub fn to_json<T: Serialize>(value: &T) -> Result<Value, HarnessError> {
    serde_json::to_value(value).map_err(|err| HarnessError::Fixture(err.to_string()))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
