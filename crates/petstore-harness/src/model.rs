// crates/petstore-harness/src/model.rs
// ============================================================================
// Module: Pet Store Wire Model
// Description: Request and response payloads for pets, orders, and users.
// Purpose: Give fixtures a typed shape that serializes to the remote schema.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Wire payloads exchanged with the pet-store API. Field names are camelCase
//! on the wire and enum values are lowercase. These types describe what the
//! harness sends; responses are inspected as raw JSON so unexpected remote
//! fields never fail deserialization.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::num::NonZeroU32;

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;

// ============================================================================
// SECTION: Pets
// ============================================================================

/// Pet availability status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetStatus {
    /// Pet can be ordered.
    Available,
    /// Pet has a pending order.
    Pending,
    /// Pet has been sold.
    Sold,
}

impl PetStatus {
    /// Returns the wire label used in `findByStatus` queries.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Pending => "pending",
            Self::Sold => "sold",
        }
    }
}

/// Tag attached to a pet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag identifier.
    pub id: i64,
    /// Tag label.
    pub name: String,
}

/// Pet category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category identifier.
    pub id: i64,
    /// Category label.
    pub name: String,
}

/// Pet resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    /// Pet identifier; the scenario key.
    pub id: i64,
    /// Optional category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// Pet name.
    pub name: String,
    /// Photo URLs; omitted from requests when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub photo_urls: Vec<String>,
    /// Ordered tags.
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Availability status.
    pub status: PetStatus,
}

// ============================================================================
// SECTION: Orders
// ============================================================================

/// Store order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order placed.
    Placed,
    /// Order approved.
    Approved,
    /// Order delivered.
    Delivered,
}

impl OrderStatus {
    /// Returns the wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Placed => "placed",
            Self::Approved => "approved",
            Self::Delivered => "delivered",
        }
    }
}

/// Store order resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Order identifier; the scenario key.
    pub id: i64,
    /// Ordered pet identifier.
    pub pet_id: i64,
    /// Quantity ordered; zero is rejected on deserialization.
    pub quantity: NonZeroU32,
    /// Ship date, serialized as RFC 3339.
    #[serde(with = "time::serde::rfc3339")]
    pub ship_date: OffsetDateTime,
    /// Order status.
    pub status: OrderStatus,
    /// Whether the order is complete.
    pub complete: bool,
}

// ============================================================================
// SECTION: Users
// ============================================================================

/// User resource keyed by `username`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Numeric identifier.
    pub id: i64,
    /// Unique username; the scenario key.
    pub username: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Email address.
    pub email: String,
    /// Plain-text password used by the login endpoint.
    pub password: String,
    /// Phone number.
    pub phone: String,
    /// Numeric user status.
    pub user_status: i32,
}
