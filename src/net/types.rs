//! Wire DTOs mirroring the marketplace backend contracts.
//!
//! DESIGN
//! ======
//! Field names follow the backend's camelCase JSON. Types are passive: no
//! behavior beyond (de)serialization and a few accessors the session model
//! needs.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Response envelope wrapped around every backend payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    #[serde(default)]
    pub message: String,
    pub data: T,
    #[serde(default)]
    pub timestamp: i64,
}

// =============================================================================
// ROLES & USERS
// =============================================================================

/// Account role tag.
///
/// Tags compare case-insensitively; anything outside the known set is kept
/// verbatim in [`Role::Other`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Consumer,
    Supplier,
    Admin,
    Other(String),
}

impl Role {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Consumer => "consumer",
            Self::Supplier => "supplier",
            Self::Admin => "admin",
            Self::Other(tag) => tag,
        }
    }
}

impl From<String> for Role {
    fn from(tag: String) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "consumer" => Self::Consumer,
            "supplier" => Self::Supplier,
            "admin" => Self::Admin,
            _ => Self::Other(tag),
        }
    }
}

impl From<&str> for Role {
    fn from(tag: &str) -> Self {
        Self::from(tag.to_owned())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_owned()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Profile of the signed-in account, as returned by login.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    /// Role tag. Older payloads call this field `role`.
    #[serde(alias = "role")]
    pub user_type: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Any extra profile fields, preserved across persistence.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AuthUser {
    #[must_use]
    pub fn role(&self) -> &Role {
        &self.user_type
    }
}

// =============================================================================
// AUTH ENDPOINTS
// =============================================================================

/// `GET /auth/captcha` payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptchaChallenge {
    pub challenge_id: String,
    pub question: String,
    /// Challenge lifetime in seconds.
    pub expires_in: i64,
}

/// `POST /auth/login` request body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    pub username: String,
    pub password: String,
    pub challenge_id: String,
    pub verification_code: String,
}

/// `POST /auth/login` payload; the input to `Session::set_auth`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
    /// Issue time in milliseconds since the Unix epoch.
    pub issued_at: i64,
    #[serde(default)]
    pub redirect_url: Option<String>,
    pub user: AuthUser,
}

impl LoginResponse {
    /// Absolute expiry in milliseconds since the Unix epoch.
    #[must_use]
    pub fn expires_at(&self) -> i64 {
        self.issued_at.saturating_add(self.expires_in.saturating_mul(1000))
    }
}

/// `POST /auth/register` request body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    pub email: String,
    pub phone: String,
    pub user_type: Role,
    /// Required when registering a supplier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
}

// =============================================================================
// CATALOG & ORDERS
// =============================================================================

/// Spring-style paged result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub content: Vec<T>,
    pub total_elements: i64,
    pub total_pages: i64,
    /// Zero-based page index.
    pub number: i64,
    pub size: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub unit: Option<String>,
    pub stock: i64,
    pub sales: i64,
    #[serde(default)]
    pub main_image: Option<String>,
    pub status: String,
    pub created_at: String,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub supplier_name: Option<String>,
    #[serde(default)]
    pub supplier_level: Option<String>,
}

/// Product reference embedded in cart lines.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemProduct {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub main_image: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: i64,
    pub quantity: i64,
    pub unit_price: f64,
    pub subtotal: f64,
    #[serde(default)]
    pub added_at: Option<String>,
    pub product: CartItemProduct,
}

/// Product reference embedded in order lines.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemProduct {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub main_image: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDetail {
    pub id: i64,
    pub quantity: i64,
    pub unit_price: f64,
    pub total_price: f64,
    pub created_at: String,
    pub product: OrderItemProduct,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    pub id: i64,
    pub order_no: String,
    pub total_amount: f64,
    pub total_quantity: i64,
    pub status: String,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub shipping_address: Option<String>,
    #[serde(default)]
    pub recipient_name: Option<String>,
    #[serde(default)]
    pub recipient_phone: Option<String>,
    pub order_time: String,
    #[serde(default)]
    pub payment_time: Option<String>,
    #[serde(default)]
    pub shipping_time: Option<String>,
    #[serde(default)]
    pub delivery_time: Option<String>,
    #[serde(default)]
    pub order_items: Vec<OrderItemDetail>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumerAddress {
    pub id: i64,
    #[serde(default)]
    pub consumer_id: Option<i64>,
    pub recipient_name: String,
    pub recipient_phone: String,
    pub shipping_address: String,
    pub is_default: bool,
    pub created_at: String,
    pub updated_at: String,
}
