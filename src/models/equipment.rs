//! Equipment model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Physical condition of an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Condition {
    New,
    #[serde(rename = "Like New")]
    LikeNew,
    Good,
    Fair,
    Poor,
}

impl Condition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::New => "New",
            Condition::LikeNew => "Like New",
            Condition::Good => "Good",
            Condition::Fair => "Fair",
            Condition::Poor => "Poor",
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Condition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "new" => Ok(Condition::New),
            "like new" | "like_new" | "like-new" => Ok(Condition::LikeNew),
            "good" => Ok(Condition::Good),
            "fair" => Ok(Condition::Fair),
            "poor" => Ok(Condition::Poor),
            _ => Err(format!("Invalid condition: {}", s)),
        }
    }
}

// SQLx conversion for Condition (stored as text)
impl sqlx::Type<Postgres> for Condition {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for Condition {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for Condition {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// Equipment record, as returned by the store with its category name joined
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Equipment {
    pub id: Uuid,
    pub name: String,
    pub brand: String,
    pub category_id: Uuid,
    pub category_name: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64)]
    pub price: Decimal,
    pub description: Option<String>,
    pub condition: Condition,
    /// Public path of the uploaded image (`/uploads/...`)
    pub image_filename: Option<String>,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create equipment request.
///
/// Required fields are optional here so that every missing one can be
/// reported in a single validation error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateEquipment {
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 255, message = "Brand must be at most 255 characters"))]
    pub brand: Option<String>,
    /// Category UUID (hyphenated)
    pub category_id: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,
    pub description: Option<String>,
    /// New, Like New, Good, Fair or Poor
    pub condition: Option<String>,
    pub image_filename: Option<String>,
    #[validate(range(min = 0.0, message = "Quantity cannot be negative"))]
    pub quantity: Option<f64>,
}

/// Update equipment request (every field optional)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateEquipment {
    #[validate(length(min = 1, max = 255, message = "Name must be 1 to 255 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Brand must be 1 to 255 characters"))]
    pub brand: Option<String>,
    pub category_id: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    #[schema(value_type = Option<f64>)]
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub condition: Option<String>,
    pub image_filename: Option<String>,
    #[validate(range(min = 0.0, message = "Quantity cannot be negative"))]
    pub quantity: Option<f64>,
}

/// Validated equipment ready to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewEquipment {
    pub name: String,
    pub brand: String,
    pub category_id: Uuid,
    pub price: Decimal,
    pub description: Option<String>,
    pub condition: Condition,
    pub image_filename: Option<String>,
    pub quantity: i32,
}

/// Validated partial update; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EquipmentChanges {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub category_id: Option<Uuid>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub condition: Option<Condition>,
    pub image_filename: Option<String>,
    pub quantity: Option<i32>,
}

impl EquipmentChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.brand.is_none()
            && self.category_id.is_none()
            && self.price.is_none()
            && self.description.is_none()
            && self.condition.is_none()
            && self.image_filename.is_none()
            && self.quantity.is_none()
    }

    /// Apply the changes to an existing record
    pub fn apply_to(&self, equipment: &mut Equipment) {
        if let Some(ref name) = self.name {
            equipment.name = name.clone();
        }
        if let Some(ref brand) = self.brand {
            equipment.brand = brand.clone();
        }
        if let Some(category_id) = self.category_id {
            equipment.category_id = category_id;
        }
        if let Some(price) = self.price {
            equipment.price = price;
        }
        if let Some(ref description) = self.description {
            equipment.description = Some(description.clone());
        }
        if let Some(condition) = self.condition {
            equipment.condition = condition;
        }
        if let Some(ref image_filename) = self.image_filename {
            equipment.image_filename = Some(image_filename.clone());
        }
        if let Some(quantity) = self.quantity {
            equipment.quantity = quantity;
        }
    }
}

/// Price ordering applied to a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Keep the store's own ordering
    #[default]
    None,
    HighLow,
    LowHigh,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::None => "none",
            SortOrder::HighLow => "high-low",
            SortOrder::LowHigh => "low-high",
        }
    }
}

/// Filter request body for `POST /equipment/filter`
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct EquipmentFilterRequest {
    /// Category UUID; absent, empty or "All" disables filtering
    pub category_id: Option<String>,
    /// Only "price" is sortable
    pub sort_by: Option<String>,
    /// none, high-low, low-high, or asc/desc together with sort_by=price
    pub sort_order: Option<String>,
}

/// Resolved listing filter handed to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EquipmentFilter {
    pub category_id: Option<Uuid>,
    pub sort_order: SortOrder,
}

/// `?id=` query parameter used by update and delete
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EquipmentIdQuery {
    /// Equipment UUID
    pub id: Option<String>,
}
