//! Equipment create / update / delete with input validation

use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

use super::parse_uuid;
use crate::{
    error::{AppError, AppResult},
    models::equipment::{
        Condition, CreateEquipment, Equipment, EquipmentChanges, NewEquipment, UpdateEquipment,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct EquipmentCommandService {
    repository: Repository,
}

impl EquipmentCommandService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Create equipment; the store generates the id
    pub async fn create(&self, data: &CreateEquipment) -> AppResult<Equipment> {
        let new = validate_create(data)?;
        let equipment = self.repository.create_equipment(&new).await?;
        tracing::info!("Created equipment {} ({})", equipment.id, equipment.name);
        Ok(equipment)
    }

    /// Apply a partial update
    pub async fn update(&self, id: Uuid, data: &UpdateEquipment) -> AppResult<Equipment> {
        let changes = validate_update(data)?;
        let equipment = self
            .repository
            .update_equipment(id, &changes)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))?;
        tracing::info!("Updated equipment {}", id);
        Ok(equipment)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        if !self.repository.delete_equipment(id).await? {
            return Err(AppError::NotFound(format!("Equipment {} not found", id)));
        }
        tracing::info!("Deleted equipment {}", id);
        Ok(())
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// An optional field that, when present, must not be blank
fn supplied<'a>(field: &str, value: &'a Option<String>) -> AppResult<Option<&'a str>> {
    match value.as_deref().map(str::trim) {
        None => Ok(None),
        Some("") => Err(AppError::Validation(format!("{} cannot be blank", field))),
        Some(value) => Ok(Some(value)),
    }
}

/// Upper bound (exclusive) of the `NUMERIC(10, 2)` price column
const PRICE_LIMIT: i64 = 100_000_000;

/// Digits kept after the decimal point
const PRICE_SCALE: u32 = 2;

fn check_price(price: Decimal) -> AppResult<Decimal> {
    if price < Decimal::ZERO {
        return Err(AppError::Validation("Price cannot be negative".to_string()));
    }
    if price >= Decimal::from(PRICE_LIMIT) {
        return Err(AppError::Validation(format!(
            "Price must be less than {}",
            PRICE_LIMIT
        )));
    }
    if price.normalize().scale() > PRICE_SCALE {
        return Err(AppError::Validation(format!(
            "Price cannot have more than {} decimal places",
            PRICE_SCALE
        )));
    }
    Ok(price)
}

fn check_quantity(quantity: f64) -> AppResult<i32> {
    if quantity < 0.0 {
        return Err(AppError::Validation("Quantity cannot be negative".to_string()));
    }
    if quantity.fract() != 0.0 || quantity > f64::from(i32::MAX) {
        return Err(AppError::Validation("Quantity must be a whole number".to_string()));
    }
    Ok(quantity as i32)
}

fn parse_condition(value: &str) -> AppResult<Condition> {
    value.parse().map_err(AppError::Validation)
}

fn field_errors(data: &impl Validate) -> AppResult<()> {
    data.validate()
        .map_err(|e| AppError::Validation(e.to_string()))
}

/// Check a create request and convert it to a store insert
pub fn validate_create(data: &CreateEquipment) -> AppResult<NewEquipment> {
    let name = non_blank(&data.name);
    let brand = non_blank(&data.brand);
    let category_id = non_blank(&data.category_id);
    let condition = non_blank(&data.condition);

    let missing: Vec<&str> = [
        ("name", name.is_none()),
        ("brand", brand.is_none()),
        ("category_id", category_id.is_none()),
        ("price", data.price.is_none()),
        ("condition", condition.is_none()),
    ]
    .into_iter()
    .filter_map(|(field, missing)| missing.then_some(field))
    .collect();

    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    field_errors(data)?;

    let (Some(name), Some(brand), Some(category_id), Some(price), Some(condition)) =
        (name, brand, category_id, data.price, condition)
    else {
        return Err(AppError::Validation("Missing required fields".to_string()));
    };

    Ok(NewEquipment {
        name: name.to_string(),
        brand: brand.to_string(),
        category_id: parse_uuid("category_id", category_id)?,
        price: check_price(price)?,
        description: data.description.clone(),
        condition: parse_condition(condition)?,
        image_filename: data.image_filename.clone(),
        quantity: data.quantity.map(check_quantity).transpose()?.unwrap_or(0),
    })
}

/// Check an update request and convert it to store changes
pub fn validate_update(data: &UpdateEquipment) -> AppResult<EquipmentChanges> {
    field_errors(data)?;

    let changes = EquipmentChanges {
        name: supplied("name", &data.name)?.map(str::to_string),
        brand: supplied("brand", &data.brand)?.map(str::to_string),
        category_id: supplied("category_id", &data.category_id)?
            .map(|id| parse_uuid("category_id", id))
            .transpose()?,
        price: data.price.map(check_price).transpose()?,
        description: data.description.clone(),
        condition: supplied("condition", &data.condition)?
            .map(parse_condition)
            .transpose()?,
        image_filename: data.image_filename.clone(),
        quantity: data.quantity.map(check_quantity).transpose()?,
    };

    if changes.is_empty() {
        return Err(AppError::Validation(
            "At least one field must be provided for update".to_string(),
        ));
    }
    Ok(changes)
}
