//! In-process store, used for development and tests

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::EquipmentStore;
use crate::{
    error::{AppError, AppResult},
    models::{
        category::Category,
        equipment::{Condition, Equipment, EquipmentChanges, EquipmentFilter, NewEquipment, SortOrder},
    },
};

#[derive(Default)]
struct MemoryState {
    categories: Vec<Category>,
    /// Insertion order is the store-native order
    items: Vec<Equipment>,
}

impl MemoryState {
    fn category_name(&self, id: Uuid) -> Option<String> {
        self.categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.clone())
    }

    fn require_category(&self, id: Uuid) -> AppResult<String> {
        self.category_name(id)
            .ok_or_else(|| AppError::Validation("Unknown category_id".to_string()))
    }

    /// Refresh the joined category name, as the SQL view would
    fn joined(&self, item: &Equipment) -> Equipment {
        let mut item = item.clone();
        item.category_name = self.category_name(item.category_id);
        item
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with the demo catalogue
    pub fn with_sample_data() -> Self {
        let now = Utc::now();
        let mut state = MemoryState::default();

        for name in ["Basketball", "Football/Soccer", "Tennis", "Training"] {
            state.categories.push(Category {
                id: Uuid::new_v4(),
                name: name.to_string(),
                created_at: Some(now),
            });
        }

        let samples: [(&str, &str, &str, i64, i32, &str); 10] = [
            ("Professional Basketball", "Basketball", "SportsPro", 2999, 5,
             "Official size and weight basketball, perfect for indoor and outdoor play"),
            ("Premium Soccer Ball", "Football/Soccer", "KickMaster", 2499, 20,
             "Size 5 soccer ball, competition grade with enhanced durability"),
            ("Pro Soccer Cleats", "Football/Soccer", "SpeedKicks", 8999, 8,
             "Lightweight soccer cleats with superior grip and comfort"),
            ("Tennis Racket Pro", "Tennis", "SwingMaster", 15999, 5,
             "Professional grade tennis racket with carbon fiber frame"),
            ("Football Training Set", "Football/Soccer", "GridIron", 4999, 15,
             "Complete football training set with cones and agility ladder"),
            ("Basketball Hoop System", "Basketball", "HoopMaster", 29999, 3,
             "Adjustable height basketball hoop with heavy-duty backboard"),
            ("Tennis Ball Set", "Tennis", "CourtKing", 1999, 25,
             "Set of 4 premium tennis balls for all court types"),
            ("Training Agility Ladder", "Training", "SpeedPro", 3499, 12,
             "Professional agility ladder for sports training"),
            ("Basketball Training Kit", "Basketball", "HoopMaster", 7999, 7,
             "Complete basketball training kit with ball, pump, and accessories"),
            ("Tennis Court Net", "Tennis", "CourtKing", 12999, 4,
             "Professional tennis net with heavy-duty construction"),
        ];

        for (name, category, brand, cents, quantity, description) in samples {
            let Some(category) = state.categories.iter().find(|c| c.name == category) else {
                continue;
            };
            state.items.push(Equipment {
                id: Uuid::new_v4(),
                name: name.to_string(),
                brand: brand.to_string(),
                category_id: category.id,
                category_name: Some(category.name.clone()),
                price: Decimal::new(cents, 2),
                description: Some(description.to_string()),
                condition: Condition::New,
                image_filename: None,
                quantity,
                created_at: now,
                updated_at: now,
            });
        }

        Self {
            state: RwLock::new(state),
        }
    }
}

#[async_trait]
impl EquipmentStore for MemoryStore {
    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let state = self.state.read().await;
        let mut categories = state.categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn create_category(&self, name: &str) -> AppResult<Category> {
        let mut state = self.state.write().await;
        if state.categories.iter().any(|c| c.name == name) {
            return Err(AppError::Validation("Category already exists".to_string()));
        }
        let category = Category {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: Some(Utc::now()),
        };
        state.categories.push(category.clone());
        Ok(category)
    }

    async fn list_equipment(&self) -> AppResult<Vec<Equipment>> {
        let state = self.state.read().await;
        Ok(state.items.iter().map(|item| state.joined(item)).collect())
    }

    async fn filter_equipment(&self, filter: &EquipmentFilter) -> AppResult<Vec<Equipment>> {
        let state = self.state.read().await;
        let mut items: Vec<Equipment> = state
            .items
            .iter()
            .filter(|item| filter.category_id.map_or(true, |id| item.category_id == id))
            .map(|item| state.joined(item))
            .collect();

        // Stable sorts keep store order among equal prices
        match filter.sort_order {
            SortOrder::None => {}
            SortOrder::HighLow => items.sort_by(|a, b| b.price.cmp(&a.price)),
            SortOrder::LowHigh => items.sort_by(|a, b| a.price.cmp(&b.price)),
        }
        Ok(items)
    }

    async fn get_equipment(&self, id: Uuid) -> AppResult<Option<Equipment>> {
        let state = self.state.read().await;
        Ok(state
            .items
            .iter()
            .find(|item| item.id == id)
            .map(|item| state.joined(item)))
    }

    async fn create_equipment(&self, data: &NewEquipment) -> AppResult<Equipment> {
        let mut state = self.state.write().await;
        let category_name = state.require_category(data.category_id)?;
        let now = Utc::now();
        let item = Equipment {
            id: Uuid::new_v4(),
            name: data.name.clone(),
            brand: data.brand.clone(),
            category_id: data.category_id,
            category_name: Some(category_name),
            price: data.price,
            description: data.description.clone(),
            condition: data.condition,
            image_filename: data.image_filename.clone(),
            quantity: data.quantity,
            created_at: now,
            updated_at: now,
        };
        state.items.push(item.clone());
        Ok(item)
    }

    async fn update_equipment(
        &self,
        id: Uuid,
        changes: &EquipmentChanges,
    ) -> AppResult<Option<Equipment>> {
        let mut state = self.state.write().await;
        let Some(index) = state.items.iter().position(|item| item.id == id) else {
            return Ok(None);
        };
        if let Some(category_id) = changes.category_id {
            state.require_category(category_id)?;
        }

        let item = &mut state.items[index];
        changes.apply_to(item);
        item.updated_at = Utc::now();
        let updated = state.joined(&state.items[index]);
        Ok(Some(updated))
    }

    async fn delete_equipment(&self, id: Uuid) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let before = state.items.len();
        state.items.retain(|item| item.id != id);
        Ok(state.items.len() < before)
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}
