//! Data models for Sportstock

pub mod category;
pub mod equipment;
pub mod pending_operation;

// Re-export commonly used types
pub use category::Category;
pub use equipment::{Condition, Equipment, EquipmentFilter, SortOrder};
pub use pending_operation::{OperationKind, PendingOperation};
