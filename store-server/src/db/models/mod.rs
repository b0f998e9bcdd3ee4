//! Database entity types
//!
//! Row structs mapped with `sqlx::FromRow` plus the create/update payloads
//! consumed by the admin CRUD handlers.

pub mod inventory;
pub mod order;
pub mod product;
pub mod user;

pub use inventory::{InventoryLevel, InventoryOverview};
pub use order::{Order, OrderDetail, OrderItem};
pub use product::{Product, ProductCreate, ProductUpdate};
pub use user::{User, UserCreate, UserUpdate};
