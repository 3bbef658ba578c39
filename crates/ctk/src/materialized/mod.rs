//! Materialized views emulated by periodically rebuilt tables.

mod manager;
mod model;
mod store;

pub use manager::MaterializedViewManager;
pub use model::{MaterializedView, MaterializedViewSettings};
pub use store::MaterializedViewStore;
