//! Pure combination services
pub mod generator;
pub mod reconciler;

pub use generator::{combination_count, generate};
pub use reconciler::{reconcile, reconcile_detailed, Reconciliation};
