//! Domain layer: value objects, aggregates, pure services and events
pub mod aggregates;
pub mod events;
pub mod previews;
pub mod services;
pub mod value_objects;
