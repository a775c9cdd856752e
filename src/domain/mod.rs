//! Domain layer - core business logic and entities

pub mod alert;
pub mod price;
pub mod sample;
