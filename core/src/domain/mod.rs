//! Forms domain layer

pub mod aggregates;
pub mod value_objects;
