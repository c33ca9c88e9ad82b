// Domain layer - Core types and segment planning

pub mod errors;
pub mod model;
pub mod rules;
