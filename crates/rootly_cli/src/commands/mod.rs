//! CLI command implementations.

pub mod resource_types;
pub mod sync;
pub mod validate;
