//! Configuration for the modbridge bundle transform: which modules are served
//! by the runtime registry, the bundle's registry identity, and output
//! options.

pub mod config;
pub mod discovery;
pub mod error;
pub mod mapping;
pub mod validation;

pub use config::*;
pub use error::*;
pub use mapping::*;

pub use discovery::{ConfigDiscovery, discover};
pub use validation::{
    ConfigValidator, MappingValidator, SchemaValidator, validate_mappings, validate_schema,
};
