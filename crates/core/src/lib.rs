//! Schema registry, validators, error taxonomy and the resource lifecycle
//! shared by every managed resource type.

pub mod arm;
pub mod error;
pub mod lifecycle;
pub mod schema;
pub mod validate;

pub use arm::{ArmId, ResourceHandle};
pub use error::{BoxError, MapperError, Result};
pub use lifecycle::{Deletion, Instance, InstanceState, Resource};
pub use schema::{AttrType, Attribute, DefaultValue, Mutability, Schema, SchemaRow};
pub use validate::{ValidationErrors, Validator, Violation, RESOURCE_GROUP_NAME};

/// Lowercases and strips whitespace, the canonical form of an Azure location.
pub fn normalize_location(location: &str) -> String {
    location.chars().filter(|c| !c.is_whitespace()).collect::<String>().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_is_normalized() {
        assert_eq!(normalize_location("West Europe"), "westeurope");
        assert_eq!(normalize_location("eastus2"), "eastus2");
    }
}
