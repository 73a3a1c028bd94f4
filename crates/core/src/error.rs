use thiserror::Error;

use crate::validate::ValidationErrors;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum MapperError {
    #[error("invalid configuration: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("unsupported {attribute} {value:?}: expected one of {expected:?}")]
    UnsupportedVariant {
        attribute: &'static str,
        value: String,
        expected: &'static [&'static str],
    },

    #[error("invalid combination: {0}")]
    InvalidCombination(String),

    #[error("invalid {attribute} {value:?}: expected one of {expected:?}")]
    InvalidEnum {
        attribute: &'static str,
        value: String,
        expected: &'static [&'static str],
    },

    #[error("a resource with the ID {id:?} already exists - to be managed via this tool it needs to be imported as {resource_type}")]
    AlreadyExists { resource_type: &'static str, id: String },

    #[error("error {action} {kind} {name:?} (resource group {resource_group:?}): {source}")]
    RemoteApi {
        action: &'static str,
        kind: &'static str,
        name: String,
        resource_group: String,
        #[source]
        source: BoxError,
    },

    #[error("{kind} {name:?} (resource group {resource_group:?}) was not found")]
    NotFound { kind: &'static str, name: String, resource_group: String },

    #[error("{kind} {name:?} (resource group {resource_group:?}) returned no ID")]
    MissingId { kind: &'static str, name: String, resource_group: String },

    #[error("invalid resource id {0}")]
    InvalidResourceId(String),

    #[error("cannot {operation} while the resource is {state}")]
    InvalidTransition { operation: &'static str, state: &'static str },

    #[error("operation cancelled")]
    Cancelled,

    #[error("decoding configuration: {0}")]
    Decode(#[from] serde_json::Error),
}

impl MapperError {
    pub fn remote(
        action: &'static str,
        kind: &'static str,
        name: &str,
        resource_group: &str,
        source: impl Into<BoxError>,
    ) -> Self {
        MapperError::RemoteApi {
            action,
            kind,
            name: name.to_string(),
            resource_group: resource_group.to_string(),
            source: source.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MapperError>;
