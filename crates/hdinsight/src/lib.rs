//! `azurerm_hdinsight_storm_cluster`: Linux Storm clusters on HDInsight.

pub mod config;
pub mod diff;
pub mod expand;
pub mod flatten;
pub mod nodes;
pub mod resource;
pub mod schema;

pub use config::{StormClusterConfig, StormClusterState};
pub use expand::expand_cluster;
pub use flatten::flatten_cluster;
pub use resource::StormClusterResource;
pub use schema::{RESOURCE_SCHEMA, RESOURCE_TYPE};
