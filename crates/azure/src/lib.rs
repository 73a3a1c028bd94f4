//! Azure Resource Manager transport and the request/response shapes of the
//! services the mapper targets.

pub mod error;
pub mod hdinsight;
pub mod http;
pub mod insights;
pub mod provider;

pub use error::{ApiError, Result};
pub use hdinsight::{ClustersApi, ClustersClient};
pub use http::{ArmClient, ClientSettings};
pub use insights::{ScheduledQueryRulesApi, ScheduledQueryRulesClient};
pub use provider::{AzureProvider, Features, PUBLIC_CLOUD_ENDPOINT};
