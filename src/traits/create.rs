//! Create trait for new resources.

use async_trait::async_trait;

use crate::client::XplentyClient;
use crate::error::Result;

/// Create a resource from parameters and return it as the API sees it.
///
/// # Example
///
/// ```ignore
/// use xplenty::{XplentyClient, Cluster, ClusterCreateParams, Create};
///
/// let client = XplentyClient::from_env()?;
/// let cluster = Cluster::create(&client, ClusterCreateParams::new("production", 2)).await?;
/// ```
#[async_trait]
pub trait Create: Sized {
    /// Parameters for the new resource.
    type Params: Send;

    /// Create the resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the parameters or the request
    /// fails.
    async fn create(client: &XplentyClient, params: Self::Params) -> Result<Self>;
}
