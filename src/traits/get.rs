//! Get trait for fetching single resources.

use async_trait::async_trait;

use crate::client::XplentyClient;
use crate::error::Result;

/// Fetch a single resource by ID.
///
/// # Example
///
/// ```ignore
/// use xplenty::{XplentyClient, Cluster, Get};
///
/// let client = XplentyClient::from_env()?;
/// let cluster = Cluster::get(&client, 42).await?;
/// ```
#[async_trait]
pub trait Get: Sized {
    /// The ID type for this resource.
    type Id;

    /// Fetch the resource by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource is not found or the request fails.
    async fn get(client: &XplentyClient, id: Self::Id) -> Result<Self>;
}
