//! Delete trait for ending a resource's life.

use async_trait::async_trait;

use crate::client::XplentyClient;
use crate::error::Result;

/// Issue a DELETE on a resource.
///
/// The API does not remove anything outright: deleting a cluster starts its
/// termination and deleting a job stops it. The returned value is the
/// resource in its new state.
#[async_trait]
pub trait Delete: Sized {
    /// The ID type for this resource.
    type Id;

    /// Delete (terminate or stop) the resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource is not found or the request fails.
    async fn delete(client: &XplentyClient, id: Self::Id) -> Result<Self>;
}
