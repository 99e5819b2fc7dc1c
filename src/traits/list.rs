//! List trait for fetching collections of resources.

use async_trait::async_trait;

use crate::client::XplentyClient;
use crate::error::Result;
use crate::pagination::Page;

pub use crate::pagination::DEFAULT_PAGE_SIZE;

/// Maximum pages to fetch (safety limit).
const MAX_PAGES: u32 = 1000;

/// List resources with offset pagination.
///
/// # Example
///
/// ```ignore
/// use xplenty::{XplentyClient, Job, List};
///
/// let client = XplentyClient::from_env()?;
///
/// // Fetch a single page
/// let page = Job::list_page(&client, &Default::default(), 0, 50).await?;
///
/// // Fetch all pages
/// let all_jobs = Job::list_all(&client, &Default::default()).await?;
/// ```
#[async_trait]
pub trait List: Sized + Send {
    /// Query parameters for filtering.
    type Query: Default + Send + Sync;

    /// List resources matching the query (single page).
    ///
    /// # Arguments
    ///
    /// * `client` - The Xplenty API client
    /// * `query` - Query parameters for filtering
    /// * `offset` - Number of items to skip
    /// * `limit` - Maximum number of items to return
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn list_page(
        client: &XplentyClient,
        query: &Self::Query,
        offset: u32,
        limit: u32,
    ) -> Result<Page<Self>>;

    /// List the first page with the API's default size.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn list(client: &XplentyClient) -> Result<Vec<Self>> {
        let page = Self::list_page(client, &Self::Query::default(), 0, DEFAULT_PAGE_SIZE).await?;
        Ok(page.items)
    }

    /// List all resources matching the query (fetches all pages).
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails.
    async fn list_all(client: &XplentyClient, query: &Self::Query) -> Result<Vec<Self>> {
        let mut all_items = Vec::new();
        let mut offset = 0;
        let mut pages = 0;

        loop {
            let result = Self::list_page(client, query, offset, DEFAULT_PAGE_SIZE).await?;
            offset = result.next_offset();
            let has_more = result.has_more;
            all_items.extend(result.items);

            if !has_more {
                break;
            }

            pages += 1;
            // Safety limit to prevent infinite loops
            if pages >= MAX_PAGES {
                tracing::warn!(
                    "Reached pagination limit of {} pages, stopping",
                    MAX_PAGES
                );
                break;
            }
        }

        Ok(all_items)
    }
}
