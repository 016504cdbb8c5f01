use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ListMergeRequestsOptions, MergeRequest};

/// Remote source of merge requests.
#[async_trait]
pub trait Forge: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    /// One listing call; the whole result page is returned in server order.
    async fn list_merge_requests(
        &self,
        opts: &ListMergeRequestsOptions,
    ) -> Result<Vec<MergeRequest>>;
}
