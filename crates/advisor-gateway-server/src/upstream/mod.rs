// SPDX-License-Identifier: Apache-2.0

//! Upstream collaborators: the results backend (aggregator) and the content
//! backend, consumed through injectable traits so tests can swap in fakes.

use crate::error::GatewayError;
use advisor_gateway_model::{ClusterId, ContentArchive, OrgId, Report, UserId};
use async_trait::async_trait;

pub mod fake;
pub mod http;

pub use fake::{FakeContentBackend, FakeResultsBackend};
pub use http::{HttpContentBackend, HttpResultsBackend};

/// Content backend's "all content" endpoint. One outbound call per
/// invocation; no state retained.
#[async_trait]
pub trait ContentBackend: Send + Sync + 'static {
    async fn fetch_all(&self) -> Result<ContentArchive, GatewayError>;
}

/// Results backend: per-cluster rule-hit reports and the cluster listing for
/// an organization.
#[async_trait]
pub trait ResultsBackend: Send + Sync + 'static {
    async fn report(
        &self,
        org: OrgId,
        cluster: &ClusterId,
        user: &UserId,
    ) -> Result<Report, GatewayError>;

    async fn clusters_for_organization(&self, org: OrgId)
        -> Result<Vec<ClusterId>, GatewayError>;
}
