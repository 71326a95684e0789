// SPDX-License-Identifier: Apache-2.0

use crate::error::GatewayError;
use crate::upstream::{ContentBackend, ResultsBackend};
use advisor_gateway_model::{ClusterId, ContentArchive, OrgId, Report, UserId};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Mutex;

/// In-memory content backend for tests: flip `fail` to simulate an outage,
/// swap `archive` to simulate a new catalog publication.
pub struct FakeContentBackend {
    pub archive: Mutex<ContentArchive>,
    pub fail: AtomicBool,
    pub fetch_calls: AtomicU64,
}

impl Default for FakeContentBackend {
    fn default() -> Self {
        Self {
            archive: Mutex::new(ContentArchive { rules: Vec::new() }),
            fail: AtomicBool::new(false),
            fetch_calls: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl ContentBackend for FakeContentBackend {
    async fn fetch_all(&self) -> Result<ContentArchive, GatewayError> {
        self.fetch_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail.load(Ordering::Relaxed) {
            return Err(GatewayError::UpstreamUnavailable(
                "fake content outage".to_string(),
            ));
        }
        Ok(self.archive.lock().await.clone())
    }
}

/// In-memory results backend for tests. Per-cluster failures are injected
/// through `failing_clusters`; `fail_all` takes the whole backend down.
#[derive(Default)]
pub struct FakeResultsBackend {
    pub reports: Mutex<HashMap<ClusterId, Report>>,
    pub clusters: Mutex<HashMap<OrgId, Vec<ClusterId>>>,
    pub failing_clusters: Mutex<HashSet<ClusterId>>,
    pub fail_all: AtomicBool,
}

#[async_trait]
impl ResultsBackend for FakeResultsBackend {
    async fn report(
        &self,
        _org: OrgId,
        cluster: &ClusterId,
        _user: &UserId,
    ) -> Result<Report, GatewayError> {
        if self.fail_all.load(Ordering::Relaxed) {
            return Err(GatewayError::UpstreamUnavailable(
                "fake results outage".to_string(),
            ));
        }
        if self.failing_clusters.lock().await.contains(cluster) {
            return Err(GatewayError::UpstreamUnavailable(format!(
                "fake failure for cluster {cluster}"
            )));
        }
        self.reports
            .lock()
            .await
            .get(cluster)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(format!("no report for cluster {cluster}")))
    }

    async fn clusters_for_organization(
        &self,
        org: OrgId,
    ) -> Result<Vec<ClusterId>, GatewayError> {
        if self.fail_all.load(Ordering::Relaxed) {
            return Err(GatewayError::UpstreamUnavailable(
                "fake results outage".to_string(),
            ));
        }
        Ok(self
            .clusters
            .lock()
            .await
            .get(&org)
            .cloned()
            .unwrap_or_default())
    }
}
