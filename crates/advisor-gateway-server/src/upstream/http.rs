// SPDX-License-Identifier: Apache-2.0

use crate::error::GatewayError;
use crate::upstream::{ContentBackend, ResultsBackend};
use advisor_gateway_model::{ClusterId, ContentArchive, OrgId, Report, RuleHit, UserId};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

fn transport_error(context: &str, err: &reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::UpstreamTimeout(format!("{context}: {err}"))
    } else {
        GatewayError::UpstreamUnavailable(format!("{context}: {err}"))
    }
}

/// Client for the content backend. The body is a compact binary archive;
/// the encoding is an external contract and is decoded as-is.
pub struct HttpContentBackend {
    base_url: String,
    timeout: Duration,
}

impl HttpContentBackend {
    #[must_use]
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    fn client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
    }
}

#[async_trait]
impl ContentBackend for HttpContentBackend {
    #[instrument(name = "content_fetch_all", skip(self))]
    async fn fetch_all(&self) -> Result<ContentArchive, GatewayError> {
        let url = format!("{}/content", self.base_url);
        let resp = self
            .client()
            .get(&url)
            .send()
            .await
            .map_err(|e| transport_error("content fetch", &e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(GatewayError::UpstreamUnavailable(format!(
                "content fetch status={status} url={url}"
            )));
        }
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| transport_error("content body read", &e))?;
        bincode::deserialize(&bytes).map_err(|e| {
            GatewayError::Decode(format!(
                "content archive ({} bytes) undecodable: {e}",
                bytes.len()
            ))
        })
    }
}

#[derive(Debug, Deserialize)]
struct ReportEnvelope {
    status: String,
    report: ReportPayload,
}

#[derive(Debug, Deserialize)]
struct ReportPayload {
    #[allow(dead_code)]
    meta: ReportMeta,
    reports: Vec<RuleHit>,
}

#[derive(Debug, Deserialize)]
struct ReportMeta {
    #[allow(dead_code)]
    count: i64,
}

#[derive(Debug, Deserialize)]
struct ClustersEnvelope {
    status: String,
    clusters: Vec<String>,
}

/// Client for the results backend. Everything here is JSON wrapped in the
/// aggregator's ok envelope.
pub struct HttpResultsBackend {
    base_url: String,
    timeout: Duration,
}

impl HttpResultsBackend {
    #[must_use]
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    fn client(&self) -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
    }
}

#[async_trait]
impl ResultsBackend for HttpResultsBackend {
    #[instrument(name = "results_report", skip(self))]
    async fn report(
        &self,
        org: OrgId,
        cluster: &ClusterId,
        user: &UserId,
    ) -> Result<Report, GatewayError> {
        let url = format!("{}/report/{org}/{cluster}/{user}", self.base_url);
        let resp = self
            .client()
            .get(&url)
            .send()
            .await
            .map_err(|e| transport_error("report fetch", &e))?;
        let status = resp.status();
        if status.as_u16() == 404 {
            return Err(GatewayError::NotFound(format!(
                "no report for cluster {cluster}"
            )));
        }
        if !status.is_success() {
            return Err(GatewayError::UpstreamUnavailable(format!(
                "report fetch status={status} url={url}"
            )));
        }
        let envelope: ReportEnvelope = resp
            .json()
            .await
            .map_err(|e| GatewayError::Decode(format!("report envelope undecodable: {e}")))?;
        if envelope.status != "ok" {
            return Err(GatewayError::UpstreamUnavailable(format!(
                "report envelope status={}",
                envelope.status
            )));
        }
        Ok(Report {
            hits: envelope.report.reports,
        })
    }

    #[instrument(name = "results_clusters", skip(self))]
    async fn clusters_for_organization(
        &self,
        org: OrgId,
    ) -> Result<Vec<ClusterId>, GatewayError> {
        let url = format!("{}/organizations/{org}/clusters", self.base_url);
        let resp = self
            .client()
            .get(&url)
            .send()
            .await
            .map_err(|e| transport_error("cluster list fetch", &e))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(GatewayError::UpstreamUnavailable(format!(
                "cluster list status={status} url={url}"
            )));
        }
        let envelope: ClustersEnvelope = resp
            .json()
            .await
            .map_err(|e| GatewayError::Decode(format!("cluster envelope undecodable: {e}")))?;
        if envelope.status != "ok" {
            return Err(GatewayError::UpstreamUnavailable(format!(
                "cluster envelope status={}",
                envelope.status
            )));
        }
        envelope
            .clusters
            .iter()
            .map(|raw| {
                ClusterId::parse(raw)
                    .map_err(|e| GatewayError::Decode(format!("cluster id {raw:?}: {e}")))
            })
            .collect()
    }
}
