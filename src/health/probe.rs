//! Status-page probe for canary releases.

use reqwest::header::COOKIE;
use reqwest::Client;

/// One release to look for, and the cookie that should route to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseCheck {
    pub release: String,
    pub cookie_name: String,
    pub cookie_value: String,
}

/// Result of probing one release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseResult {
    pub release: String,
    pub found: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthReport {
    /// Inputs were not parallel lists of equal length.
    InvalidInput { releases: usize, names: usize, values: usize },
    /// Every release probed so far, in order; ends at the first failure.
    Checked(Vec<ReleaseResult>),
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        match self {
            HealthReport::InvalidInput { .. } => false,
            HealthReport::Checked(results) => results.iter().all(|r| r.found),
        }
    }

    pub fn status_code(&self) -> u16 {
        if self.is_healthy() {
            200
        } else {
            500
        }
    }
}

/// Split a `;`-delimited list. A single trailing `;` ends the list; interior
/// empty entries are kept so parallel lists stay aligned.
pub fn split_list(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.strip_suffix(';')
        .unwrap_or(raw)
        .split(';')
        .map(str::to_string)
        .collect()
}

/// A status page and the releases expected behind it.
#[derive(Debug, Clone)]
pub struct ProbeTarget {
    pub url: String,
    pub checks: Vec<ReleaseCheck>,
}

impl ProbeTarget {
    /// Zip parallel lists; `Err` carries the mismatch report.
    pub fn from_lists(
        url: impl Into<String>,
        releases: Vec<String>,
        names: Vec<String>,
        values: Vec<String>,
    ) -> Result<Self, HealthReport> {
        if releases.len() != names.len() || names.len() != values.len() {
            tracing::warn!(
                releases = releases.len(),
                names = names.len(),
                values = values.len(),
                "Release lists are not the same length"
            );
            return Err(HealthReport::InvalidInput {
                releases: releases.len(),
                names: names.len(),
                values: values.len(),
            });
        }

        let checks = releases
            .into_iter()
            .zip(names)
            .zip(values)
            .map(|((release, cookie_name), cookie_value)| ReleaseCheck {
                release,
                cookie_name,
                cookie_value,
            })
            .collect();
        Ok(Self {
            url: url.into(),
            checks,
        })
    }

    /// Probe each release in order, stopping at the first one not found.
    pub async fn run(&self, client: &Client) -> HealthReport {
        let mut results = Vec::with_capacity(self.checks.len());
        for check in &self.checks {
            let found = check_status_page(client, &self.url, check).await;
            results.push(ReleaseResult {
                release: check.release.clone(),
                found,
            });
            if !found {
                break;
            }
        }
        HealthReport::Checked(results)
    }
}

/// Whether the page served for `check`'s cookie mentions its release.
pub async fn check_status_page(client: &Client, url: &str, check: &ReleaseCheck) -> bool {
    tracing::info!(
        url = %url,
        release = %check.release,
        cookie = %check.cookie_name,
        "Checking status page"
    );

    let body = match client
        .get(url)
        .header(COOKIE, format!("{}={}", check.cookie_name, check.cookie_value))
        .send()
        .await
    {
        Ok(response) => match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read status page body");
                return false;
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "Status page request failed");
            return false;
        }
    };

    let found = body.contains(&check.release);
    tracing::info!(release = %check.release, found, "Status page checked");
    found
}
