//! The rebuild dispatch: one `repository_dispatch` event asking CI to
//! re-run the content sync and rebuild the sites.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use chrono::Utc;
use serde_json::json;

const GITHUB_API_VERSION: &str = "2022-11-28";
const EVENT_TYPE: &str = "cms_update";

/// A hung upstream must not hold the handler; the call is bounded and
/// never retried.
const DISPATCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("dispatch request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("GitHub API error: {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Seam for the publish trigger so route tests can count dispatches.
pub trait RebuildDispatcher: Send + Sync {
    /// Emit exactly one dispatch event carrying the acting user. Single
    /// attempt; the caller surfaces failure without retrying.
    fn dispatch<'a>(
        &'a self,
        user: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), DispatchError>> + Send + 'a>>;
}

/// Sends `repository_dispatch` events to the site repository.
pub struct DispatchClient {
    http: reqwest::Client,
    token: String,
    owner: String,
    repo: String,
}

impl DispatchClient {
    pub fn new(token: String, owner: String, repo: String) -> Result<Self, anyhow::Error> {
        let http = reqwest::Client::builder()
            .timeout(DISPATCH_TIMEOUT)
            .user_agent("copydesk")
            .build()?;
        Ok(Self {
            http,
            token,
            owner,
            repo,
        })
    }

    async fn send(&self, user: &str) -> Result<(), DispatchError> {
        let url = format!(
            "https://api.github.com/repos/{}/{}/dispatches",
            self.owner, self.repo
        );
        let response = self
            .http
            .post(&url)
            .header("Accept", "application/vnd.github+json")
            .header("Authorization", format!("Bearer {}", self.token))
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
            .json(&json!({
                "event_type": EVENT_TYPE,
                "client_payload": {
                    "user": user,
                    "timestamp": Utc::now().to_rfc3339(),
                },
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), %body, "github dispatch rejected");
            return Err(DispatchError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(user, "rebuild dispatch sent");
        Ok(())
    }
}

impl RebuildDispatcher for DispatchClient {
    fn dispatch<'a>(
        &'a self,
        user: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<(), DispatchError>> + Send + 'a>> {
        Box::pin(self.send(user))
    }
}
