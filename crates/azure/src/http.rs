//! Management-plane HTTP transport: bearer auth, `api-version` URLs, ARM error
//! envelopes and long-running-operation polling.

use reqwest::header::HeaderMap;
use reqwest::{Client, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, warn};
use url::Url;

use crate::error::{ApiError, Result};

/// Maximum length of response body to log
const MAX_LOG_BODY_LENGTH: usize = 200;

fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let cut = (0..=MAX_LOG_BODY_LENGTH).rev().find(|i| body.is_char_boundary(*i)).unwrap_or(0);
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };
    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct OperationStatus {
    status: String,
    error: Option<ErrorDetail>,
}

fn error_from_reply(status: StatusCode, body: &str) -> ApiError {
    let detail = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|e| e.error)
        .unwrap_or_else(|| ErrorDetail {
            code: status.canonical_reason().unwrap_or("Unknown").replace(' ', ""),
            message: sanitize_for_log(body),
        });
    if status == StatusCode::NOT_FOUND {
        ApiError::NotFound { code: detail.code, message: detail.message }
    } else {
        ApiError::Status { status: status.as_u16(), code: detail.code, message: detail.message }
    }
}

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
}

enum PollTarget {
    AsyncOperation(Url),
    Location(Url),
}

/// Settings read once at start; see [`crate::AzureProvider`].
pub struct ClientSettings {
    pub endpoint: String,
    pub subscription_id: String,
    pub token: SecretString,
    pub poll_interval: Duration,
    pub operation_timeout: Duration,
}

/// HTTP client for Azure Resource Manager calls.
#[derive(Clone)]
pub struct ArmClient {
    http: Client,
    endpoint: Url,
    subscription_id: String,
    token: Arc<SecretString>,
    poll_interval: Duration,
    operation_timeout: Duration,
    shutdown: watch::Receiver<bool>,
}

impl ArmClient {
    /// `shutdown` is the host's cancellation scope: once it reads `true`,
    /// in-flight long-running-operation waits return [`ApiError::Cancelled`].
    pub fn new(settings: ClientSettings, shutdown: watch::Receiver<bool>) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("azmapper/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint: Url::parse(&settings.endpoint)?,
            subscription_id: settings.subscription_id,
            token: Arc::new(settings.token),
            poll_interval: settings.poll_interval,
            operation_timeout: settings.operation_timeout,
            shutdown,
        })
    }

    pub fn subscription_id(&self) -> &str { &self.subscription_id }

    /// Builds `{endpoint}/subscriptions/{sub}/resourceGroups/{rg}/providers/{provider}/{name}/{extra..}?api-version=`.
    pub fn resource_url(
        &self,
        resource_group: &str,
        provider_path: &str,
        name: &str,
        extra: &[&str],
        api_version: &str,
    ) -> Result<Url> {
        let mut url = self.endpoint.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?;
            segments
                .pop_if_empty()
                .push("subscriptions")
                .push(&self.subscription_id)
                .push("resourceGroups")
                .push(resource_group)
                .push("providers")
                .extend(provider_path.split('/'))
                .push(name)
                .extend(extra);
        }
        url.query_pairs_mut().append_pair("api-version", api_version);
        Ok(url)
    }

    pub async fn get<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
        debug!("GET {}", url);
        let reply = self.send(self.http.get(url.clone())).await?;
        Ok(serde_json::from_str(&reply.body)?)
    }

    /// PUT, wait for the operation if the service started one, then return the resource.
    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(&self, url: &Url, body: &B) -> Result<T> {
        debug!("PUT {}", url);
        let reply = self.send(self.http.put(url.clone()).json(body)).await?;
        if let Some(target) = self.poll_target(&reply) {
            self.wait_for_completion(target, retry_after(&reply.headers)).await?;
            return self.get(url).await;
        }
        if reply.body.trim().is_empty() {
            return self.get(url).await;
        }
        Ok(serde_json::from_str(&reply.body)?)
    }

    pub async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(&self, url: &Url, body: &B) -> Result<T> {
        debug!("PATCH {}", url);
        let reply = self.send(self.http.patch(url.clone()).json(body)).await?;
        if let Some(target) = self.poll_target(&reply) {
            self.wait_for_completion(target, retry_after(&reply.headers)).await?;
            return self.get(url).await;
        }
        Ok(serde_json::from_str(&reply.body)?)
    }

    /// POST an action (e.g. resize) and wait for it to settle.
    pub async fn post<B: Serialize + ?Sized>(&self, url: &Url, body: &B) -> Result<()> {
        debug!("POST {}", url);
        let reply = self.send(self.http.post(url.clone()).json(body)).await?;
        if let Some(target) = self.poll_target(&reply) {
            self.wait_for_completion(target, retry_after(&reply.headers)).await?;
        }
        Ok(())
    }

    /// DELETE and wait for it to settle. A 404 surfaces as [`ApiError::NotFound`].
    pub async fn delete(&self, url: &Url) -> Result<()> {
        debug!("DELETE {}", url);
        let reply = self.send(self.http.delete(url.clone())).await?;
        if let Some(target) = self.poll_target(&reply) {
            self.wait_for_completion(target, retry_after(&reply.headers)).await?;
        }
        Ok(())
    }

    async fn send(&self, request: RequestBuilder) -> Result<Reply> {
        let response = request.bearer_auth(self.token.expose_secret()).send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        if !status.is_success() {
            if status != StatusCode::NOT_FOUND {
                warn!("API error: {} - {}", status, sanitize_for_log(&body));
            }
            return Err(error_from_reply(status, &body));
        }
        Ok(Reply { status, headers, body })
    }

    fn poll_target(&self, reply: &Reply) -> Option<PollTarget> {
        let header = |name: &str| {
            reply
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| self.endpoint.join(v).ok())
        };
        if let Some(url) = header("azure-asyncoperation") {
            return Some(PollTarget::AsyncOperation(url));
        }
        if reply.status == StatusCode::ACCEPTED {
            return header("location").map(PollTarget::Location);
        }
        None
    }

    async fn wait_for_completion(&self, target: PollTarget, first_delay: Option<Duration>) -> Result<()> {
        let deadline = Instant::now() + self.operation_timeout;
        let mut delay = first_delay.unwrap_or(self.poll_interval);
        loop {
            let now = Instant::now();
            if now >= deadline {
                return Err(ApiError::Timeout(self.operation_timeout));
            }
            self.pause(delay.min(deadline - now)).await?;

            match &target {
                PollTarget::AsyncOperation(url) => {
                    debug!("polling operation {}", url);
                    let reply = self.send(self.http.get(url.clone())).await?;
                    let op: OperationStatus = serde_json::from_str(&reply.body)?;
                    match op.status.as_str() {
                        "Succeeded" => return Ok(()),
                        "Failed" | "Canceled" | "Cancelled" => {
                            let detail = op.error.unwrap_or_default();
                            return Err(ApiError::OperationFailed {
                                status: op.status,
                                code: detail.code,
                                message: detail.message,
                            });
                        }
                        _ => delay = retry_after(&reply.headers).unwrap_or(self.poll_interval),
                    }
                }
                PollTarget::Location(url) => {
                    debug!("polling location {}", url);
                    let reply = self.send(self.http.get(url.clone())).await?;
                    if reply.status != StatusCode::ACCEPTED {
                        return Ok(());
                    }
                    delay = retry_after(&reply.headers).unwrap_or(self.poll_interval);
                }
            }
        }
    }

    /// Sleeps for `delay` unless the shutdown signal fires first.
    async fn pause(&self, delay: Duration) -> Result<()> {
        let mut shutdown = self.shutdown.clone();
        if *shutdown.borrow() {
            return Err(ApiError::Cancelled);
        }
        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);
        let mut listening = true;
        loop {
            tokio::select! {
                _ = &mut sleep => return Ok(()),
                changed = shutdown.changed(), if listening => match changed {
                    Ok(()) if *shutdown.borrow() => return Err(ApiError::Cancelled),
                    Ok(()) => {}
                    // sender dropped: nobody can cancel any more
                    Err(_) => listening = false,
                },
            }
        }
    }
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
