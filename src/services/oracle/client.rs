//! Oracle transports and the retrying, parsing client

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use super::parser::parse_verdict;
use super::prompt::Prompt;
use super::retry::{with_retry, RetryPolicy};
use super::{AdvisoryOracle, AdvisoryRequest, OracleError};
use crate::models::verdict::AdvisoryVerdict;
use crate::services::pacing::Pacer;

pub const DEFAULT_ORACLE_BASE_URL: &str = "https://api.deepseek.com/v1";
pub const DEFAULT_ORACLE_MODEL: &str = "deepseek-chat";
const UNPARSEABLE_REPLY: &str = "unparseable oracle reply";

/// Raw completion call. Returns the model's text.
#[async_trait]
pub trait OracleTransport: Send + Sync {
    async fn complete(&self, prompt: &Prompt) -> Result<String, OracleError>;
}

#[async_trait]
impl<T: OracleTransport + ?Sized> OracleTransport for Arc<T> {
    async fn complete(&self, prompt: &Prompt) -> Result<String, OracleError> {
        (**self).complete(prompt).await
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible `chat/completions` endpoint.
pub struct ChatCompletionsTransport {
    client: reqwest::Client,
    endpoint: Url,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
}

impl ChatCompletionsTransport {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

    pub fn new(base_url: &str, api_key: impl Into<String>, timeout: Duration) -> Result<Self, OracleError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_client(base_url, api_key, client)
    }

    pub fn with_client(
        base_url: &str,
        api_key: impl Into<String>,
        client: reqwest::Client,
    ) -> Result<Self, OracleError> {
        // keep any path prefix such as /v1
        let base = format!("{}/", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&base)
            .and_then(|b| b.join("chat/completions"))
            .map_err(|e| OracleError::Parse(format!("invalid oracle base url {:?}: {}", base_url, e)))?;

        Ok(Self {
            client,
            endpoint,
            api_key: api_key.into(),
            model: DEFAULT_ORACLE_MODEL.to_string(),
            max_tokens: 200,
            temperature: 0.2,
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl OracleTransport for ChatCompletionsTransport {
    async fn complete(&self, prompt: &Prompt) -> Result<String, OracleError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: ChatResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Parse(e.to_string()))?;

        payload
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(OracleError::EmptyResponse)
    }
}

fn classify_transport_error(err: reqwest::Error) -> OracleError {
    if err.is_timeout() {
        OracleError::Timeout
    } else {
        OracleError::Http(err)
    }
}

/// Retrying client that turns every failure into an abstain verdict.
pub struct AdvisoryClient<T> {
    transport: T,
    retry: RetryPolicy,
    pacer: Option<Arc<Pacer>>,
}

impl<T: OracleTransport> AdvisoryClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            retry: RetryPolicy::default(),
            pacer: None,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Share outbound-call spacing with the rest of the pass.
    pub fn with_pacer(mut self, pacer: Arc<Pacer>) -> Self {
        self.pacer = Some(pacer);
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// One call plus parsing. An unparseable reply fails the attempt so it
    /// is retried like a transport error.
    async fn attempt(
        &self,
        prompt: &Prompt,
        request: &AdvisoryRequest,
    ) -> Result<AdvisoryVerdict, OracleError> {
        if let Some(pacer) = &self.pacer {
            pacer.acquire().await;
        }
        let reply = self.transport.complete(prompt).await?;
        debug!(instrument = %request.instrument, reply = %reply, "AdvisoryClient: raw reply");

        parse_verdict(&reply, request.direction)
            .ok_or_else(|| OracleError::Parse(UNPARSEABLE_REPLY.to_string()))
    }
}

#[async_trait]
impl<T: OracleTransport> AdvisoryOracle for AdvisoryClient<T> {
    async fn confirm(&self, request: &AdvisoryRequest) -> AdvisoryVerdict {
        let prompt = Prompt::for_request(request);

        match with_retry(&self.retry, || self.attempt(&prompt, request)).await {
            Ok(verdict) => {
                info!(
                    instrument = %request.instrument,
                    direction = %request.direction,
                    verdict = %verdict.verdict,
                    confidence = verdict.confidence,
                    "AdvisoryClient: {} {} -> {}",
                    request.instrument,
                    request.direction,
                    verdict.verdict
                );
                verdict
            }
            Err(OracleError::Parse(message)) => {
                warn!(
                    instrument = %request.instrument,
                    error = %message,
                    "AdvisoryClient: unparseable reply for {}, abstaining",
                    request.instrument
                );
                AdvisoryVerdict::abstain(UNPARSEABLE_REPLY)
            }
            Err(err) => {
                warn!(
                    instrument = %request.instrument,
                    direction = %request.direction,
                    error = %err,
                    "AdvisoryClient: oracle unavailable for {}, abstaining",
                    request.instrument
                );
                AdvisoryVerdict::abstain(format!("oracle unavailable: {}", err))
            }
        }
    }
}
