use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::{ClaimsGateway, RetryPolicy, UpstreamError, MIN_AIRPORT_TERM_LEN};
use crate::claims::domain::{Airport, IataCode};
use crate::claims::submission::{ClaimEvaluation, ClaimEvaluationRequest, ClaimOrder, OrderReceipt};
use crate::config::UpstreamConfig;

const API_KEY_HEADER: &str = "x-api-key";

/// Whether a call may be repeated after the request could have reached the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    /// Lookups: any retryable failure is retried.
    Repeatable,
    /// Writes: resent only when the connection was never established.
    AtMostOnce,
}
const MAX_ERROR_MESSAGE_LEN: usize = 200;

/// reqwest-backed [`ClaimsGateway`].
#[derive(Debug, Clone)]
pub struct HttpClaimsGateway {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    retry: RetryPolicy,
}

impl HttpClaimsGateway {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|err| UpstreamError::Client(err.to_string()))?;

        Ok(Self::with_client(
            client,
            config.base_url.clone(),
            config.api_key.clone(),
            config.retry_policy(),
        ))
    }

    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        api_key: Option<String>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key,
            retry,
        }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn with_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => builder.header(API_KEY_HEADER, key),
            None => builder,
        }
    }

    async fn execute<T, B>(
        &self,
        route: &'static str,
        delivery: Delivery,
        build: B,
    ) -> Result<T, UpstreamError>
    where
        T: DeserializeOwned,
        B: Fn() -> RequestBuilder,
    {
        let retryable: fn(&UpstreamError) -> bool = match delivery {
            Delivery::Repeatable => UpstreamError::is_retryable,
            Delivery::AtMostOnce => UpstreamError::is_connect_failure,
        };
        self.retry
            .run_when(route, retryable, |attempt| {
                let request = self.with_auth(build());
                async move {
                    debug!(route, attempt, "calling claims api");
                    let response = request.send().await.map_err(transport_error)?;
                    let status = response.status();
                    if !status.is_success() {
                        let body = response.text().await.unwrap_or_default();
                        return Err(UpstreamError::Status {
                            status: status.as_u16(),
                            message: error_message(&body),
                        });
                    }
                    response
                        .json::<T>()
                        .await
                        .map_err(|err| UpstreamError::Decode(err.to_string()))
                }
            })
            .await
    }
}

#[async_trait]
impl ClaimsGateway for HttpClaimsGateway {
    async fn compensation_for_route(
        &self,
        from: &IataCode,
        to: &IataCode,
    ) -> Result<u32, UpstreamError> {
        let url = self.url("compensation");
        let payload: Value = self
            .execute("compensation", Delivery::Repeatable, || {
                self.client
                    .get(&url)
                    .query(&[("from_iata", from.as_str()), ("to_iata", to.as_str())])
            })
            .await?;

        extract_amount(&payload).ok_or_else(|| {
            UpstreamError::Decode("compensation payload carried no numeric amount".to_string())
        })
    }

    async fn search_airports(&self, term: &str) -> Result<Vec<Airport>, UpstreamError> {
        let term = term.trim();
        if term.chars().count() < MIN_AIRPORT_TERM_LEN {
            return Ok(Vec::new());
        }

        let url = self.url("airports");
        self.execute("airports", Delivery::Repeatable, || {
            self.client.get(&url).query(&[("term", term)])
        })
        .await
    }

    async fn evaluate_claim(
        &self,
        request: &ClaimEvaluationRequest,
    ) -> Result<ClaimEvaluation, UpstreamError> {
        let url = self.url("claims/evaluate");
        self.execute("claims.evaluate", Delivery::AtMostOnce, || {
            self.client.post(&url).json(request)
        })
        .await
    }

    async fn submit_order(&self, order: &ClaimOrder) -> Result<OrderReceipt, UpstreamError> {
        let url = self.url("claims/orders");
        self.execute("claims.orders", Delivery::AtMostOnce, || {
            self.client.post(&url).json(order)
        })
        .await
    }
}

fn transport_error(err: reqwest::Error) -> UpstreamError {
    if err.is_connect() {
        UpstreamError::Connect(err.to_string())
    } else if err.is_timeout() {
        UpstreamError::Timeout
    } else {
        UpstreamError::Transport(err.to_string())
    }
}

/// Prefer the API's own `message`/`error` field; otherwise a truncated body.
fn error_message(body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|value| {
        ["message", "error"]
            .iter()
            .find_map(|key| value.get(*key).and_then(Value::as_str).map(str::to_string))
    });

    from_json.unwrap_or_else(|| body.trim().chars().take(MAX_ERROR_MESSAGE_LEN).collect())
}

/// Pull a non-negative amount from `compensation`/`amount`, at the top level or under `data`.
pub(crate) fn extract_amount(payload: &Value) -> Option<u32> {
    let candidates = [payload, payload.get("data").unwrap_or(&Value::Null)];
    candidates.iter().find_map(|scope| {
        ["compensation", "amount"].iter().find_map(|key| {
            let number = scope.get(*key)?.as_f64()?;
            if number.is_finite() && number >= 0.0 {
                Some(number.floor().min(f64::from(u32::MAX)) as u32)
            } else {
                None
            }
        })
    })
}
