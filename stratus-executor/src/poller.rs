//! Long-running operation pollers.
//!
//! Mirrors the Resource Manager LRO protocol: the initial response names a
//! status monitor through `Azure-AsyncOperation` or `Location`, or, for PUT
//! without either header, the resource's own `provisioningState` is polled.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::http::{HttpMethod, HttpResponse, RequestBody};
use crate::pipeline::{response_error, ArmPipeline};
use crate::value::Output;
use crate::ExecutorError;

const IN_PROGRESS: &str = "InProgress";
const SUCCEEDED: &str = "Succeeded";

fn is_terminal(status: &str) -> bool {
    ["succeeded", "failed", "canceled", "cancelled"].contains(&status.to_ascii_lowercase().as_str())
}

fn is_success(status: &str) -> bool {
    status.eq_ignore_ascii_case(SUCCEEDED)
}

#[derive(Debug)]
struct PollState {
    status: String,
    async_url: Option<String>,
    location_url: Option<String>,
    retry_after: Option<Duration>,
    /// Body that becomes the result when no final GET is needed.
    final_body: Option<Value>,
    /// Error body of a failed or canceled operation.
    failure: Option<Value>,
    /// Cached outcome once the operation has finished.
    result: Option<Output>,
}

/// Handle on an operation started by a `begin_*` call.
///
/// Clones share state: waiting through one clone completes them all.
#[derive(Clone)]
pub struct Poller {
    pipeline: Arc<ArmPipeline>,
    method: HttpMethod,
    resource_url: Url,
    result_type: &'static str,
    interval: Duration,
    state: Arc<Mutex<PollState>>,
}

impl Poller {
    /// Build a poller from the operation's initial response.
    ///
    /// # Errors
    /// Returns [`ExecutorError::Decode`] if the initial body is not JSON.
    pub fn new(
        pipeline: Arc<ArmPipeline>,
        method: HttpMethod,
        resource_url: Url,
        initial: &HttpResponse,
        result_type: &'static str,
        interval: Duration,
    ) -> Result<Self, ExecutorError> {
        let body = initial.json()?;
        let async_url = initial.header("azure-asyncoperation").map(str::to_owned);
        let location_url = initial.header("location").map(str::to_owned);

        let status = if async_url.is_some() || (initial.status == 202 && location_url.is_some()) {
            IN_PROGRESS.to_owned()
        } else if let Some(state) = body.as_ref().and_then(provisioning_state) {
            if is_terminal(state) { state.to_owned() } else { IN_PROGRESS.to_owned() }
        } else {
            SUCCEEDED.to_owned()
        };

        let failure = (!is_success(&status) && is_terminal(&status)).then(|| body.clone()).flatten();
        let state = PollState {
            status,
            async_url,
            location_url,
            retry_after: retry_after(initial),
            final_body: body,
            failure,
            result: None,
        };

        Ok(Self {
            pipeline,
            method,
            resource_url,
            result_type,
            interval,
            state: Arc::new(Mutex::new(state)),
        })
    }

    /// Current status without contacting the service.
    pub async fn status(&self) -> String {
        self.state.lock().await.status.clone()
    }

    /// Whether the operation reached a terminal state.
    pub async fn done(&self) -> bool {
        is_terminal(&self.state.lock().await.status)
    }

    /// Block until the operation finishes.
    ///
    /// # Errors
    /// Returns [`ExecutorError::OperationFailed`] if it ends in `Failed` or
    /// `Canceled`, or the pipeline's error if a poll fails.
    pub async fn wait(&self) -> Result<(), ExecutorError> {
        self.result().await.map(drop)
    }

    /// Wait for completion and return the final resource, or `None` for
    /// operations that produce none.
    ///
    /// # Errors
    /// Same as [`Poller::wait`].
    pub async fn result(&self) -> Result<Output, ExecutorError> {
        let mut state = self.state.lock().await;
        if let Some(result) = &state.result {
            return Ok(result.clone());
        }

        while !is_terminal(&state.status) {
            let delay = state.retry_after.unwrap_or(self.interval);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            self.poll(&mut state).await?;
        }
        tracing::debug!(status = %state.status, url = %self.resource_url, "operation finished");

        if !is_success(&state.status) {
            return Err(failure_error(&state.status, state.failure.as_ref()));
        }

        let result = self.final_result(&mut state).await?;
        state.result = Some(result.clone());
        Ok(result)
    }

    async fn poll(&self, state: &mut PollState) -> Result<(), ExecutorError> {
        if let Some(link) = state.async_url.clone() {
            let (response, body) = self.pipeline.get_link(&link).await?;
            state.retry_after = retry_after(&response);
            let status = body
                .as_ref()
                .and_then(|b| b.get("status"))
                .and_then(Value::as_str)
                .unwrap_or(IN_PROGRESS);
            state.status = status.to_owned();
            if is_terminal(status) && !is_success(status) {
                state.failure = body;
            }
            return Ok(());
        }

        if let Some(link) = state.location_url.clone() {
            let url = Url::parse(&link).map_err(|e| ExecutorError::InvalidUrl {
                url: link.clone(),
                reason: e.to_string(),
            })?;
            let response = self.pipeline.send_raw(HttpMethod::Get, url, RequestBody::Empty).await?;
            state.retry_after = retry_after(&response);
            match response.status {
                202 => {
                    if let Some(next) = response.header("location") {
                        state.location_url = Some(next.to_owned());
                    }
                }
                status if (200..300).contains(&status) => {
                    state.status = SUCCEEDED.to_owned();
                    state.final_body = response.json()?;
                }
                _ => return Err(response_error(&response)),
            }
            return Ok(());
        }

        let response = self
            .pipeline
            .send(HttpMethod::Get, self.resource_url.clone(), RequestBody::Empty)
            .await?;
        state.retry_after = retry_after(&response);
        let body = response.json()?;
        let status = body.as_ref().and_then(provisioning_state).unwrap_or(SUCCEEDED);
        state.status = if is_terminal(status) { status.to_owned() } else { IN_PROGRESS.to_owned() };
        if is_terminal(status) && !is_success(status) {
            state.failure = body.clone();
        }
        state.final_body = body;
        Ok(())
    }

    async fn final_result(&self, state: &mut PollState) -> Result<Output, ExecutorError> {
        let body = match self.method {
            HttpMethod::Delete => None,
            HttpMethod::Put | HttpMethod::Patch if state.async_url.is_some() || state.location_url.is_some() => {
                let response = self
                    .pipeline
                    .send(HttpMethod::Get, self.resource_url.clone(), RequestBody::Empty)
                    .await?;
                response.json()?
            }
            _ => state.final_body.take(),
        };
        Ok(body.map_or(Output::None, |b| Output::from_arm(self.result_type, b)))
    }
}

fn provisioning_state(body: &Value) -> Option<&str> {
    body.get("properties")
        .and_then(|p| p.get("provisioningState"))
        .or_else(|| body.get("provisioningState"))
        .and_then(Value::as_str)
}

fn retry_after(response: &HttpResponse) -> Option<Duration> {
    response
        .header("retry-after")
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

fn failure_error(status: &str, body: Option<&Value>) -> ExecutorError {
    let message = body
        .and_then(|b| b.get("error"))
        .map(|error| {
            let code = error.get("code").and_then(Value::as_str);
            let message = error.get("message").and_then(Value::as_str).unwrap_or_default();
            match code {
                Some(code) => format!("({code}) {message}"),
                None => message.to_owned(),
            }
        })
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| "The operation did not complete successfully".to_owned());
    ExecutorError::OperationFailed { status: status.to_owned(), message }
}

impl fmt::Debug for Poller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Poller")
            .field("method", &self.method)
            .field("resource_url", &self.resource_url.as_str())
            .field("result_type", &self.result_type)
            .finish_non_exhaustive()
    }
}
