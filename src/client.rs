use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, header};
use serde::Serialize;
use url::Url;

use crate::client_logger::ClientLogger;
use crate::config::ClientConfig;
use crate::decoder::DecodeMode;
use crate::display::ResponseDisplay;
use crate::error::{Error, Result};
use crate::observability::{
    CLIENT_REJECTED, CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS,
    CLIENT_STREAM_ERRORS, CLIENT_TRANSPORT_ERRORS, STREAM_TTFB,
};
use crate::outcome::RequestOutcome;
use crate::stream::collect_response;

/// Body of a chat request.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    prompt: &'a str,
}

impl ChatRequest<'_> {
    fn to_body(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Client for a streaming chat backend.
///
/// One prompt is in flight at a time.  Clones share that restriction, since
/// they share the flag that tracks it.
#[derive(Clone)]
pub struct ChatClient {
    client: ReqwestClient,
    chat_url: Url,
    timeout: Option<Duration>,
    decode: DecodeMode,
    in_flight: Arc<AtomicBool>,
    logger: Option<Arc<dyn ClientLogger>>,
}

impl ChatClient {
    /// Create a new client for the backend described by `config`.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let chat_url = config.chat_url()?;

        let mut builder = ReqwestClient::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            Error::http_client(
                format!("Failed to build HTTP client: {e}"),
                Some(Box::new(e)),
            )
        })?;

        Ok(Self {
            client,
            chat_url,
            timeout: config.timeout,
            decode: config.decode,
            in_flight: Arc::new(AtomicBool::new(false)),
            logger: None,
        })
    }

    /// Attach a logger that sees every request, chunk and outcome.
    pub fn with_logger(mut self, logger: Arc<dyn ClientLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// The URL prompts are posted to.
    pub fn chat_url(&self) -> &Url {
        &self.chat_url
    }

    /// True while a submission is outstanding.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Create and return default headers for chat requests.
    fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("text/plain"));
        headers
    }

    /// Send `prompt` and stream the answer into `display`.
    ///
    /// `display.on_progress` is called after every chunk, then exactly one of
    /// `on_success` or `on_error`.  The same outcome is returned.  No fault
    /// escapes this call.
    ///
    /// A call made while another is still running is rejected with a
    /// transport error and does not touch the network.  So is a prompt that is
    /// empty or only whitespace.
    pub async fn submit<D>(&self, prompt: &str, display: &mut D) -> RequestOutcome
    where
        D: ResponseDisplay + ?Sized,
    {
        let outcome = match InFlightGuard::acquire(&self.in_flight) {
            Some(_guard) => {
                CLIENT_REQUESTS.click();
                let start = Instant::now();
                let result = self.run(prompt, &mut *display, start).await;
                CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());
                match result {
                    Ok(text) => RequestOutcome::success(text),
                    Err(err) => {
                        CLIENT_REQUEST_ERRORS.click();
                        if err.is_transport() {
                            CLIENT_TRANSPORT_ERRORS.click();
                        } else {
                            CLIENT_STREAM_ERRORS.click();
                        }
                        RequestOutcome::from_error(&err)
                    }
                }
            }
            None => {
                CLIENT_REJECTED.click();
                RequestOutcome::from_error(&Error::busy("a request is already in flight"))
            }
        };

        if let Some(logger) = &self.logger {
            logger.log_outcome(&outcome);
        }
        display.finish(&outcome);
        outcome
    }

    async fn run<D>(&self, prompt: &str, display: &mut D, start: Instant) -> Result<String>
    where
        D: ResponseDisplay + ?Sized,
    {
        if prompt.trim().is_empty() {
            return Err(Error::validation(
                "prompt must not be empty",
                Some("prompt".to_string()),
            ));
        }
        if let Some(logger) = &self.logger {
            logger.log_request(self.chat_url.as_str(), prompt);
        }

        let body = ChatRequest { prompt }.to_body()?;
        let response = self
            .client
            .post(self.chat_url.clone())
            .headers(Self::default_headers())
            .body(body)
            .send()
            .await
            .map_err(|e| Error::from_send(e, self.timeout.map(|t| t.as_secs_f64())))?;
        STREAM_TTFB.add(start.elapsed().as_secs_f64());

        let status = response.status();
        if !status.is_success() {
            return Err(Error::api(
                status.as_u16(),
                status.canonical_reason().unwrap_or_default(),
            ));
        }

        collect_response(
            response.bytes_stream(),
            self.decode,
            display,
            self.logger.as_deref(),
        )
        .await
    }
}

impl fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatClient")
            .field("chat_url", &self.chat_url.as_str())
            .field("timeout", &self.timeout)
            .field("decode", &self.decode)
            .field("busy", &self.is_busy())
            .field("logger", &self.logger.is_some())
            .finish()
    }
}

/// Holds the single-flight flag for the duration of one submission.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
