//! Configuration for the chat client and its command-line host.
//!
//! [`ChatArgs`] is parsed with `arrrg`; [`ClientConfig`] holds the resolved
//! values with defaults applied.

use std::time::Duration;

use arrrg_derive::CommandLine;
use url::Url;

use crate::decoder::DecodeMode;
use crate::{Error, Result};

/// Where the backend listens unless told otherwise.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Route that accepts prompts.
pub const DEFAULT_CHAT_PATH: &str = "/chat";

/// Command-line arguments for the promptstream tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Base URL of the chat backend.
    #[arrrg(optional, "Backend base URL (default: http://127.0.0.1:5000)", "URL")]
    pub base_url: Option<String>,

    /// Path of the chat route.
    #[arrrg(optional, "Chat route path (default: /chat)", "PATH")]
    pub path: Option<String>,

    /// Give up on a request after this many seconds.
    #[arrrg(optional, "Request timeout in seconds (default: none)", "SECONDS")]
    pub timeout_secs: Option<u64>,

    /// Fail on invalid UTF-8 instead of substituting U+FFFD.
    #[arrrg(flag, "Reject invalid UTF-8 in responses")]
    pub strict_utf8: bool,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,

    /// Read prompts interactively.
    #[arrrg(flag, "Prompt repeatedly instead of running once")]
    pub repl: bool,
}

/// Resolved client configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Scheme, host and port of the backend.
    pub base_url: String,

    /// Path joined onto `base_url` for every submission.
    pub chat_path: String,

    /// Optional request timeout.  `None` waits indefinitely.
    pub timeout: Option<Duration>,

    /// How invalid UTF-8 in the body is handled.
    pub decode: DecodeMode,
}

impl ClientConfig {
    /// Creates a configuration pointing at the default local backend.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            chat_path: DEFAULT_CHAT_PATH.to_string(),
            timeout: None,
            decode: DecodeMode::Lossy,
        }
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the chat route path.
    pub fn with_chat_path(mut self, chat_path: impl Into<String>) -> Self {
        self.chat_path = chat_path.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the decode mode.
    pub fn with_decode_mode(mut self, decode: DecodeMode) -> Self {
        self.decode = decode;
        self
    }

    /// The full URL prompts are posted to.
    pub fn chat_url(&self) -> Result<Url> {
        let base = Url::parse(&self.base_url)?;
        if base.cannot_be_a_base() {
            return Err(Error::validation(
                format!("{} cannot be used as a base URL", self.base_url),
                Some("base_url".to_string()),
            ));
        }
        Ok(base.join(&self.chat_path)?)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ClientConfig {
    fn from(args: ChatArgs) -> Self {
        let mut config = ClientConfig::new();
        if let Some(base_url) = args.base_url {
            config.base_url = base_url;
        }
        if let Some(path) = args.path {
            config.chat_path = path;
        }
        config.timeout = args.timeout_secs.map(Duration::from_secs);
        if args.strict_utf8 {
            config.decode = DecodeMode::Strict;
        }
        config
    }
}
