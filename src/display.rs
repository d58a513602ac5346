//! The display collaborator.
//!
//! The client never touches a screen.  It reports what it has assembled so far
//! through [`ResponseDisplay`], and whatever host embeds it (terminal, web
//! view, test harness) decides what that looks like.

use crate::RequestOutcome;

/// Receives the lifecycle of one submission.
///
/// `on_progress` is called after every non-terminal chunk with the whole text
/// assembled so far.  Exactly one of `on_success` or `on_error` follows, once.
pub trait ResponseDisplay {
    /// The answer grew.  `current_text` is the full buffer, not a delta.
    fn on_progress(&mut self, current_text: &str);

    /// The answer is complete.
    fn on_success(&mut self, final_text: &str);

    /// The submission failed.
    fn on_error(&mut self, message: &str);

    /// Deliver a terminal outcome to the matching callback.
    fn finish(&mut self, outcome: &RequestOutcome) {
        match outcome {
            RequestOutcome::Success { text } => self.on_success(text),
            RequestOutcome::TransportError { message, .. }
            | RequestOutcome::StreamError { message } => self.on_error(message),
        }
    }
}

impl<D: ResponseDisplay + ?Sized> ResponseDisplay for &mut D {
    fn on_progress(&mut self, current_text: &str) {
        (**self).on_progress(current_text);
    }

    fn on_success(&mut self, final_text: &str) {
        (**self).on_success(final_text);
    }

    fn on_error(&mut self, message: &str) {
        (**self).on_error(message);
    }
}

/// One callback as observed by a [`RecordingDisplay`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DisplayEvent {
    Progress(String),
    Success(String),
    Error(String),
}

/// A display that remembers every call made to it.
///
/// Handy for tests and for hosts that want to render after the fact.
#[derive(Clone, Debug, Default)]
pub struct RecordingDisplay {
    events: Vec<DisplayEvent>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// All callbacks in the order they were made.
    pub fn events(&self) -> &[DisplayEvent] {
        &self.events
    }

    /// The text passed to each `on_progress` call.
    pub fn progress(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                DisplayEvent::Progress(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// The terminal callbacks made.  Should hold exactly one element.
    pub fn terminal(&self) -> Vec<&DisplayEvent> {
        self.events
            .iter()
            .filter(|e| !matches!(e, DisplayEvent::Progress(_)))
            .collect()
    }
}

impl ResponseDisplay for RecordingDisplay {
    fn on_progress(&mut self, current_text: &str) {
        self.events
            .push(DisplayEvent::Progress(current_text.to_string()));
    }

    fn on_success(&mut self, final_text: &str) {
        self.events.push(DisplayEvent::Success(final_text.to_string()));
    }

    fn on_error(&mut self, message: &str) {
        self.events.push(DisplayEvent::Error(message.to_string()));
    }
}
