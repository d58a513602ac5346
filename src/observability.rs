use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("promptstream.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter =
    Counter::new("promptstream.client.request_errors");
pub(crate) static CLIENT_TRANSPORT_ERRORS: Counter =
    Counter::new("promptstream.client.transport_errors");
pub(crate) static CLIENT_STREAM_ERRORS: Counter =
    Counter::new("promptstream.client.stream_errors");
pub(crate) static CLIENT_REJECTED: Counter = Counter::new("promptstream.client.rejected");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("promptstream.client.request_duration_seconds");

pub(crate) static STREAM_CHUNKS: Counter = Counter::new("promptstream.stream.chunks");
pub(crate) static STREAM_BYTES: Counter = Counter::new("promptstream.stream.bytes");
pub(crate) static STREAM_MARKERS: Counter = Counter::new("promptstream.stream.markers");
pub(crate) static STREAM_TTFB: Moments = Moments::new("promptstream.stream.ttfb_seconds");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_counter(&CLIENT_TRANSPORT_ERRORS);
    collector.register_counter(&CLIENT_STREAM_ERRORS);
    collector.register_counter(&CLIENT_REJECTED);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&STREAM_CHUNKS);
    collector.register_counter(&STREAM_BYTES);
    collector.register_counter(&STREAM_MARKERS);
    collector.register_moments(&STREAM_TTFB);
}
