use std::cell::RefCell;

use crate::audit::{AdmissionEvent, AdmissionOutcome};

/// Fire-and-forget diagnostic output.
///
/// The admission check hands one [`AdmissionEvent`] per decision to
/// [`TraceSink::record`], which by default writes it as a single line through
/// [`TraceSink::trace`]. Nothing about correctness depends on a sink:
/// implementations may drop messages, and neither method can fail.
///
/// # Examples
///
/// ```
/// use case_admission::{RecordingSink, TraceSink};
///
/// let sink = RecordingSink::new();
/// sink.trace("Success: case creation allowed");
///
/// assert_eq!(sink.messages(), vec!["Success: case creation allowed"]);
/// ```
pub trait TraceSink {
    /// Records a diagnostic message.
    fn trace(&self, message: &str);

    /// Records a decision event.
    ///
    /// Sinks with a structured backend override this to keep the event's
    /// fields instead of its rendered line.
    fn record(&self, event: &AdmissionEvent) {
        self.trace(&event.to_string());
    }
}

impl<T: TraceSink + ?Sized> TraceSink for &T {
    fn trace(&self, message: &str) {
        (**self).trace(message)
    }

    fn record(&self, event: &AdmissionEvent) {
        (**self).record(event)
    }
}

/// A sink that collects messages into an in-memory vector.
///
/// Uses interior mutability so it can be shared by reference with the
/// admission gate while the caller keeps inspecting it.
#[derive(Debug, Default)]
pub struct RecordingSink {
    messages: RefCell<Vec<String>>,
}

impl RecordingSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all recorded messages, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }

    /// Returns the number of recorded messages.
    pub fn len(&self) -> usize {
        self.messages.borrow().len()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.messages.borrow().is_empty()
    }

    /// Returns true if any recorded message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.messages.borrow().iter().any(|m| m.contains(needle))
    }

}

impl TraceSink for RecordingSink {
    fn trace(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}

/// A sink that forwards to `tracing`.
///
/// Plain messages go out at info level on target `case_admission::trace`.
/// Decision events go out once on target `case_admission` with
/// `request_id`, `stage`, `outcome` and `customer` fields, at info for
/// allowed, warn for rejected and error for failed. Every event carries the
/// configured `source` label so interceptor output can be filtered from the
/// rest of the host's logs.
#[derive(Debug, Clone)]
pub struct TracingSink {
    source: String,
}

impl TracingSink {
    /// Creates a sink labelling messages with `source`.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Returns the source label.
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::new("case_admission")
    }
}

impl TraceSink for TracingSink {
    fn trace(&self, message: &str) {
        tracing::info!(target: "case_admission::trace", source = %self.source, "{}", message);
    }

    fn record(&self, event: &AdmissionEvent) {
        let customer = event.customer().map(ToString::to_string);
        let customer = customer.as_deref().unwrap_or("-");

        match event.outcome() {
            AdmissionOutcome::Allowed => tracing::info!(
                target: "case_admission",
                source = %self.source,
                request_id = %event.request_id(),
                stage = %event.stage(),
                outcome = %event.outcome(),
                customer = %customer,
                "{}",
                event.detail()
            ),
            AdmissionOutcome::Rejected => tracing::warn!(
                target: "case_admission",
                source = %self.source,
                request_id = %event.request_id(),
                stage = %event.stage(),
                outcome = %event.outcome(),
                customer = %customer,
                "{}",
                event.detail()
            ),
            AdmissionOutcome::Failed => tracing::error!(
                target: "case_admission",
                source = %self.source,
                request_id = %event.request_id(),
                stage = %event.stage(),
                outcome = %event.outcome(),
                customer = %customer,
                "{}",
                event.detail()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::Stage;

    #[test]
    fn recording_sink_starts_empty() {
        let sink = RecordingSink::new();
        assert!(sink.is_empty());
        assert_eq!(sink.len(), 0);
    }

    #[test]
    fn recording_sink_keeps_order() {
        let sink = RecordingSink::new();
        sink.trace("first");
        sink.trace("second");

        assert_eq!(sink.messages(), vec!["first", "second"]);
        assert!(sink.contains("sec"));
        assert!(!sink.contains("third"));
    }

    #[test]
    fn sink_usable_as_trait_object() {
        let sink = RecordingSink::new();
        let dynamic: &dyn TraceSink = &sink;

        dynamic.trace("via trait object");
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn recording_sink_renders_events_as_one_line() {
        let sink = RecordingSink::new();
        let event = AdmissionEvent::new("req-9", Stage::Decide, AdmissionOutcome::Allowed)
            .with_detail("no open cases");

        sink.record(&event);

        assert_eq!(sink.messages(), vec!["[req-9] allowed at decide: no open cases"]);
    }

    #[test]
    fn record_is_forwarded_through_references() {
        let sink = RecordingSink::new();
        let event = AdmissionEvent::new("req-10", Stage::ExtractTarget, AdmissionOutcome::Allowed);

        <&RecordingSink as TraceSink>::record(&&sink, &event);

        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn tracing_sink_does_not_panic_without_subscriber() {
        let sink = TracingSink::default();
        assert_eq!(sink.source(), "case_admission");
        sink.trace("no subscriber installed");
        sink.record(&AdmissionEvent::new(
            "req-11",
            Stage::Decide,
            AdmissionOutcome::Failed,
        ));
    }
}
