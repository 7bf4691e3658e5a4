//! Decision events.
//!
//! Every admission check ends in exactly one [`AdmissionEvent`], handed once
//! to the injected trace sink. [`TracingSink`](crate::TracingSink) turns it
//! into a structured event on target `case_admission`; other sinks get one
//! rendered line.
//!
//! Events hold identifiers and the decision detail only; record payloads are
//! never copied into them.

use std::fmt;

use crate::customer::CustomerReference;
use crate::outcome::AdmissionResult;
use crate::sink::TraceSink;

/// Point in the admission state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Nothing evaluated yet
    Start,
    /// Looking for the target record
    ExtractTarget,
    /// Reading the customer reference
    ResolveCustomer,
    /// Customer is not an account; no query needed
    SkipCheck,
    /// Querying for active cases
    CheckExistingCases,
    /// Turning the query answer into a decision
    Decide,
    /// Decision reached
    Terminal,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Start => write!(f, "start"),
            Stage::ExtractTarget => write!(f, "extract_target"),
            Stage::ResolveCustomer => write!(f, "resolve_customer"),
            Stage::SkipCheck => write!(f, "skip_check"),
            Stage::CheckExistingCases => write!(f, "check_existing_cases"),
            Stage::Decide => write!(f, "decide"),
            Stage::Terminal => write!(f, "terminal"),
        }
    }
}

/// Outcome recorded on a decision event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionOutcome {
    /// Creation allowed
    Allowed,
    /// Creation vetoed by the business rule
    Rejected,
    /// Check failed internally
    Failed,
}

impl From<&AdmissionResult> for AdmissionOutcome {
    fn from(result: &AdmissionResult) -> Self {
        match result {
            AdmissionResult::Allowed => AdmissionOutcome::Allowed,
            AdmissionResult::Rejected(_) => AdmissionOutcome::Rejected,
            AdmissionResult::Failed(_) => AdmissionOutcome::Failed,
        }
    }
}

impl fmt::Display for AdmissionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdmissionOutcome::Allowed => write!(f, "allowed"),
            AdmissionOutcome::Rejected => write!(f, "rejected"),
            AdmissionOutcome::Failed => write!(f, "failed"),
        }
    }
}

/// A complete record of one admission decision.
///
/// # Example
///
/// ```
/// use case_admission::audit::{AdmissionEvent, AdmissionOutcome, Stage};
///
/// let event = AdmissionEvent::new("req-7", Stage::ExtractTarget, AdmissionOutcome::Allowed)
///     .with_detail("no record target; nothing to validate");
///
/// assert_eq!(event.request_id(), "req-7");
/// assert!(event.to_string().contains("nothing to validate"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionEvent {
    request_id: String,
    stage: Stage,
    outcome: AdmissionOutcome,
    customer: Option<CustomerReference>,
    detail: String,
}

impl AdmissionEvent {
    /// Creates an event decided at `stage`.
    pub fn new(request_id: impl Into<String>, stage: Stage, outcome: AdmissionOutcome) -> Self {
        Self {
            request_id: request_id.into(),
            stage,
            outcome,
            customer: None,
            detail: String::new(),
        }
    }

    /// Attaches the resolved customer.
    pub fn with_customer(mut self, customer: CustomerReference) -> Self {
        self.customer = Some(customer);
        self
    }

    /// Attaches the decision detail.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }

    /// Returns the request id.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Returns the stage at which the decision was made.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Returns the outcome.
    pub fn outcome(&self) -> AdmissionOutcome {
        self.outcome
    }

    /// Returns the customer, if it was resolved.
    pub fn customer(&self) -> Option<&CustomerReference> {
        self.customer.as_ref()
    }

    /// Returns the decision detail.
    pub fn detail(&self) -> &str {
        &self.detail
    }

    /// Hands the event to `sink`, once.
    pub fn emit<T: TraceSink + ?Sized>(&self, sink: &T) {
        sink.record(self);
    }
}

impl fmt::Display for AdmissionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} at {}",
            self.request_id, self.outcome, self.stage
        )?;
        if let Some(customer) = &self.customer {
            write!(f, " for {}", customer)?;
        }
        if !self.detail.is_empty() {
            write!(f, ": {}", self.detail)?;
        }
        Ok(())
    }
}
