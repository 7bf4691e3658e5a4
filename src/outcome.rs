use std::fmt;

use crate::value::RecordId;

/// Message returned when a case has no usable customer.
pub const CUSTOMER_REQUIRED_MESSAGE: &str = "Customer information is required to create a case.";

/// Message returned for every unexpected failure.
///
/// Deliberately carries no detail; the cause goes to the trace sink only.
pub const UNEXPECTED_FAILURE_MESSAGE: &str = "An unexpected error occurred while processing the case admission check. Please contact your system administrator.";

/// Final decision of an admission check.
///
/// Callers discriminate on the variant instead of catching errors:
/// `Allowed` lets the creation proceed, `Rejected` is an expected business
/// outcome with a message for the user, `Failed` is an internal fault whose
/// details were traced but are not exposed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionResult {
    /// The creation may proceed
    Allowed,
    /// The creation violates a business rule
    Rejected(Rejection),
    /// The check itself could not be completed
    Failed(Failure),
}

impl AdmissionResult {
    /// Returns `true` if the creation may proceed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, AdmissionResult::Allowed)
    }

    /// Returns `true` if the creation was vetoed by a business rule.
    pub fn is_rejected(&self) -> bool {
        matches!(self, AdmissionResult::Rejected(_))
    }

    /// Returns `true` if the check failed internally.
    pub fn is_failed(&self) -> bool {
        matches!(self, AdmissionResult::Failed(_))
    }

    /// Returns the rejection, if any.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            AdmissionResult::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }

    /// Converts the decision into the signal a creation pipeline expects.
    ///
    /// # Errors
    ///
    /// Returns a `BusinessRuleViolation` carrying the rejection message
    /// verbatim, or an `Unexpected` error carrying only the generic failure
    /// message.
    ///
    /// # Examples
    ///
    /// ```
    /// use case_admission::{AdmissionResult, PipelineErrorKind, Rejection};
    ///
    /// assert!(AdmissionResult::Allowed.into_pipeline_result().is_ok());
    ///
    /// let rejected = AdmissionResult::Rejected(Rejection::customer_required());
    /// let err = rejected.into_pipeline_result().unwrap_err();
    /// assert_eq!(err.kind(), PipelineErrorKind::BusinessRuleViolation);
    /// ```
    pub fn into_pipeline_result(self) -> Result<(), PipelineError> {
        match self {
            AdmissionResult::Allowed => Ok(()),
            AdmissionResult::Rejected(rejection) => Err(PipelineError::new(
                PipelineErrorKind::BusinessRuleViolation,
                rejection.message,
            )),
            AdmissionResult::Failed(failure) => Err(PipelineError::new(
                PipelineErrorKind::Unexpected,
                failure.message(),
            )),
        }
    }
}

/// A business-rule veto with a user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Which rule was violated
    pub kind: RejectionKind,
    /// Human-readable message shown to the user
    pub message: String,
}

impl Rejection {
    /// The case has no usable customer reference.
    pub fn customer_required() -> Self {
        Self {
            kind: RejectionKind::CustomerRequired,
            message: CUSTOMER_REQUIRED_MESSAGE.to_string(),
        }
    }

    /// The account already owns an active case.
    pub fn open_case_exists(customer_id: RecordId) -> Self {
        let message = format!(
            "The account {} already has an open case. Only one active case is allowed at a time. Please resolve or close any open cases before creating a new one.",
            customer_id
        );

        Self {
            kind: RejectionKind::OpenCaseExists { customer_id },
            message,
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// The rule behind a rejection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionKind {
    /// The case carries no customer reference
    CustomerRequired,
    /// The account already has an active case
    OpenCaseExists {
        /// Account that owns the active case
        customer_id: RecordId,
    },
}

impl fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionKind::CustomerRequired => write!(f, "customer_required"),
            RejectionKind::OpenCaseExists { .. } => write!(f, "open_case_exists"),
        }
    }
}

/// An internal fault, stripped of all detail.
///
/// Only the request id is kept, so support staff can find the full trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    request_id: String,
}

impl Failure {
    /// Creates a failure for the given request.
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
        }
    }

    /// Returns the request id for correlation with traces.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Returns the generic user-facing message.
    pub fn message(&self) -> &'static str {
        UNEXPECTED_FAILURE_MESSAGE
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(UNEXPECTED_FAILURE_MESSAGE)
    }
}

/// Error signalled back to the creation pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineError {
    kind: PipelineErrorKind,
    message: String,
}

impl PipelineError {
    /// Creates a pipeline error.
    pub fn new(kind: PipelineErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> PipelineErrorKind {
        self.kind
    }

    /// Returns the user-facing message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for PipelineError {}

/// Kind of pipeline error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineErrorKind {
    /// An expected, actionable business outcome
    BusinessRuleViolation,
    /// Something went wrong inside the check
    Unexpected,
}

impl fmt::Display for PipelineErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BusinessRuleViolation => write!(f, "business rule violation"),
            Self::Unexpected => write!(f, "unexpected error"),
        }
    }
}
