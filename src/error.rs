use std::fmt;

use crate::query::QueryError;
use crate::value::RecordId;

/// Errors raised while evaluating a case admission.
///
/// Each variant has a fixed place in the admission policy:
///
/// | Variant              | Fatal | Surfaces to the caller as          |
/// |----------------------|-------|------------------------------------|
/// | `MissingTarget`      | no    | allowed (nothing to validate)      |
/// | `MissingCustomer`    | yes   | rejected: customer required        |
/// | `InvariantViolation` | yes   | rejected: account has an open case |
/// | `BackendQuery`       | yes   | failed: generic message only       |
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionError {
    /// The execution context carries no record-shaped target
    MissingTarget(MissingTargetError),
    /// The target has no usable customer reference
    MissingCustomer(MissingCustomerError),
    /// The case store could not be queried
    BackendQuery(QueryError),
    /// The account already has an active case
    InvariantViolation {
        /// The account that already owns an active case
        customer_id: RecordId,
    },
}

impl fmt::Display for AdmissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdmissionError::MissingTarget(e) => write!(f, "missing target: {}", e),
            AdmissionError::MissingCustomer(e) => write!(f, "missing customer: {}", e),
            AdmissionError::BackendQuery(e) => write!(f, "backend query failed: {}", e),
            AdmissionError::InvariantViolation { customer_id } => {
                write!(f, "account {} already has an active case", customer_id)
            }
        }
    }
}

impl std::error::Error for AdmissionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AdmissionError::MissingTarget(e) => Some(e),
            AdmissionError::MissingCustomer(e) => Some(e),
            AdmissionError::BackendQuery(e) => Some(e),
            AdmissionError::InvariantViolation { .. } => None,
        }
    }
}

impl From<MissingTargetError> for AdmissionError {
    fn from(e: MissingTargetError) -> Self {
        AdmissionError::MissingTarget(e)
    }
}

impl From<MissingCustomerError> for AdmissionError {
    fn from(e: MissingCustomerError) -> Self {
        AdmissionError::MissingCustomer(e)
    }
}

impl From<QueryError> for AdmissionError {
    fn from(e: QueryError) -> Self {
        AdmissionError::BackendQuery(e)
    }
}

/// The execution context has no identifiable record payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingTargetError {
    /// Name of the input parameter that was inspected
    pub parameter: String,
    /// Why the target could not be used
    pub reason: MissingTargetReason,
}

impl MissingTargetError {
    /// Creates a missing-target error for `parameter`.
    pub fn new(parameter: impl Into<String>, reason: MissingTargetReason) -> Self {
        Self {
            parameter: parameter.into(),
            reason,
        }
    }
}

impl fmt::Display for MissingTargetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            MissingTargetReason::Absent => {
                write!(f, "input parameter '{}' is not present", self.parameter)
            }
            MissingTargetReason::NotARecord { found } => write!(
                f,
                "input parameter '{}' holds a {} instead of a record",
                self.parameter, found
            ),
        }
    }
}

impl std::error::Error for MissingTargetError {}

/// Why a target payload was unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingTargetReason {
    /// No parameter under the target name
    Absent,
    /// The parameter exists but is not record-shaped
    NotARecord {
        /// Shape that was found instead
        found: &'static str,
    },
}

/// The creation request has no usable customer reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingCustomerError {
    /// Name of the customer field that was inspected
    pub field: String,
    /// Why the customer could not be resolved
    pub reason: MissingCustomerReason,
}

impl MissingCustomerError {
    /// Creates a missing-customer error for `field`.
    pub fn new(field: impl Into<String>, reason: MissingCustomerReason) -> Self {
        Self {
            field: field.into(),
            reason,
        }
    }
}

impl fmt::Display for MissingCustomerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            MissingCustomerReason::Absent => {
                write!(f, "field '{}' is missing on the target record", self.field)
            }
            MissingCustomerReason::NotAReference { found } => write!(
                f,
                "field '{}' holds a {} value instead of a reference",
                self.field, found
            ),
        }
    }
}

impl std::error::Error for MissingCustomerError {}

/// Why a customer field was unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingCustomerReason {
    /// Field not present on the record
    Absent,
    /// Field present but not reference-typed
    NotAReference {
        /// Shape that was found instead
        found: &'static str,
    },
}
