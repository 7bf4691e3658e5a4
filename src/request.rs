//! Execution context and target extraction.
//!
//! The creation pipeline hands the interceptor an [`ExecutionContext`]: an
//! immutable value describing one in-flight operation. The record being
//! created sits in the input parameter bag under the target name.

use std::collections::BTreeMap;

use crate::error::{MissingTargetError, MissingTargetReason};
use crate::value::{EntityReference, FieldValue, RecordId};

/// The record being created, as submitted to the pipeline.
///
/// # Examples
///
/// ```
/// use case_admission::{CreationRequest, EntityReference};
///
/// let request = CreationRequest::new("incident")
///     .with_field("title", "Printer on fire")
///     .with_field("customerid", EntityReference::new("account", "A1"));
///
/// let customer = request.reference("customerid").expect("reference field");
/// assert_eq!(customer.logical_name(), "account");
/// assert!(request.reference("title").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationRequest {
    logical_name: String,
    fields: BTreeMap<String, FieldValue>,
}

impl CreationRequest {
    /// Creates an empty request for entity `logical_name`.
    pub fn new(logical_name: impl Into<String>) -> Self {
        Self {
            logical_name: logical_name.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Sets a field, returning the request for chaining.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Returns the logical name of the entity being created.
    pub fn logical_name(&self) -> &str {
        &self.logical_name
    }

    /// Returns `true` if the field is present, whatever its type.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Returns the field value if present.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Returns the field's reference if it is present and reference-typed.
    pub fn reference(&self, name: &str) -> Option<&EntityReference> {
        self.get(name).and_then(FieldValue::as_reference)
    }
}

/// A value in the execution context's input parameter bag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputParameter {
    /// A full record payload (create and update messages)
    Record(CreationRequest),
    /// A pointer to an existing record (delete, assign and similar messages)
    Reference(EntityReference),
    /// Any scalar argument
    Value(FieldValue),
}

impl InputParameter {
    fn shape(&self) -> &'static str {
        match self {
            InputParameter::Record(_) => "record",
            InputParameter::Reference(_) => "reference",
            InputParameter::Value(_) => "scalar value",
        }
    }
}

/// Immutable description of one in-flight pipeline operation.
///
/// # Examples
///
/// ```
/// use case_admission::{CreationRequest, ExecutionContext};
///
/// let ctx = ExecutionContext::new("req-1")
///     .with_message_name("Create")
///     .with_target(CreationRequest::new("incident"));
///
/// assert_eq!(ctx.request_id(), "req-1");
/// assert!(ctx.parameter("Target").is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionContext {
    request_id: String,
    user_id: Option<RecordId>,
    message_name: String,
    input_parameters: BTreeMap<String, InputParameter>,
}

impl ExecutionContext {
    /// Name of the standard target parameter.
    pub const TARGET: &'static str = "Target";

    /// Creates a context for a `Create` operation with no parameters.
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            user_id: None,
            message_name: "Create".to_string(),
            input_parameters: BTreeMap::new(),
        }
    }

    /// Sets the initiating user.
    pub fn with_user_id(mut self, user_id: impl Into<RecordId>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Sets the pipeline message name.
    pub fn with_message_name(mut self, message_name: impl Into<String>) -> Self {
        self.message_name = message_name.into();
        self
    }

    /// Adds an input parameter.
    pub fn with_parameter(mut self, name: impl Into<String>, value: InputParameter) -> Self {
        self.input_parameters.insert(name.into(), value);
        self
    }

    /// Stores `request` under the standard target parameter.
    pub fn with_target(self, request: CreationRequest) -> Self {
        self.with_parameter(Self::TARGET, InputParameter::Record(request))
    }

    /// Returns the correlation id of this operation.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Returns the initiating user, if known.
    pub fn user_id(&self) -> Option<&RecordId> {
        self.user_id.as_ref()
    }

    /// Returns the pipeline message name.
    pub fn message_name(&self) -> &str {
        &self.message_name
    }

    /// Returns an input parameter by name.
    pub fn parameter(&self, name: &str) -> Option<&InputParameter> {
        self.input_parameters.get(name)
    }
}

/// Pulls the record payload stored under `parameter` out of `ctx`.
///
/// # Errors
///
/// Returns `MissingTargetError` if the parameter is absent or does not hold a
/// record.
pub fn extract_target<'a>(
    ctx: &'a ExecutionContext,
    parameter: &str,
) -> Result<&'a CreationRequest, MissingTargetError> {
    match ctx.parameter(parameter) {
        Some(InputParameter::Record(request)) => Ok(request),
        Some(other) => Err(MissingTargetError::new(
            parameter,
            MissingTargetReason::NotARecord {
                found: other.shape(),
            },
        )),
        None => Err(MissingTargetError::new(parameter, MissingTargetReason::Absent)),
    }
}
