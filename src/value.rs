//! Strongly typed record field values.
//!
//! Record payloads arriving from the creation pipeline are string-keyed maps.
//! Instead of untyped lookups, every field carries a [`FieldValue`] so callers
//! can ask for exactly the shape they expect (for example, a reference).

use std::fmt;

/// Opaque identifier of a stored record.
///
/// The identifier is kept in its string form and displayed verbatim, so it can
/// be embedded in user-facing messages without reformatting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(String);

impl RecordId {
    /// Creates a record id from its string form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A typed pointer to another record.
///
/// Carries the target's id and the logical name of its entity type
/// (for example `"account"` or `"contact"`).
///
/// # Examples
///
/// ```
/// use case_admission::EntityReference;
///
/// let account = EntityReference::new("account", "A1");
/// assert_eq!(account.logical_name(), "account");
/// assert_eq!(account.id().as_str(), "A1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityReference {
    id: RecordId,
    logical_name: String,
}

impl EntityReference {
    /// Creates a reference to the record `id` of entity type `logical_name`.
    pub fn new(logical_name: impl Into<String>, id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            logical_name: logical_name.into(),
        }
    }

    /// Returns the referenced record's id.
    pub fn id(&self) -> &RecordId {
        &self.id
    }

    /// Returns the logical name of the referenced entity type.
    pub fn logical_name(&self) -> &str {
        &self.logical_name
    }
}

impl fmt::Display for EntityReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.logical_name, self.id)
    }
}

/// The value of a single record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Free text
    Text(String),
    /// Whole number
    Integer(i64),
    /// Two-option field
    Boolean(bool),
    /// Numeric option-set code (lifecycle states, status reasons)
    OptionSet(i32),
    /// A bare record id
    Id(RecordId),
    /// A typed reference to another record
    Reference(EntityReference),
}

impl FieldValue {
    /// Returns the reference if this value is reference-typed.
    pub fn as_reference(&self) -> Option<&EntityReference> {
        match self {
            FieldValue::Reference(reference) => Some(reference),
            _ => None,
        }
    }

    /// Equality as used by query conditions.
    ///
    /// A reference field matches a bare [`FieldValue::Id`] when the ids are
    /// equal, so a lookup column can be filtered by id alone. All other
    /// combinations compare structurally.
    pub fn matches(&self, condition: &FieldValue) -> bool {
        match (self, condition) {
            (FieldValue::Reference(reference), FieldValue::Id(id)) => reference.id() == id,
            _ => self == condition,
        }
    }

    /// Short name of the value's shape, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Text(_) => "text",
            FieldValue::Integer(_) => "integer",
            FieldValue::Boolean(_) => "boolean",
            FieldValue::OptionSet(_) => "option_set",
            FieldValue::Id(_) => "id",
            FieldValue::Reference(_) => "reference",
        }
    }
}

impl From<EntityReference> for FieldValue {
    fn from(reference: EntityReference) -> Self {
        FieldValue::Reference(reference)
    }
}

impl From<RecordId> for FieldValue {
    fn from(id: RecordId) -> Self {
        FieldValue::Id(id)
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        FieldValue::Text(text.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(text: String) -> Self {
        FieldValue::Text(text)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}
