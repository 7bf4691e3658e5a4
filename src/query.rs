//! The Query Service capability.
//!
//! The interceptor reads the case store through a single narrow interface:
//! an entity name, a conjunction of equality conditions, and the columns to
//! project. Anything able to answer that shape can back the check.

use std::collections::BTreeMap;
use std::fmt;

use crate::value::{FieldValue, RecordId};

/// Error returned when a query cannot be executed.
///
/// The message may carry store internals (hostnames, SQL, permission names).
/// It is meant for diagnostics only and never reaches the end user.
///
/// # Examples
///
/// ```
/// use case_admission::{QueryError, QueryErrorKind};
///
/// let error = QueryError::new(QueryErrorKind::Timeout, "no response after 30s");
/// assert_eq!(error.kind(), QueryErrorKind::Timeout);
/// assert_eq!(error.message(), "no response after 30s");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryError {
    kind: QueryErrorKind,
    message: String,
}

impl QueryError {
    /// Creates a query error with a diagnostic message.
    pub fn new(kind: QueryErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> QueryErrorKind {
        self.kind
    }

    /// Returns the diagnostic message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "query error ({}): {}", self.kind, self.message)
    }
}

impl std::error::Error for QueryError {}

/// Kind of query failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorKind {
    /// Store could not be reached
    Unavailable,
    /// Store did not answer within its own timeout
    Timeout,
    /// Caller lacks read permission on the entity
    PermissionDenied,
    /// Query references unknown entities or fields
    InvalidQuery,
}

impl fmt::Display for QueryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "store unavailable"),
            Self::Timeout => write!(f, "timed out"),
            Self::PermissionDenied => write!(f, "permission denied"),
            Self::InvalidQuery => write!(f, "invalid query"),
        }
    }
}

/// Comparison operator of a query condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionOperator {
    /// Field equals value
    Equal,
}

impl fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionOperator::Equal => write!(f, "eq"),
        }
    }
}

/// A single `field <op> value` predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    /// Field the predicate applies to
    pub field: String,
    /// Comparison operator
    pub operator: ConditionOperator,
    /// Value to compare against
    pub value: FieldValue,
}

impl Condition {
    /// Creates an equality condition.
    pub fn equal(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            field: field.into(),
            operator: ConditionOperator::Equal,
            value: value.into(),
        }
    }
}

/// A query over one entity: conjunctive conditions plus a column projection.
///
/// # Examples
///
/// ```
/// use case_admission::{Condition, FieldValue, QueryExpression, RecordId};
///
/// let query = QueryExpression::new("incident")
///     .with_condition(Condition::equal("customerid", RecordId::new("A1")))
///     .with_condition(Condition::equal("statecode", FieldValue::OptionSet(0)))
///     .with_column("statecode");
///
/// assert_eq!(query.conditions().len(), 2);
/// assert_eq!(query.columns(), ["statecode".to_string()]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryExpression {
    entity_name: String,
    conditions: Vec<Condition>,
    columns: Vec<String>,
}

impl QueryExpression {
    /// Starts a query over `entity_name` with no conditions and no columns.
    pub fn new(entity_name: impl Into<String>) -> Self {
        Self {
            entity_name: entity_name.into(),
            conditions: Vec::new(),
            columns: Vec::new(),
        }
    }

    /// Adds a condition; all conditions must hold for a record to match.
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Adds a column to the projection.
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.columns.push(column.into());
        self
    }

    /// Returns the queried entity's logical name.
    pub fn entity_name(&self) -> &str {
        &self.entity_name
    }

    /// Returns the conjunctive conditions.
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Returns the projected columns.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

impl fmt::Display for QueryExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.entity_name, self.columns.join(", "))?;
        for (i, c) in self.conditions.iter().enumerate() {
            let joiner = if i == 0 { " where" } else { " and" };
            write!(f, "{} {} {} {:?}", joiner, c.field, c.operator, c.value)?;
        }
        Ok(())
    }
}

/// A record returned by a query, holding only the projected columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    id: RecordId,
    logical_name: String,
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    /// Creates an empty record of entity `logical_name`.
    pub fn new(logical_name: impl Into<String>, id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            logical_name: logical_name.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Sets a field, returning the record for chaining.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Returns the record id.
    pub fn id(&self) -> &RecordId {
        &self.id
    }

    /// Returns the entity's logical name.
    pub fn logical_name(&self) -> &str {
        &self.logical_name
    }

    /// Returns a field value if present.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Returns `true` if every condition holds for this record.
    pub fn satisfies(&self, conditions: &[Condition]) -> bool {
        conditions.iter().all(|c| match c.operator {
            ConditionOperator::Equal => self
                .fields
                .get(&c.field)
                .is_some_and(|value| value.matches(&c.value)),
        })
    }

    /// Returns a copy containing only `columns`.
    ///
    /// Columns the record does not have are skipped.
    pub fn project(&self, columns: &[String]) -> Record {
        let fields = columns
            .iter()
            .filter_map(|c| self.fields.get(c).map(|v| (c.clone(), v.clone())))
            .collect();

        Record {
            id: self.id.clone(),
            logical_name: self.logical_name.clone(),
            fields,
        }
    }
}

/// Read access to a record store.
///
/// Execution is synchronous and blocking. Timeouts belong to the
/// implementation and are reported as [`QueryErrorKind::Timeout`].
pub trait QueryService {
    /// Returns every record of the query's entity satisfying all of its
    /// conditions, projected to its columns.
    ///
    /// # Errors
    ///
    /// Returns `QueryError` if the query could not be executed.
    fn query(&self, query: &QueryExpression) -> Result<Vec<Record>, QueryError>;
}

impl<Q: QueryService + ?Sized> QueryService for &Q {
    fn query(&self, query: &QueryExpression) -> Result<Vec<Record>, QueryError> {
        (**self).query(query)
    }
}
