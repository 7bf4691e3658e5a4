//! Case records and the active-case existence check.

use std::fmt;

use crate::config::AdmissionConfig;
use crate::query::{Condition, QueryError, QueryExpression, QueryService, Record};
use crate::value::{EntityReference, FieldValue, RecordId};

/// Lifecycle state of a case, with the platform's `statecode` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseState {
    /// Open and unresolved
    Active,
    /// Closed as resolved
    Resolved,
    /// Closed without resolution
    Cancelled,
}

impl CaseState {
    /// Returns the option-set code stored in the state field.
    pub fn code(self) -> i32 {
        match self {
            CaseState::Active => 0,
            CaseState::Resolved => 1,
            CaseState::Cancelled => 2,
        }
    }
}

impl fmt::Display for CaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseState::Active => write!(f, "active"),
            CaseState::Resolved => write!(f, "resolved"),
            CaseState::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl From<CaseState> for FieldValue {
    fn from(state: CaseState) -> Self {
        FieldValue::OptionSet(state.code())
    }
}

/// A stored case, as owned by the backing store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseRecord {
    /// Case id
    pub id: RecordId,
    /// Customer the case belongs to
    pub customer: EntityReference,
    /// Lifecycle state
    pub state: CaseState,
}

impl CaseRecord {
    /// Creates a case for `customer` in `state`.
    pub fn new(id: impl Into<RecordId>, customer: EntityReference, state: CaseState) -> Self {
        Self {
            id: id.into(),
            customer,
            state,
        }
    }

    /// Returns the customer id.
    pub fn customer_id(&self) -> &RecordId {
        self.customer.id()
    }

    /// Renders the case as a store record using the configured schema names.
    pub fn to_record(&self, config: &AdmissionConfig) -> Record {
        Record::new(config.case_entity(), self.id.clone())
            .with_field(config.customer_field(), self.customer.clone())
            .with_field(config.state_field(), self.state)
    }
}

/// Builds the existence query for active cases of `customer_id`.
///
/// Filters on exactly the customer and state fields and projects only the
/// state column.
pub fn active_cases_query(config: &AdmissionConfig, customer_id: &RecordId) -> QueryExpression {
    QueryExpression::new(config.case_entity())
        .with_condition(Condition::equal(
            config.customer_field(),
            customer_id.clone(),
        ))
        .with_condition(Condition::equal(config.state_field(), CaseState::Active))
        .with_column(config.state_field())
}

/// Returns `true` if the store holds at least one active case for
/// `customer_id`.
///
/// Issues a single query. No retries.
///
/// # Errors
///
/// Returns `QueryError` if the query could not be executed.
pub fn has_active_cases<Q: QueryService + ?Sized>(
    service: &Q,
    config: &AdmissionConfig,
    customer_id: &RecordId,
) -> Result<bool, QueryError> {
    let query = active_cases_query(config, customer_id);
    let matches = service.query(&query)?;

    tracing::debug!(
        query = %query,
        matches = matches.len(),
        "active case query completed"
    );

    Ok(!matches.is_empty())
}
