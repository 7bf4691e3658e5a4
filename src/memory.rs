//! In-memory record store.
//!
//! A simple [`QueryService`] over a vector of records, for tests and
//! embedders that keep cases in process. It records every query it answers
//! and can be told to fail, so callers can observe exactly what was asked.

use std::cell::RefCell;

use crate::case::CaseRecord;
use crate::config::AdmissionConfig;
use crate::query::{QueryError, QueryErrorKind, QueryExpression, QueryService, Record};

/// In-memory store answering queries over its records.
///
/// # Example
///
/// ```
/// use case_admission::{
///     has_active_cases, AdmissionConfig, CaseRecord, CaseState, EntityReference,
///     InMemoryCaseStore, RecordId,
/// };
///
/// let store = InMemoryCaseStore::new();
/// store.insert_case(&CaseRecord::new(
///     "CASE-1",
///     EntityReference::new("account", "A1"),
///     CaseState::Active,
/// ));
///
/// let config = AdmissionConfig::default();
/// assert!(has_active_cases(&store, &config, &RecordId::new("A1")).unwrap());
/// assert_eq!(store.queries().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryCaseStore {
    config: AdmissionConfig,
    records: RefCell<Vec<Record>>,
    queries: RefCell<Vec<QueryExpression>>,
    fault: RefCell<Option<QueryError>>,
}

impl InMemoryCaseStore {
    /// Creates an empty store using the default case schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store rendering cases with `config`'s schema names.
    pub fn with_config(config: AdmissionConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Adds a raw record.
    pub fn insert(&self, record: Record) {
        self.records.borrow_mut().push(record);
    }

    /// Adds a case, rendered with the store's schema names.
    pub fn insert_case(&self, case: &CaseRecord) {
        self.insert(case.to_record(&self.config));
    }

    /// Makes every subsequent query fail with `error`.
    pub fn fail_with(&self, error: QueryError) {
        *self.fault.borrow_mut() = Some(error);
    }

    /// Returns a snapshot of every query received, in order.
    pub fn queries(&self) -> Vec<QueryExpression> {
        self.queries.borrow().clone()
    }

    /// Returns the number of stored records.
    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    /// Returns true if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }
}

impl QueryService for InMemoryCaseStore {
    fn query(&self, query: &QueryExpression) -> Result<Vec<Record>, QueryError> {
        self.queries.borrow_mut().push(query.clone());

        if let Some(error) = self.fault.borrow().as_ref() {
            return Err(error.clone());
        }

        if query.entity_name().is_empty() {
            return Err(QueryError::new(
                QueryErrorKind::InvalidQuery,
                "query has no entity name",
            ));
        }

        let matches = self
            .records
            .borrow()
            .iter()
            .filter(|r| r.logical_name() == query.entity_name())
            .filter(|r| r.satisfies(query.conditions()))
            .map(|r| r.project(query.columns()))
            .collect();

        Ok(matches)
    }
}
