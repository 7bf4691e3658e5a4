//! Pre-create admission control for case records.
//!
//! This crate keeps accounts to one open case at a time. It runs as a
//! synchronous pre-commit step of a record-creation pipeline:
//! - **Target extraction**: pull the record being created out of an explicit
//!   [`ExecutionContext`]
//! - **Customer resolution**: read and classify the case's customer reference
//! - **Existence check**: one query for active cases of that customer
//! - **Decision**: an explicit [`AdmissionResult`] instead of exceptions
//!
//! # Core Types
//!
//! - [`AdmissionGate`]: the orchestrator, built from an injected
//!   [`QueryService`] and [`TraceSink`]
//! - [`AdmissionResult`]: `Allowed`, `Rejected(reason)` or `Failed(generic)`
//! - [`CreationRequest`]: typed view of the in-flight record
//! - [`InMemoryCaseStore`]: in-process store for tests and embedders
//!
//! # Guarantees
//!
//! The rule is advisory under concurrent writers: two creations for the same
//! account evaluated before either is persisted can both be allowed. Pair the
//! gate with a store-side uniqueness constraint when the invariant must hold
//! strictly.
//!
//! # Examples
//!
//! ```
//! use case_admission::{
//!     AdmissionGate, AdmissionResult, CreationRequest, EntityReference, ExecutionContext,
//!     InMemoryCaseStore, RecordingSink,
//! };
//!
//! let store = InMemoryCaseStore::new();
//! let sink = RecordingSink::new();
//! let gate = AdmissionGate::new(&store, &sink);
//!
//! let ctx = ExecutionContext::new("req-1").with_target(
//!     CreationRequest::new("incident")
//!         .with_field("customerid", EntityReference::new("account", "A1")),
//! );
//!
//! assert_eq!(gate.admit(&ctx), AdmissionResult::Allowed);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod audit;
mod case;
mod config;
mod customer;
mod error;
mod gate;
mod memory;
mod outcome;
mod query;
mod request;
mod sink;
mod value;

pub use case::{active_cases_query, has_active_cases, CaseRecord, CaseState};
pub use config::AdmissionConfig;
pub use customer::{resolve_customer, CustomerReference, EntityKind};
pub use error::{
    AdmissionError, MissingCustomerError, MissingCustomerReason, MissingTargetError,
    MissingTargetReason,
};
pub use gate::{AdmissionGate, PreCreateHook};
pub use memory::InMemoryCaseStore;
pub use outcome::{
    AdmissionResult, Failure, PipelineError, PipelineErrorKind, Rejection, RejectionKind,
    CUSTOMER_REQUIRED_MESSAGE, UNEXPECTED_FAILURE_MESSAGE,
};
pub use query::{
    Condition, ConditionOperator, QueryError, QueryErrorKind, QueryExpression, QueryService,
    Record,
};
pub use request::{extract_target, CreationRequest, ExecutionContext, InputParameter};
pub use sink::{RecordingSink, TraceSink, TracingSink};
pub use value::{EntityReference, FieldValue, RecordId};
