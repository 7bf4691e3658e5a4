use crate::audit::{AdmissionEvent, AdmissionOutcome, Stage};
use crate::case::has_active_cases;
use crate::config::AdmissionConfig;
use crate::customer::{resolve_customer, CustomerReference, EntityKind};
use crate::error::AdmissionError;
use crate::outcome::{AdmissionResult, Failure, PipelineError, Rejection};
use crate::query::QueryService;
use crate::request::{extract_target, ExecutionContext};
use crate::sink::TraceSink;
use crate::value::RecordId;

/// A synchronous step run by a record-creation pipeline before commit.
pub trait PreCreateHook {
    /// Runs the step for one creation attempt.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError` to veto the creation.
    fn execute(&self, ctx: &ExecutionContext) -> Result<(), PipelineError>;
}

/// The open-case admission gate.
///
/// `AdmissionGate` vetoes creation of a case when the case's customer is an
/// account that already owns an active case. The case store and the trace
/// sink are injected at construction; nothing is looked up from ambient
/// state.
///
/// # Decision Flow
///
/// ```text
/// extract_target ──missing──────────────────────────────▶ Allowed
///       │
/// resolve_customer ──missing──────────────────────────▶ Rejected (customer required)
///       │
///       ├── not an account ──▶ skip_check ──────────────▶ Allowed
///       │
/// check_existing_cases ──query error──────────────────▶ Failed (generic)
///       │
///     decide ──active case found──────────────────────▶ Rejected (open case)
///       └──────none─────────────────────────────────────▶ Allowed
/// ```
///
/// Each call hands exactly one decision event to the trace sink.
///
/// # Panics
///
/// Store failures reported as `Err` become [`AdmissionResult::Failed`]. A
/// panic raised inside the injected [`QueryService`] or [`TraceSink`] is not
/// caught and unwinds out of [`admit`](Self::admit) to the host pipeline.
///
/// # Concurrency
///
/// The check-then-create sequence is not atomic. Two attempts for the same
/// account evaluated before either case is persisted will both be allowed.
/// The gate is an advisory guard; a hard guarantee needs a uniqueness
/// constraint in the store or a serializable transaction around the check
/// and the insert.
///
/// # Examples
///
/// ```
/// use case_admission::{
///     AdmissionGate, CaseRecord, CaseState, CreationRequest, EntityReference,
///     ExecutionContext, InMemoryCaseStore, RecordingSink,
/// };
///
/// let store = InMemoryCaseStore::new();
/// store.insert_case(&CaseRecord::new(
///     "CASE-1",
///     EntityReference::new("account", "A1"),
///     CaseState::Active,
/// ));
/// let sink = RecordingSink::new();
/// let gate = AdmissionGate::new(&store, &sink);
///
/// let ctx = ExecutionContext::new("req-1").with_target(
///     CreationRequest::new("incident")
///         .with_field("customerid", EntityReference::new("account", "A1")),
/// );
///
/// let result = gate.admit(&ctx);
/// assert!(result.is_rejected());
/// assert_eq!(sink.len(), 1);
/// ```
#[derive(Debug)]
pub struct AdmissionGate<Q, T> {
    query: Q,
    sink: T,
    config: AdmissionConfig,
}

impl<Q: QueryService, T: TraceSink> AdmissionGate<Q, T> {
    /// Creates a gate over `query` that reports to `sink`, using the default
    /// case schema.
    pub fn new(query: Q, sink: T) -> Self {
        Self {
            query,
            sink,
            config: AdmissionConfig::default(),
        }
    }

    /// Replaces the schema configuration.
    pub fn with_config(mut self, config: AdmissionConfig) -> Self {
        self.config = config;
        self
    }

    /// Decides whether the creation described by `ctx` may proceed.
    ///
    /// Never panics on bad input and never writes to the store.
    pub fn admit(&self, ctx: &ExecutionContext) -> AdmissionResult {
        let mut progress = Progress::new(ctx.request_id());
        let evaluation = self.evaluate(ctx, &mut progress);

        let (result, detail) = match evaluation {
            Ok(Admitted::NoOpenCases { customer_id }) => (
                AdmissionResult::Allowed,
                format!(
                    "case creation allowed; no open cases found for customer {}",
                    customer_id
                ),
            ),
            Ok(Admitted::NotAnAccount { kind }) => (
                AdmissionResult::Allowed,
                format!(
                    "customer is a {} record; open-case check applies to accounts only",
                    kind
                ),
            ),
            Err(AdmissionError::MissingTarget(e)) => (
                AdmissionResult::Allowed,
                format!("nothing to validate: {}", e),
            ),
            Err(AdmissionError::MissingCustomer(e)) => {
                let rejection = Rejection::customer_required();
                let detail = format!("{} ({})", rejection.message, e);
                (AdmissionResult::Rejected(rejection), detail)
            }
            Err(AdmissionError::InvariantViolation { customer_id }) => {
                let rejection = Rejection::open_case_exists(customer_id);
                let detail = rejection.message.clone();
                (AdmissionResult::Rejected(rejection), detail)
            }
            Err(e @ AdmissionError::BackendQuery(_)) => (
                AdmissionResult::Failed(Failure::new(ctx.request_id())),
                format!(
                    "unhandled error during {} (message {}, user {}): {}",
                    progress.stage,
                    ctx.message_name(),
                    ctx.user_id().map_or("unknown", |id| id.as_str()),
                    e
                ),
            ),
        };

        let mut event =
            AdmissionEvent::new(ctx.request_id(), progress.stage, AdmissionOutcome::from(&result))
                .with_detail(detail);
        if let Some(customer) = progress.customer.take() {
            event = event.with_customer(customer);
        }
        event.emit(&self.sink);

        progress.enter(Stage::Terminal);
        result
    }

    fn evaluate(
        &self,
        ctx: &ExecutionContext,
        progress: &mut Progress<'_>,
    ) -> Result<Admitted, AdmissionError> {
        progress.enter(Stage::ExtractTarget);
        let target = extract_target(ctx, self.config.target_parameter())?;

        progress.enter(Stage::ResolveCustomer);
        let customer = resolve_customer(target, self.config.customer_field())?;
        progress.customer = Some(customer.clone());

        if !customer.is_account() {
            progress.enter(Stage::SkipCheck);
            return Ok(Admitted::NotAnAccount {
                kind: customer.entity_kind,
            });
        }

        progress.enter(Stage::CheckExistingCases);
        let exists = has_active_cases(&self.query, &self.config, &customer.id)?;

        progress.enter(Stage::Decide);
        if exists {
            return Err(AdmissionError::InvariantViolation {
                customer_id: customer.id,
            });
        }

        Ok(Admitted::NoOpenCases {
            customer_id: customer.id,
        })
    }
}

impl<Q: QueryService, T: TraceSink> PreCreateHook for AdmissionGate<Q, T> {
    fn execute(&self, ctx: &ExecutionContext) -> Result<(), PipelineError> {
        self.admit(ctx).into_pipeline_result()
    }
}

/// Why a creation was allowed after a full evaluation.
enum Admitted {
    NoOpenCases { customer_id: RecordId },
    NotAnAccount { kind: EntityKind },
}

/// Tracks how far an evaluation got, for the decision event.
struct Progress<'a> {
    request_id: &'a str,
    stage: Stage,
    customer: Option<CustomerReference>,
}

impl<'a> Progress<'a> {
    fn new(request_id: &'a str) -> Self {
        Self {
            request_id,
            stage: Stage::Start,
            customer: None,
        }
    }

    fn enter(&mut self, stage: Stage) {
        tracing::debug!(
            target: "case_admission",
            request_id = %self.request_id,
            from = %self.stage,
            to = %stage,
            "stage transition"
        );
        self.stage = stage;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::{CaseRecord, CaseState};
    use crate::memory::InMemoryCaseStore;
    use crate::outcome::{PipelineErrorKind, RejectionKind, UNEXPECTED_FAILURE_MESSAGE};
    use crate::query::{QueryError, QueryErrorKind, QueryExpression, Record};
    use crate::request::{CreationRequest, InputParameter};
    use crate::sink::RecordingSink;
    use crate::value::{EntityReference, FieldValue};

    fn case_for(customer: EntityReference) -> ExecutionContext {
        ExecutionContext::new("req-test")
            .with_target(CreationRequest::new("incident").with_field("customerid", customer))
    }

    fn active_case(id: &str, logical_name: &str, customer: &str) -> CaseRecord {
        CaseRecord::new(
            id,
            EntityReference::new(logical_name, customer),
            CaseState::Active,
        )
    }

    #[test]
    fn account_without_cases_is_allowed() {
        let store = InMemoryCaseStore::new();
        let sink = RecordingSink::new();
        let gate = AdmissionGate::new(&store, &sink);

        let result = gate.admit(&case_for(EntityReference::new("account", "A1")));

        assert_eq!(result, AdmissionResult::Allowed);
        assert_eq!(store.queries().len(), 1);
        assert!(sink.contains("no open cases found for customer A1"));
    }

    #[test]
    fn account_with_active_case_is_rejected() {
        let store = InMemoryCaseStore::new();
        store.insert_case(&active_case("CASE-1", "account", "A1"));
        let sink = RecordingSink::new();
        let gate = AdmissionGate::new(&store, &sink);

        let result = gate.admit(&case_for(EntityReference::new("account", "A1")));

        let rejection = result.rejection().expect("rejected");
        assert_eq!(
            rejection.kind,
            RejectionKind::OpenCaseExists {
                customer_id: RecordId::new("A1")
            }
        );
        assert!(rejection.message.contains("A1"));
        assert!(sink.contains("rejected at decide for account:A1"));
    }

    #[test]
    fn resolved_and_cancelled_cases_do_not_block() {
        let store = InMemoryCaseStore::new();
        for (id, state) in [("CASE-1", CaseState::Resolved), ("CASE-2", CaseState::Cancelled)] {
            store.insert_case(&CaseRecord::new(
                id,
                EntityReference::new("account", "A1"),
                state,
            ));
        }
        let gate = AdmissionGate::new(&store, RecordingSink::new());

        assert!(gate
            .admit(&case_for(EntityReference::new("account", "A1")))
            .is_allowed());
    }

    #[test]
    fn contact_customer_skips_the_query() {
        let store = InMemoryCaseStore::new();
        store.insert_case(&active_case("CASE-1", "contact", "C1"));
        let sink = RecordingSink::new();
        let gate = AdmissionGate::new(&store, &sink);

        let result = gate.admit(&case_for(EntityReference::new("contact", "C1")));

        assert!(result.is_allowed());
        assert!(store.queries().is_empty());
        assert!(sink.contains("allowed at skip_check for contact:C1"));
    }

    #[test]
    fn missing_target_is_allowed_silently() {
        let store = InMemoryCaseStore::new();
        let sink = RecordingSink::new();
        let gate = AdmissionGate::new(&store, &sink);

        let result = gate.admit(&ExecutionContext::new("req-none"));

        assert!(result.is_allowed());
        assert!(store.queries().is_empty());
        assert_eq!(sink.len(), 1);
        assert!(sink.contains("allowed at extract_target"));
    }

    #[test]
    fn non_record_target_is_allowed() {
        let store = InMemoryCaseStore::new();
        let gate = AdmissionGate::new(&store, RecordingSink::new());
        let ctx = ExecutionContext::new("req-ref").with_parameter(
            "Target",
            InputParameter::Value(FieldValue::Text("not a record".to_string())),
        );

        assert!(gate.admit(&ctx).is_allowed());
    }

    #[test]
    fn missing_customer_is_rejected() {
        let store = InMemoryCaseStore::new();
        let sink = RecordingSink::new();
        let gate = AdmissionGate::new(&store, &sink);
        let ctx = ExecutionContext::new("req-nocust")
            .with_target(CreationRequest::new("incident").with_field("title", "Orphan"));

        let result = gate.admit(&ctx);

        let rejection = result.rejection().expect("rejected");
        assert_eq!(rejection.kind, RejectionKind::CustomerRequired);
        assert!(store.queries().is_empty());
        assert!(sink.contains("rejected at resolve_customer"));
    }

    #[test]
    fn text_customer_is_rejected() {
        let gate = AdmissionGate::new(InMemoryCaseStore::new(), RecordingSink::new());
        let ctx = ExecutionContext::new("req-text")
            .with_target(CreationRequest::new("incident").with_field("customerid", "A1"));

        assert!(gate.admit(&ctx).is_rejected());
    }

    #[test]
    fn query_failure_is_generic_to_caller_and_detailed_in_trace() {
        let store = InMemoryCaseStore::new();
        store.fail_with(QueryError::new(
            QueryErrorKind::Unavailable,
            "tcp connect to sql-07:1433 refused",
        ));
        let sink = RecordingSink::new();
        let gate = AdmissionGate::new(&store, &sink);

        let err = gate
            .execute(&case_for(EntityReference::new("account", "A1")))
            .unwrap_err();

        assert_eq!(err.kind(), PipelineErrorKind::Unexpected);
        assert_eq!(err.message(), UNEXPECTED_FAILURE_MESSAGE);
        assert!(!err.message().contains("sql-07"));
        assert_eq!(sink.len(), 1);
        assert!(sink.contains("tcp connect to sql-07:1433 refused"));
        assert!(sink.contains("failed at check_existing_cases"));
    }

    #[test]
    fn custom_schema_names_drive_extraction_and_query() {
        let store = InMemoryCaseStore::with_config(
            AdmissionConfig::default()
                .with_case_entity("new_ticket")
                .with_customer_field("new_accountid"),
        );
        store.insert_case(&active_case("T-1", "account", "A1"));
        let config = AdmissionConfig::default()
            .with_target_parameter("Record")
            .with_case_entity("new_ticket")
            .with_customer_field("new_accountid");
        let gate = AdmissionGate::new(&store, RecordingSink::new()).with_config(config);

        let ctx = ExecutionContext::new("req-custom").with_parameter(
            "Record",
            InputParameter::Record(
                CreationRequest::new("new_ticket")
                    .with_field("new_accountid", EntityReference::new("account", "A1")),
            ),
        );

        assert!(gate.admit(&ctx).is_rejected());
        assert_eq!(store.queries()[0].entity_name(), "new_ticket");
    }

    struct PanickingStore;

    impl QueryService for PanickingStore {
        fn query(&self, _query: &QueryExpression) -> Result<Vec<Record>, QueryError> {
            panic!("driver bug")
        }
    }

    #[test]
    #[should_panic(expected = "driver bug")]
    fn panic_in_query_service_unwinds_to_caller() {
        let gate = AdmissionGate::new(PanickingStore, RecordingSink::new());
        gate.admit(&case_for(EntityReference::new("account", "A1")));
    }

    #[test]
    fn hook_returns_business_violation_for_rejection() {
        let store = InMemoryCaseStore::new();
        store.insert_case(&active_case("CASE-1", "account", "A1"));
        let gate = AdmissionGate::new(&store, RecordingSink::new());

        let err = gate
            .execute(&case_for(EntityReference::new("account", "A1")))
            .unwrap_err();

        assert_eq!(err.kind(), PipelineErrorKind::BusinessRuleViolation);
        assert!(err.message().contains("The account A1 already has an open case"));
    }
}
