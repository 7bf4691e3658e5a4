//! Property tests for the admission decision.
//!
//! Each property builds a random case store and a random creation request
//! and checks the decision against the one-open-case rule.

use case_admission::{
    AdmissionGate, AdmissionResult, CaseRecord, CaseState, CreationRequest, EntityReference,
    ExecutionContext, InMemoryCaseStore, PipelineErrorKind, PreCreateHook, QueryError,
    QueryErrorKind, RecordingSink, UNEXPECTED_FAILURE_MESSAGE,
};
use proptest::prelude::*;

// Strategy: record ids in the platform's short form
fn arb_id() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Z][0-9]{1,4}").unwrap()
}

fn arb_state() -> impl Strategy<Value = CaseState> {
    prop_oneof![
        Just(CaseState::Active),
        Just(CaseState::Resolved),
        Just(CaseState::Cancelled),
    ]
}

fn arb_closed_state() -> impl Strategy<Value = CaseState> {
    prop_oneof![Just(CaseState::Resolved), Just(CaseState::Cancelled)]
}

fn arb_non_account_kind() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("contact"), Just("lead"), Just("systemuser"), Just("team")]
}

fn store_with(cases: &[(String, &str, CaseState)]) -> InMemoryCaseStore {
    let store = InMemoryCaseStore::new();
    for (i, (customer, kind, state)) in cases.iter().enumerate() {
        store.insert_case(&CaseRecord::new(
            format!("CASE-{}", i),
            EntityReference::new(*kind, customer.as_str()),
            *state,
        ));
    }
    store
}

fn creation_for(kind: &str, customer: &str) -> ExecutionContext {
    ExecutionContext::new("req-prop").with_target(
        CreationRequest::new("incident")
            .with_field("customerid", EntityReference::new(kind, customer)),
    )
}

proptest! {
    /// Property: non-account customers are always allowed, whatever the store holds
    #[test]
    fn proptest_non_account_customers_always_allowed(
        customer in arb_id(),
        kind in arb_non_account_kind(),
        states in prop::collection::vec(arb_state(), 0..6)
    ) {
        let cases: Vec<_> = states.into_iter().map(|s| (customer.clone(), kind, s)).collect();
        let store = store_with(&cases);
        let gate = AdmissionGate::new(&store, RecordingSink::new());

        prop_assert_eq!(gate.admit(&creation_for(kind, &customer)), AdmissionResult::Allowed);
        prop_assert!(store.queries().is_empty());
    }

    /// Property: an account with no active cases is allowed
    #[test]
    fn proptest_account_without_active_cases_allowed(
        customer in arb_id(),
        closed in prop::collection::vec(arb_closed_state(), 0..6),
        others in prop::collection::vec(arb_id(), 0..4)
    ) {
        let mut cases: Vec<_> = closed.into_iter().map(|s| (customer.clone(), "account", s)).collect();
        cases.extend(
            others
                .into_iter()
                .filter(|o| *o != customer)
                .map(|o| (o, "account", CaseState::Active)),
        );
        let store = store_with(&cases);
        let gate = AdmissionGate::new(&store, RecordingSink::new());

        prop_assert_eq!(gate.admit(&creation_for("account", &customer)), AdmissionResult::Allowed);
    }

    /// Property: an account with at least one active case is rejected, naming the account
    #[test]
    fn proptest_account_with_active_case_rejected(
        customer in arb_id(),
        active in 1usize..4,
        closed in prop::collection::vec(arb_closed_state(), 0..4)
    ) {
        let mut cases: Vec<_> = (0..active).map(|_| (customer.clone(), "account", CaseState::Active)).collect();
        cases.extend(closed.into_iter().map(|s| (customer.clone(), "account", s)));
        let store = store_with(&cases);
        let gate = AdmissionGate::new(&store, RecordingSink::new());

        let result = gate.admit(&creation_for("account", &customer));
        let rejection = result.rejection().cloned();
        prop_assert!(rejection.is_some(), "expected rejection, got {:?}", result);
        let needle = format!("account {} ", customer);
        prop_assert!(rejection.unwrap().message.contains(&needle));
    }

    /// Property: checking twice with no intervening creation gives the same answer
    #[test]
    fn proptest_check_is_idempotent(
        customer in arb_id(),
        states in prop::collection::vec(arb_state(), 0..6)
    ) {
        let cases: Vec<_> = states.into_iter().map(|s| (customer.clone(), "account", s)).collect();
        let store = store_with(&cases);
        let gate = AdmissionGate::new(&store, RecordingSink::new());
        let ctx = creation_for("account", &customer);

        prop_assert_eq!(gate.admit(&ctx), gate.admit(&ctx));
    }

    /// Property: backend fault text reaches the trace but never the caller
    #[test]
    fn proptest_backend_faults_never_leak(
        customer in arb_id(),
        fault in prop::string::string_regex("[A-Z]{4}-[0-9]{4}").unwrap()
    ) {
        let store = InMemoryCaseStore::new();
        store.fail_with(QueryError::new(QueryErrorKind::Unavailable, fault.clone()));
        let sink = RecordingSink::new();
        let gate = AdmissionGate::new(&store, &sink);

        let err = gate.execute(&creation_for("account", &customer)).unwrap_err();

        prop_assert_eq!(err.kind(), PipelineErrorKind::Unexpected);
        prop_assert_eq!(err.message(), UNEXPECTED_FAILURE_MESSAGE);
        prop_assert!(!err.to_string().contains(&fault));
        prop_assert!(sink.contains(&fault));
    }

    /// Property: every call produces exactly one trace line
    #[test]
    fn proptest_one_trace_per_decision(
        customer in arb_id(),
        kind in prop_oneof![Just("account"), Just("contact"), Just("lead")],
        states in prop::collection::vec(arb_state(), 0..4),
        fail in any::<bool>()
    ) {
        let cases: Vec<_> = states.into_iter().map(|s| (customer.clone(), kind, s)).collect();
        let store = store_with(&cases);
        if fail {
            store.fail_with(QueryError::new(QueryErrorKind::Timeout, "slow"));
        }
        let sink = RecordingSink::new();
        let gate = AdmissionGate::new(&store, &sink);

        gate.admit(&creation_for(kind, &customer));

        prop_assert_eq!(sink.len(), 1);
    }
}
