use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use domain::approvers::AuthorizedApprover;
use domain::requests::{RequestDraft, RequestParts, RequestReason};
use domain::Error;
use store::gateway::{DotationLookup, FixtureGateway, InitialState, SheetGateway};
use store::state::{AppStore, LoadPhase};

async fn ready_store() -> AppStore {
    let store = AppStore::new(Arc::new(FixtureGateway::with_latency(Duration::ZERO)));
    store.load_initial_state().await.unwrap();
    store
}

async fn parts_for(store: &AppStore, employee_id: &str, item_code: &str) -> RequestParts {
    let mut draft = RequestDraft::new("Laura Jiménez", "4411", RequestReason::NewDelivery);
    draft.add_collaborator(employee_id, "Carlos Ramirez").unwrap();
    let item = store.resolve_item(item_code).await.unwrap();
    draft.add_item(employee_id, &item).unwrap();
    draft.build().unwrap()
}

async fn login(store: &AppStore) {
    let approver = store.find_approver_by_id("5658").await.unwrap();
    store.login_approver(approver).await;
}

/// Gateway that counts every call and answers with empty success
/// payloads, to prove which operations were (not) reached.
#[derive(Default)]
struct RecordingGateway {
    initial_calls: AtomicUsize,
    delivery_calls: AtomicUsize,
}

#[async_trait]
impl SheetGateway for RecordingGateway {
    async fn initial_state(&self) -> Result<InitialState, Error> {
        self.initial_calls.fetch_add(1, Ordering::SeqCst);
        Ok(InitialState {
            inventory: Vec::new(),
            approvers: Vec::new(),
            epp_columns: Vec::new(),
        })
    }

    async fn process_delivery(
        &self,
        _request: &domain::requests::EppRequest,
        _approver: &AuthorizedApprover,
    ) -> Result<(), Error> {
        self.delivery_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn employee_dotation(&self, employee_id: &str) -> Result<DotationLookup, Error> {
        Ok(DotationLookup::Missing {
            message: format!("No recorded deliveries for code {employee_id}"),
        })
    }
}

/// Gateway whose submit blocks until the test releases it, to hold an
/// approval in flight deterministically.
struct HoldGateway {
    inner: FixtureGateway,
    entered: Notify,
    release: Notify,
}

impl HoldGateway {
    fn new() -> Self {
        Self {
            inner: FixtureGateway::with_latency(Duration::ZERO),
            entered: Notify::new(),
            release: Notify::new(),
        }
    }
}

#[async_trait]
impl SheetGateway for HoldGateway {
    async fn initial_state(&self) -> Result<InitialState, Error> {
        self.inner.initial_state().await
    }

    async fn process_delivery(
        &self,
        request: &domain::requests::EppRequest,
        approver: &AuthorizedApprover,
    ) -> Result<(), Error> {
        self.entered.notify_one();
        self.release.notified().await;
        self.inner.process_delivery(request, approver).await
    }

    async fn employee_dotation(&self, employee_id: &str) -> Result<DotationLookup, Error> {
        self.inner.employee_dotation(employee_id).await
    }
}

/// Gateway that fails its first snapshot fetch and succeeds afterwards.
struct FlakyGateway {
    inner: FixtureGateway,
    attempts: AtomicUsize,
}

#[async_trait]
impl SheetGateway for FlakyGateway {
    async fn initial_state(&self) -> Result<InitialState, Error> {
        if self.attempts.fetch_add(1, Ordering::SeqCst) == 0 {
            return Err(Error::remote("the sheet did not answer"));
        }
        self.inner.initial_state().await
    }

    async fn process_delivery(
        &self,
        request: &domain::requests::EppRequest,
        approver: &AuthorizedApprover,
    ) -> Result<(), Error> {
        self.inner.process_delivery(request, approver).await
    }

    async fn employee_dotation(&self, employee_id: &str) -> Result<DotationLookup, Error> {
        self.inner.employee_dotation(employee_id).await
    }
}

#[tokio::test]
async fn add_request_round_trips_through_find_request_by_id() {
    let store = ready_store().await;
    let parts = parts_for(&store, "1234", "CAS-001").await;

    let id = store.add_request(parts.clone()).await;
    let found = store.find_request_by_id(&id).await.unwrap();

    assert_eq!(found.requester_name, parts.requester_name);
    assert_eq!(found.requester_id, parts.requester_id);
    assert_eq!(found.reason, parts.reason);
    assert_eq!(found.items, parts.items);
}

#[tokio::test]
async fn approval_without_a_session_approver_never_reaches_the_gateway() {
    let gateway = Arc::new(RecordingGateway::default());
    let store = AppStore::new(gateway.clone());
    store.load_initial_state().await.unwrap();

    let err = store.approve_and_process("REQ-anything").await.unwrap_err();

    assert!(matches!(err, Error::NoActiveApprover));
    assert_eq!(gateway.initial_calls.load(Ordering::SeqCst), 1);
    assert_eq!(gateway.delivery_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn approving_an_unknown_request_is_not_found() {
    let store = ready_store().await;
    login(&store).await;

    let err = store.approve_and_process("REQ-missing").await.unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[tokio::test]
async fn an_approved_delivery_decrements_stock_after_the_silent_refresh() {
    let store = ready_store().await;
    login(&store).await;

    assert_eq!(store.find_item_by_id("CAS-001").await.unwrap().quantity, 50);

    let parts = parts_for(&store, "1234", "CAS-001").await;
    let id = store.add_request(parts).await;
    store.approve_and_process(&id).await.unwrap();

    assert!(store.find_request_by_id(&id).await.is_none());
    assert_eq!(store.find_item_by_id("CAS-001").await.unwrap().quantity, 49);
}

#[tokio::test]
async fn concurrent_approvals_of_distinct_requests_both_land() {
    let store = Arc::new(ready_store().await);
    login(&store).await;

    let first = store.add_request(parts_for(&store, "1234", "CAS-001").await).await;
    let second = store.add_request(parts_for(&store, "5678", "ZAP-005").await).await;

    let (a, b) = tokio::join!(
        store.approve_and_process(&first),
        store.approve_and_process(&second)
    );

    a.unwrap();
    b.unwrap();
    assert!(store.pending_requests().await.is_empty());
}

#[tokio::test]
async fn a_request_cannot_be_submitted_twice_while_in_flight() {
    let gateway = Arc::new(HoldGateway::new());
    let store = Arc::new(AppStore::new(gateway.clone()));
    store.load_initial_state().await.unwrap();
    login(&store).await;

    let id = store.add_request(parts_for(&store, "1234", "CAS-001").await).await;

    let task = tokio::spawn({
        let store = store.clone();
        let id = id.clone();
        async move { store.approve_and_process(&id).await }
    });

    // Wait until the first submit is inside the gateway, then race it.
    gateway.entered.notified().await;
    let err = store.approve_and_process(&id).await.unwrap_err();
    assert!(matches!(err, Error::DeliveryInFlight { .. }));

    gateway.release.notify_one();
    task.await.unwrap().unwrap();
    assert!(store.find_request_by_id(&id).await.is_none());
}

#[tokio::test]
async fn a_failed_submit_leaves_the_pending_list_untouched() {
    struct RejectingGateway {
        inner: FixtureGateway,
    }

    #[async_trait]
    impl SheetGateway for RejectingGateway {
        async fn initial_state(&self) -> Result<InitialState, Error> {
            self.inner.initial_state().await
        }

        async fn process_delivery(
            &self,
            _request: &domain::requests::EppRequest,
            _approver: &AuthorizedApprover,
        ) -> Result<(), Error> {
            Err(Error::remote("Row for CAS-001 is locked"))
        }

        async fn employee_dotation(&self, employee_id: &str) -> Result<DotationLookup, Error> {
            self.inner.employee_dotation(employee_id).await
        }
    }

    let store = AppStore::new(Arc::new(RejectingGateway {
        inner: FixtureGateway::with_latency(Duration::ZERO),
    }));
    store.load_initial_state().await.unwrap();
    login(&store).await;

    let id = store.add_request(parts_for(&store, "1234", "CAS-001").await).await;
    let err = store.approve_and_process(&id).await.unwrap_err();

    assert!(matches!(err, Error::Remote { .. }));
    assert!(store.find_request_by_id(&id).await.is_some());
    // The same request can be retried once the first attempt settled.
    store.approve_and_process(&id).await.unwrap_err();
}

#[tokio::test]
async fn a_dotation_miss_is_a_structured_result_with_a_message() {
    let store = ready_store().await;

    match store.employee_dotation("9999").await.unwrap() {
        DotationLookup::Missing { message } => assert!(!message.is_empty()),
        DotationLookup::Found(_) => panic!("employee 9999 has no recorded deliveries"),
    }
}

#[tokio::test]
async fn a_recorded_dotation_comes_back_with_its_items() {
    let store = ready_store().await;

    match store.employee_dotation("5658").await.unwrap() {
        DotationLookup::Found(dotation) => {
            assert_eq!(dotation.employee_name, "William Alfaro Delgado");
            assert_eq!(
                dotation.items.get("White Safety Helmet").map(String::as_str),
                Some("20/07/2024")
            );
        }
        DotationLookup::Missing { .. } => panic!("employee 5658 has recorded deliveries"),
    }
}

#[tokio::test]
async fn a_failed_load_is_terminal_until_retried() {
    let store = AppStore::new(Arc::new(FlakyGateway {
        inner: FixtureGateway::with_latency(Duration::ZERO),
        attempts: AtomicUsize::new(0),
    }));

    store.load_initial_state().await.unwrap_err();
    assert!(matches!(store.load_phase().await, LoadPhase::Failed(_)));
    assert!(store.inventory().await.is_empty());

    // load_initial_state is idempotent; a retry recovers fully.
    store.load_initial_state().await.unwrap();
    assert_eq!(store.load_phase().await, LoadPhase::Ready);
    assert_eq!(store.inventory().await.len(), 6);
}

#[tokio::test]
async fn item_lookups_are_case_insensitive_and_never_fail() {
    let store = ready_store().await;

    assert_eq!(
        store.find_item_by_id("cas-001").await.map(|i| i.description),
        Some("White Safety Helmet".to_string())
    );
    assert!(store.find_item_by_id("NOPE-999").await.is_none());
    assert!(matches!(
        store.resolve_item("").await,
        Err(Error::Validation { .. })
    ));
    assert!(matches!(
        store.resolve_item("NOPE-999").await,
        Err(Error::NotFound { .. })
    ));
}

#[tokio::test]
async fn stale_lines_resolve_to_unknown_on_the_delivery_screen() {
    let store = ready_store().await;

    let mut parts = parts_for(&store, "1234", "CAS-001").await;
    parts.items[0].item_id = "GONE-000".to_string();
    store.add_request(parts).await;

    let deliveries = store.pending_deliveries().await;
    assert_eq!(deliveries[0].descriptions, vec!["unknown".to_string()]);
}

#[tokio::test]
async fn logout_clears_the_session_approver() {
    let store = ready_store().await;
    login(&store).await;
    assert!(store.current_approver().await.is_some());

    store.logout_approver().await;
    assert!(store.current_approver().await.is_none());
}
