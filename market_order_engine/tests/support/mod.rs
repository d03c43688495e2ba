#![allow(dead_code)]
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
    Mutex,
};

use market_order_engine::{
    events::EventProducers,
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    traits::{PaymentGateway, PaymentSession, SessionOutcome, SessionRequest},
    MarketplaceDatabase,
    OrderFlowApi,
    ReconciliationApi,
    SqliteDatabase,
};
use sqlx::{migrate::MigrateDatabase, Sqlite};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayMode {
    Succeed,
    SucceedWithAdvisory,
    NoSession,
    Unreachable,
}

/// An in-memory payment gateway that records every request it receives.
#[derive(Clone)]
pub struct FakeGateway {
    mode: Arc<Mutex<GatewayMode>>,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<SessionRequest>>>,
}

impl FakeGateway {
    pub fn new(mode: GatewayMode) -> Self {
        Self { mode: Arc::new(Mutex::new(mode)), calls: Arc::default(), requests: Arc::default() }
    }

    pub fn set_mode(&self, mode: GatewayMode) {
        *self.mode.lock().unwrap() = mode;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<SessionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl PaymentGateway for FakeGateway {
    async fn create_session(&self, request: SessionRequest) -> SessionOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let order_id = request.order_id.to_string();
        self.requests.lock().unwrap().push(request);
        let mode = *self.mode.lock().unwrap();
        let session = PaymentSession {
            token: format!("tok-{order_id}"),
            redirect_url: format!("https://pay.example.com/v2/vtweb/{order_id}"),
        };
        match mode {
            GatewayMode::Succeed => SessionOutcome::Created { session, advisory: None },
            GatewayMode::SucceedWithAdvisory => {
                SessionOutcome::Created { session, advisory: Some("HTTP 201 with unexpected fields".into()) }
            },
            GatewayMode::NoSession => SessionOutcome::NoSession,
            GatewayMode::Unreachable => SessionOutcome::TransportError("connection refused".into()),
        }
    }
}

pub struct TestSystem {
    pub db: SqliteDatabase,
    pub gateway: FakeGateway,
    pub orders: OrderFlowApi<SqliteDatabase, FakeGateway>,
    pub reconciler: ReconciliationApi<SqliteDatabase>,
}

impl TestSystem {
    pub async fn new(mode: GatewayMode) -> Self {
        let url = random_db_path();
        prepare_test_env(&url).await;
        let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database");
        let gateway = FakeGateway::new(mode);
        let orders = OrderFlowApi::new(db.clone(), gateway.clone(), EventProducers::default());
        let reconciler = ReconciliationApi::new(db.clone(), EventProducers::default());
        Self { db, gateway, orders, reconciler }
    }

    pub async fn tear_down(mut self) {
        let url = self.db.url().to_string();
        let _ = self.orders.db_mut().close().await;
        let _ = self.reconciler.db_mut().close().await;
        let _ = self.db.close().await;
        let _ = Sqlite::drop_database(&url).await;
    }
}
