use market_order_engine::traits::{PaymentGateway, PaymentSession, SessionOutcome, SessionRequest};
use mockall::mock;

mock! {
    pub Gateway {}
    impl PaymentGateway for Gateway {
        async fn create_session(&self, request: SessionRequest) -> SessionOutcome;
    }
}

/// A gateway that hands out one session per order and must be called exactly `times` times.
pub fn gateway_that_succeeds(times: usize) -> MockGateway {
    let mut gateway = MockGateway::new();
    gateway.expect_create_session().times(times).returning(|req| SessionOutcome::Created {
        session: PaymentSession {
            token: format!("tok-{}", req.order_id),
            redirect_url: format!("https://pay.example.com/{}", req.order_id),
        },
        advisory: None,
    });
    gateway
}
