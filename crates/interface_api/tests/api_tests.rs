//! HTTP-level tests of the router over in-memory adapters

use std::str::FromStr;
use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderValue, StatusCode};
use axum_test::TestServer;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use core_kernel::{Actor, SystemRole};
use domain_assistant::conversation::mock::MockConversationPort;
use domain_assistant::llm::mock::ScriptedLlm;
use domain_assistant::{LlmClient, LlmReply};
use domain_claims::ports::mock::{MockCasePort, MockRefundPort};
use domain_claims::{Claim, Dispute};
use domain_notifications::ports::mock::{MockNotificationPort, MockRoleDirectory};
use interface_api::auth::create_token;
use interface_api::config::ApiConfig;
use interface_api::{create_router, AppState, Ports};
use test_utils::ActorFixtures;

const SECRET: &str = "api-test-secret";

struct TestApp {
    server: TestServer,
    roles: Arc<MockRoleDirectory>,
}

async fn app_with_llm(llm: Option<Arc<dyn LlmClient>>) -> TestApp {
    let roles = Arc::new(MockRoleDirectory::new());
    let ports = Ports {
        claims: Arc::new(MockCasePort::<Claim>::new()),
        disputes: Arc::new(MockCasePort::<Dispute>::new()),
        refunds: Arc::new(MockRefundPort::new()),
        notifications: Arc::new(MockNotificationPort::new()),
        roles: roles.clone(),
        conversations: Arc::new(MockConversationPort::new()),
    };
    let config = ApiConfig {
        jwt_secret: SECRET.to_string(),
        ..ApiConfig::default()
    };
    let state = AppState::new(config, ports, llm);
    TestApp {
        server: TestServer::new(create_router(state)).unwrap(),
        roles,
    }
}

async fn app() -> TestApp {
    app_with_llm(None).await
}

fn bearer(actor: &Actor) -> HeaderValue {
    let token = create_token(actor, SECRET, 600).unwrap();
    HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
}

fn decimal(value: &Value) -> Decimal {
    Decimal::from_str(value.as_str().unwrap()).unwrap()
}

impl TestApp {
    async fn submit_claim(&self, employee: &Actor, amount: &str) -> Value {
        let response = self
            .server
            .post("/api/v1/claims")
            .add_header(AUTHORIZATION, bearer(employee))
            .json(&json!({
                "description": "Client dinner",
                "claim_type": "meals",
                "amount": amount
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json::<Value>()
    }
}

mod health {
    use super::*;

    #[tokio::test]
    async fn test_health_endpoints_are_public() {
        let app = app().await;

        let health = app.server.get("/health").await;
        health.assert_status_ok();
        assert_eq!(health.json::<Value>()["status"], "healthy");

        let ready = app.server.get("/health/ready").await;
        ready.assert_status_ok();
        let body = ready.json::<Value>();
        assert_eq!(body["status"], "ready");
        assert_eq!(body["adapters"].as_array().unwrap().len(), 5);
    }
}

mod auth {
    use super::*;

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let app = app().await;
        let response = app.server.get("/api/v1/claims/mine").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<Value>()["error"], "unauthorized");
    }

    #[tokio::test]
    async fn test_token_signed_with_other_secret_is_rejected() {
        let app = app().await;
        let token = create_token(&ActorFixtures::employee(), "someone-else", 600).unwrap();
        let response = app
            .server
            .get("/api/v1/claims/mine")
            .add_header(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", token)).unwrap())
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_work_queues_require_roles() {
        let app = app().await;
        let employee = ActorFixtures::employee();

        for path in [
            "/api/v1/claims/under-review",
            "/api/v1/claims/pending-manager-approval",
            "/api/v1/claims/approved",
            "/api/v1/disputes/under-review",
        ] {
            let response = app.server.get(path).add_header(AUTHORIZATION, bearer(&employee)).await;
            response.assert_status(StatusCode::FORBIDDEN);
            assert_eq!(response.json::<Value>()["error"], "forbidden");
        }
    }
}

mod claims {
    use super::*;

    #[tokio::test]
    async fn test_create_claim_generates_number() {
        let app = app().await;
        let employee = ActorFixtures::employee();

        let claim = app.submit_claim(&employee, "500.00").await;
        assert!(claim["claim_number"].as_str().unwrap().starts_with("CLAIM-"));
        assert_eq!(claim["status"], "under_review");
        assert_eq!(decimal(&claim["amount"]), dec!(500));

        let mine = app
            .server
            .get("/api/v1/claims/mine")
            .add_header(AUTHORIZATION, bearer(&employee))
            .await
            .json::<Value>();
        assert_eq!(mine.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_amount_is_bad_request() {
        let app = app().await;
        let response = app
            .server
            .post("/api/v1/claims")
            .add_header(AUTHORIZATION, bearer(&ActorFixtures::employee()))
            .json(&json!({ "description": "Taxi", "claim_type": "travel" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body = response.json::<Value>();
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["message"], "Amount is required");
    }

    #[tokio::test]
    async fn test_other_employees_cannot_see_a_claim() {
        let app = app().await;
        let owner = ActorFixtures::employee();
        let claim = app.submit_claim(&owner, "80").await;
        let number = claim["claim_number"].as_str().unwrap();

        let stranger = app
            .server
            .get(&format!("/api/v1/claims/{}", number))
            .add_header(AUTHORIZATION, bearer(&ActorFixtures::employee()))
            .await;
        stranger.assert_status(StatusCode::NOT_FOUND);

        let reviewer = app
            .server
            .get(&format!("/api/v1/claims/{}", number))
            .add_header(AUTHORIZATION, bearer(&ActorFixtures::specialist()))
            .await;
        reviewer.assert_status_ok();
    }

    #[tokio::test]
    async fn test_specialist_cannot_exceed_claimed_amount() {
        let app = app().await;
        let claim = app.submit_claim(&ActorFixtures::employee(), "500").await;
        let number = claim["claim_number"].as_str().unwrap();

        let response = app
            .server
            .post(&format!("/api/v1/claims/{}/review", number))
            .add_header(AUTHORIZATION, bearer(&ActorFixtures::specialist()))
            .json(&json!({ "action": "approve", "approved_amount": "600" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["error"], "amount_constraint");
    }

    #[tokio::test]
    async fn test_unknown_action_is_bad_request() {
        let app = app().await;
        let claim = app.submit_claim(&ActorFixtures::employee(), "500").await;
        let number = claim["claim_number"].as_str().unwrap();

        let response = app
            .server
            .post(&format!("/api/v1/claims/{}/review", number))
            .add_header(AUTHORIZATION, bearer(&ActorFixtures::specialist()))
            .json(&json!({ "action": "escalate" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_manager_cannot_confirm_before_specialist() {
        let app = app().await;
        let claim = app.submit_claim(&ActorFixtures::employee(), "500").await;
        let number = claim["claim_number"].as_str().unwrap();

        let response = app
            .server
            .post(&format!("/api/v1/claims/{}/confirm", number))
            .add_header(AUTHORIZATION, bearer(&ActorFixtures::manager()))
            .json(&json!({ "action": "approve" }))
            .await;
        response.assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_full_pipeline_to_paid_refund() {
        let app = app().await;
        let employee = ActorFixtures::employee();
        let specialist = ActorFixtures::specialist();
        let manager = ActorFixtures::manager();
        let finance = ActorFixtures::finance_staff();

        let claim = app.submit_claim(&employee, "500.00").await;
        let number = claim["claim_number"].as_str().unwrap().to_string();

        let queue = app
            .server
            .get("/api/v1/claims/under-review")
            .add_header(AUTHORIZATION, bearer(&specialist))
            .await
            .json::<Value>();
        assert_eq!(queue.as_array().unwrap().len(), 1);

        let reviewed = app
            .server
            .post(&format!("/api/v1/claims/{}/review", number))
            .add_header(AUTHORIZATION, bearer(&specialist))
            .json(&json!({ "action": "approve", "approved_amount": "450.00" }))
            .await;
        reviewed.assert_status_ok();
        assert_eq!(reviewed.json::<Value>()["status"], "pending_manager_approval");

        let confirmed = app
            .server
            .post(&format!("/api/v1/claims/{}/confirm", number))
            .add_header(AUTHORIZATION, bearer(&manager))
            .json(&json!({ "action": "approve" }))
            .await;
        confirmed.assert_status_ok();
        let confirmed = confirmed.json::<Value>();
        assert_eq!(confirmed["status"], "approved");
        assert_eq!(confirmed["decision_log"].as_array().unwrap().len(), 2);
        assert!(confirmed["resolution_comment"].is_string());

        let awaiting = app
            .server
            .get("/api/v1/claims/approved")
            .add_header(AUTHORIZATION, bearer(&finance))
            .await
            .json::<Value>();
        assert_eq!(awaiting.as_array().unwrap().len(), 1);

        let refund = app
            .server
            .post(&format!("/api/v1/claims/{}/refund", number))
            .add_header(AUTHORIZATION, bearer(&finance))
            .await;
        refund.assert_status(StatusCode::CREATED);
        let refund = refund.json::<Value>();
        assert_eq!(decimal(&refund["amount"]), dec!(450));
        assert_eq!(refund["status"], "pending");
        assert_eq!(refund["source_type"], "claim");

        let duplicate = app
            .server
            .post(&format!("/api/v1/claims/{}/refund", number))
            .add_header(AUTHORIZATION, bearer(&finance))
            .await;
        duplicate.assert_status(StatusCode::CONFLICT);

        let awaiting = app
            .server
            .get("/api/v1/claims/approved")
            .add_header(AUTHORIZATION, bearer(&finance))
            .await
            .json::<Value>();
        assert!(awaiting.as_array().unwrap().is_empty());

        let paid = app
            .server
            .post(&format!("/api/v1/refunds/{}/paid", refund["id"].as_str().unwrap()))
            .add_header(AUTHORIZATION, bearer(&finance))
            .await;
        paid.assert_status_ok();
        let paid = paid.json::<Value>();
        assert_eq!(paid["status"], "paid");
        assert!(paid["paid_at"].is_string());
    }

    #[tokio::test]
    async fn test_refund_body_can_override_amount() {
        let app = app().await;
        let claim = app.submit_claim(&ActorFixtures::employee(), "300").await;
        let number = claim["claim_number"].as_str().unwrap().to_string();

        app.server
            .post(&format!("/api/v1/claims/{}/review", number))
            .add_header(AUTHORIZATION, bearer(&ActorFixtures::specialist()))
            .json(&json!({ "action": "approve", "approved_amount": "300" }))
            .await
            .assert_status_ok();
        app.server
            .post(&format!("/api/v1/claims/{}/confirm", number))
            .add_header(AUTHORIZATION, bearer(&ActorFixtures::manager()))
            .json(&json!({ "action": "approve" }))
            .await
            .assert_status_ok();

        let refund = app
            .server
            .post(&format!("/api/v1/claims/{}/refund", number))
            .add_header(AUTHORIZATION, bearer(&ActorFixtures::finance_staff()))
            .json(&json!({ "description": "Partial payout", "amount": "120" }))
            .await;
        refund.assert_status(StatusCode::CREATED);
        let refund = refund.json::<Value>();
        assert_eq!(decimal(&refund["amount"]), dec!(120));
        assert_eq!(refund["description"], "Partial payout");
    }

    #[tokio::test]
    async fn test_malformed_refund_amount_creates_no_refund() {
        let app = app().await;
        let claim = app.submit_claim(&ActorFixtures::employee(), "300").await;
        let number = claim["claim_number"].as_str().unwrap().to_string();
        let finance = ActorFixtures::finance_staff();

        app.server
            .post(&format!("/api/v1/claims/{}/review", number))
            .add_header(AUTHORIZATION, bearer(&ActorFixtures::specialist()))
            .json(&json!({ "action": "approve", "approved_amount": "300" }))
            .await
            .assert_status_ok();
        app.server
            .post(&format!("/api/v1/claims/{}/confirm", number))
            .add_header(AUTHORIZATION, bearer(&ActorFixtures::manager()))
            .json(&json!({ "action": "approve" }))
            .await
            .assert_status_ok();

        let rejected = app
            .server
            .post(&format!("/api/v1/claims/{}/refund", number))
            .add_header(AUTHORIZATION, bearer(&finance))
            .json(&json!({ "description": "Partial payout", "amount": "120 EUR" }))
            .await;
        rejected.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(rejected.json::<Value>()["error"], "validation_error");

        let awaiting = app
            .server
            .get("/api/v1/claims/approved")
            .add_header(AUTHORIZATION, bearer(&finance))
            .await
            .json::<Value>();
        assert_eq!(awaiting.as_array().unwrap().len(), 1);

        let refund = app
            .server
            .post(&format!("/api/v1/claims/{}/refund", number))
            .add_header(AUTHORIZATION, bearer(&finance))
            .await;
        refund.assert_status(StatusCode::CREATED);
        assert_eq!(decimal(&refund.json::<Value>()["amount"]), dec!(300));
    }

    #[tokio::test]
    async fn test_unknown_refund_is_not_found() {
        let app = app().await;
        let response = app
            .server
            .post(&format!("/api/v1/refunds/{}/paid", uuid::Uuid::new_v4()))
            .add_header(AUTHORIZATION, bearer(&ActorFixtures::finance_staff()))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }
}

mod disputes {
    use super::*;

    #[tokio::test]
    async fn test_dispute_is_opened_and_queued() {
        let app = app().await;
        let employee = ActorFixtures::employee();

        let response = app
            .server
            .post("/api/v1/disputes")
            .add_header(AUTHORIZATION, bearer(&employee))
            .json(&json!({ "payslip_reference": "PS-2024-03", "description": "Overtime missing" }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let dispute = response.json::<Value>();
        assert!(dispute["dispute_number"].as_str().unwrap().starts_with("DISP-"));
        assert_eq!(dispute["status"], "under_review");

        let queue = app
            .server
            .get("/api/v1/disputes/under-review")
            .add_header(AUTHORIZATION, bearer(&ActorFixtures::specialist()))
            .await
            .json::<Value>();
        assert_eq!(queue.as_array().unwrap().len(), 1);
    }
}

mod notifications {
    use super::*;

    #[tokio::test]
    async fn test_manager_is_notified_and_can_mark_read() {
        let app = app().await;
        let manager = ActorFixtures::manager();
        app.roles.assign(manager.employee_id, SystemRole::PayrollManager).await;

        let claim = app.submit_claim(&ActorFixtures::employee(), "200").await;
        let number = claim["claim_number"].as_str().unwrap();
        app.server
            .post(&format!("/api/v1/claims/{}/review", number))
            .add_header(AUTHORIZATION, bearer(&ActorFixtures::specialist()))
            .json(&json!({ "action": "approve", "approved_amount": "200" }))
            .await
            .assert_status_ok();

        let inbox = app
            .server
            .get("/api/v1/notifications")
            .add_header(AUTHORIZATION, bearer(&manager))
            .await
            .json::<Value>();
        let inbox = inbox.as_array().unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0]["is_read"], false);
        assert_eq!(inbox[0]["notification_type"], "alert");

        let id = inbox[0]["id"].as_str().unwrap();
        let read = app
            .server
            .post(&format!("/api/v1/notifications/{}/read", id))
            .add_header(AUTHORIZATION, bearer(&manager))
            .await;
        read.assert_status_ok();
        assert_eq!(read.json::<Value>()["is_read"], true);

        let all = app
            .server
            .post("/api/v1/notifications/read-all")
            .add_header(AUTHORIZATION, bearer(&manager))
            .await
            .json::<Value>();
        assert_eq!(all["updated"], 0);
    }

    #[tokio::test]
    async fn test_foreign_notification_is_not_found() {
        let app = app().await;
        let manager = ActorFixtures::manager();
        app.roles.assign(manager.employee_id, SystemRole::PayrollManager).await;

        let claim = app.submit_claim(&ActorFixtures::employee(), "200").await;
        let number = claim["claim_number"].as_str().unwrap();
        app.server
            .post(&format!("/api/v1/claims/{}/review", number))
            .add_header(AUTHORIZATION, bearer(&ActorFixtures::specialist()))
            .json(&json!({ "action": "approve", "approved_amount": "200" }))
            .await
            .assert_status_ok();

        let inbox = app
            .server
            .get("/api/v1/notifications")
            .add_header(AUTHORIZATION, bearer(&manager))
            .await
            .json::<Value>();
        let id = inbox[0]["id"].as_str().unwrap();

        let response = app
            .server
            .post(&format!("/api/v1/notifications/{}/read", id))
            .add_header(AUTHORIZATION, bearer(&ActorFixtures::finance_staff()))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }
}

mod chatbot {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_chatbot_is_unavailable() {
        let app = app().await;
        let response = app
            .server
            .post("/api/v1/chatbot/message")
            .add_header(AUTHORIZATION, bearer(&ActorFixtures::employee()))
            .json(&json!({ "message": "How many claims do I have?" }))
            .await;
        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.json::<Value>()["error"], "service_unavailable");
    }

    #[tokio::test]
    async fn test_chatbot_replies() {
        let llm: Arc<dyn LlmClient> = Arc::new(ScriptedLlm::new(vec![LlmReply {
            content: Some("You have no claims yet.".to_string()),
            tool_calls: vec![],
        }]));
        let app = app_with_llm(Some(llm)).await;
        let employee = ActorFixtures::employee();

        let response = app
            .server
            .post("/api/v1/chatbot/message")
            .add_header(AUTHORIZATION, bearer(&employee))
            .json(&json!({ "message": "How many claims do I have?" }))
            .await;
        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["response"], "You have no claims yet.");
        assert!(body["timestamp"].is_string());

        let reset = app
            .server
            .post("/api/v1/chatbot/new")
            .add_header(AUTHORIZATION, bearer(&employee))
            .await;
        reset.assert_status_ok();
    }

    #[tokio::test]
    async fn test_empty_message_is_rejected() {
        let llm: Arc<dyn LlmClient> = Arc::new(ScriptedLlm::new(vec![LlmReply::default()]));
        let app = app_with_llm(Some(llm)).await;
        let response = app
            .server
            .post("/api/v1/chatbot/message")
            .add_header(AUTHORIZATION, bearer(&ActorFixtures::employee()))
            .json(&json!({ "message": "" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }
}
