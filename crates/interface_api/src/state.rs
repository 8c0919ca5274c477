//! Shared application state and service wiring

use std::sync::Arc;

use core_kernel::{HealthCheckResult, HealthCheckable};
use domain_assistant::{ChatbotService, ConversationPort, LlmClient, ToolExecutor};
use domain_claims::{ClaimPort, ClaimService, DisputePort, DisputeService, RefundPort, RefundService};
use domain_notifications::{NotificationPort, NotificationService, RoleDirectory};
use infra_db::{
    DatabasePool, PostgresClaimAdapter, PostgresConversationAdapter, PostgresDisputeAdapter,
    PostgresNotificationAdapter, PostgresRefundAdapter, PostgresRoleDirectory,
};

use crate::config::ApiConfig;

/// The storage adapters behind every service
#[derive(Clone)]
pub struct Ports {
    pub claims: Arc<ClaimPort>,
    pub disputes: Arc<DisputePort>,
    pub refunds: Arc<dyn RefundPort>,
    pub notifications: Arc<dyn NotificationPort>,
    pub roles: Arc<dyn RoleDirectory>,
    pub conversations: Arc<dyn ConversationPort>,
}

impl Ports {
    pub fn postgres(pool: DatabasePool) -> Self {
        Self {
            claims: Arc::new(PostgresClaimAdapter::new(pool.clone())),
            disputes: Arc::new(PostgresDisputeAdapter::new(pool.clone())),
            refunds: Arc::new(PostgresRefundAdapter::new(pool.clone())),
            notifications: Arc::new(PostgresNotificationAdapter::new(pool.clone())),
            roles: Arc::new(PostgresRoleDirectory::new(pool.clone())),
            conversations: Arc::new(PostgresConversationAdapter::new(pool)),
        }
    }

    /// Health of every adapter that can report it
    pub async fn health(&self) -> Vec<HealthCheckResult> {
        vec![
            self.claims.health_check().await,
            self.disputes.health_check().await,
            self.refunds.health_check().await,
            self.notifications.health_check().await,
            self.conversations.health_check().await,
        ]
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ApiConfig>,
    pub ports: Ports,
    pub claims: ClaimService,
    pub disputes: DisputeService,
    pub refunds: RefundService,
    pub notifications: NotificationService,
    pub chatbot: ChatbotService,
}

impl AppState {
    /// Builds every service over the given adapters
    ///
    /// `llm` is `None` when no provider key is configured.
    pub fn new(config: ApiConfig, ports: Ports, llm: Option<Arc<dyn LlmClient>>) -> Self {
        let notifications = NotificationService::new(ports.notifications.clone(), ports.roles.clone());
        let notifier = Arc::new(notifications.clone());

        let claims = ClaimService::new(
            ports.claims.clone(),
            ports.refunds.clone(),
            notifier.clone(),
            config.claim_policy(),
        );
        let disputes = DisputeService::new(
            ports.disputes.clone(),
            ports.refunds.clone(),
            notifier,
            config.dispute_policy(),
        );
        let refunds = RefundService::new(ports.refunds.clone());

        let tools = ToolExecutor::new(claims.clone(), disputes.clone(), notifications.clone());
        let chatbot = ChatbotService::new(llm, ports.conversations.clone(), tools);

        Self {
            config: Arc::new(config),
            ports,
            claims,
            disputes,
            refunds,
            notifications,
            chatbot,
        }
    }
}
