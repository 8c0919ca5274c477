//! Read-only tools the assistant may call
//!
//! Every tool answers with a [`ToolResult`]; failures are reported to the
//! model as data so it can explain them, never raised to the caller.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use core_kernel::{Actor, SystemRole};
use domain_claims::{Claim, ClaimService, Dispute, DisputeService, ReviewStatus};
use domain_notifications::{NotificationService, NotificationView};

use crate::llm::ToolDefinition;

/// Upper bound on list items handed to the model
pub const MAX_TOOL_RESULTS: usize = 15;

pub const GET_PROFILE: &str = "getProfile";
pub const GET_MY_CLAIMS: &str = "getMyClaims";
pub const COUNT_CLAIMS_BY_STATUS: &str = "countClaimsByStatus";
pub const GET_PENDING_APPROVALS: &str = "getPendingApprovals";
pub const GET_MY_NOTIFICATIONS: &str = "getMyNotifications";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    /// JSON text sent back to the model as the tool message content
    pub fn to_message_content(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"success":false,"error":"unserializable result"}"#.to_string())
    }
}

/// Schemas advertised to the model
pub fn tool_catalog() -> Vec<ToolDefinition> {
    let statuses = json!(["under_review", "pending_manager_approval", "approved", "rejected"]);
    vec![
        ToolDefinition {
            name: GET_PROFILE.to_string(),
            description: "Get the current user's employee id, name and roles.".to_string(),
            parameters: json!({ "type": "object", "properties": {} }),
        },
        ToolDefinition {
            name: GET_MY_CLAIMS.to_string(),
            description: "List the current user's expense claims, newest first, optionally filtered by status."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "status": {
                        "type": "string",
                        "enum": statuses,
                        "description": "Only return claims in this status"
                    }
                }
            }),
        },
        ToolDefinition {
            name: COUNT_CLAIMS_BY_STATUS.to_string(),
            description: "Count the current user's expense claims per review status.".to_string(),
            parameters: json!({ "type": "object", "properties": {} }),
        },
        ToolDefinition {
            name: GET_PENDING_APPROVALS.to_string(),
            description: "List claims and disputes waiting on the current user's role: under review for payroll \
                          specialists, pending manager approval for payroll managers, approved without refund for \
                          finance staff."
                .to_string(),
            parameters: json!({ "type": "object", "properties": {} }),
        },
        ToolDefinition {
            name: GET_MY_NOTIFICATIONS.to_string(),
            description: "List the current user's notifications, newest first.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "unreadOnly": {
                        "type": "boolean",
                        "description": "Only return unread notifications"
                    }
                }
            }),
        },
    ]
}

/// Executes catalog tools on behalf of one user
#[derive(Clone)]
pub struct ToolExecutor {
    claims: ClaimService,
    disputes: DisputeService,
    notifications: NotificationService,
}

impl ToolExecutor {
    pub fn new(claims: ClaimService, disputes: DisputeService, notifications: NotificationService) -> Self {
        Self {
            claims,
            disputes,
            notifications,
        }
    }

    pub async fn execute(&self, name: &str, arguments: &Value, user: &Actor) -> ToolResult {
        debug!(tool = name, employee_id = %user.employee_id, "Executing assistant tool");
        let result = match name {
            GET_PROFILE => Ok(profile(user)),
            GET_MY_CLAIMS => self.my_claims(arguments, user).await,
            COUNT_CLAIMS_BY_STATUS => self.count_claims(user).await,
            GET_PENDING_APPROVALS => self.pending_approvals(user).await,
            GET_MY_NOTIFICATIONS => self.my_notifications(arguments, user).await,
            other => Err(format!("Unknown tool: {}", other)),
        };
        match result {
            Ok(data) => ToolResult::ok(data),
            Err(error) => {
                warn!(tool = name, %error, "Assistant tool failed");
                ToolResult::failure(error)
            }
        }
    }

    async fn my_claims(&self, arguments: &Value, user: &Actor) -> Result<Value, String> {
        let status = match arguments.get("status").and_then(Value::as_str) {
            Some(raw) => Some(raw.parse::<ReviewStatus>()?),
            None => None,
        };
        let claims = self
            .claims
            .employee_claims(user.employee_id)
            .await
            .map_err(|e| e.to_string())?;
        let matching: Vec<&Claim> = claims
            .iter()
            .filter(|c| status.map_or(true, |s| c.status() == s))
            .collect();
        Ok(json!({
            "total": matching.len(),
            "claims": matching.into_iter().take(MAX_TOOL_RESULTS).map(claim_summary).collect::<Vec<_>>(),
        }))
    }

    async fn count_claims(&self, user: &Actor) -> Result<Value, String> {
        let claims = self
            .claims
            .employee_claims(user.employee_id)
            .await
            .map_err(|e| e.to_string())?;
        let count = |status: ReviewStatus| claims.iter().filter(|c| c.status() == status).count();
        Ok(json!({
            "total": claims.len(),
            "under_review": count(ReviewStatus::UnderReview),
            "pending_manager_approval": count(ReviewStatus::PendingManagerApproval),
            "approved": count(ReviewStatus::Approved),
            "rejected": count(ReviewStatus::Rejected),
        }))
    }

    async fn pending_approvals(&self, user: &Actor) -> Result<Value, String> {
        let mut queues = Vec::new();
        if user.has_role(SystemRole::PayrollSpecialist) {
            let claims = self.claims.claims_under_review().await.map_err(|e| e.to_string())?;
            let disputes = self.disputes.disputes_under_review().await.map_err(|e| e.to_string())?;
            queues.push(queue(SystemRole::PayrollSpecialist, "under_review", &claims, &disputes));
        }
        if user.has_role(SystemRole::PayrollManager) {
            let claims = self
                .claims
                .claims_pending_manager_approval()
                .await
                .map_err(|e| e.to_string())?;
            let disputes = self
                .disputes
                .disputes_pending_manager_approval()
                .await
                .map_err(|e| e.to_string())?;
            queues.push(queue(SystemRole::PayrollManager, "pending_manager_approval", &claims, &disputes));
        }
        if user.has_role(SystemRole::FinanceStaff) {
            let claims = self
                .claims
                .approved_claims_awaiting_refund()
                .await
                .map_err(|e| e.to_string())?;
            let disputes = self
                .disputes
                .approved_disputes_awaiting_refund()
                .await
                .map_err(|e| e.to_string())?;
            queues.push(queue(SystemRole::FinanceStaff, "approved_awaiting_refund", &claims, &disputes));
        }
        if queues.is_empty() {
            return Err("You do not have a payroll approval role, so there is no approval queue to show.".to_string());
        }
        Ok(json!({ "queues": queues }))
    }

    async fn my_notifications(&self, arguments: &Value, user: &Actor) -> Result<Value, String> {
        let unread_only = arguments.get("unreadOnly").and_then(Value::as_bool).unwrap_or(false);
        let inbox = self
            .notifications
            .notifications_for(user.employee_id)
            .await
            .map_err(|e| e.to_string())?;
        let unread = inbox.iter().filter(|n| !n.is_read).count();
        let shown: Vec<Value> = inbox
            .iter()
            .filter(|n| !unread_only || !n.is_read)
            .take(MAX_TOOL_RESULTS)
            .map(notification_summary)
            .collect();
        Ok(json!({
            "total": inbox.len(),
            "unread": unread,
            "notifications": shown,
        }))
    }
}

fn profile(user: &Actor) -> Value {
    json!({
        "employeeId": user.employee_id.to_string(),
        "name": user.name.as_deref().unwrap_or("Employee"),
        "roles": user.roles.iter().map(|r| r.as_str()).collect::<Vec<_>>(),
    })
}

fn queue(role: SystemRole, stage: &str, claims: &[Claim], disputes: &[Dispute]) -> Value {
    json!({
        "role": role.as_str(),
        "stage": stage,
        "claimCount": claims.len(),
        "disputeCount": disputes.len(),
        "claims": claims.iter().take(MAX_TOOL_RESULTS).map(claim_summary).collect::<Vec<_>>(),
        "disputes": disputes.iter().take(MAX_TOOL_RESULTS).map(dispute_summary).collect::<Vec<_>>(),
    })
}

fn claim_summary(claim: &Claim) -> Value {
    json!({
        "claimNumber": claim.claim_number,
        "description": claim.description,
        "claimType": claim.claim_type,
        "amount": claim.amount,
        "approvedAmount": claim.approved_amount(),
        "status": claim.status().as_str(),
        "createdAt": claim.created_at,
    })
}

fn dispute_summary(dispute: &Dispute) -> Value {
    json!({
        "disputeNumber": dispute.dispute_number,
        "payslipReference": dispute.payslip_reference,
        "description": dispute.description,
        "status": dispute.status().as_str(),
        "createdAt": dispute.created_at,
    })
}

fn notification_summary(view: &NotificationView) -> Value {
    json!({
        "title": view.notification.title,
        "message": view.notification.message,
        "type": view.notification.notification_type.as_str(),
        "isRead": view.is_read,
        "createdAt": view.notification.created_at,
    })
}
