//! Append-only decision log
//!
//! Each reviewer action appends one [`DecisionEntry`]. Amount resolution
//! reads the most recent entry of a stage, so later decisions win over
//! earlier ones without any text parsing.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::EmployeeId;
use crate::status::CaseKind;

/// Stage of the pipeline that produced an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStage {
    SpecialistApproved,
    SpecialistRejected,
    ManagerConfirmed,
    ManagerRejected,
    /// Written when a case reached manager review without a specialist entry
    SpecialistMarkerRepaired,
}

/// One recorded decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionEntry {
    pub stage: DecisionStage,
    pub actor: Option<EmployeeId>,
    pub amount: Option<Decimal>,
    pub note: Option<String>,
    pub reason: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl DecisionEntry {
    pub fn new(stage: DecisionStage, actor: Option<EmployeeId>, recorded_at: DateTime<Utc>) -> Self {
        Self {
            stage,
            actor,
            amount: None,
            note: None,
            reason: None,
            recorded_at,
        }
    }

    pub fn with_amount(mut self, amount: Option<Decimal>) -> Self {
        self.amount = amount;
        self
    }

    /// Blank notes are dropped
    pub fn with_note(mut self, note: Option<&str>) -> Self {
        self.note = note
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Human-readable line, in the format reviewers see in the UI
    pub fn render(&self, kind: CaseKind) -> String {
        let amount_suffix = |label: &str| {
            self.amount
                .map(|a| format!(" ({}: {})", label, a.normalize()))
                .unwrap_or_default()
        };
        let reason = self.reason.as_deref().unwrap_or_default();

        match self.stage {
            DecisionStage::SpecialistApproved => format!(
                "Payroll Specialist: {}{}",
                self.note.as_deref().unwrap_or("Approved for manager review"),
                amount_suffix(kind.proposed_label()),
            ),
            DecisionStage::SpecialistMarkerRepaired => {
                "Payroll Specialist: Approved for manager review (decision log was missing, but status indicates approval)"
                    .to_string()
            }
            DecisionStage::SpecialistRejected => match &self.note {
                Some(note) => format!("Payroll Specialist rejected: {}. Reason: {}", note, reason),
                None => format!("Payroll Specialist rejected. Reason: {}", reason),
            },
            DecisionStage::ManagerConfirmed => match &self.note {
                Some(note) => format!("Manager confirmed: {}{}", note, amount_suffix(kind.final_label())),
                None => format!("Manager confirmed approval{}", amount_suffix(kind.final_label())),
            },
            DecisionStage::ManagerRejected => match &self.note {
                Some(note) => format!("Manager rejected: {}. Reason: {}", note, reason),
                None => format!("Manager rejected. Reason: {}", reason),
            },
        }
    }
}

/// Ordered audit trail of review decisions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecisionLog {
    entries: Vec<DecisionEntry>,
}

impl DecisionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores a log loaded from storage
    pub fn from_entries(entries: Vec<DecisionEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[DecisionEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn append(&mut self, entry: DecisionEntry) {
        self.entries.push(entry);
    }

    fn latest_amount(&self, stage: DecisionStage) -> Option<Decimal> {
        self.entries
            .iter()
            .rev()
            .filter(|e| e.stage == stage)
            .find_map(|e| e.amount)
    }

    /// Amount set by the most recent manager confirmation
    pub fn final_amount(&self) -> Option<Decimal> {
        self.latest_amount(DecisionStage::ManagerConfirmed)
    }

    /// Amount proposed by the most recent specialist approval
    pub fn proposed_amount(&self) -> Option<Decimal> {
        self.latest_amount(DecisionStage::SpecialistApproved)
    }

    pub fn has_specialist_approval(&self) -> bool {
        self.entries.iter().any(|e| {
            matches!(
                e.stage,
                DecisionStage::SpecialistApproved | DecisionStage::SpecialistMarkerRepaired
            )
        })
    }

    pub fn has_manager_confirmation(&self) -> bool {
        self.entries
            .iter()
            .any(|e| e.stage == DecisionStage::ManagerConfirmed)
    }

    /// Renders the whole log as newline-separated resolution comment text
    pub fn render(&self, kind: CaseKind) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }
        Some(
            self.entries
                .iter()
                .map(|e| e.render(kind))
                .collect::<Vec<_>>()
                .join("\n"),
        )
    }
}
