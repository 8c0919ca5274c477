//! System roles and the acting user context
//!
//! Roles gate who may act on each stage of the review pipeline:
//! payroll specialists propose, payroll managers confirm, finance staff
//! disburse. Every other employee can only submit and read their own work.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::identifiers::EmployeeId;

/// Roles an employee can hold in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemRole {
    DepartmentEmployee,
    DepartmentHead,
    HrManager,
    HrEmployee,
    PayrollSpecialist,
    PayrollManager,
    FinanceStaff,
    SystemAdmin,
}

impl SystemRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            SystemRole::DepartmentEmployee => "department_employee",
            SystemRole::DepartmentHead => "department_head",
            SystemRole::HrManager => "hr_manager",
            SystemRole::HrEmployee => "hr_employee",
            SystemRole::PayrollSpecialist => "payroll_specialist",
            SystemRole::PayrollManager => "payroll_manager",
            SystemRole::FinanceStaff => "finance_staff",
            SystemRole::SystemAdmin => "system_admin",
        }
    }

    /// Roles allowed to read every employee's claims and disputes
    pub fn is_payroll_reviewer(&self) -> bool {
        matches!(
            self,
            SystemRole::PayrollSpecialist | SystemRole::PayrollManager | SystemRole::FinanceStaff
        )
    }
}

impl fmt::Display for SystemRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SystemRole {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "department_employee" | "employee" => Ok(SystemRole::DepartmentEmployee),
            "department_head" => Ok(SystemRole::DepartmentHead),
            "hr_manager" => Ok(SystemRole::HrManager),
            "hr_employee" => Ok(SystemRole::HrEmployee),
            "payroll_specialist" => Ok(SystemRole::PayrollSpecialist),
            "payroll_manager" => Ok(SystemRole::PayrollManager),
            "finance_staff" => Ok(SystemRole::FinanceStaff),
            "system_admin" | "admin" => Ok(SystemRole::SystemAdmin),
            other => Err(CoreError::UnknownRole(other.to_string())),
        }
    }
}

/// The authenticated user performing an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub employee_id: EmployeeId,
    pub roles: Vec<SystemRole>,
    pub name: Option<String>,
}

impl Actor {
    pub fn new(employee_id: EmployeeId, roles: Vec<SystemRole>) -> Self {
        Self {
            employee_id,
            roles,
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// System admins implicitly hold every role
    pub fn has_role(&self, role: SystemRole) -> bool {
        self.roles.iter().any(|r| *r == role || *r == SystemRole::SystemAdmin)
    }

    pub fn can_view_all_cases(&self) -> bool {
        self.roles.iter().any(|r| r.is_payroll_reviewer() || *r == SystemRole::SystemAdmin)
    }
}
