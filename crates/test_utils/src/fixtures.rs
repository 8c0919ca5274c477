//! Pre-built Test Fixtures
//!
//! Ready-to-use actors and payloads for the review pipeline. Identifiers are
//! random so fixtures never collide across tests.

use core_kernel::{Actor, EmployeeId, SystemRole};
use domain_claims::{NewClaim, NewDispute};
use fake::faker::lorem::en::Sentence;
use fake::faker::name::en::Name;
use fake::Fake;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Fixture for authenticated users
pub struct ActorFixtures;

impl ActorFixtures {
    fn with_role(role: SystemRole) -> Actor {
        let name: String = Name().fake();
        Actor::new(EmployeeId::new(), vec![role]).with_name(name)
    }

    /// A regular department employee who submits claims
    pub fn employee() -> Actor {
        Self::with_role(SystemRole::DepartmentEmployee)
    }

    pub fn specialist() -> Actor {
        Self::with_role(SystemRole::PayrollSpecialist)
    }

    pub fn manager() -> Actor {
        Self::with_role(SystemRole::PayrollManager)
    }

    pub fn finance_staff() -> Actor {
        Self::with_role(SystemRole::FinanceStaff)
    }

    pub fn admin() -> Actor {
        Self::with_role(SystemRole::SystemAdmin)
    }
}

/// Fixture for amounts used across the workflow tests
pub struct AmountFixtures;

impl AmountFixtures {
    /// Amount requested on a standard claim
    pub fn claimed() -> Decimal {
        dec!(500)
    }

    /// Amount a specialist proposes for the standard claim
    pub fn proposed() -> Decimal {
        dec!(400)
    }

    /// Above the standard claimed amount
    pub fn over_claimed() -> Decimal {
        dec!(600)
    }
}

/// Fixture for submission payloads
pub struct RequestFixtures;

impl RequestFixtures {
    pub fn description() -> String {
        Sentence(3..8).fake()
    }

    pub fn new_claim(amount: Decimal) -> NewClaim {
        NewClaim::new(Self::description(), "travel", amount)
    }

    pub fn standard_claim() -> NewClaim {
        Self::new_claim(AmountFixtures::claimed())
    }

    pub fn new_dispute() -> NewDispute {
        NewDispute::new("PAYSLIP-2024-06", Self::description())
    }
}
