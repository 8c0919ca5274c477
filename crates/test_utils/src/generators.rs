//! Property-Based Test Generators
//!
//! Proptest strategies for amounts and reviewer input.

use domain_claims::ReviewAction;
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Positive amount with two decimal places, 0.01 to 1,000,000.00
pub fn claimed_amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Any amount with two decimal places, negatives included
pub fn signed_amount_strategy() -> impl Strategy<Value = Decimal> {
    (-100_000_000i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// A claimed amount paired with an arbitrary reviewer amount
pub fn claimed_and_candidate_strategy() -> impl Strategy<Value = (Decimal, Decimal)> {
    (claimed_amount_strategy(), signed_amount_strategy())
}

/// A claimed amount paired with a reviewer amount inside `[0, claimed]`
pub fn claimed_and_valid_amount_strategy() -> impl Strategy<Value = (Decimal, Decimal)> {
    (1i64..100_000_000i64).prop_flat_map(|cents| {
        (
            Just(Decimal::new(cents, 2)),
            (0i64..=cents).prop_map(|c| Decimal::new(c, 2)),
        )
    })
}

pub fn review_action_strategy() -> impl Strategy<Value = ReviewAction> {
    prop_oneof![Just(ReviewAction::Approve), Just(ReviewAction::Reject)]
}

/// Optional reviewer comment, sometimes blank
pub fn comment_strategy() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some(String::new())),
        "[a-zA-Z ]{1,40}".prop_map(Some),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn test_claimed_amount_positive(amount in claimed_amount_strategy()) {
            prop_assert!(amount > Decimal::ZERO);
        }

        #[test]
        fn test_valid_amount_within_claimed((claimed, amount) in claimed_and_valid_amount_strategy()) {
            prop_assert!(amount >= Decimal::ZERO);
            prop_assert!(amount <= claimed);
        }
    }
}
