//! Input validation helpers shared by the claim and dispute workflows

use rust_decimal::Decimal;

use crate::error::ClaimError;
use crate::status::CaseKind;

/// Returns the trimmed value, or a validation error naming the field
pub fn require_text(value: Option<&str>, message: &str) -> Result<String, ClaimError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ClaimError::validation(message)),
    }
}

/// Optional caller-supplied business number; blank counts as absent
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Rejects negative amounts
pub fn require_non_negative(amount: Decimal, label: &str) -> Result<Decimal, ClaimError> {
    if amount < Decimal::ZERO {
        return Err(ClaimError::amount(format!("{} cannot be negative", label)));
    }
    Ok(amount)
}

/// Rejects amounts above the originally claimed amount
pub fn ensure_within_claimed(amount: Decimal, claimed: Decimal, label: &str) -> Result<Decimal, ClaimError> {
    if amount > claimed {
        return Err(ClaimError::amount(format!(
            "{} ({}) cannot exceed the claimed amount ({}).",
            label,
            amount.normalize(),
            claimed.normalize()
        )));
    }
    Ok(amount)
}

/// Applies both amount bounds; `cap` is absent for disputes
pub fn check_amount(amount: Decimal, cap: Option<Decimal>, label: &str) -> Result<Decimal, ClaimError> {
    require_non_negative(amount, label)?;
    match cap {
        Some(claimed) => ensure_within_claimed(amount, claimed, label),
        None => Ok(amount),
    }
}

/// Rejection reasons must carry text
pub fn require_rejection_reason(reason: Option<&str>, kind: CaseKind) -> Result<String, ClaimError> {
    require_text(
        reason,
        &format!("Rejection reason is required when rejecting a {}", kind.noun()),
    )
}
