//! Sequential business numbers (`CLAIM-<n>`, `DISP-<n>`)

use crate::error::ClaimError;
use crate::ports::CasePort;
use crate::review::ReviewCase;

/// Candidates tried before giving up
pub const MAX_NUMBER_ATTEMPTS: u64 = 1_000;

pub fn format_number(prefix: &str, counter: u64) -> String {
    format!("{}{}", prefix, counter)
}

/// Next unused number, starting the search at `count + 1`
///
/// Deleted or caller-supplied numbers can leave gaps and collisions in the
/// sequence, so each candidate is checked against the store.
pub async fn next_business_number<C: ReviewCase>(
    cases: &dyn CasePort<C>,
    prefix: &str,
) -> Result<String, ClaimError> {
    let start = cases.count().await? + 1;

    for counter in start..start + MAX_NUMBER_ATTEMPTS {
        let candidate = format_number(prefix, counter);
        if !cases.number_exists(&candidate).await? {
            return Ok(candidate);
        }
    }

    Err(ClaimError::invalid_state(format!(
        "Could not allocate a unique {} number with prefix {}",
        C::KIND.noun(),
        prefix
    )))
}
