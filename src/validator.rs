use thiserror::Error;
use time::OffsetDateTime;

use crate::assertion::Assertion;

/// The first condition an assertion failed, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("no audience was supplied")]
    MissingAudience,
    #[error("assertion is intended for a different audience")]
    AudienceMismatch,
    #[error("assertion does not answer the expected request")]
    InResponseToMismatch,
    #[error("assertion is not valid yet")]
    NotYetValid,
    #[error("assertion has expired")]
    Expired,
}

/// Checks `assertion` against the relying party's `audience`, the expected request id and `now`.
///
/// The window is inclusive at `not_before` and exclusive at `not_after`.
pub fn check_conditions(
    assertion: &Assertion,
    audience: &str,
    in_response_to: Option<&str>,
    now: OffsetDateTime,
) -> Result<(), Rejection> {
    if audience.is_empty() {
        return Err(Rejection::MissingAudience);
    }
    if audience != assertion.audience() {
        return Err(Rejection::AudienceMismatch);
    }
    if let Some(expected) = in_response_to {
        if assertion.in_response_to() != Some(expected) {
            return Err(Rejection::InResponseToMismatch);
        }
    }
    if now < assertion.not_before() {
        return Err(Rejection::NotYetValid);
    }
    if now >= assertion.not_after() {
        return Err(Rejection::Expired);
    }
    Ok(())
}

impl Assertion {
    /// Whether the assertion is usable right now by `audience`, optionally as the answer
    /// to request `in_response_to`.
    pub fn valid(&self, audience: &str, in_response_to: Option<&str>) -> bool {
        self.valid_at(audience, in_response_to, OffsetDateTime::now_utc())
    }

    pub fn valid_at(
        &self,
        audience: &str,
        in_response_to: Option<&str>,
        now: OffsetDateTime,
    ) -> bool {
        self.check_at(audience, in_response_to, now).is_ok()
    }

    pub fn check(&self, audience: &str, in_response_to: Option<&str>) -> Result<(), Rejection> {
        self.check_at(audience, in_response_to, OffsetDateTime::now_utc())
    }

    pub fn check_at(
        &self,
        audience: &str,
        in_response_to: Option<&str>,
        now: OffsetDateTime,
    ) -> Result<(), Rejection> {
        check_conditions(self, audience, in_response_to, now).inspect_err(|rejection| {
            tracing::debug!(%rejection, audience, %now, "assertion rejected");
        })
    }
}
