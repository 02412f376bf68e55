//! Effective token lifetime.
//!
//! A token created by a chain issuer carries its creator's expiry in `issexp`
//! and can never be valid for longer than that.

use crate::chain::CHAIN_ISSUER_PREFIX;
use crate::claims::StandardClaims;
use crate::date::NumericDate;
use chrono::{DateTime, Utc};

impl StandardClaims {
    /// The earlier of `exp` and `issexp`, ignoring unset values.
    ///
    /// Returns [`NumericDate::ZERO`] when neither is set.
    pub fn expire_time(&self) -> NumericDate {
        [self.expires_at, self.issuer_expires_at]
            .into_iter()
            .flatten()
            .filter(|date| !date.is_zero())
            .min()
            .unwrap_or(NumericDate::ZERO)
    }

    /// Whether the effective expiry has passed.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub(crate) fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        let expires = self.expire_time();
        !expires.is_zero() && expires.is_before(now)
    }

    /// Check the expiry of the chain issuer that created this token.
    ///
    /// The check only applies to tokens with a chain issuer, a trust chain
    /// signature and a non-zero `issexp`. When any of those is missing the
    /// result is `!required`, so `required = true` turns "not applicable" into
    /// failure.
    pub(crate) fn verify_issuer_expiry(&self, required: bool) -> bool {
        if !self.issuer.starts_with(CHAIN_ISSUER_PREFIX) {
            return !required;
        }

        if self.trust_chain_signature.is_empty() {
            return !required;
        }

        match self.issuer_expires_at {
            Some(issuer_expires_at) if !issuer_expires_at.is_zero() => {
                issuer_expires_at.is_future()
            }
            _ => !required,
        }
    }
}
