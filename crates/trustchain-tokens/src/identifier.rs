//! Time-ordered token identifiers.
//!
//! Token ids are UUIDv7 strings. The Unix millisecond timestamp in the id must
//! be exactly the token's `iat`, which ties the id (and every payload it is
//! signed into) to the issue time.

use crate::date::NumericDate;
use crate::error::{Result, TokenError};
use chrono::{DateTime, Utc};
use uuid::{NoContext, Timestamp, Uuid};

const UUID_V7: usize = 7;

/// Create a token id bound to `issued_at`.
pub fn new_token_id(issued_at: NumericDate) -> String {
    let seconds = u64::try_from(issued_at.unix_seconds()).unwrap_or(0);
    Uuid::new_v7(Timestamp::from_unix(NoContext, seconds, 0)).to_string()
}

/// Decode the creation time embedded in a token id.
pub fn identifier_time(id: &str) -> Result<DateTime<Utc>> {
    let uuid = Uuid::parse_str(id).map_err(|_| TokenError::InvalidIdentifierFormat)?;
    if uuid.get_version_num() != UUID_V7 {
        return Err(TokenError::InvalidIdentifierFormat);
    }

    let (seconds, nanos) = uuid
        .get_timestamp()
        .ok_or(TokenError::InvalidIdentifierFormat)?
        .to_unix();
    let seconds = i64::try_from(seconds).map_err(|_| TokenError::InvalidIdentifierFormat)?;

    DateTime::from_timestamp(seconds, nanos).ok_or(TokenError::InvalidIdentifierFormat)
}

/// Check that `id` was generated for `issued_at`.
///
/// The comparison is exact at millisecond resolution: an id minted even one
/// millisecond away from the issue time is rejected.
pub fn verify_identifier_time(id: &str, issued_at: NumericDate) -> Result<()> {
    let embedded = identifier_time(id)?;
    if issued_at.to_datetime() != Some(embedded) {
        return Err(TokenError::IdentifierTimeMismatch);
    }

    Ok(())
}
