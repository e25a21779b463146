//! Simulated ledger verification.
//!
//! There is no chain client. A verification record is a pure function of the
//! content digest and the time of the lookup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::digest::ContentDigest;
use crate::error::Result;

/// Placeholder contract the simulated proofs claim to come from.
pub const CONTRACT_ADDRESS: &str = "0xDeePTrAce00000000000000000000000000000001";

/// Network reported on every simulated proof.
pub const NETWORK: &str = "ethereum";

/// Number of digest characters carried into the transaction hash.
const TX_HASH_HEX_CHARS: usize = 64;

/// Simulated on-chain attestation for a digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct VerificationRecord {
    #[cfg_attr(
        feature = "openapi",
        schema(example = "0xDeePTrAce00000000000000000000000000000001")
    )]
    pub contract_address: String,
    /// `0x` followed by the digest
    pub tx_hash: String,
    #[cfg_attr(feature = "openapi", schema(example = "ethereum"))]
    pub network: String,
    /// True when the digest is an even base-16 number
    pub verified: bool,
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "2026-01-08T10:00:00Z"))]
    pub timestamp: DateTime<Utc>,
}

impl VerificationRecord {
    /// Build the record for `digest` as of `now`.
    pub fn simulate(digest: &ContentDigest, now: DateTime<Utc>) -> Self {
        let hex = digest.as_str();
        let end = hex.len().min(TX_HASH_HEX_CHARS);

        Self {
            contract_address: CONTRACT_ADDRESS.to_string(),
            tx_hash: format!("0x{}", &hex[..end]),
            network: NETWORK.to_string(),
            verified: digest.is_even(),
            timestamp: now,
        }
    }
}

/// Result of a verify-by-digest lookup: the normalized digest plus its record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DigestVerification {
    /// Lower-cased digest as supplied by the caller
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub filehash: ContentDigest,
    #[serde(flatten)]
    pub record: VerificationRecord,
}

/// Verify a caller-supplied digest string.
///
/// Fails with [`DeeptraceError::InvalidDigest`](crate::DeeptraceError::InvalidDigest)
/// unless the string is hexadecimal.
pub fn verify_digest(filehash: &str, now: DateTime<Utc>) -> Result<DigestVerification> {
    let digest = ContentDigest::parse(filehash)?;
    let record = VerificationRecord::simulate(&digest, now);
    Ok(DigestVerification {
        filehash: digest,
        record,
    })
}
