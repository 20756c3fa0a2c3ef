use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::digest::Digester;

/// Fixed genesis value concatenated into the first period's timestamp
/// request, standing in for the (absent) previous token.
pub const GENESIS_TOKEN: &[u8] = b"arkiv-genesis-v1";

/// Payload submitted to the timestamp authority for one period:
/// the period's archive hash concatenated with the previous period's token
/// (or [`GENESIS_TOKEN`] for the first period).
pub fn timestamp_request_payload(current_hash: &str, previous_token: Option<&[u8]>) -> Vec<u8> {
    let prev = previous_token.unwrap_or(GENESIS_TOKEN);
    let mut payload = Vec::with_capacity(current_hash.len() + prev.len());
    payload.extend_from_slice(current_hash.as_bytes());
    payload.extend_from_slice(prev);
    payload
}

/// Reference to a previous token as written in archive metadata:
/// base64 of the digest of the raw token bytes.
pub fn token_reference(digester: &Digester, token: &[u8]) -> String {
    BASE64.encode(digester.hash(token))
}

/// Trait for period records that participate in the custody chain.
pub trait ChainedPeriod {
    /// The period's archive payload hash (hex).
    fn current_hash(&self) -> &str;
    /// Base64 digest reference to the previous period's token
    /// (None for the first period).
    fn previous_token_reference(&self) -> Option<&str>;
    /// The period's raw timestamp token.
    fn token(&self) -> &[u8];
}

/// Custody chain verifier.
///
/// Checks that a sequence of periods forms an unbroken chain: the first
/// period carries no previous-token reference, and every subsequent period's
/// reference matches the digest of its predecessor's token.
pub struct CustodyChainVerifier;

impl CustodyChainVerifier {
    pub fn verify_chain(
        digester: &Digester,
        periods: &[impl ChainedPeriod],
    ) -> Result<(), ChainError> {
        if periods.is_empty() {
            return Ok(());
        }

        if periods[0].previous_token_reference().is_some() {
            return Err(ChainError::GenesisHasPrevious);
        }

        for i in 1..periods.len() {
            let expected = token_reference(digester, periods[i - 1].token());
            match periods[i].previous_token_reference() {
                Some(actual) if actual == expected => {}
                Some(_) => return Err(ChainError::BrokenLink { index: i }),
                None => return Err(ChainError::MissingPrevious { index: i }),
            }
        }

        Ok(())
    }
}

/// Errors from custody chain verification.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("first period carries a previous-token reference (should be absent)")]
    GenesisHasPrevious,

    #[error("broken custody link at period {index}: previous-token reference mismatch")]
    BrokenLink { index: usize },

    #[error("missing previous-token reference at period {index}")]
    MissingPrevious { index: usize },
}
