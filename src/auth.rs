// Operator capability checks

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{LedgerError, LedgerResult};

/// SHA-256 hex digest of a secret
pub fn digest_key(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// The privileged identity allowed to resolve markets, withdraw fees,
/// fund wallets and toggle the pause gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operator {
    address: String,
}

impl Operator {
    pub fn new(address: impl Into<String>) -> Self {
        Self { address: address.into() }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Compare the caller against the stored operator identity
    pub fn authorize(&self, caller: &str) -> LedgerResult<()> {
        if caller != self.address {
            return Err(LedgerError::Unauthorized(format!("{} is not the operator", caller)));
        }
        Ok(())
    }
}

/// Shared secret presented by operator HTTP calls, kept only as a digest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorKey {
    digest: String,
}

impl OperatorKey {
    pub fn from_secret(secret: &str) -> Self {
        Self { digest: digest_key(secret) }
    }

    pub fn from_digest(digest: impl Into<String>) -> Self {
        Self { digest: digest.into().to_lowercase() }
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn verify(&self, presented: &str) -> bool {
        let candidate = digest_key(presented);
        // Digests have a fixed length; compare every byte
        candidate.len() == self.digest.len()
            && candidate
                .bytes()
                .zip(self.digest.bytes())
                .fold(0u8, |acc, (a, b)| acc | (a ^ b))
                == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_authorize() {
        let operator = Operator::new("op");
        assert!(operator.authorize("op").is_ok());
        assert!(matches!(operator.authorize("mallory"), Err(LedgerError::Unauthorized(_))));
    }

    #[test]
    fn test_key_verify() {
        let key = OperatorKey::from_secret("hunter2");
        assert!(key.verify("hunter2"));
        assert!(!key.verify("hunter3"));
        assert!(!key.verify(""));
        assert_eq!(key.digest().len(), 64);
    }

    #[test]
    fn test_key_from_digest_matches_secret() {
        let digest = digest_key("s3cret").to_uppercase();
        let key = OperatorKey::from_digest(digest);
        assert!(key.verify("s3cret"));
    }
}
