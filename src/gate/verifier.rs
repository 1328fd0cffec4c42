use crate::config::DEFAULT_ADMIN_PASSWORD;
use crate::error::{ContactsError, GateError};
use std::fmt;
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Shortest string that can be a bcrypt hash (`$2b$NN$` + 53 chars).
const BCRYPT_HASH_LEN: usize = 60;
const BCRYPT_PREFIXES: [&str; 4] = ["$2a$", "$2b$", "$2x$", "$2y$"];

/// Strategy used to compare a presented credential with the configured one.
#[derive(Clone)]
pub enum CredentialVerifier {
    /// Every request passes.
    Open,
    /// Constant-time comparison against a plaintext secret.
    ExactMatch(Arc<str>),
    /// bcrypt verification against a stored hash.
    HashedMatch(Arc<str>),
}

impl CredentialVerifier {
    /// Build an exact-match verifier, refusing empty or well-known secrets.
    pub fn exact(secret: &str) -> Result<Self, ContactsError> {
        if secret.is_empty() {
            return Err(ContactsError::Config("admin password must not be empty".into()));
        }
        if secret == DEFAULT_ADMIN_PASSWORD {
            return Err(ContactsError::Config(
                "admin password is the well-known default; set ADMIN_PASSWORD".into(),
            ));
        }
        Ok(Self::ExactMatch(Arc::from(secret)))
    }

    /// Build a hashed-match verifier.
    ///
    /// The hash must look like a bcrypt hash, must be usable by the verifier,
    /// and must not be a hash of the well-known default password.
    pub fn hashed(hash: &str) -> Result<Self, ContactsError> {
        if hash.len() < BCRYPT_HASH_LEN {
            return Err(ContactsError::Config(format!(
                "admin password hash is too short ({} chars, expected {BCRYPT_HASH_LEN})",
                hash.len()
            )));
        }
        if !BCRYPT_PREFIXES.iter().any(|p| hash.starts_with(p)) {
            return Err(ContactsError::Config(
                "admin password hash is not a bcrypt hash".into(),
            ));
        }
        match bcrypt::verify(DEFAULT_ADMIN_PASSWORD, hash) {
            Ok(false) => Ok(Self::HashedMatch(Arc::from(hash))),
            Ok(true) => Err(ContactsError::Config(
                "admin password hash matches the well-known default password".into(),
            )),
            Err(e) => Err(ContactsError::Config(format!(
                "admin password hash is unusable: {e}"
            ))),
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// Compare `token` with the configured credential.
    ///
    /// `Ok(false)` is a mismatch; `Err` means the comparison itself failed.
    pub async fn verify(&self, token: &str) -> Result<bool, GateError> {
        match self {
            Self::Open => Ok(true),
            Self::ExactMatch(secret) => Ok(bool::from(token.as_bytes().ct_eq(secret.as_bytes()))),
            Self::HashedMatch(hash) => {
                let hash = Arc::clone(hash);
                let token = token.to_owned();
                // bcrypt is CPU-bound; keep it off the async workers.
                tokio::task::spawn_blocking(move || bcrypt::verify(token.as_bytes(), &hash))
                    .await
                    .map_err(|e| {
                        GateError::ComparisonFault(format!("verification task failed: {e}"))
                    })?
                    .map_err(|e| GateError::ComparisonFault(e.to_string()))
            }
        }
    }
}

impl fmt::Debug for CredentialVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => f.write_str("Open"),
            Self::ExactMatch(_) => f.write_str("ExactMatch(<redacted>)"),
            Self::HashedMatch(_) => f.write_str("HashedMatch(<redacted>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Valid bcrypt layout, but cost 99 is outside bcrypt's allowed range.
    const BROKEN_HASH: &str = "$2b$99$.....................................................";

    #[tokio::test]
    async fn exact_match_accepts_only_the_secret() {
        let v = CredentialVerifier::exact("secret123").unwrap();
        assert!(v.verify("secret123").await.unwrap());
        assert!(!v.verify("secret124").await.unwrap());
        assert!(!v.verify("secret1234").await.unwrap());
        assert!(!v.verify("").await.unwrap());
    }

    #[test]
    fn exact_refuses_empty_and_default_secret() {
        assert!(matches!(
            CredentialVerifier::exact(""),
            Err(ContactsError::Config(_))
        ));
        assert!(matches!(
            CredentialVerifier::exact(DEFAULT_ADMIN_PASSWORD),
            Err(ContactsError::Config(_))
        ));
    }

    #[tokio::test]
    async fn hashed_match_verifies_own_plaintext() {
        let hash = bcrypt::hash("hunter2", 4).unwrap();
        let v = CredentialVerifier::hashed(&hash).unwrap();
        assert!(v.verify("hunter2").await.unwrap());
        assert!(!v.verify("hunter3").await.unwrap());
        assert!(!v.verify("").await.unwrap());
    }

    #[test]
    fn hashed_refuses_short_or_foreign_hashes() {
        assert!(CredentialVerifier::hashed("").is_err());
        assert!(CredentialVerifier::hashed("$2b$04$short").is_err());
        let not_bcrypt = "x".repeat(BCRYPT_HASH_LEN);
        assert!(CredentialVerifier::hashed(&not_bcrypt).is_err());
    }

    #[test]
    fn hashed_refuses_hash_of_default_password() {
        let hash = bcrypt::hash(DEFAULT_ADMIN_PASSWORD, 4).unwrap();
        let err = CredentialVerifier::hashed(&hash).unwrap_err();
        assert!(err.to_string().contains("well-known default"));
    }

    #[test]
    fn hashed_refuses_unusable_hash_at_construction() {
        assert_eq!(BROKEN_HASH.len(), BCRYPT_HASH_LEN);
        assert!(matches!(
            CredentialVerifier::hashed(BROKEN_HASH),
            Err(ContactsError::Config(_))
        ));
    }

    #[tokio::test]
    async fn unusable_hash_is_a_fault_not_a_mismatch() {
        let v = CredentialVerifier::HashedMatch(Arc::from(BROKEN_HASH));
        let err = v.verify("anything").await.unwrap_err();
        assert!(matches!(err, GateError::ComparisonFault(_)));
    }

    #[tokio::test]
    async fn open_always_verifies() {
        assert!(CredentialVerifier::Open.verify("").await.unwrap());
        assert!(CredentialVerifier::Open.is_open());
    }

    #[test]
    fn debug_hides_secret() {
        let v = CredentialVerifier::exact("secret123").unwrap();
        assert!(!format!("{v:?}").contains("secret123"));
    }
}
