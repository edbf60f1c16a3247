//! Salted SHA-256 credential hashing.
//!
//! Stored format: `sha256$<hex salt>$<hex digest>` where the digest is
//! `SHA-256(salt || password)`. Digests are compared in constant time.

use rand::RngCore as _;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq as _;

use crate::domain::ports::{PasswordVerifier, PasswordVerifierError};
use crate::domain::{CredentialHash, UserValidationError};

const SCHEME: &str = "sha256";
const SALT_LEN: usize = 16;

/// Hashes new passwords and verifies stored hashes.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256PasswordHasher;

impl Sha256PasswordHasher {
    pub fn new() -> Self {
        Self
    }

    /// Hash `password` with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Never fails in practice; the result type mirrors [`CredentialHash::new`].
    pub fn hash(&self, password: &str) -> Result<CredentialHash, UserValidationError> {
        let mut salt = [0_u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        CredentialHash::new(encode(&salt, password))
    }
}

fn digest(salt: &[u8], password: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().into()
}

fn encode(salt: &[u8], password: &str) -> String {
    format!(
        "{SCHEME}${}${}",
        hex::encode(salt),
        hex::encode(digest(salt, password))
    )
}

impl PasswordVerifier for Sha256PasswordHasher {
    fn verify(&self, password: &str, hash: &CredentialHash) -> Result<bool, PasswordVerifierError> {
        let mut parts = hash.as_ref().split('$');
        let (Some(SCHEME), Some(salt), Some(expected), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(PasswordVerifierError::unsupported_hash(
                "expected sha256$<salt>$<digest>",
            ));
        };
        let salt = hex::decode(salt)
            .map_err(|err| PasswordVerifierError::unsupported_hash(format!("salt: {err}")))?;
        let expected = hex::decode(expected)
            .map_err(|err| PasswordVerifierError::unsupported_hash(format!("digest: {err}")))?;

        let actual = digest(&salt, password);
        Ok(bool::from(actual.as_slice().ct_eq(expected.as_slice())))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn hashed_passwords_verify() {
        let hasher = Sha256PasswordHasher::new();
        let hash = hasher.hash("correct horse").expect("hash");

        assert!(hash.as_ref().starts_with("sha256$"));
        assert!(hasher.verify("correct horse", &hash).expect("verify"));
        assert!(!hasher.verify("correct horsE", &hash).expect("verify"));
    }

    #[rstest]
    fn salts_differ_between_hashes() {
        let hasher = Sha256PasswordHasher::new();
        let a = hasher.hash("pw").expect("hash");
        let b = hasher.hash("pw").expect("hash");
        assert_ne!(a.as_ref(), b.as_ref());
    }

    #[rstest]
    fn known_vector_verifies() {
        let salt = [0xab_u8; SALT_LEN];
        let hash = CredentialHash::new(encode(&salt, "secret")).expect("hash");
        assert!(Sha256PasswordHasher.verify("secret", &hash).expect("verify"));
    }

    #[rstest]
    fn truncated_digest_does_not_match() {
        let salt = [1_u8; SALT_LEN];
        let full = encode(&salt, "secret");
        let truncated = CredentialHash::new(&full[..full.len() - 2]).expect("hash");
        assert!(!Sha256PasswordHasher.verify("secret", &truncated).expect("verify"));
    }

    #[rstest]
    #[case("plaintext")]
    #[case("bcrypt$aa$bb")]
    #[case("sha256$zz$00")]
    #[case("sha256$00$11$22")]
    fn unsupported_hashes_are_errors(#[case] stored: &str) {
        let hash = CredentialHash::new(stored).expect("hash");
        let err = Sha256PasswordHasher
            .verify("secret", &hash)
            .expect_err("unsupported");
        assert!(matches!(err, PasswordVerifierError::UnsupportedHash { .. }));
    }
}
