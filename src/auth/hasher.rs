use sha2::{Digest, Sha256};

/// Derives the stored form of a password: SHA-256 over an application-wide
/// salt followed by the plaintext, rendered as 64 lowercase hex characters.
///
/// One salt for every credential. Swapping in a per-credential KDF only needs
/// to keep the `hash(&str) -> String` shape.
#[derive(Clone)]
pub struct PasswordHasher {
    salt: String,
}

impl PasswordHasher {
    pub fn new(salt: impl Into<String>) -> Self {
        Self { salt: salt.into() }
    }

    pub fn hash(&self, plaintext: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.salt.as_bytes());
        hasher.update(plaintext.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher").finish_non_exhaustive()
    }
}
