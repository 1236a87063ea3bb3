use sha2::{Digest, Sha256};

/// The admin password, held only as its SHA-256 digest.
pub struct AdminSecret([u8; 32]);

impl AdminSecret {
    pub fn new(password: &str) -> Self {
        Self(digest(password))
    }

    /// Digests are compared in full, with no early exit on the first
    /// differing byte.
    pub fn matches(&self, supplied: &str) -> bool {
        let guess = digest(supplied);
        self.0
            .iter()
            .zip(guess.iter())
            .fold(0u8, |diff, (a, b)| diff | (a ^ b))
            == 0
    }
}

fn digest(text: &str) -> [u8; 32] {
    Sha256::digest(text.as_bytes()).into()
}
