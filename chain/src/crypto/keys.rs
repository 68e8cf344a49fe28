//! Ed25519 key material.
//!
//! Validator identity is the hex-encoded public key. Keys can be generated
//! at random (for production-ish use) or derived deterministically from a
//! seed string plus an index, which is what lets the simulator harness and
//! tests reconstruct identical validator sets across runs.

use ed25519_dalek::{SigningKey, VerifyingKey};
use sha2::{Digest, Sha256};

/// An Ed25519 keypair, plus the lowercase-hex form of the public key that
/// is used as the validator identity throughout the crate.
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
    public_hex: String,
}

impl KeyPair {
    /// Generates a new random keypair using the OS RNG.
    pub fn generate() -> Self {
        let mut rng = rand_core::OsRng;
        let signing_key = SigningKey::generate(&mut rng);
        Self::from_signing_key(signing_key)
    }

    /// Deterministically derives a keypair from `seed_material` and an
    /// index, following `seed = SHA-256(seed_material || ":" || index)`.
    ///
    /// This mirrors the deterministic key derivation used by the
    /// determinism-verification harness so that two runs seeded with the
    /// same `(seed_material, index)` pairs produce byte-identical
    /// validator identities.
    pub fn from_seed(seed_material: &str, index: usize) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(seed_material.as_bytes());
        hasher.update(b":");
        hasher.update(index.to_string().as_bytes());
        let digest = hasher.finalize();
        let mut seed = [0u8; 32];
        seed.copy_from_slice(&digest);
        let signing_key = SigningKey::from_bytes(&seed);
        Self::from_signing_key(signing_key)
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let public_hex = hex::encode(signing_key.verifying_key().to_bytes());
        Self {
            signing_key,
            public_hex,
        }
    }

    /// Lowercase-hex encoded public key; this is the validator identity.
    pub fn public_hex(&self) -> &str {
        &self.public_hex
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

/// Parses a lowercase-hex Ed25519 public key into a [`VerifyingKey`].
///
/// Returns `None` on any malformed input (wrong length, invalid hex, or a
/// byte sequence that is not a valid compressed Edwards point) rather than
/// raising, matching the "verification failures are silent" contract.
pub fn parse_public_key(pubkey_hex: &str) -> Option<VerifyingKey> {
    let bytes = hex::decode(pubkey_hex).ok()?;
    let bytes: [u8; 32] = bytes.try_into().ok()?;
    VerifyingKey::from_bytes(&bytes).ok()
}
