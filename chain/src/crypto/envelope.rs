//! Domain-separated signing envelope.
//!
//! Every signature produced or checked in this crate is bound to a
//! `(context, chain_id)` pair so that a signature minted for one message
//! kind (a transaction, say) can never be replayed as a different kind (a
//! vote) or on a different chain.

use serde::Serialize;

use ed25519_dalek::{Signature, Signer, Verifier};

use super::canonical::canonical_bytes;
use super::keys::{KeyPair, parse_public_key};

/// The three signed message kinds in this protocol.
///
/// Contexts must never collide: `sign`/`verify` mix the context string
/// directly into the signed payload.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Context {
    Tx,
    Header,
    Vote,
}

impl Context {
    fn as_str(self) -> &'static str {
        match self {
            Context::Tx => "TX",
            Context::Header => "HEADER",
            Context::Vote => "VOTE",
        }
    }
}

/// Builds the exact bytes that get signed: `context:chain_id:` followed by
/// the canonical encoding of `message`.
fn build_payload<T: Serialize>(message: &T, context: Context, chain_id: &str) -> Vec<u8> {
    let mut payload = format!("{}:{}:", context.as_str(), chain_id).into_bytes();
    payload.extend_from_slice(&canonical_bytes(message));
    payload
}

/// Signs `message` under `context` and `chain_id` with `key`, returning the
/// signature as lowercase hex.
pub fn sign<T: Serialize>(key: &KeyPair, message: &T, context: Context, chain_id: &str) -> String {
    let payload = build_payload(message, context, chain_id);
    let signature: Signature = key.signing_key().sign(&payload);
    hex::encode(signature.to_bytes())
}

/// Verifies `signature_hex` against `pubkey_hex` for `message` under
/// `context` and `chain_id`.
///
/// Returns `false` for any failure mode: malformed public key, malformed
/// signature, or a signature that simply does not verify. This function
/// never raises.
pub fn verify<T: Serialize>(
    pubkey_hex: &str,
    signature_hex: &str,
    message: &T,
    context: Context,
    chain_id: &str,
) -> bool {
    let Some(verifying_key) = parse_public_key(pubkey_hex) else {
        return false;
    };
    let Ok(sig_bytes) = hex::decode(signature_hex) else {
        return false;
    };
    let Ok(sig_bytes): Result<[u8; 64], _> = sig_bytes.try_into() else {
        return false;
    };
    let signature = Signature::from_bytes(&sig_bytes);
    let payload = build_payload(message, context, chain_id);
    verifying_key.verify(&payload, &signature).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Msg {
        a: u32,
    }

    #[test]
    fn sign_then_verify_roundtrips() {
        let key = KeyPair::from_seed("seed", 0);
        let msg = Msg { a: 1 };
        let sig = sign(&key, &msg, Context::Tx, "test-chain");
        assert!(verify(key.public_hex(), &sig, &msg, Context::Tx, "test-chain"));
    }

    #[test]
    fn wrong_context_fails_verification() {
        let key = KeyPair::from_seed("seed", 0);
        let msg = Msg { a: 1 };
        let sig = sign(&key, &msg, Context::Tx, "test-chain");
        assert!(!verify(key.public_hex(), &sig, &msg, Context::Vote, "test-chain"));
    }

    #[test]
    fn wrong_chain_id_fails_verification() {
        let key = KeyPair::from_seed("seed", 0);
        let msg = Msg { a: 1 };
        let sig = sign(&key, &msg, Context::Header, "chain-a");
        assert!(!verify(key.public_hex(), &sig, &msg, Context::Header, "chain-b"));
    }

    #[test]
    fn tampered_message_fails_verification() {
        let key = KeyPair::from_seed("seed", 0);
        let sig = sign(&key, &Msg { a: 1 }, Context::Tx, "test-chain");
        assert!(!verify(key.public_hex(), &sig, &Msg { a: 2 }, Context::Tx, "test-chain"));
    }

    #[test]
    fn malformed_signature_is_rejected_silently() {
        let key = KeyPair::from_seed("seed", 0);
        assert!(!verify(key.public_hex(), "not-hex", &Msg { a: 1 }, Context::Tx, "test-chain"));
    }

    #[test]
    fn malformed_pubkey_is_rejected_silently() {
        let msg = Msg { a: 1 };
        assert!(!verify("zz", "00", &msg, Context::Tx, "test-chain"));
    }
}
