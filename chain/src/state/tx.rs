//! Signed key/value transactions.

use serde::{Deserialize, Serialize};

use crate::crypto::{Context, sign, verify};
use crate::crypto::KeyPair;

/// A signed write of `value` into `key`, submitted by `sender`.
///
/// `key` must be namespaced under the sender's own public key
/// (`"<sender>/..."`); this is the only ownership rule the application
/// enforces.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub key: String,
    pub value: String,
    pub signature: String,
}

/// The portion of a transaction that actually gets signed — everything
/// except the signature itself.
#[derive(Serialize)]
struct TxPayload<'a> {
    sender: &'a str,
    key: &'a str,
    value: &'a str,
}

impl Transaction {
    /// Builds and signs a new transaction with `key`.
    pub fn new_signed(key: &KeyPair, tx_key: impl Into<String>, value: impl Into<String>, chain_id: &str) -> Self {
        let sender = key.public_hex().to_string();
        let tx_key = tx_key.into();
        let value = value.into();
        let payload = TxPayload {
            sender: &sender,
            key: &tx_key,
            value: &value,
        };
        let signature = sign(key, &payload, Context::Tx, chain_id);
        Transaction {
            sender,
            key: tx_key,
            value,
            signature,
        }
    }

    /// Returns `true` if `self.key` is namespaced under `self.sender`.
    pub fn is_owned_by_sender(&self) -> bool {
        self.key.starts_with(&format!("{}/", self.sender))
    }

    /// Verifies this transaction's signature under context `"TX"`.
    pub fn verify_signature(&self, chain_id: &str) -> bool {
        let payload = TxPayload {
            sender: &self.sender,
            key: &self.key,
            value: &self.value,
        };
        verify(&self.sender, &self.signature, &payload, Context::Tx, chain_id)
    }
}
