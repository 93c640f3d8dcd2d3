//! Wallet-signature verification collaborator.
//!
//! The consent proof is "the wallet that the subject registered signed
//! this exact message". The default implementation treats the wallet
//! address as a hex-encoded ed25519 public key and the signature as a hex
//! ed25519 signature over the raw message bytes. Deployments with other
//! wallet schemes provide their own [`SignatureVerifier`].

use ed25519_dalek::{Signature, VerifyingKey, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};

pub trait SignatureVerifier: Send + Sync {
    /// Whether `signature` is a valid proof that `address` signed
    /// `message`. Malformed inputs are simply invalid, never an error.
    fn verify(&self, address: &str, message: &str, signature: &str) -> bool;
}

#[derive(Debug, Default)]
pub struct Ed25519Verifier;

impl Ed25519Verifier {
    fn decode_key(address: &str) -> Option<VerifyingKey> {
        let address = address.strip_prefix("0x").unwrap_or(address);
        let bytes: [u8; PUBLIC_KEY_LENGTH] = hex::decode(address).ok()?.try_into().ok()?;
        VerifyingKey::from_bytes(&bytes).ok()
    }

    fn decode_signature(signature: &str) -> Option<Signature> {
        let signature = signature.strip_prefix("0x").unwrap_or(signature);
        let bytes: [u8; SIGNATURE_LENGTH] = hex::decode(signature).ok()?.try_into().ok()?;
        Some(Signature::from_bytes(&bytes))
    }
}

impl SignatureVerifier for Ed25519Verifier {
    fn verify(&self, address: &str, message: &str, signature: &str) -> bool {
        let Some(key) = Self::decode_key(address) else {
            return false;
        };
        let Some(signature) = Self::decode_signature(signature) else {
            return false;
        };
        key.verify_strict(message.as_bytes(), &signature).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signer, SigningKey};

    fn keypair() -> (SigningKey, String) {
        // Fixed test key; never used outside tests.
        let key = SigningKey::from_bytes(&[7u8; 32]);
        let address = hex::encode(key.verifying_key().to_bytes());
        (key, address)
    }

    #[test]
    fn valid_signature_verifies() {
        let (key, address) = keypair();
        let message = "I consent to data access request 42";
        let signature = hex::encode(key.sign(message.as_bytes()).to_bytes());

        assert!(Ed25519Verifier.verify(&address, message, &signature));
    }

    #[test]
    fn hex_prefix_is_tolerated() {
        let (key, address) = keypair();
        let message = "consent";
        let signature = hex::encode(key.sign(message.as_bytes()).to_bytes());

        assert!(Ed25519Verifier.verify(&format!("0x{address}"), message, &format!("0x{signature}")));
    }

    #[test]
    fn tampered_message_fails() {
        let (key, address) = keypair();
        let signature = hex::encode(key.sign(b"original message").to_bytes());

        assert!(!Ed25519Verifier.verify(&address, "altered message", &signature));
    }

    #[test]
    fn wrong_key_fails() {
        let (key, _) = keypair();
        let other = SigningKey::from_bytes(&[9u8; 32]);
        let other_address = hex::encode(other.verifying_key().to_bytes());
        let signature = hex::encode(key.sign(b"consent").to_bytes());

        assert!(!Ed25519Verifier.verify(&other_address, "consent", &signature));
    }

    #[test]
    fn malformed_inputs_are_invalid_not_errors() {
        assert!(!Ed25519Verifier.verify("not-hex", "msg", "also-not-hex"));
        assert!(!Ed25519Verifier.verify("abcd", "msg", "ef01"));
        assert!(!Ed25519Verifier.verify("", "", ""));
    }
}
