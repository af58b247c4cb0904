//! Pluggable signing backends.
//!
//! [`PlaceholderSigner`] produces a reversible marker, not a cryptographic
//! signature. Deployments that need a certificate-backed signature plug in
//! their own [`InvoiceSigner`].

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

use super::error::EngineError;

/// Something that can sign bytes.
pub trait InvoiceSigner: Send + Sync {
    /// XML-DSig `SignatureMethod` algorithm URI.
    fn algorithm(&self) -> &str;

    /// Sign `message`, returning the raw signature bytes.
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, EngineError>;

    /// Public verification key, if the scheme has one.
    fn public_key(&self) -> Option<Vec<u8>> {
        None
    }
}

impl<S: InvoiceSigner + ?Sized> InvoiceSigner for &S {
    fn algorithm(&self) -> &str {
        (**self).algorithm()
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, EngineError> {
        (**self).sign(message)
    }

    fn public_key(&self) -> Option<Vec<u8>> {
        (**self).public_key()
    }
}

/// Marker appended by [`PlaceholderSigner`].
pub const PLACEHOLDER_MARKER: &str = "UAE-FTA-PLACEHOLDER";

/// Reversible stand-in signature: `message ":" PLACEHOLDER_MARKER`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderSigner;

impl PlaceholderSigner {
    /// Sign and base64-encode in one step.
    pub fn encode(&self, message: &str) -> String {
        BASE64.encode(format!("{message}:{PLACEHOLDER_MARKER}"))
    }

    /// Recover the signed message from a base64 placeholder signature.
    ///
    /// Returns `None` if the value is not a placeholder signature.
    pub fn decode(signature: &str) -> Option<String> {
        let bytes = BASE64.decode(signature.trim()).ok()?;
        let text = String::from_utf8(bytes).ok()?;
        text.strip_suffix(PLACEHOLDER_MARKER)?
            .strip_suffix(':')
            .map(String::from)
    }
}

impl InvoiceSigner for PlaceholderSigner {
    fn algorithm(&self) -> &str {
        "urn:emarat-einvoice:signature:placeholder"
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, EngineError> {
        let mut out = Vec::with_capacity(message.len() + PLACEHOLDER_MARKER.len() + 1);
        out.extend_from_slice(message);
        out.push(b':');
        out.extend_from_slice(PLACEHOLDER_MARKER.as_bytes());
        Ok(out)
    }
}

/// Ed25519 signer backed by a caller-supplied private key.
///
/// Does not implement `Debug` or `Serialize`; the key must not leak into
/// logs or artifacts.
#[cfg(feature = "ed25519")]
pub struct Ed25519Signer {
    signing_key: ed25519_dalek::SigningKey,
}

#[cfg(feature = "ed25519")]
impl Ed25519Signer {
    /// Create a signer from a 32-byte secret key.
    pub fn from_secret_bytes(secret: &[u8]) -> Result<Self, EngineError> {
        let bytes: [u8; 32] = secret.try_into().map_err(|_| {
            EngineError::Signing(format!(
                "Ed25519 secret key must be 32 bytes, got {}",
                secret.len()
            ))
        })?;
        Ok(Self {
            signing_key: ed25519_dalek::SigningKey::from_bytes(&bytes),
        })
    }

    /// Verify a signature produced by this signer.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        use ed25519_dalek::Verifier;

        ed25519_dalek::Signature::from_slice(signature)
            .map(|sig| self.signing_key.verifying_key().verify(message, &sig).is_ok())
            .unwrap_or(false)
    }
}

#[cfg(feature = "ed25519")]
impl InvoiceSigner for Ed25519Signer {
    fn algorithm(&self) -> &str {
        "http://www.w3.org/2021/04/xmldsig-more#eddsa-ed25519"
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, EngineError> {
        use ed25519_dalek::Signer;

        Ok(self.signing_key.sign(message).to_bytes().to_vec())
    }

    fn public_key(&self) -> Option<Vec<u8>> {
        Some(self.signing_key.verifying_key().to_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_is_reversible() {
        let hash = "ab".repeat(32);
        let sig = PlaceholderSigner.encode(&hash);
        assert_eq!(PlaceholderSigner::decode(&sig).as_deref(), Some(hash.as_str()));
    }

    #[test]
    fn placeholder_sign_matches_encode() {
        let raw = PlaceholderSigner.sign(b"abc").unwrap();
        assert_eq!(BASE64.encode(raw), PlaceholderSigner.encode("abc"));
    }

    #[test]
    fn decode_rejects_foreign_values() {
        assert!(PlaceholderSigner::decode("not base64 !!").is_none());
        assert!(PlaceholderSigner::decode(&BASE64.encode("abc")).is_none());
    }

    #[cfg(feature = "ed25519")]
    #[test]
    fn ed25519_sign_and_verify() {
        let signer = Ed25519Signer::from_secret_bytes(&[7u8; 32]).unwrap();
        let sig = signer.sign(b"invoice").unwrap();
        assert_eq!(sig.len(), 64);
        assert!(signer.verify(b"invoice", &sig));
        assert!(!signer.verify(b"tampered", &sig));
        assert!(Ed25519Signer::from_secret_bytes(&[0u8; 31]).is_err());
    }
}
