//! secp256k1 ECDSA primitives for signing and verifying block headers.
//!
//! Keys and signatures are stored in their encoded forms (33-byte compressed
//! SEC1 points and 64-byte `r || s` signatures) and only decoded when used.

use crate::hash::{hash, Hash};
use k256::ecdsa::{
    signature::{Signer, Verifier},
    Signature as EcdsaSignature, SigningKey, VerifyingKey,
};
use rand::rngs::OsRng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Errors that can occur during cryptographic operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("invalid signature encoding")]
    InvalidSignature,
    #[error("invalid public key")]
    InvalidPublicKey,
    #[error("invalid private key")]
    InvalidPrivateKey,
    #[error("signature verification failed")]
    VerificationFailed,
}

/// Decode a fixed-size byte array from hex.
fn decode_fixed<const N: usize>(s: &str, err: CryptoError) -> Result<[u8; N], CryptoError> {
    let bytes = hex::decode(s).map_err(|_| err.clone())?;
    bytes.try_into().map_err(|_| err)
}

/// An ECDSA signature in raw `r || s` form.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature(pub [u8; 64]);

impl Signature {
    /// Create a signature from raw bytes.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Get the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Convert to a hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a 128-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        decode_fixed(s, CryptoError::InvalidSignature).map(Self)
    }

    fn decode(&self) -> Result<EcdsaSignature, CryptoError> {
        EcdsaSignature::from_slice(&self.0).map_err(|_| CryptoError::InvalidSignature)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}...)", &self.to_hex()[..16])
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Signature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Signature::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// A compressed secp256k1 public key (33 bytes, `0x02`/`0x03` prefix).
///
/// The bytes are not checked to lie on the curve until [`PublicKey::verify_hash`].
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(pub [u8; 33]);

impl PublicKey {
    /// Wrap compressed bytes, checking that they decode to a curve point.
    pub fn from_bytes(bytes: [u8; 33]) -> Result<Self, CryptoError> {
        VerifyingKey::from_sec1_bytes(&bytes).map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self(bytes))
    }

    /// Get the raw compressed bytes.
    pub fn as_bytes(&self) -> &[u8; 33] {
        &self.0
    }

    /// Convert to a hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a 66-character hex string without validating the point.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        decode_fixed(s, CryptoError::InvalidPublicKey).map(Self)
    }

    /// Derive an address: the hex SHA-256 of the compressed key.
    pub fn to_address(&self) -> String {
        hash(&self.0).to_hex()
    }

    /// Verify a signature over a header hash.
    pub fn verify_hash(&self, hash: &Hash, signature: &Signature) -> Result<(), CryptoError> {
        let key =
            VerifyingKey::from_sec1_bytes(&self.0).map_err(|_| CryptoError::InvalidPublicKey)?;
        let sig = signature.decode()?;
        key.verify(hash.to_hex().as_bytes(), &sig)
            .map_err(|_| CryptoError::VerificationFailed)
    }

    fn from_verifying_key(key: &VerifyingKey) -> Self {
        let point = key.to_encoded_point(true);
        let mut bytes = [0u8; 33];
        bytes.copy_from_slice(point.as_bytes());
        Self(bytes)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", hex::encode(&self.0[..8]))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for PublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PublicKey::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// A keypair for signing and verification.
pub struct Keypair {
    signing_key: SigningKey,
    public_key: PublicKey,
}

impl Keypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        Self::from_signing_key(SigningKey::random(&mut OsRng))
    }

    /// Create a keypair from a private key (32 bytes).
    pub fn from_private_key(bytes: &[u8; 32]) -> Result<Self, CryptoError> {
        let signing_key =
            SigningKey::from_slice(bytes).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self::from_signing_key(signing_key))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let public_key = PublicKey::from_verifying_key(signing_key.verifying_key());
        Self {
            signing_key,
            public_key,
        }
    }

    /// Get the private key bytes.
    pub fn private_key(&self) -> [u8; 32] {
        self.signing_key.to_bytes().into()
    }

    /// Get the compressed public key.
    pub fn public_key(&self) -> PublicKey {
        self.public_key
    }

    /// Sign a header hash (deterministic RFC 6979 nonce, SHA-256 prehash of its hex text).
    pub fn sign_hash(&self, hash: &Hash) -> Signature {
        let sig: EcdsaSignature = self.signing_key.sign(hash.to_hex().as_bytes());
        Signature(sig.to_bytes().into())
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("public_key", &self.public_key)
            .finish()
    }
}
