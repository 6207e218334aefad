//! Keys and signatures in NEAR's `curve:base58` text form.
//!
//! Both curves round-trip through borsh and text; only ed25519 can sign.
//! Secp256k1 public keys are the 64-byte uncompressed form without the
//! `0x04` prefix, as they appear in NEAR transactions.

use std::fmt;
use std::str::FromStr;

use borsh::{BorshDeserialize, BorshSerialize};
use ed25519_dalek::{Signer as _, SigningKey, Verifier as _, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ParseKeyError;

/// Key curve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyType {
    Ed25519,
    Secp256k1,
}

impl KeyType {
    /// Text prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::Ed25519 => "ed25519",
            KeyType::Secp256k1 => "secp256k1",
        }
    }
}

impl FromStr for KeyType {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ed25519" => Ok(KeyType::Ed25519),
            "secp256k1" => Ok(KeyType::Secp256k1),
            other => Err(ParseKeyError::UnknownKeyType(other.to_string())),
        }
    }
}

fn split_key(s: &str) -> Result<(KeyType, Vec<u8>), ParseKeyError> {
    let (curve, data) = s.split_once(':').ok_or(ParseKeyError::InvalidFormat)?;
    let key_type = curve.parse()?;
    let bytes = bs58::decode(data)
        .into_vec()
        .map_err(|e| ParseKeyError::InvalidBase58(e.to_string()))?;
    Ok((key_type, bytes))
}

fn fixed<const N: usize>(bytes: &[u8]) -> Result<[u8; N], ParseKeyError> {
    bytes.try_into().map_err(|_| ParseKeyError::InvalidLength {
        expected: N,
        actual: bytes.len(),
    })
}

fn write_key(f: &mut fmt::Formatter<'_>, key_type: KeyType, bytes: &[u8]) -> fmt::Result {
    write!(f, "{}:{}", key_type.as_str(), bs58::encode(bytes).into_string())
}

macro_rules! string_serde {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                s.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                let s = <String as Deserialize>::deserialize(d)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

// ============================================================================
// PublicKey
// ============================================================================

/// A public key. The borsh enum tag is the curve byte.
#[derive(Clone, PartialEq, Eq, Hash, BorshSerialize, BorshDeserialize)]
pub enum PublicKey {
    Ed25519([u8; 32]),
    Secp256k1([u8; 64]),
}

impl PublicKey {
    /// Key curve.
    pub fn key_type(&self) -> KeyType {
        match self {
            PublicKey::Ed25519(_) => KeyType::Ed25519,
            PublicKey::Secp256k1(_) => KeyType::Secp256k1,
        }
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            PublicKey::Ed25519(b) => b,
            PublicKey::Secp256k1(b) => b,
        }
    }

    /// Check an ed25519 signature over `message`.
    ///
    /// Always false for secp256k1 keys or mismatched signature curves.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        let (PublicKey::Ed25519(key), Signature::Ed25519(sig)) = (self, signature) else {
            return false;
        };
        let Ok(key) = VerifyingKey::from_bytes(key) else {
            return false;
        };
        key.verify(message, &ed25519_dalek::Signature::from_bytes(sig))
            .is_ok()
    }
}

impl FromStr for PublicKey {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match split_key(s)? {
            (KeyType::Ed25519, bytes) => Ok(PublicKey::Ed25519(fixed(&bytes)?)),
            (KeyType::Secp256k1, bytes) => Ok(PublicKey::Secp256k1(fixed(&bytes)?)),
        }
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_key(f, self.key_type(), self.as_bytes())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({self})")
    }
}

string_serde!(PublicKey);

// ============================================================================
// Signature
// ============================================================================

/// A transaction signature.
#[derive(Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum Signature {
    Ed25519([u8; 64]),
    Secp256k1([u8; 65]),
}

impl Signature {
    /// Signature curve.
    pub fn key_type(&self) -> KeyType {
        match self {
            Signature::Ed25519(_) => KeyType::Ed25519,
            Signature::Secp256k1(_) => KeyType::Secp256k1,
        }
    }

    /// Raw signature bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Signature::Ed25519(b) => b,
            Signature::Secp256k1(b) => b,
        }
    }
}

impl FromStr for Signature {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match split_key(s)? {
            (KeyType::Ed25519, bytes) => Ok(Signature::Ed25519(fixed(&bytes)?)),
            (KeyType::Secp256k1, bytes) => Ok(Signature::Secp256k1(fixed(&bytes)?)),
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_key(f, self.key_type(), self.as_bytes())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({self})")
    }
}

string_serde!(Signature);

// ============================================================================
// SecretKey
// ============================================================================

/// An ed25519 signing key.
#[derive(Clone)]
pub struct SecretKey(SigningKey);

impl SecretKey {
    /// Generate a random key.
    pub fn generate() -> Self {
        Self(SigningKey::generate(&mut OsRng))
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self(SigningKey::from_bytes(&seed))
    }

    /// Matching public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey::Ed25519(self.0.verifying_key().to_bytes())
    }

    /// Sign `message`.
    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature::Ed25519(self.0.sign(message).to_bytes())
    }
}

impl FromStr for SecretKey {
    type Err = ParseKeyError;

    /// Accepts the 32-byte seed or the 64-byte `seed || public key` form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key_type, bytes) = split_key(s)?;
        if key_type != KeyType::Ed25519 {
            return Err(ParseKeyError::UnsupportedKeyType(key_type.as_str()));
        }
        let seed = match bytes.len() {
            32 | 64 => fixed::<32>(&bytes[..32])?,
            actual => return Err(ParseKeyError::InvalidLength { expected: 32, actual }),
        };
        Ok(Self::from_seed(seed))
    }
}

impl fmt::Display for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_key(f, KeyType::Ed25519, &self.0.to_keypair_bytes())
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey({})", self.public_key())
    }
}
