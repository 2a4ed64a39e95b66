//! Triple-DES helper for the three-element identity check.
//!
//! The `three_element_verify_mobile` endpoint carries
//! `3des("name|id_card|mobile", app_secret)` as uppercase hex. Methods are
//! named the way OpenSSL names them:
//!
//! | Name            | Mode | IV length |
//! |-----------------|------|-----------|
//! | `des-ede3`      | ECB  | 0         |
//! | `des-ede3-cbc`  | CBC  | 8         |
//!
//! The key is the secret's bytes truncated or NUL-padded to 24 bytes, and
//! plaintext is PKCS#7-padded. A random IV of the method's length is drawn
//! for every call and then dropped: it is neither returned nor prepended to
//! the ciphertext. With `des-ede3` the IV is empty so nothing is lost; with
//! `des-ede3-cbc` the recipient cannot decrypt unless it learns the IV some
//! other way.
//!
//! Failures are values, not errors: callers get a [`CipherOutcome`].

use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockEncryptMut, KeyInit, KeyIvInit};
use des::TdesEde3;
use rand::RngCore;

type TdesEcbEnc = ecb::Encryptor<TdesEde3>;
type TdesCbcEnc = cbc::Encryptor<TdesEde3>;

/// Key length of EDE3 (three 8-byte DES keys).
pub const KEY_LEN: usize = 24;

/// Method used by the three-element verification flow.
pub const THREE_ELEMENT_METHOD: &str = "des-ede3";

/// Supported cipher methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherMethod {
    DesEde3,
    DesEde3Cbc,
}

impl CipherMethod {
    pub const SUPPORTED: [CipherMethod; 2] = [Self::DesEde3, Self::DesEde3Cbc];

    /// Resolve an OpenSSL-style method name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::SUPPORTED
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(name))
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::DesEde3 => "des-ede3",
            Self::DesEde3Cbc => "des-ede3-cbc",
        }
    }

    /// IV length required by the method.
    pub fn iv_len(self) -> usize {
        match self {
            Self::DesEde3 => 0,
            Self::DesEde3Cbc => 8,
        }
    }
}

/// Result of an encryption attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CipherOutcome {
    /// Uppercase hex ciphertext.
    Encrypted(String),
    /// Diagnostic message.
    Failed(String),
}

impl CipherOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Encrypted(_))
    }

    /// Ciphertext hex on success, diagnostic otherwise.
    pub fn payload(&self) -> &str {
        match self {
            Self::Encrypted(s) | Self::Failed(s) => s,
        }
    }

    /// `(success, payload)` pair.
    pub fn into_pair(self) -> (bool, String) {
        match self {
            Self::Encrypted(s) => (true, s),
            Self::Failed(s) => (false, s),
        }
    }
}

/// Encrypt `data` with the named method and `key`.
pub fn encrypt(method: &str, data: &str, key: &str) -> CipherOutcome {
    let Some(method) = CipherMethod::from_name(method) else {
        return CipherOutcome::Failed(format!("unknown cipher method '{method}'"));
    };

    let key = derive_key(key);
    let mut iv = vec![0u8; method.iv_len()];
    rand::thread_rng().fill_bytes(&mut iv);

    let ciphertext = match method {
        CipherMethod::DesEde3 => TdesEcbEnc::new_from_slice(&key)
            .map(|enc| enc.encrypt_padded_vec_mut::<Pkcs7>(data.as_bytes())),
        CipherMethod::DesEde3Cbc => TdesCbcEnc::new_from_slices(&key, &iv)
            .map(|enc| enc.encrypt_padded_vec_mut::<Pkcs7>(data.as_bytes())),
    };

    match ciphertext {
        Ok(bytes) if !bytes.is_empty() => CipherOutcome::Encrypted(hex::encode_upper(bytes)),
        Ok(_) => CipherOutcome::Failed("encryption produced no output".into()),
        Err(e) => CipherOutcome::Failed(format!("cipher initialisation failed: {e}")),
    }
}

/// Encrypt the `name|id_card|mobile` triple with the shared secret.
pub fn encrypt_three_elements(name: &str, id_card: &str, mobile: &str, secret: &str) -> CipherOutcome {
    encrypt(THREE_ELEMENT_METHOD, &format!("{name}|{id_card}|{mobile}"), secret)
}

/// Secret bytes truncated or NUL-padded to [`KEY_LEN`].
fn derive_key(secret: &str) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    let len = secret.len().min(KEY_LEN);
    key[..len].copy_from_slice(&secret.as_bytes()[..len]);
    key
}
