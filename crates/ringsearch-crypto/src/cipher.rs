//! Decrypt primitive used to test candidate keys
//!
//! [`Decryptor`] is the seam between the search and the cipher. The search
//! only needs "decrypt this ciphertext under this key"; the production
//! implementation is AES-256-CBC with a fixed IV.

use aes::Aes256;
use cbc::cipher::{BlockDecryptMut, KeyIvInit, block_padding::NoPadding};
use zeroize::Zeroize;

use crate::{error::CryptoError, key_space::TrialKey};

/// AES block size in bytes
pub const BLOCK_SIZE: usize = 16;

/// Default CBC initialization vector (ASCII `0123456789012345`)
pub const DEFAULT_IV: [u8; BLOCK_SIZE] = *b"0123456789012345";

type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Decrypts a ciphertext under a candidate key.
///
/// Implementations must be callable from many workers at once.
pub trait Decryptor: Send + Sync {
    /// Owned buffer holding decrypted bytes.
    ///
    /// Released when the caller drops it, once per decrypt call.
    type Plaintext: AsRef<[u8]> + Send;

    /// Decrypt `ciphertext` under `key`.
    ///
    /// # Errors
    ///
    /// - `CryptoError::Initialization` if the cipher rejects the key or IV
    /// - `CryptoError::InvalidCiphertextLength` if the ciphertext cannot be
    ///   decrypted block-wise
    fn decrypt(&self, key: &TrialKey, ciphertext: &[u8]) -> Result<Self::Plaintext, CryptoError>;
}

/// Decrypted bytes, zeroized on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct Plaintext {
    bytes: Vec<u8>,
}

impl Plaintext {
    /// Wrap decrypted bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Decrypted bytes including any padding.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl AsRef<[u8]> for Plaintext {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

impl std::fmt::Debug for Plaintext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Plaintext({} bytes)", self.bytes.len())
    }
}

impl Drop for Plaintext {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

/// AES-256-CBC decryption with a fixed IV.
///
/// Padding is left in place: candidates are judged by a prefix comparison
/// against the known plaintext, so trailing padding never affects a match.
/// Use [`strip_pkcs7`] when displaying the result.
#[derive(Debug, Clone)]
pub struct Aes256CbcDecryptor {
    iv: [u8; BLOCK_SIZE],
}

impl Aes256CbcDecryptor {
    /// Create a decryptor with the given IV.
    pub fn new(iv: [u8; BLOCK_SIZE]) -> Self {
        Self { iv }
    }

    /// CBC initialization vector.
    pub fn iv(&self) -> &[u8; BLOCK_SIZE] {
        &self.iv
    }
}

impl Default for Aes256CbcDecryptor {
    fn default() -> Self {
        Self::new(DEFAULT_IV)
    }
}

impl Decryptor for Aes256CbcDecryptor {
    type Plaintext = Plaintext;

    fn decrypt(&self, key: &TrialKey, ciphertext: &[u8]) -> Result<Plaintext, CryptoError> {
        if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
            return Err(CryptoError::InvalidCiphertextLength {
                len: ciphertext.len(),
                block_size: BLOCK_SIZE,
            });
        }

        let cipher = Aes256CbcDec::new_from_slices(key.as_bytes(), &self.iv)
            .map_err(|e| CryptoError::Initialization { reason: e.to_string() })?;

        let bytes = cipher.decrypt_padded_vec_mut::<NoPadding>(ciphertext).map_err(|_| {
            CryptoError::InvalidCiphertextLength { len: ciphertext.len(), block_size: BLOCK_SIZE }
        })?;

        Ok(Plaintext::new(bytes))
    }
}

/// Strip PKCS#7 padding if present and well-formed.
///
/// Returns the input unchanged when the trailing bytes are not valid
/// padding.
pub fn strip_pkcs7(bytes: &[u8]) -> &[u8] {
    let Some(&last) = bytes.last() else {
        return bytes;
    };

    let pad = usize::from(last);
    if pad == 0 || pad > BLOCK_SIZE || pad > bytes.len() {
        return bytes;
    }

    let (body, padding) = bytes.split_at(bytes.len() - pad);
    if padding.iter().all(|&b| b == last) { body } else { bytes }
}

#[cfg(test)]
mod tests {
    use cbc::cipher::{BlockEncryptMut, block_padding::Pkcs7};

    use super::*;
    use crate::key_space::KEY_LENGTH;

    type Aes256CbcEnc = cbc::Encryptor<Aes256>;

    fn test_key(seed: u8) -> TrialKey {
        let mut bytes = [0u8; KEY_LENGTH];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = seed.wrapping_add(i as u8);
        }
        TrialKey::from_bytes(bytes)
    }

    fn encrypt(key: &TrialKey, plaintext: &[u8]) -> Vec<u8> {
        Aes256CbcEnc::new_from_slices(key.as_bytes(), &DEFAULT_IV)
            .unwrap()
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext)
    }

    #[test]
    fn decrypts_under_correct_key() {
        let key = test_key(7);
        let ciphertext = encrypt(&key, b"attack at dawn");

        let plaintext = Aes256CbcDecryptor::default().decrypt(&key, &ciphertext).unwrap();

        assert_eq!(plaintext.as_bytes().len(), BLOCK_SIZE);
        assert_eq!(strip_pkcs7(plaintext.as_bytes()), b"attack at dawn");
    }

    #[test]
    fn wrong_key_yields_different_bytes() {
        let ciphertext = encrypt(&test_key(7), b"attack at dawn");

        let plaintext = Aes256CbcDecryptor::default().decrypt(&test_key(8), &ciphertext).unwrap();

        assert!(!plaintext.as_bytes().starts_with(b"attack"));
    }

    #[test]
    fn wrong_iv_corrupts_first_block_only() {
        let key = test_key(1);
        let message = b"first block here second block!!!";
        let ciphertext = encrypt(&key, message);

        let decryptor = Aes256CbcDecryptor::new(*b"fedcba9876543210");
        let plaintext = decryptor.decrypt(&key, &ciphertext).unwrap();

        assert_ne!(&plaintext.as_bytes()[..BLOCK_SIZE], &message[..BLOCK_SIZE]);
        assert_eq!(&plaintext.as_bytes()[BLOCK_SIZE..32], &message[BLOCK_SIZE..]);
    }

    #[test]
    fn rejects_partial_block() {
        let result = Aes256CbcDecryptor::default().decrypt(&test_key(0), &[0u8; 15]);
        assert_eq!(
            result.unwrap_err(),
            CryptoError::InvalidCiphertextLength { len: 15, block_size: BLOCK_SIZE }
        );
    }

    #[test]
    fn rejects_empty_ciphertext() {
        let result = Aes256CbcDecryptor::default().decrypt(&test_key(0), &[]);
        assert!(matches!(result, Err(CryptoError::InvalidCiphertextLength { len: 0, .. })));
    }

    #[test]
    fn strip_pkcs7_removes_valid_padding() {
        assert_eq!(strip_pkcs7(b"hello\x03\x03\x03"), b"hello");
        assert_eq!(strip_pkcs7(&[0x10; 16]), b"");
    }

    #[test]
    fn strip_pkcs7_keeps_invalid_padding() {
        assert_eq!(strip_pkcs7(b"hello\x01\x03\x03"), b"hello\x01\x03\x03");
        assert_eq!(strip_pkcs7(b"hello\x00"), b"hello\x00");
        assert_eq!(strip_pkcs7(b"\x05\x05"), b"\x05\x05");
        assert_eq!(strip_pkcs7(b""), b"");
    }
}
