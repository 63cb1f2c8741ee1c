use super::{RANDOM_BATCH_LEN, SALT_CAPACITY};
use crate::error::PwcryptError;
use anyhow::Result;
use getrandom::fill;
use std::fmt;
use tracing::{debug, trace};
use zeroize::Zeroize;

/// A crypt salt: public, but only drawn from `[./0-9A-Za-z]` when generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Salt(String);

impl Salt {
    /// Takes a caller supplied salt, silently truncated to [`SALT_CAPACITY`].
    ///
    /// No alphabet check happens here; the hash primitive rejects what it
    /// cannot use.
    pub fn from_user(salt: &str) -> Self {
        let mut end = salt.len().min(SALT_CAPACITY);
        while !salt.is_char_boundary(end) {
            end -= 1;
        }
        if end < salt.len() {
            debug!(given = salt.len(), kept = end, "truncated caller salt");
        }
        Self(salt[..end].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hashed passphrase alphabet from crypt(5). Done by hand so the locale
/// cannot change the answer.
pub fn is_valid_for_salt(c: u8) -> bool {
    matches!(c, b'.' | b'/' | b'0'..=b'9' | b'A'..=b'Z' | b'a'..=b'z')
}

/// Fill buffer with cryptographically secure random bytes
fn secure_random(buf: &mut [u8]) -> Result<()> {
    fill(buf).map_err(|_| PwcryptError::RandomUnavailable)?;
    Ok(())
}

/// Generate a random salt of exactly `len` characters.
///
/// Bytes outside the alphabet are discarded rather than reduced modulo the
/// alphabet size, so every allowed character is equally likely.
pub fn generate_salt(len: usize) -> Result<Salt> {
    let mut salt = String::with_capacity(len);
    let mut batch = [0u8; RANDOM_BATCH_LEN];
    let mut batches = 0usize;

    while salt.len() < len {
        secure_random(&mut batch)?;
        batches += 1;
        for &b in batch.iter() {
            if salt.len() == len {
                break;
            }
            if is_valid_for_salt(b) {
                salt.push(char::from(b));
            }
        }
    }
    batch.zeroize();

    trace!(len, batches, "generated random salt");
    Ok(Salt(salt))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alphabet_accepts_crypt_characters() {
        for c in b"./0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz" {
            assert!(is_valid_for_salt(*c), "rejected {:?}", char::from(*c));
        }
    }

    #[test]
    fn alphabet_rejects_separators_and_whitespace() {
        for c in b"$:;*!\\ \t\r\n\0" {
            assert!(!is_valid_for_salt(*c), "accepted {:?}", char::from(*c));
        }
    }

    #[test]
    fn alphabet_size_is_64() {
        let count = (0..=u8::MAX).filter(|b| is_valid_for_salt(*b)).count();
        assert_eq!(count, 64);
    }

    #[test]
    fn generated_salt_has_requested_length() {
        for len in [1, 2, 8, 16, 200, 500] {
            let salt = generate_salt(len).unwrap();
            assert_eq!(salt.len(), len);
            assert!(salt.as_str().bytes().all(is_valid_for_salt), "{salt}");
        }
    }

    #[test]
    fn generated_salt_of_zero_is_empty() {
        assert!(generate_salt(0).unwrap().is_empty());
    }

    #[test]
    fn generated_salts_differ() {
        let a = generate_salt(16).unwrap();
        let b = generate_salt(16).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn user_salt_kept_verbatim() {
        let salt = Salt::from_user("UD23qlwjerf");
        assert_eq!(salt.as_str(), "UD23qlwjerf");
    }

    #[test]
    fn user_salt_is_truncated_silently() {
        let long = "a".repeat(SALT_CAPACITY + 50);
        let salt = Salt::from_user(&long);
        assert_eq!(salt.len(), SALT_CAPACITY);
    }

    #[test]
    fn user_salt_truncation_respects_char_boundaries() {
        let mut long = "a".repeat(SALT_CAPACITY - 1);
        long.push('é');
        let salt = Salt::from_user(&long);
        assert_eq!(salt.len(), SALT_CAPACITY - 1);
    }
}
