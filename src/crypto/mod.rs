//! Salt generation, algorithm selection, and the crypt(3) primitive.
//!
//! Everything needed to turn a passphrase into a `$id$salt$hash` string
//! except the passphrase itself.

pub mod algorithm;
pub mod hash;
pub mod salt;

pub use algorithm::{CRYPT_MD5, CRYPT_SHA256, CRYPT_SHA512, resolve_algorithm};
pub use hash::{crypt, encode_salt_param};
pub use salt::{Salt, generate_salt, is_valid_for_salt};

/// Longest salt accepted from the caller, room for a `rounds=N$` prefix.
pub const SALT_CAPACITY: usize = 200;
/// Length of a generated SHA-256/SHA-512 salt (the crypt_r limit).
pub const SHA_SALT_LEN: usize = 16;
/// Length of a generated MD5 salt.
pub const MD5_SALT_LEN: usize = 8;
/// Random bytes pulled from the OS per batch while building a salt.
pub const RANDOM_BATCH_LEN: usize = 128;
