use super::{MD5_SALT_LEN, SHA_SALT_LEN};
use tracing::debug;

// see the "Notes" section of crypt(3) for the ids glibc understands
pub const CRYPT_MD5: &str = "1";
pub const CRYPT_SHA256: &str = "5";
pub const CRYPT_SHA512: &str = "6";

/// Normalize an algorithm name into the crypt id used in `$id$salt$`.
///
/// Unknown names are returned verbatim; the hash primitive rejects
/// anything it cannot handle.
pub fn resolve_algorithm(input: Option<&str>) -> String {
    let resolved = match input {
        None => CRYPT_SHA512,
        Some(s) if s.is_empty() || s.eq_ignore_ascii_case("default") => CRYPT_SHA512,
        Some(s) if s.eq_ignore_ascii_case("sha512") || s == CRYPT_SHA512 => CRYPT_SHA512,
        Some(s) if s.eq_ignore_ascii_case("sha256") || s == CRYPT_SHA256 => CRYPT_SHA256,
        Some(s) if s.eq_ignore_ascii_case("md5") || s == CRYPT_MD5 => CRYPT_MD5,
        Some(s) => s,
    };
    debug!(algorithm = resolved, "resolved crypt algorithm");
    resolved.to_string()
}

/// Length of a freshly generated salt for the given crypt id.
pub fn salt_len_for(algorithm: &str) -> usize {
    match algorithm {
        CRYPT_MD5 => MD5_SALT_LEN,
        _ => SHA_SALT_LEN,
    }
}
