pub mod crypto;
pub mod error;
pub mod prompt;
pub mod secret;

pub use crate::error::PwcryptError;
pub use crate::prompt::{BufLineReader, LineReader, TerminalReader, prompt_passphrase};
pub use crate::secret::SecretBuffer;
use crate::crypto::{Salt, algorithm::salt_len_for};
use anyhow::{Context, Result};
use std::io::Write;
use tracing::debug;

/// Bytes reserved for a typed passphrase; longer lines are truncated.
pub const PASSPHRASE_CAPACITY: usize = 1024;

/// What to hash with; everything the command line decides.
#[derive(Debug, Clone, Default)]
pub struct HashOptions {
    /// Ask twice and insist the entries match.
    pub confirm: bool,
    /// Inserted into the prompt, e.g. "email" gives "input email passphrase: ".
    pub label: String,
    /// Algorithm name or crypt id; `None` means SHA-512.
    pub algorithm: Option<String>,
    /// Fixed salt; a random one is generated when absent.
    pub salt: Option<String>,
}

/// Prompts for a passphrase and returns its crypt(3) hash.
///
/// Prompts go to `out`, the passphrase comes from `reader`. The plaintext is
/// wiped as soon as the hash has been computed.
pub fn pwcrypt<R, W>(options: &HashOptions, reader: &mut R, out: &mut W) -> Result<String>
where
    R: LineReader + ?Sized,
    W: Write + ?Sized,
{
    let algorithm = crypto::resolve_algorithm(options.algorithm.as_deref());

    let salt = match options.salt.as_deref() {
        Some(salt) => Salt::from_user(salt),
        None => crypto::generate_salt(salt_len_for(&algorithm))
            .context("failed to generate salt")?,
    };
    debug!(
        salt_len = salt.len(),
        user_supplied = options.salt.is_some(),
        "salt ready"
    );

    let setting = crypto::encode_salt_param(&algorithm, &salt);

    let passphrase = prompt_passphrase(
        out,
        reader,
        &options.label,
        options.confirm,
        PASSPHRASE_CAPACITY,
    )?;
    if !passphrase.is_isolated() {
        debug!("passphrase buffer is not excluded from dumps or forks");
    }

    let hashed = crypto::crypt(passphrase.as_bytes(), &setting);
    drop(passphrase);

    hashed
}
