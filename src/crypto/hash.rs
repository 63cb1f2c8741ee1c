use super::Salt;
use crate::error::PwcryptError;
use anyhow::Result;

/// Build the `$<algo>$<salt>$` setting string fed to crypt.
pub fn encode_salt_param(algorithm: &str, salt: &Salt) -> String {
    format!("${algorithm}${salt}$")
}

/// Run the crypt(3) compatible primitive over `plaintext` with `setting`.
pub fn crypt(plaintext: &[u8], setting: &str) -> Result<String> {
    pwhash::unix::crypt(plaintext, setting).map_err(|e| {
        tracing::debug!(error = ?e, "crypt primitive rejected setting");
        let algorithm = setting.split('$').nth(1).unwrap_or_default().to_string();
        PwcryptError::HashFailed { algorithm }.into()
    })
}
