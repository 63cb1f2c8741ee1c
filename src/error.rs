use std::fmt;

#[derive(Debug)]
pub enum PwcryptError {
    EndOfInput,
    RandomUnavailable,
    HashFailed { algorithm: String },
}

impl fmt::Display for PwcryptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PwcryptError::EndOfInput => write!(f, "end of input while reading passphrase"),
            PwcryptError::RandomUnavailable => write!(f, "OS random generator unavailable"),
            PwcryptError::HashFailed { algorithm } => {
                write!(f, "crypt failed for algorithm '{algorithm}'")
            }
        }
    }
}

impl std::error::Error for PwcryptError {}
