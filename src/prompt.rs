//! Passphrase entry: prompt, read one line without echo, optionally confirm.

use crate::error::PwcryptError;
use crate::secret::SecretBuffer;
use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use subtle::ConstantTimeEq;
use tracing::debug;
use zeroize::Zeroizing;

/// A source of passphrase lines.
pub trait LineReader {
    /// Reads one line into `buf`, without its trailing CR/LF.
    ///
    /// End of input is an error, never an empty line.
    fn read_line(&mut self, buf: &mut SecretBuffer) -> Result<()>;

    /// Whether the user's Enter key already reached the screen.
    fn echoes_newline(&self) -> bool {
        false
    }
}

/// Reads from the controlling terminal with echo disabled.
///
/// rpassword saves the terminal attributes, clears `ECHO`, and restores them
/// when the read returns, whether it succeeded or not. It leaves `ECHONL`
/// set, so the newline is echoed by the terminal itself.
#[derive(Debug, Default)]
pub struct TerminalReader;

impl LineReader for TerminalReader {
    fn read_line(&mut self, buf: &mut SecretBuffer) -> Result<()> {
        let line = Zeroizing::new(
            rpassword::read_password().context("failed to read passphrase from terminal")?,
        );
        buf.fill_from(chomp_crlf(line.as_bytes()));
        Ok(())
    }

    fn echoes_newline(&self) -> bool {
        true
    }
}

/// Reads lines from any buffered source as-is: a pipe, or a terminal left in
/// echo mode.
pub struct BufLineReader<R> {
    inner: R,
    echoes_newline: bool,
}

impl<R: BufRead> BufLineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            echoes_newline: false,
        }
    }

    /// For a terminal with echo on, where the user sees their own Enter.
    pub fn echoing(inner: R) -> Self {
        Self {
            inner,
            echoes_newline: true,
        }
    }
}

impl<R: BufRead> LineReader for BufLineReader<R> {
    fn read_line(&mut self, buf: &mut SecretBuffer) -> Result<()> {
        let mut line = Zeroizing::new(Vec::new());
        let n = self
            .inner
            .read_until(b'\n', &mut line)
            .context("failed to read passphrase")?;
        if n == 0 {
            return Err(PwcryptError::EndOfInput.into());
        }
        buf.fill_from(chomp_crlf(&line));
        Ok(())
    }

    fn echoes_newline(&self) -> bool {
        self.echoes_newline
    }
}

/// Cuts the line at the first CR or LF.
fn chomp_crlf(line: &[u8]) -> &[u8] {
    match line.iter().position(|b| *b == b'\r' || *b == b'\n') {
        Some(end) => &line[..end],
        None => line,
    }
}

/// Prompts for a passphrase on `out`, reading it through `reader`.
///
/// With `confirm`, the passphrase is asked for twice; on a mismatch both
/// entries are asked for again, until they agree.
pub fn prompt_passphrase<R, W>(
    out: &mut W,
    reader: &mut R,
    label: &str,
    confirm: bool,
    capacity: usize,
) -> Result<SecretBuffer>
where
    R: LineReader + ?Sized,
    W: Write + ?Sized,
{
    let label = if label.is_empty() {
        String::new()
    } else {
        format!("{label} ")
    };

    let mut first = SecretBuffer::with_capacity(capacity)?;
    let mut second = if confirm {
        Some(SecretBuffer::with_capacity(capacity)?)
    } else {
        None
    };

    loop {
        ask(out, reader, &format!("input {label}passphrase: "), &mut first)?;

        let Some(second) = second.as_mut() else {
            return Ok(first);
        };
        ask(out, reader, &format!("repeat {label}passphrase: "), second)?;

        if bool::from(first.full().ct_eq(second.full())) {
            return Ok(first);
        }

        debug!("passphrase confirmation mismatch, asking again");
        writeln!(out, "inputs did not match").context("failed to write prompt")?;
    }
}

fn ask<R, W>(out: &mut W, reader: &mut R, prompt: &str, buf: &mut SecretBuffer) -> Result<()>
where
    R: LineReader + ?Sized,
    W: Write + ?Sized,
{
    write!(out, "{prompt}").context("failed to write prompt")?;
    out.flush().context("failed to flush prompt")?;

    reader.read_line(buf)?;

    if !reader.echoes_newline() {
        writeln!(out).context("failed to write prompt")?;
    }
    out.flush().context("failed to flush prompt")?;
    Ok(())
}
