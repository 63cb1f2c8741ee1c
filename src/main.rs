use anyhow::{Context, Result};
use clap::Parser;
use pwcrypt::{BufLineReader, HashOptions, LineReader, TerminalReader, pwcrypt};
use std::io::{self, IsTerminal, Write};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pwcrypt")]
#[command(
    version,
    about = "Prompts for a passphrase and prints an /etc/shadow style crypt hash."
)]
struct Cli {
    /// Prompt twice to enter the passphrase
    #[arg(short, long, overrides_with = "no_confirm")]
    confirm: bool,

    /// Prompt only once (default)
    #[arg(long, overrides_with = "confirm")]
    no_confirm: bool,

    /// Add LABEL to the prompt, e.g. "email"
    #[arg(short = 't', long = "type", value_name = "LABEL", default_value = "")]
    label: String,

    /// SHA512 (6, default), SHA256 (5), MD5 (1), or any crypt id
    #[arg(short, long, value_name = "ALGO", env = "PWCRYPT_ALGORITHM")]
    algorithm: Option<String>,

    /// Use SALT instead of a random one; may start with "rounds=N$"
    #[arg(short, long, value_name = "SALT")]
    salt: Option<String>,

    /// Read the passphrase from stdin instead of the terminal
    #[arg(short, long)]
    pipe: bool,

    /// Do not hide the passphrase while typing
    #[arg(short, long)]
    echo: bool,
}

impl Cli {
    fn to_hash_options(&self) -> HashOptions {
        HashOptions {
            confirm: self.confirm && !self.no_confirm,
            label: self.label.clone(),
            algorithm: self.algorithm.clone(),
            salt: self.salt.clone(),
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("PWCRYPT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Where prompts go and where the passphrase comes from.
fn open_input(cli: &Cli) -> Result<(Box<dyn Write>, Box<dyn LineReader>)> {
    //  stdin (Pipeline)
    //  printf 'secret\n' | pwcrypt --pipe
    if cli.pipe || !io::stdin().is_terminal() {
        tracing::debug!("reading passphrase from stdin");
        let reader = BufLineReader::new(io::stdin().lock());
        return Ok((Box::new(io::stderr()), Box::new(reader)));
    }

    let tty = terminal_writer()?;

    //  Interactive, visible
    if cli.echo {
        tracing::debug!("reading passphrase from terminal with echo");
        let reader = BufLineReader::echoing(terminal_reader()?);
        return Ok((tty, Box::new(reader)));
    }

    //  Interactive (TTY)
    Ok((tty, Box::new(TerminalReader)))
}

#[cfg(unix)]
fn terminal_writer() -> Result<Box<dyn Write>> {
    let tty = std::fs::OpenOptions::new()
        .write(true)
        .open("/dev/tty")
        .context("failed to open /dev/tty")?;
    Ok(Box::new(tty))
}

#[cfg(not(unix))]
fn terminal_writer() -> Result<Box<dyn Write>> {
    Ok(Box::new(io::stderr()))
}

#[cfg(unix)]
fn terminal_reader() -> Result<io::BufReader<std::fs::File>> {
    let tty = std::fs::File::open("/dev/tty").context("failed to open /dev/tty")?;
    Ok(io::BufReader::new(tty))
}

#[cfg(not(unix))]
fn terminal_reader() -> Result<io::StdinLock<'static>> {
    Ok(io::stdin().lock())
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let options = cli.to_hash_options();

    let (mut out, mut reader) = open_input(&cli)?;
    let hashed = pwcrypt(&options, reader.as_mut(), out.as_mut())?;

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{hashed}").context("failed to write hash")?;
    stdout.flush().context("failed to write hash")?;
    Ok(())
}
