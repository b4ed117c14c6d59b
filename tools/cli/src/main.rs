//! crypt4gh CLI - Command line interface for key management.
//!
//! This tool generates X25519 key pairs and derives the reader/writer
//! session keys used for file encryption.

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use std::ffi::OsString;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use crypt4gh_common::KeyName;
use crypt4gh_crypto::Role;
use crypt4gh_keystore::{load_private_key, load_public_key, Confirm, Outcome, Provisioner};

#[derive(Parser)]
#[command(name = "crypt4gh")]
#[command(about = "crypt4gh - X25519 key management and session key agreement")]
#[command(version)]
#[command(disable_help_subcommand = true)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a key pair.
    Generate {
        /// Key pair name.
        #[arg(short, long)]
        name: String,
    },

    /// Encrypt a file for a reader.
    Encrypt {
        /// File to encrypt.
        #[arg(short, long, value_name = "FILE")]
        file: PathBuf,

        /// Secret key to use.
        #[arg(short, long, value_name = "FILE")]
        seckey: PathBuf,

        /// Public key to use.
        #[arg(short, long, value_name = "FILE")]
        pubkey: PathBuf,
    },

    /// Decrypt a file.
    Decrypt {
        /// File to decrypt.
        #[arg(short, long, value_name = "FILE")]
        file: PathBuf,

        /// Secret key to use.
        #[arg(short, long, value_name = "FILE")]
        seckey: PathBuf,

        /// Public key of the writer.
        #[arg(short, long, value_name = "FILE")]
        pubkey: Option<PathBuf>,
    },

    /// Print version information.
    Version,
}

fn main() -> Result<()> {
    let args: Vec<OsString> = std::env::args_os().collect();
    if wants_usage(&args) {
        print_usage(&mut io::stdout().lock())?;
        return Ok(());
    }

    let cli = Cli::parse_from(args);

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Generate { name } => cmd_generate(&name),

        Commands::Encrypt {
            file,
            seckey,
            pubkey,
        } => cmd_encrypt(&file, &seckey, &pubkey),

        Commands::Decrypt {
            file,
            seckey,
            pubkey,
        } => cmd_decrypt(&file, &seckey, pubkey.as_deref()),

        Commands::Version => {
            println!("crypt4gh {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// No arguments, or `-h`/`--help` in command position.
fn wants_usage(args: &[OsString]) -> bool {
    match args.get(1).and_then(|arg| arg.to_str()) {
        None => args.len() <= 1,
        Some(arg) => arg == "-h" || arg == "--help",
    }
}

/// Print the top-level help followed by the help of every subcommand.
fn print_usage(out: &mut impl Write) -> Result<()> {
    let mut cmd = Cli::command();
    writeln!(out, "{}", cmd.render_help())?;
    for sub in cmd.get_subcommands_mut() {
        writeln!(out, "{}", sub.render_help())?;
    }
    Ok(())
}

/// Yes/no prompt on the terminal.
struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&mut self, message: &str) -> crypt4gh_common::Result<bool> {
        let mut stdout = io::stdout().lock();
        write!(stdout, "{} [y/N]: ", message)?;
        stdout.flush()?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        Ok(is_affirmative(&answer))
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Generate a key pair in the current directory.
fn cmd_generate(name: &str) -> Result<()> {
    let name = KeyName::new(name).context("Invalid key pair name")?;

    let provisioner = Provisioner::new(".");
    let outcome = provisioner
        .provision(&name, &mut TerminalConfirm)
        .context("Failed to generate key pair")?;

    match outcome {
        Outcome::Created(paths) => {
            println!("Key pair generated successfully!");
            println!("  Public key: {}", paths.public.display());
            println!("  Secret key: {}", paths.private.display());
        }
        Outcome::Cancelled => {
            println!("Key pair generation cancelled.");
        }
    }

    Ok(())
}

/// Derive the writer session key for a file.
fn cmd_encrypt(file: &Path, seckey: &Path, pubkey: &Path) -> Result<()> {
    info!("Encrypting {}", file.display());

    let own = load_private_key(seckey)
        .with_context(|| format!("Failed to load secret key {}", seckey.display()))?;
    let reader = load_public_key(pubkey)
        .with_context(|| format!("Failed to load public key {}", pubkey.display()))?;
    check_readable(file)?;

    let _session_key = own
        .session_key(&reader, Role::Writer)
        .context("Failed to derive session key")?;
    debug!("Writer session key established");

    println!("Session key derived for reader {}", reader);
    warn!("Payload encryption is not available; no output was written");

    Ok(())
}

/// Derive the reader session key for a file.
fn cmd_decrypt(file: &Path, seckey: &Path, pubkey: Option<&Path>) -> Result<()> {
    info!("Decrypting {}", file.display());

    let own = load_private_key(seckey)
        .with_context(|| format!("Failed to load secret key {}", seckey.display()))?;
    check_readable(file)?;

    let Some(pubkey) = pubkey else {
        warn!("No writer public key given; the file header is not parsed, so no session key can be derived");
        return Ok(());
    };
    let writer = load_public_key(pubkey)
        .with_context(|| format!("Failed to load public key {}", pubkey.display()))?;

    let _session_key = own
        .session_key(&writer, Role::Reader)
        .context("Failed to derive session key")?;
    debug!("Reader session key established");

    println!("Session key derived for writer {}", writer);
    warn!("Payload decryption is not available; no output was written");

    Ok(())
}

/// The input must be a regular file that can be opened.
fn check_readable(file: &Path) -> Result<()> {
    let metadata = std::fs::metadata(file)
        .with_context(|| format!("Failed to open {}", file.display()))?;
    if !metadata.is_file() {
        bail!("{} is not a regular file", file.display());
    }
    std::fs::File::open(file)
        .map(drop)
        .with_context(|| format!("Failed to open {}", file.display()))
}
