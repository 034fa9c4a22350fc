//! SHP CLI - Command-line interface for content signing and verification.

use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{canonicalize, keygen, sign, verify};

#[derive(Parser)]
#[command(name = "shp")]
#[command(about = "SHP content signing and verification CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a signing key pair
    Keygen {
        /// Algorithm: ed25519 or rsa
        #[arg(long, default_value = "ed25519")]
        algorithm: String,
        /// Key identifier
        #[arg(long)]
        key_id: String,
        /// Directory receiving <key-id>.key and <key-id>.pub
        #[arg(long, default_value = ".")]
        out: String,
    },
    /// Sign content and print the envelope in a wire form
    Sign {
        /// Input file (or stdin if not provided)
        input: Option<String>,
        /// Directory holding <key-id>.key
        #[arg(long)]
        key_dir: String,
        /// Signing key identifier
        #[arg(long)]
        key_id: String,
        /// Algorithm the key was generated with
        #[arg(long, default_value = "ed25519")]
        algorithm: String,
        /// Treat input as a markup document instead of JSON
        #[arg(long)]
        markup: bool,
        /// Bind a header into the signature (name=value, repeatable)
        #[arg(long = "header")]
        headers: Vec<String>,
        /// Omit the timestamp from the envelope
        #[arg(long)]
        no_timestamp: bool,
        /// Wire form: headers, json, or meta
        #[arg(long, default_value = "headers")]
        format: String,
    },
    /// Verify signed content
    Verify {
        /// Input file: a JSON envelope body, or a markup document with
        /// embedded meta tags
        input: String,
        /// Public key file (base64 SPKI) for verification
        #[arg(long)]
        pubkey: Option<String>,
        /// Algorithm the public key belongs to
        #[arg(long, default_value = "ed25519")]
        algorithm: String,
        /// Wire form of the input: json or meta
        #[arg(long, default_value = "json")]
        format: String,
        /// Accept unsigned content (legacy mode) instead of failing
        #[arg(long)]
        legacy: bool,
        /// Maximum signature age in seconds
        #[arg(long)]
        max_age: Option<u64>,
        /// Exit with error code on any non-success outcome
        #[arg(long)]
        strict_exit: bool,
    },
    /// Show canonical bytes for input content
    Canonicalize {
        /// Input file (or stdin if not provided)
        input: Option<String>,
        /// Treat input as a markup document instead of JSON
        #[arg(long)]
        markup: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Keygen {
            algorithm,
            key_id,
            out,
        } => keygen::run(algorithm, key_id, out),
        Commands::Sign {
            input,
            key_dir,
            key_id,
            algorithm,
            markup,
            headers,
            no_timestamp,
            format,
        } => sign::run(
            input,
            key_dir,
            key_id,
            algorithm,
            markup,
            headers,
            no_timestamp,
            format,
        ),
        Commands::Verify {
            input,
            pubkey,
            algorithm,
            format,
            legacy,
            max_age,
            strict_exit,
        } => verify::run(input, pubkey, algorithm, format, legacy, max_age, strict_exit),
        Commands::Canonicalize { input, markup } => canonicalize::run(input, markup),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
