//! zkvault - command-line front end for the zero-knowledge vault envelope
//!
//! Encrypts and decrypts single records in the wire format and reads and
//! writes encrypted export files. Nothing leaves the machine; JSON goes to
//! stdout and logs go to stderr.

mod commands;

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use vault_core::storage::default_data_dir;
use vault_core::{MasterPassword, PasswordOptions, PlaintextRecord, SettingsManager, VaultCodec};

/// zkvault - zero-knowledge password vault envelope
#[derive(Parser, Debug)]
#[command(name = "zkvault")]
#[command(author = "Symbia Labs")]
#[command(version)]
#[command(about = "Encrypt, decrypt, export and import vault records locally")]
struct Args {
    /// Directory holding settings.json (defaults to the user data directory)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a fresh random salt (base64)
    Salt,

    /// Encrypt one record and print it in the wire format (the entry password is prompted for)
    Encrypt {
        #[arg(long)]
        username: String,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Decrypt a wire-format record ("-" reads stdin)
    Decrypt { input: PathBuf },

    /// Encrypt a JSON array of records into an export file
    Export {
        /// JSON array of records ("-" reads stdin)
        #[arg(long)]
        input: PathBuf,
        /// Export file to write (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Decrypt an export file and print its records
    Import {
        input: PathBuf,
        /// File to write the records to (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Generate random passwords
    Generate {
        #[arg(long)]
        length: Option<usize>,
        #[arg(long, default_value = "1")]
        count: usize,
        #[arg(long)]
        no_uppercase: bool,
        #[arg(long)]
        no_lowercase: bool,
        #[arg(long)]
        no_numbers: bool,
        #[arg(long)]
        no_symbols: bool,
        #[arg(long)]
        exclude_look_alikes: bool,
    },

    /// Score a password (prompted for)
    Strength,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let codec = VaultCodec::new();

    match args.command {
        Command::Salt => println!("{}", commands::salt()),

        Command::Encrypt {
            ref username,
            ref url,
            ref notes,
        } => {
            let secret = rpassword::prompt_password("Entry password: ")?;
            let mut record = PlaintextRecord::new(username.as_str(), secret);
            record.url = url.clone();
            record.notes = notes.clone();

            let master = master_password()?;
            println!("{}", commands::encrypt(&codec, &record, master.expose())?);
        }

        Command::Decrypt { ref input } => {
            let contents = read_input(input)?;
            let master = master_password()?;
            println!("{}", commands::decrypt(&codec, &contents, master.expose())?);
        }

        Command::Export {
            ref input,
            ref output,
        } => {
            let contents = read_input(input)?;
            let master = master_password()?;
            let file = commands::export(&codec, &contents, master.expose())?;
            write_output(output.as_deref(), &file)?;
        }

        Command::Import {
            ref input,
            ref output,
        } => {
            let contents = read_input(input)?;
            let master = master_password()?;
            let records = commands::import(&codec, &contents, master.expose())?;
            write_output(output.as_deref(), &records)?;
        }

        Command::Generate {
            length,
            count,
            no_uppercase,
            no_lowercase,
            no_numbers,
            no_symbols,
            exclude_look_alikes,
        } => {
            let defaults = generator_defaults(args.data_dir.as_deref())?;
            let options = PasswordOptions {
                length: length.unwrap_or(defaults.length),
                include_uppercase: defaults.include_uppercase && !no_uppercase,
                include_lowercase: defaults.include_lowercase && !no_lowercase,
                include_numbers: defaults.include_numbers && !no_numbers,
                include_symbols: defaults.include_symbols && !no_symbols,
                exclude_look_alikes: defaults.exclude_look_alikes || exclude_look_alikes,
            };
            println!("{}", commands::generate(&options, count)?);
        }

        Command::Strength => {
            let password = rpassword::prompt_password("Password to score: ")?;
            println!("{}", commands::strength(&password)?);
        }
    }

    Ok(())
}

/// Environment variable read before falling back to a prompt
const MASTER_PASSWORD_ENV: &str = "ZKVAULT_MASTER_PASSWORD";

/// Master password from the environment or the terminal, never from argv
fn master_password() -> Result<MasterPassword> {
    let password = match std::env::var(MASTER_PASSWORD_ENV) {
        Ok(password) => password,
        Err(_) => rpassword::prompt_password("Master password: ")?,
    };
    Ok(MasterPassword::new(password))
}

fn generator_defaults(data_dir: Option<&Path>) -> Result<PasswordOptions> {
    let dir = match data_dir {
        Some(dir) => dir.to_path_buf(),
        None => default_data_dir()?,
    };

    let settings = SettingsManager::new(&dir)
        .with_context(|| format!("Failed to load settings from {}", dir.display()))?;
    debug!("Generator defaults from {:?}", dir);
    Ok(settings.get().generator)
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut contents = String::new();
        std::io::stdin().read_to_string(&mut contents)?;
        return Ok(contents);
    }

    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn write_output(path: Option<&Path>, contents: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, contents)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => println!("{}", contents),
    }
    Ok(())
}
