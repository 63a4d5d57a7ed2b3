//! keyrack CLI
//!
//! Thin front-end over the keyrack-core vault engine: prompts, table-ish
//! output, and exit codes live here; every invariant lives in the engine.

use clap::{Parser, Subcommand};
use std::error::Error;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use zeroize::Zeroize;

use keyrack_core::{vault_exists, Vault};

#[derive(Parser)]
#[command(name = "keyrack")]
#[command(version)]
#[command(about = "keyrack - a single-file encrypted password store")]
#[command(after_help = "EXAMPLES:
  keyrack add example.com alice     Store a password (prompts securely)
  keyrack get example.com alice     Print the stored password
  keyrack list                      List sources and logins (never passwords)
  keyrack search example            Find records by source or login

The vault file defaults to ~/.keyrack/vault.dat; override with --vault.")]
struct Cli {
    /// Path to the vault file
    #[arg(long, global = true)]
    vault: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a password, replacing any record with the same source and login
    Add {
        /// Site or service the credential belongs to
        source: String,
        /// Account name
        login: String,
    },

    /// Print the password for an exact source and login
    Get {
        source: String,
        login: String,
    },

    /// List all records (sources and logins only, never passwords)
    List,

    /// Find records whose source or login contains the keyword
    Search {
        keyword: String,
    },

    /// Move a record to a new source/login and set a new password
    Edit {
        source: String,
        login: String,
        new_source: String,
        new_login: String,
    },

    /// Remove a record
    Remove {
        source: String,
        login: String,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let vault_path = cli.vault.unwrap_or_else(default_vault_file);

    match cli.command {
        None => {
            println!("keyrack - a single-file encrypted password store");
            println!();
            println!("Run 'keyrack --help' for usage information.");
            println!("Run 'keyrack add <source> <login>' to store your first password.");
        }
        Some(cmd) => {
            if let Err(e) = handle_command(&vault_path, cmd) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
}

fn handle_command(vault_path: &Path, cmd: Commands) -> Result<(), Box<dyn Error>> {
    let mut vault = open_vault(vault_path)?;
    debug!(records = vault.list_all().len(), "vault unlocked");

    match cmd {
        Commands::Add { source, login } => {
            let mut password = prompt_password(&format!("Password for {}/{}: ", source, login))?;
            let result = vault.add(&source, &login, &password);
            password.zeroize();
            result?;
            println!("Added.");
        }
        Commands::Get { source, login } => match vault.find(&source, &login) {
            Some(record) => println!("{}", record.password),
            None => println!("No matching record."),
        },
        Commands::List => {
            print_records(vault.list_all().iter());
        }
        Commands::Search { keyword } => {
            print_records(vault.search(&keyword).into_iter());
        }
        Commands::Edit {
            source,
            login,
            new_source,
            new_login,
        } => {
            if vault.find(&source, &login).is_none() {
                println!("No matching record.");
            } else {
                let mut password =
                    prompt_password(&format!("Password for {}/{}: ", new_source, new_login))?;
                let result = vault.edit(&source, &login, &new_source, &new_login, &password);
                password.zeroize();
                result?;
                println!("Updated.");
            }
        }
        Commands::Remove { source, login } => {
            if vault.find(&source, &login).is_none() {
                println!("No matching record.");
            } else {
                vault.delete(&source, &login)?;
                println!("Removed.");
            }
        }
    }

    vault.close()?;
    Ok(())
}

/// Unlock the vault, prompting for the master passphrase. Creating a new
/// vault asks for the passphrase twice.
fn open_vault(path: &Path) -> Result<Vault, Box<dyn Error>> {
    let creating = !vault_exists(path);

    let passphrase = if creating {
        println!("Creating new vault at {}", path.display());
        let mut passphrase = prompt_password("Enter master passphrase: ")?;
        let mut confirm = prompt_password("Confirm master passphrase: ")?;
        let matching = passphrase == confirm;
        confirm.zeroize();
        if !matching {
            passphrase.zeroize();
            return Err("passphrases do not match".into());
        }
        passphrase
    } else {
        prompt_password("Enter master passphrase: ")?
    };

    // The engine wipes the buffer during key derivation.
    let mut buf = passphrase.into_bytes();
    let vault = Vault::unlock(path, &mut buf)?;
    Ok(vault)
}

fn print_records<'a>(records: impl Iterator<Item = &'a keyrack_core::Record>) {
    let mut any = false;
    for record in records {
        println!("Source: {}, Login: {}", record.source, record.login);
        any = true;
    }
    if !any {
        println!("No matching records.");
    }
}

fn default_vault_file() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".keyrack")
        .join("vault.dat")
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error>> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let password = rpassword::read_password()?;
    Ok(password)
}
