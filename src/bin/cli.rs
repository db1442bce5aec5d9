//! jsonkv CLI Client
//!
//! Command-line interface for working with JSON documents in a store.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use jsonkv::{loader, Client, Config, JsonCommands, KeyCommands, Result, SetOptions, TcpTransport};
use serde_json::Value;
use tracing_subscriber::{fmt, EnvFilter};

/// jsonkv CLI
#[derive(Parser, Debug)]
#[command(name = "jsonkv-cli")]
#[command(about = "CLI for JSON documents in a key-value store")]
#[command(version)]
struct Args {
    /// Store address
    #[arg(short, long, default_value = "127.0.0.1:6379")]
    server: String,

    /// Connect/read/write timeout in milliseconds
    #[arg(short, long, default_value = "5000")]
    timeout_ms: u64,

    /// Return non-ASCII text unescaped
    #[arg(long)]
    no_escape: bool,

    /// JSON configuration file (replaces the connection flags)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get the value at a path
    Get {
        key: String,
        path: Option<String>,
    },

    /// Set a JSON value at a path
    Set {
        key: String,

        /// JSON text to store
        value: String,

        path: Option<String>,

        /// Only set if nothing exists at the path
        #[arg(long, conflicts_with = "xx")]
        nx: bool,

        /// Only set if something already exists at the path
        #[arg(long)]
        xx: bool,

        /// Expire the key after this many seconds
        #[arg(long)]
        ttl: Option<u64>,
    },

    /// Delete the value at a path
    Del {
        key: String,
        path: Option<String>,
    },

    /// Append JSON values to the array at a path
    Arrappend {
        key: String,
        path: String,

        #[arg(required = true)]
        values: Vec<String>,
    },

    /// Show the type of the value at a path
    Type {
        key: String,
        path: Option<String>,
    },

    /// Store every JSON file under a folder, one key per file
    Load {
        folder: PathBuf,

        /// Path to store each file at
        #[arg(long)]
        path: Option<String>,
    },

    /// Ping the store
    Ping,
}

/// Exit status when the requested key or path does not exist
const EXIT_ABSENT: i32 = 2;

/// How a command finished
#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Done,
    Absent,
}

fn parse_json(text: &str) -> Result<Value> {
    Ok(serde_json::from_str(text)?)
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Failed to render result: {}", e),
    }
}

/// Print a read value; a stored `null` prints as `null`, absence prints nothing
fn show_value(value: Option<Value>) -> Outcome {
    match value {
        Some(value) => {
            print_json(&value);
            Outcome::Done
        }
        None => {
            eprintln!("(absent)");
            Outcome::Absent
        }
    }
}

fn run(client: &mut Client<TcpTransport>, command: Commands) -> Result<Outcome> {
    match command {
        Commands::Get { key, path } => {
            let value = client.get(&key, path.as_deref())?;
            return Ok(show_value(value));
        }
        Commands::Set {
            key,
            value,
            path,
            nx,
            xx,
            ttl,
        } => {
            let value = parse_json(&value)?;
            let options = SetOptions { nx, xx, ttl };
            let reply = client.set(&key, path.as_deref(), &value, options)?;
            print_json(&reply.to_json());
        }
        Commands::Del { key, path } => {
            let removed = client.delete(&key, path.as_deref())?;
            println!("{}", removed);
        }
        Commands::Arrappend { key, path, values } => {
            let values = values
                .iter()
                .map(|v| parse_json(v))
                .collect::<Result<Vec<_>>>()?;
            let lengths = client.arrappend(&key, Some(path.as_str()), &values)?;
            print_json(&serde_json::json!(lengths));
        }
        Commands::Type { key, path } => {
            for name in client.type_of(&key, path.as_deref())? {
                println!("{}", name);
            }
        }
        Commands::Load { folder, path } => {
            let outcome = loader::set_path(client, path.as_deref(), &folder, SetOptions::new())?;
            for (file, stored) in outcome {
                println!("{}\t{}", if stored { "stored" } else { "skipped" }, file.display());
            }
        }
        Commands::Ping => {
            println!("{}", client.ping()?);
        }
    }
    Ok(Outcome::Done)
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,jsonkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match Config::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!("Failed to load {}: {}", path.display(), e);
                process::exit(1);
            }
        },
        None => Config::builder()
            .addr(&args.server)
            .connect_timeout_ms(args.timeout_ms)
            .read_timeout_ms(args.timeout_ms)
            .write_timeout_ms(args.timeout_ms)
            .no_escape(args.no_escape)
            .build(),
    };

    let addr = config.addr.clone();
    let mut client = match Client::connect(config) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to connect to {}: {}", addr, e);
            process::exit(1);
        }
    };

    match run(&mut client, args.command) {
        Ok(Outcome::Done) => {}
        Ok(Outcome::Absent) => process::exit(EXIT_ABSENT),
        Err(e) => {
            tracing::error!("Command failed: {}", e);
            process::exit(1);
        }
    }
}
