//! Inkwell CLI - Local cart inspection and editing.
//!
//! Operates directly on the durable cart slots written by the storefront or
//! by earlier CLI runs. Every mutation is written through immediately.
//!
//! # Usage
//!
//! ```bash
//! # Show the default cart
//! ink-cli show
//!
//! # Add two notebooks to a named profile's cart
//! ink-cli --profile 0b5c1f6e-7d0c-4a53-9a43-3c1e2f0e9d11 add notebook-a5 -q 2
//!
//! # Log out and empty the cart
//! ink-cli logout --clear
//! ```
//!
//! # Commands
//!
//! - `show` - Print the cart
//! - `add` / `remove` / `update` / `clear` - Edit entries
//! - `login` / `logout` - Attach or detach the owner
//! - `reset` - Forget the owner and every entry

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

mod commands;

use commands::CartCommand;

#[derive(Parser)]
#[command(name = "ink-cli")]
#[command(author, version, about = "Inkwell CLI tools")]
struct Cli {
    /// Directory holding the cart slots
    #[arg(long, env = "INKWELL_CART_DIR", default_value = ".inkwell")]
    data_dir: PathBuf,

    /// Browser profile whose cart to open (defaults to the shared `cart` slot)
    #[arg(long)]
    profile: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the cart
    Show,
    /// Add units of a product
    Add {
        /// Product identifier
        product: String,

        /// Units to add
        #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a product
    Remove {
        /// Product identifier
        product: String,
    },
    /// Set the quantity of a product already in the cart
    Update {
        /// Product identifier
        product: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove every product, keeping the owner
    Clear,
    /// Attach a user to the cart
    Login {
        /// User identifier
        user: String,
    },
    /// Log out, optionally emptying the cart
    Logout {
        /// Empty the cart as well
        #[arg(long)]
        clear: bool,
    },
    /// Forget the owner and every entry
    Reset,
}

impl From<Commands> for CartCommand {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Show => Self::Show,
            Commands::Add { product, quantity } => Self::Add { product, quantity },
            Commands::Remove { product } => Self::Remove { product },
            Commands::Update { product, quantity } => Self::Update { product, quantity },
            Commands::Clear => Self::Clear,
            Commands::Login { user } => Self::Login { user },
            Commands::Logout { clear } => Self::Logout { clear },
            Commands::Reset => Self::Reset,
        }
    }
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "inkwell_cli=info,inkwell_cart=warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match commands::run(&cli.data_dir, cli.profile.as_deref(), cli.command.into()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}
