//! BabyLuxe CLI - browse the catalog and check out from the terminal.
//!
//! # Usage
//!
//! ```bash
//! bl-cli products list [--category <name>]
//! bl-cli products show <slug>
//! bl-cli cart add|remove <id>
//! bl-cli cart set <id> <qty>
//! bl-cli cart show|clear
//! bl-cli checkout --email .. --phone .. --first-name .. --last-name .. \
//!     --address .. --city .. --zip .. [--notes ..]
//! ```
//!
//! Configuration is read from the same environment variables as the
//! storefront (`.env` is loaded if present).

#![cfg_attr(not(test), forbid(unsafe_code))]

mod commands;
mod store;

use std::path::PathBuf;
use std::process::ExitCode;

use babyluxe_core::CheckoutForm;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::CommandError;

#[derive(Parser)]
#[command(name = "bl-cli")]
#[command(about = "BabyLuxe storefront CLI")]
#[command(version)]
struct Cli {
    /// File holding the persisted cart
    #[arg(long, global = true, default_value = ".babyluxe/cart.json")]
    cart_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Compose the WhatsApp order for the cart
    Checkout(CheckoutArgs),
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List active products
    List {
        /// Only show this category
        #[arg(long)]
        category: Option<String>,
    },
    /// Show one product
    Show {
        /// Product slug
        slug: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Add one unit of a product
    Add { product_id: String },
    /// Remove a product
    Remove { product_id: String },
    /// Set a product's quantity
    Set { product_id: String, quantity: u32 },
    /// Empty the cart
    Clear,
    /// Show the cart
    Show,
}

#[derive(Args)]
struct CheckoutArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    address: String,
    #[arg(long)]
    city: String,
    #[arg(long)]
    zip: String,
    #[arg(long, default_value = "")]
    notes: String,
}

impl From<CheckoutArgs> for CheckoutForm {
    fn from(args: CheckoutArgs) -> Self {
        Self {
            email: args.email,
            phone: args.phone,
            first_name: args.first_name,
            last_name: args.last_name,
            address: args.address,
            city: args.city,
            zip: args.zip,
            notes: args.notes,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            #[allow(clippy::print_stderr)]
            {
                eprintln!("Error: {e}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CommandError> {
    match cli.command {
        Commands::Products { action } => {
            let state = commands::load_state()?;
            match action {
                ProductsAction::List { category } => {
                    commands::products::list(&state, category.as_deref()).await;
                }
                ProductsAction::Show { slug } => {
                    commands::products::show(&state, &slug).await?;
                }
            }
        }
        Commands::Cart { action } => {
            let mut cart = commands::open_cart(&cli.cart_file)?;
            match action {
                CartAction::Add { product_id } => commands::cart::add(&mut cart, &product_id)?,
                CartAction::Remove { product_id } => {
                    commands::cart::remove(&mut cart, &product_id)?;
                }
                CartAction::Set {
                    product_id,
                    quantity,
                } => commands::cart::set(&mut cart, &product_id, quantity)?,
                CartAction::Clear => commands::cart::clear(&mut cart)?,
                CartAction::Show => {
                    let state = commands::load_state()?;
                    commands::cart::show(&state, &cart).await;
                }
            }
        }
        Commands::Checkout(args) => {
            let state = commands::load_state()?;
            let mut cart = commands::open_cart(&cli.cart_file)?;
            commands::checkout::run(&state, &mut cart, &args.into()).await?;
        }
    }

    Ok(())
}
