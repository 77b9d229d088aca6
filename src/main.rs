//! Storefront CLI

use std::{
    io::{self, Write},
    process::ExitCode,
};

use clap::{Args, Parser, Subcommand};
use storefront::{
    catalog::{ALL_CATEGORIES, Catalog, CatalogError},
    checkout::{CheckoutError, OrderDraft, PaymentMethod, ShippingAddress},
    config::{ConfigError, StorefrontConfig},
    observability::{ObservabilityError, init_subscriber},
    products::ProductId,
    receipt::{ReceiptError, write_cart, write_products},
    session::{Session, SessionStore, User},
    storage::FileStorage,
    store::CartStore,
    summary::{CartSummary, SummaryError},
    theme::ThemeStore,
};
use thiserror::Error;

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Observability(#[from] ObservabilityError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Summary(#[from] SummaryError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Receipt(#[from] ReceiptError),

    #[error("failed to encode order: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),

    #[error("product {0} is not in the catalog")]
    UnknownProduct(ProductId),
}

#[derive(Debug, Parser)]
#[command(name = "storefront", about = "Storefront cart, theme and session state", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: StorefrontConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Inspect and change the cart
    #[command(subcommand)]
    Cart(CartCommand),

    /// Browse the product catalog
    #[command(subcommand)]
    Catalog(CatalogCommand),

    /// Show or switch the colour theme
    #[command(subcommand)]
    Theme(ThemeCommand),

    /// Manage the signed-in session
    #[command(subcommand)]
    Session(SessionCommand),

    /// Build the order payload for the current cart
    Checkout(CheckoutArgs),
}

#[derive(Debug, Subcommand)]
enum CartCommand {
    /// Show the cart and its summary
    List,

    /// Add a catalog product to the cart
    Add {
        /// Product id
        id: String,

        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },

    /// Remove a product from the cart
    Remove {
        /// Product id
        id: String,
    },

    /// Set the quantity of a product already in the cart
    Update {
        /// Product id
        id: String,

        /// New quantity, at least 1
        quantity: u32,
    },

    /// Show the number of units in the cart
    Count,

    /// Show the subtotal, tax and total
    Summary,

    /// Empty the cart
    Clear,
}

#[derive(Debug, Subcommand)]
enum CatalogCommand {
    /// List products, optionally in one category
    List {
        /// Category to show
        #[arg(short, long, default_value = ALL_CATEGORIES)]
        category: String,
    },

    /// Search products by name, category or description
    Search {
        /// Search text
        query: String,
    },

    /// List the categories
    Categories,
}

#[derive(Debug, Subcommand)]
enum ThemeCommand {
    /// Print the active theme
    Show,

    /// Switch between light and dark
    Toggle,
}

#[derive(Debug, Subcommand)]
enum SessionCommand {
    /// Record the result of a backend login
    SignIn(SignInArgs),

    /// Forget the signed-in user
    SignOut,

    /// Print the signed-in user
    Show,
}

#[derive(Debug, Args)]
struct SignInArgs {
    /// Bearer token issued by the backend
    #[arg(long)]
    token: String,

    /// User id
    #[arg(long)]
    id: String,

    /// Display name
    #[arg(long)]
    name: String,

    /// Email address
    #[arg(long)]
    email: String,

    /// Back-office account
    #[arg(long)]
    admin: bool,
}

#[derive(Debug, Args)]
struct CheckoutArgs {
    /// Street address
    #[arg(long)]
    address: String,

    /// City
    #[arg(long)]
    city: String,

    /// Postal code
    #[arg(long)]
    zip_code: String,

    /// Contact phone number
    #[arg(long)]
    phone: String,

    /// Payment method
    #[arg(long, default_value_t = PaymentMethod::VisaCard)]
    payment_method: PaymentMethod,

    /// Empty the cart once the draft has been printed
    #[arg(long)]
    clear_cart: bool,
}

fn main() -> ExitCode {
    _ = dotenvy::dotenv();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "command failed");
            let _written = writeln!(io::stderr(), "error: {error}");

            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    init_subscriber(&cli.config.logging)?;

    let storage = FileStorage::new(cli.config.data_dir.clone());
    let mut out = io::stdout().lock();

    match cli.command {
        Commands::Cart(command) => run_cart(&cli.config, storage, command, &mut out),
        Commands::Catalog(command) => run_catalog(&cli.config, command, &mut out),
        Commands::Theme(command) => {
            let mut theme = ThemeStore::new(storage, cli.config.system_dark);

            if matches!(command, ThemeCommand::Toggle) {
                theme.toggle();
            }

            writeln!(out, "{}", theme.theme())?;

            Ok(())
        }
        Commands::Session(command) => run_session(storage, command, &mut out),
        Commands::Checkout(args) => run_checkout(&cli.config, storage, args, &mut out),
    }
}

fn run_cart(
    config: &StorefrontConfig,
    storage: FileStorage,
    command: CartCommand,
    out: &mut impl Write,
) -> Result<(), AppError> {
    let mut store = CartStore::new(storage);

    match command {
        CartCommand::List => {}
        CartCommand::Add { id, quantity } => {
            let catalog = Catalog::load(&config.catalog)?;
            let id = ProductId::new(id);
            let product = catalog
                .get(&id)
                .cloned()
                .ok_or(AppError::UnknownProduct(id))?;

            store.add_to_cart(product, quantity);
        }
        CartCommand::Remove { id } => store.remove_from_cart(&ProductId::new(id)),
        CartCommand::Update { id, quantity } => {
            if !store.update_quantity(&ProductId::new(id), quantity) {
                writeln!(
                    out,
                    "Quantity unchanged: it must be at least 1 and the product must be in the cart."
                )?;
            }
        }
        CartCommand::Count => {
            writeln!(out, "{}", store.cart_items_count())?;
            return Ok(());
        }
        CartCommand::Summary => {
            let summary =
                CartSummary::new(store.cart(), config.currency()?, &config.tax_rate()?)?;

            writeln!(out, "Items:    {}", summary.items())?;
            writeln!(out, "Subtotal: {}", summary.subtotal())?;
            writeln!(out, "Tax:      {}", summary.tax())?;
            writeln!(out, "Total:    {}", summary.total())?;
            return Ok(());
        }
        CartCommand::Clear => store.clear_cart(),
    }

    let summary = CartSummary::new(store.cart(), config.currency()?, &config.tax_rate()?)?;

    write_cart(out, store.cart(), &summary)?;

    Ok(())
}

fn run_catalog(
    config: &StorefrontConfig,
    command: CatalogCommand,
    out: &mut impl Write,
) -> Result<(), AppError> {
    let catalog = Catalog::load(&config.catalog)?;
    let currency = config.currency()?;

    match command {
        CatalogCommand::List { category } => {
            write_products(out, catalog.in_category(&category), currency)?;
        }
        CatalogCommand::Search { query } => {
            let found = catalog.search(&query);

            write_products(&mut *out, found.iter().copied(), currency)?;
            writeln!(
                out,
                "Found {} product{}",
                found.len(),
                if found.len() == 1 { "" } else { "s" }
            )?;
        }
        CatalogCommand::Categories => {
            for category in catalog.categories() {
                writeln!(out, "{category}")?;
            }
        }
    }

    Ok(())
}

fn run_session(
    storage: FileStorage,
    command: SessionCommand,
    out: &mut impl Write,
) -> Result<(), AppError> {
    let mut session = SessionStore::new(storage);

    match command {
        SessionCommand::SignIn(args) => session.sign_in(Session {
            token: args.token,
            user: User {
                id: args.id,
                name: args.name,
                email: args.email,
                is_admin: args.admin,
            },
        }),
        SessionCommand::SignOut => session.sign_out(),
        SessionCommand::Show => {}
    }

    match session.user() {
        Some(user) => writeln!(
            out,
            "Hi, {} <{}>{}",
            session.first_name().unwrap_or_default(),
            user.email,
            if user.is_admin { " (admin)" } else { "" }
        )?,
        None => writeln!(out, "Signed out")?,
    }

    Ok(())
}

fn run_checkout(
    config: &StorefrontConfig,
    storage: FileStorage,
    args: CheckoutArgs,
    out: &mut impl Write,
) -> Result<(), AppError> {
    let session = SessionStore::new(storage.clone());
    let mut store = CartStore::new(storage);

    let draft = OrderDraft::prepare(
        store.cart(),
        session.user(),
        ShippingAddress {
            address: args.address,
            city: args.city,
            zip_code: args.zip_code,
            phone: args.phone,
        },
        args.payment_method,
        config.currency()?,
        &config.tax_rate()?,
    )?;

    writeln!(out, "{}", serde_json::to_string_pretty(&draft)?)?;

    if args.clear_cart {
        store.clear_cart();
    }

    Ok(())
}
