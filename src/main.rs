use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use kasi_manager::kasi_config::{KasiConfig, KasiToml, LogFormat};
use kasi_manager::models::media::MediaSort;
use kasi_manager::models::product::ProductSort;
use kasi_manager::models::OrderStatus;

mod cmd;

#[derive(Parser)]
#[command(name = "kasi")]
#[command(version, about = "Kasi Manager back office: catalog, media, orders and admin accounts")]
pub struct Cli {
    /// Path to kasi.toml. Defaults to ./.kasi/kasi.toml, then the user config dir.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// API base URL. Overrides kasi.toml and KASI_API_BASE_URL.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Log filter, e.g. "debug" or "kasi_manager=trace". Overrides KASI_LOG.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Answer yes to confirmation prompts
    #[arg(long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in with an administrator account
    Login {
        #[arg(long)]
        email: Option<String>,
        /// Prompted for when omitted
        #[arg(long, env = "KASI_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Change the signed-in account's password
    Password,
    /// Manage the product catalog
    Products {
        #[command(subcommand)]
        command: ProductCommands,
    },
    /// Manage categories
    Categories {
        #[command(subcommand)]
        command: CategoryCommands,
    },
    /// Track orders
    Orders {
        #[command(subcommand)]
        command: OrderCommands,
    },
    /// Manage back-office accounts
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// Manage the media library
    Media {
        #[command(subcommand)]
        command: MediaCommands,
    },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

/// Paging and search shared by list commands.
#[derive(Args, Clone, Debug)]
pub struct ListArgs {
    /// Page to fetch (1-based, clamped to the last page)
    #[arg(long, default_value = "1")]
    pub page: u32,

    /// Case-insensitive search within the fetched page
    #[arg(short, long)]
    pub search: Option<String>,
}

/// Repeated `--set path=value` edits applied to a form draft.
#[derive(Args, Clone, Debug, Default)]
pub struct FieldArgs {
    /// Field assignment, e.g. --set name=Oud --set details.brand=Kasi
    #[arg(long = "set", value_name = "PATH=VALUE")]
    pub set: Vec<String>,
}

#[derive(Subcommand, Clone)]
pub enum ProductCommands {
    List {
        #[command(flatten)]
        list: ListArgs,
        /// Only products in this category (by name)
        #[arg(long)]
        category: Option<String>,
        /// name, price-asc, price-desc or stock
        #[arg(long)]
        sort: Option<ProductSort>,
    },
    Show {
        id: String,
    },
    Create {
        #[command(flatten)]
        fields: FieldArgs,
    },
    Edit {
        id: String,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Set the stock level
    Stock {
        id: String,
        #[arg(allow_hyphen_values = true)]
        stock: i64,
    },
    /// Delete one or more products
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(Subcommand, Clone)]
pub enum CategoryCommands {
    List {
        #[command(flatten)]
        list: ListArgs,
    },
    Show {
        id: String,
    },
    Create {
        #[command(flatten)]
        fields: FieldArgs,
    },
    Edit {
        id: String,
        #[command(flatten)]
        fields: FieldArgs,
    },
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(Subcommand, Clone)]
pub enum OrderCommands {
    List {
        #[command(flatten)]
        list: ListArgs,
        #[arg(long)]
        status: Option<OrderStatus>,
    },
    Show {
        id: String,
    },
    /// Move an order to a new status
    Status {
        id: String,
        status: OrderStatus,
        #[arg(long)]
        note: Option<String>,
    },
}

#[derive(Subcommand, Clone)]
pub enum UserCommands {
    List {
        #[command(flatten)]
        list: ListArgs,
        #[arg(long)]
        role: Option<String>,
        /// Only active (true) or inactive (false) accounts
        #[arg(long)]
        active: Option<bool>,
    },
    Create {
        #[command(flatten)]
        fields: FieldArgs,
    },
    Activate {
        id: String,
    },
    Deactivate {
        id: String,
    },
}

#[derive(Subcommand, Clone)]
pub enum MediaCommands {
    List {
        #[command(flatten)]
        list: ListArgs,
        #[arg(long)]
        category: Option<String>,
        /// newest, oldest, name-asc or name-desc
        #[arg(long)]
        sort: Option<MediaSort>,
    },
    /// Upload one or more files
    Upload {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Stored name (single file only)
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        private: bool,
    },
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Print the display URL for a stored path
    Url {
        url: String,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Write a default kasi.toml
    Init,
}

fn init_logging(config: &KasiConfig) {
    let filter = EnvFilter::try_new(config.log_level()).unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format() {
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // `config init --config <path>` creates the file it names
    let creating = matches!(
        &cli.command,
        Commands::Config {
            command: Some(ConfigCommands::Init)
        }
    ) && cli.config.as_deref().is_some_and(|p| !p.exists());
    let config = if creating {
        KasiConfig::from_toml(KasiToml::default(), None)
    } else {
        KasiConfig::discover(cli.config.as_deref())?
    }
    .with_cli_overrides(cli.api_url.clone(), cli.log_level.clone());
    init_logging(&config);

    if let Commands::Config { command } = &cli.command {
        return cmd::cmd_config(&config, cli.config.as_deref(), command.clone());
    }

    let ctx = cmd::Context::new(config, cli.yes)?;
    match &cli.command {
        Commands::Login { email, password } => {
            cmd::cmd_login(&ctx, email.clone(), password.clone()).await?
        }
        Commands::Logout => cmd::cmd_logout(&ctx),
        Commands::Whoami => cmd::cmd_whoami(&ctx)?,
        Commands::Password => cmd::cmd_password(&ctx).await?,
        Commands::Products { command } => cmd::cmd_products(&ctx, command.clone()).await?,
        Commands::Categories { command } => cmd::cmd_categories(&ctx, command.clone()).await?,
        Commands::Orders { command } => cmd::cmd_orders(&ctx, command.clone()).await?,
        Commands::Users { command } => cmd::cmd_users(&ctx, command.clone()).await?,
        Commands::Media { command } => cmd::cmd_media(&ctx, command.clone()).await?,
        Commands::Config { .. } => {}
    }

    Ok(())
}
