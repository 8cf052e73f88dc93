use account_models::{AccountRequest, Config, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "account-cli")]
#[command(about = "CLI tool for the Account REST API Service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, default_value = "http://localhost:8080")]
    endpoint: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Drop and recreate the accounts table
    DbCreate {
        /// Configuration file (defaults to $ACCOUNT_CONFIG, then configs/default.toml)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Create a new account
    Create(AccountArgs),
    /// List accounts
    List {
        /// Only accounts with exactly this name
        #[arg(long)]
        name: Option<String>,
    },
    /// Get account details
    Get {
        /// Account id
        id: i64,
    },
    /// Replace an account's fields
    Update {
        /// Account id
        id: i64,
        #[command(flatten)]
        account: AccountArgs,
    },
    /// Delete an account
    Delete {
        /// Account id
        id: i64,
    },
    /// Check service health
    Health,
}

#[derive(Args, Debug, Clone)]
struct AccountArgs {
    /// Full name
    name: String,
    /// Email address
    email: String,
    /// Postal address
    address: String,
    #[arg(long)]
    phone_number: Option<String>,
    /// Date joined (YYYY-MM-DD); the server uses today when omitted
    #[arg(long)]
    date_joined: Option<String>,
}

impl From<AccountArgs> for AccountRequest {
    fn from(args: AccountArgs) -> Self {
        Self {
            id: None,
            name: Some(args.name),
            email: Some(args.email),
            address: Some(args.address),
            phone_number: args.phone_number,
            date_joined: args.date_joined,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let client = Client::new();
    let endpoint = cli.endpoint.trim_end_matches('/');

    match cli.command {
        Commands::DbCreate { config } => db_create(config).await?,
        Commands::Create(account) => create_account(&client, endpoint, account.into()).await?,
        Commands::List { name } => list_accounts(&client, endpoint, name).await?,
        Commands::Get { id } => get_account(&client, endpoint, id).await?,
        Commands::Update { id, account } => {
            update_account(&client, endpoint, id, account.into()).await?
        }
        Commands::Delete { id } => delete_account(&client, endpoint, id).await?,
        Commands::Health => health(&client, endpoint).await?,
    }

    Ok(())
}

fn resolve_config_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
    explicit
        .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
        .or_else(|| {
            let default = Path::new(DEFAULT_CONFIG_PATH);
            default.exists().then(|| default.to_path_buf())
        })
}

async fn db_create(config: Option<PathBuf>) -> Result<()> {
    let path = resolve_config_path(config);
    let config = Config::load(path.as_deref()).context("failed to load configuration")?;

    info!("Recreating all database tables");
    let store = account_store::connect(&config.database)
        .await
        .context("failed to open the account store")?;
    store.recreate().await?;
    println!("✅ Database tables recreated");
    Ok(())
}

async fn print_json_or_fail(response: Response, action: &str) -> Result<()> {
    if response.status().is_success() {
        let body: Value = response.json().await?;
        println!("{}", serde_json::to_string_pretty(&body)?);
        Ok(())
    } else {
        let status = response.status();
        let error_text = response.text().await?;
        error!("Failed to {}: {} {}", action, status, error_text);
        bail!("failed to {action}: {status}")
    }
}

async fn create_account(client: &Client, endpoint: &str, request: AccountRequest) -> Result<()> {
    info!("Creating account for {:?}", request.name);

    let response = client
        .post(format!("{endpoint}/accounts"))
        .json(&request)
        .send()
        .await?;

    if let Some(location) = response.headers().get(reqwest::header::LOCATION) {
        info!("Account location: {:?}", location);
    }
    print_json_or_fail(response, "create account").await
}

async fn list_accounts(client: &Client, endpoint: &str, name: Option<String>) -> Result<()> {
    info!("Listing accounts");

    let mut request = client.get(format!("{endpoint}/accounts"));
    if let Some(name) = &name {
        request = request.query(&[("name", name)]);
    }
    print_json_or_fail(request.send().await?, "list accounts").await
}

async fn get_account(client: &Client, endpoint: &str, id: i64) -> Result<()> {
    info!("Getting account: {}", id);

    let response = client
        .get(format!("{endpoint}/accounts/{id}"))
        .send()
        .await?;
    print_json_or_fail(response, "get account").await
}

async fn update_account(
    client: &Client,
    endpoint: &str,
    id: i64,
    request: AccountRequest,
) -> Result<()> {
    info!("Updating account: {}", id);

    let response = client
        .put(format!("{endpoint}/accounts/{id}"))
        .json(&request)
        .send()
        .await?;
    print_json_or_fail(response, "update account").await
}

async fn delete_account(client: &Client, endpoint: &str, id: i64) -> Result<()> {
    info!("Deleting account: {}", id);

    let response = client
        .delete(format!("{endpoint}/accounts/{id}"))
        .send()
        .await?;

    if response.status() == StatusCode::NO_CONTENT {
        println!("✅ Account deleted: {id}");
        Ok(())
    } else {
        let status = response.status();
        let error_text = response.text().await?;
        error!("Failed to delete account: {} {}", status, error_text);
        bail!("failed to delete account {id}: {status}")
    }
}

async fn health(client: &Client, endpoint: &str) -> Result<()> {
    let response = client.get(format!("{endpoint}/health")).send().await?;
    print_json_or_fail(response, "check health").await
}
