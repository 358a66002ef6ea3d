use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::debug;

use onlycats::logging::init_logging;
use onlycats::models::{
    CreateInquiryRequest, LoginRequest, PetQuery, PetStatus, RegisterRequest, UserType,
};
use onlycats::{ApiClient, ApiError, ClientConfig, FileStore};

#[derive(Parser)]
#[command(name = "onlycats", version, about = "Browse and manage OnlyCats adoptions from the terminal")]
struct Cli {
    /// TOML file with an [api] table; defaults to ONLYCATS_* variables.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the API base URL.
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Where the session file lives.
    #[arg(long, global = true, env = "ONLYCATS_STATE_DIR", default_value = ".onlycats")]
    state_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "ONLYCATS_PASSWORD")]
        password: String,
    },
    Register {
        #[arg(long)]
        email: String,
        #[arg(long, env = "ONLYCATS_PASSWORD")]
        password: String,
        #[arg(long)]
        name: String,
        /// adopter, shelter or individual
        #[arg(long = "type", default_value = "adopter", value_parser = parse_user_type)]
        user_type: UserType,
    },
    Logout,
    /// Show the logged-in user.
    Whoami {
        /// Fetch the profile from the server instead of the cached copy.
        #[arg(long)]
        refresh: bool,
    },
    #[command(subcommand)]
    Pets(PetsCommand),
    #[command(subcommand)]
    Favorites(FavoritesCommand),
    #[command(subcommand)]
    Inquiries(InquiriesCommand),
    #[command(subcommand)]
    Notifications(NotificationsCommand),
}

#[derive(Subcommand)]
enum PetsCommand {
    List(ListPets),
    Show { id: i64 },
    Delete { id: i64 },
}

#[derive(Args)]
struct ListPets {
    #[arg(long)]
    search: Option<String>,
    #[arg(long, value_parser = parse_pet_status)]
    status: Option<PetStatus>,
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long, default_value_t = 20)]
    limit: u32,
    /// Only my own listings.
    #[arg(long)]
    mine: bool,
}

#[derive(Subcommand)]
enum FavoritesCommand {
    List,
    Add { pet_id: i64 },
    Remove { pet_id: i64 },
}

#[derive(Subcommand)]
enum InquiriesCommand {
    Sent,
    Received,
    Send {
        #[arg(long)]
        pet: i64,
        #[arg(long)]
        message: String,
    },
}

#[derive(Subcommand)]
enum NotificationsCommand {
    List,
    Unread,
    ReadAll,
}

fn parse_user_type(raw: &str) -> Result<UserType, String> {
    serde_json::from_value(serde_json::Value::String(raw.to_ascii_lowercase()))
        .map_err(|_| format!("unknown account type '{}'", raw))
}

fn parse_pet_status(raw: &str) -> Result<PetStatus, String> {
    serde_json::from_value(serde_json::Value::String(raw.to_ascii_lowercase()))
        .map_err(|_| format!("unknown pet status '{}'", raw))
}

fn print_json<T: Serialize>(value: &T) -> onlycats::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn build_client(cli: &Cli) -> onlycats::Result<ApiClient> {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::from_env()?,
    };
    if let Some(url) = &cli.api_url {
        config = ClientConfig::new(url)?
            .with_timeout(config.timeout)
            .with_storage_keys(config.storage_keys);
    }
    let store = FileStore::new(cli.state_dir.join("session.json"));
    debug!(base_url = %config.base_url, state = %store.path().display(), "client configured");
    ApiClient::with_store(config, Arc::new(store))
}

async fn run(cli: Cli) -> onlycats::Result<()> {
    let client = build_client(&cli)?;

    match cli.command {
        Command::Login { email, password } => {
            let data = client.auth().login(&LoginRequest { email, password }).await?;
            print_json(&data.user)
        }
        Command::Register {
            email,
            password,
            name,
            user_type,
        } => {
            let request = RegisterRequest {
                email,
                password,
                name,
                user_type,
                phone: None,
                location: None,
            };
            let data = client.auth().register(&request).await?;
            print_json(&data.user)
        }
        Command::Logout => client.auth().logout().await,
        Command::Whoami { refresh } => {
            let user = if refresh {
                Some(client.auth().profile().await?)
            } else {
                client.auth().current_user().await?
            };
            match user {
                Some(user) => print_json(&user),
                None => Err(ApiError::Validation("not logged in".into())),
            }
        }
        Command::Pets(PetsCommand::List(args)) => {
            let mut query = PetQuery::default().page(args.page, args.limit);
            if let Some(search) = args.search {
                query = query.search(search);
            }
            if let Some(status) = args.status {
                query = query.status(status);
            }
            let list = if args.mine {
                client.pets().mine(query).await?
            } else {
                client.pets().list(&query).await?
            };
            print_json(&list)
        }
        Command::Pets(PetsCommand::Show { id }) => print_json(&client.pets().get(id).await?),
        Command::Pets(PetsCommand::Delete { id }) => client.pets().delete(id).await,
        Command::Favorites(FavoritesCommand::List) => {
            print_json(&client.favorites().list().await?)
        }
        Command::Favorites(FavoritesCommand::Add { pet_id }) => {
            print_json(&client.favorites().add(pet_id).await?)
        }
        Command::Favorites(FavoritesCommand::Remove { pet_id }) => {
            client.favorites().remove(pet_id).await
        }
        Command::Inquiries(InquiriesCommand::Sent) => {
            print_json(&client.inquiries().sent().await?)
        }
        Command::Inquiries(InquiriesCommand::Received) => {
            print_json(&client.inquiries().received().await?)
        }
        Command::Inquiries(InquiriesCommand::Send { pet, message }) => {
            let request = CreateInquiryRequest {
                pet_id: pet,
                message,
            };
            print_json(&client.inquiries().create(&request).await?)
        }
        Command::Notifications(NotificationsCommand::List) => {
            print_json(&client.notifications().list().await?)
        }
        Command::Notifications(NotificationsCommand::Unread) => {
            println!("{}", client.notifications().unread_count().await?);
            Ok(())
        }
        Command::Notifications(NotificationsCommand::ReadAll) => {
            client.notifications().mark_all_read().await
        }
    }
}

#[tokio::main]
async fn main() {
    init_logging("onlycats=warn");
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!("error: {}", err);
        if matches!(err, ApiError::SessionExpired { .. }) {
            eprintln!("run `onlycats login` again");
        }
        std::process::exit(1);
    }
}
