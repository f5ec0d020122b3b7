//! Ratehub CLI - command-line client for the store-rating platform.
//!
//! # Usage
//!
//! ```bash
//! # Log in and check who you are
//! ratehub auth login -e alice@example.com -p 'Secret!pw'
//! ratehub auth whoami
//!
//! # Browse stores
//! ratehub stores list --search bakery --sort rating_highest
//! ratehub stores show 3
//! ratehub stores search          # interactive, debounced
//!
//! # Rate a store (creates or updates your rating)
//! ratehub rate set 3 --value 5 --comment "great bread"
//! ratehub rate delete 3
//!
//! # Admin and owner views
//! ratehub admin dashboard
//! ratehub admin users list --search smith
//! ratehub owner ratings --min-rating 4
//! ```
//!
//! # Environment Variables
//!
//! - `RATEHUB_API_URL` - Base URL of the Ratehub API (required)
//! - `RATEHUB_SESSION_FILE` - Where the session token is persisted
//! - `RATEHUB_STALE_TIME_SECS` - Cache freshness window (default 300)

#![cfg_attr(not(test), forbid(unsafe_code))]
// Command output belongs on stdout.
#![allow(clippy::print_stdout)]

use clap::{Parser, Subcommand};
use ratehub_client::RatehubClient;
use ratehub_core::{OwnerRatingFilter, Role, SortOrder, StoreFilter, StoreSearch, UserFilter};

mod commands;

#[derive(Parser)]
#[command(name = "ratehub")]
#[command(author, version, about = "Command-line client for the Ratehub platform")]
struct Cli {
    /// Print raw JSON instead of human-readable output
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in, register, or inspect the current session
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
    /// Update your own profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Browse the public store listing
    Stores {
        #[command(subcommand)]
        action: StoresAction,
    },
    /// Create, update, or delete your rating of a store
    Rate {
        #[command(subcommand)]
        action: RateAction,
    },
    /// Administrator tools (requires an ADMIN account)
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Store-owner views (requires an OWNER account)
    Owner {
        #[command(subcommand)]
        action: OwnerAction,
    },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Log in with email and password
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Create an account and log into it
    Register {
        /// Full name (20-60 characters)
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        /// 8-16 characters with an uppercase letter and a special character
        #[arg(short, long)]
        password: String,
        #[arg(short, long)]
        address: Option<String>,
    },
    /// Drop the session and everything cached under it
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Change your password
    Password {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Update name, email, or address; omitted fields stay unchanged
    Update {
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        email: Option<String>,
        #[arg(short, long)]
        address: Option<String>,
    },
}

#[derive(Subcommand)]
enum StoresAction {
    /// List stores with optional search and sorting
    List {
        #[arg(short, long)]
        search: Option<String>,
        #[arg(short, long)]
        address: Option<String>,
        /// Sort key: `rating_highest`, `rating_lowest`, `name_asc`, `name_desc`
        #[arg(long, default_value = "rating_highest")]
        sort: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Show one store
    Show { id: i64 },
    /// Interactive search: results refresh once typing settles
    Search,
}

#[derive(Subcommand)]
enum RateAction {
    /// Rate a store, or change your existing rating
    Set {
        store_id: i64,
        /// 1 through 5
        #[arg(short, long)]
        value: u8,
        #[arg(short, long)]
        comment: Option<String>,
    },
    /// Delete your rating of a store
    Delete { store_id: i64 },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Platform-wide counters
    Dashboard,
    /// Manage user accounts
    Users {
        #[command(subcommand)]
        action: AdminUsersAction,
    },
    /// Manage stores
    Stores {
        #[command(subcommand)]
        action: AdminStoresAction,
    },
}

#[derive(Subcommand)]
enum AdminUsersAction {
    List {
        /// Filter by name
        #[arg(short, long)]
        name: Option<String>,
        /// Filter by email
        #[arg(short, long)]
        email: Option<String>,
        /// Filter by address
        #[arg(short, long)]
        address: Option<String>,
        #[arg(long, default_value = "name")]
        sort: String,
        #[arg(long, default_value = "asc")]
        order: String,
    },
    Show {
        id: i64,
    },
    Create {
        /// Full name (20-60 characters)
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
        #[arg(short, long)]
        address: Option<String>,
        /// `ADMIN`, `OWNER`, or `USER`
        #[arg(short, long, default_value = "USER")]
        role: String,
    },
    Update {
        id: i64,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        email: Option<String>,
        #[arg(short, long)]
        address: Option<String>,
        #[arg(short, long)]
        role: Option<String>,
    },
    Delete {
        id: i64,
    },
}

#[derive(Subcommand)]
enum AdminStoresAction {
    List {
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        address: Option<String>,
        #[arg(long, default_value = "name")]
        sort: String,
        #[arg(long, default_value = "asc")]
        order: String,
    },
    Create {
        /// Store name (20-60 characters)
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: Option<String>,
        #[arg(short, long)]
        address: String,
        /// Account id of the store's owner
        #[arg(short, long)]
        owner: Option<i64>,
    },
    Update {
        id: i64,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        email: Option<String>,
        #[arg(short, long)]
        address: Option<String>,
        #[arg(short, long)]
        owner: Option<i64>,
    },
    Delete {
        id: i64,
    },
}

#[derive(Subcommand)]
enum OwnerAction {
    /// Your store's aggregates and recent raters
    Dashboard,
    /// Ratings your store has received
    Ratings {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        limit: u32,
        /// Sort key: `date_newest`, `date_oldest`, `rating_highest`, `rating_lowest`
        #[arg(long, default_value = "date_newest")]
        sort: String,
        /// Hide ratings below this value
        #[arg(long, default_value_t = 0)]
        min_rating: u8,
        /// Filter by rater name
        #[arg(short, long)]
        search: Option<String>,
    },
}

fn parse_role(role: &str) -> Result<Role, Box<dyn std::error::Error>> {
    match role.to_ascii_uppercase().as_str() {
        "ADMIN" => Ok(Role::Admin),
        "OWNER" => Ok(Role::Owner),
        "USER" => Ok(Role::User),
        other => Err(format!("invalid role: {other}. Valid roles: ADMIN, OWNER, USER").into()),
    }
}

fn parse_order(order: &str) -> Result<SortOrder, Box<dyn std::error::Error>> {
    match order.to_ascii_lowercase().as_str() {
        "asc" => Ok(SortOrder::Asc),
        "desc" => Ok(SortOrder::Desc),
        other => Err(format!("invalid order: {other}. Valid orders: asc, desc").into()),
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

#[allow(clippy::too_many_lines)]
async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let client = RatehubClient::from_env()?;
    let json = cli.json;

    match cli.command {
        Commands::Auth { action } => match action {
            AuthAction::Login { email, password } => {
                commands::auth::login(&client, &email, &password, json).await?;
            }
            AuthAction::Register {
                name,
                email,
                password,
                address,
            } => {
                commands::auth::register(&client, &name, &email, &password, address, json).await?;
            }
            AuthAction::Logout => commands::auth::logout(&client).await,
            AuthAction::Whoami => commands::auth::whoami(&client, json).await?,
            AuthAction::Password { current, new } => {
                commands::auth::change_password(&client, &current, &new).await?;
            }
        },
        Commands::Profile { action } => match action {
            ProfileAction::Update {
                name,
                email,
                address,
            } => {
                commands::profile::update(&client, name, email, address, json).await?;
            }
        },
        Commands::Stores { action } => match action {
            StoresAction::List {
                search,
                address,
                sort,
                page,
                limit,
            } => {
                let search = StoreSearch {
                    page,
                    limit,
                    sort,
                    search: search.unwrap_or_default(),
                    address: address.unwrap_or_default(),
                    ..StoreSearch::default()
                };
                commands::stores::list(&client, &search, json).await?;
            }
            StoresAction::Show { id } => commands::stores::show(&client, id, json).await?,
            StoresAction::Search => commands::stores::interactive_search(&client, json).await?,
        },
        Commands::Rate { action } => match action {
            RateAction::Set {
                store_id,
                value,
                comment,
            } => {
                commands::rate::set(&client, store_id, value, comment, json).await?;
            }
            RateAction::Delete { store_id } => commands::rate::delete(&client, store_id).await?,
        },
        Commands::Admin { action } => match action {
            AdminAction::Dashboard => commands::admin::dashboard(&client, json).await?,
            AdminAction::Users { action } => match action {
                AdminUsersAction::List {
                    name,
                    email,
                    address,
                    sort,
                    order,
                } => {
                    let filter = UserFilter {
                        name: name.unwrap_or_default(),
                        email: email.unwrap_or_default(),
                        address: address.unwrap_or_default(),
                        sort,
                        order: parse_order(&order)?,
                    };
                    commands::admin::users_list(&client, &filter, json).await?;
                }
                AdminUsersAction::Show { id } => {
                    commands::admin::user_show(&client, id, json).await?;
                }
                AdminUsersAction::Create {
                    name,
                    email,
                    password,
                    address,
                    role,
                } => {
                    commands::admin::user_create(
                        &client,
                        &name,
                        &email,
                        &password,
                        address,
                        parse_role(&role)?,
                        json,
                    )
                    .await?;
                }
                AdminUsersAction::Update {
                    id,
                    name,
                    email,
                    address,
                    role,
                } => {
                    let role = role.map(|r| parse_role(&r)).transpose()?;
                    commands::admin::user_update(&client, id, name, email, address, role, json)
                        .await?;
                }
                AdminUsersAction::Delete { id } => {
                    commands::admin::user_delete(&client, id).await?;
                }
            },
            AdminAction::Stores { action } => match action {
                AdminStoresAction::List {
                    name,
                    address,
                    sort,
                    order,
                } => {
                    let filter = StoreFilter {
                        name: name.unwrap_or_default(),
                        address: address.unwrap_or_default(),
                        sort,
                        order: parse_order(&order)?,
                    };
                    commands::admin::stores_list(&client, &filter, json).await?;
                }
                AdminStoresAction::Create {
                    name,
                    email,
                    address,
                    owner,
                } => {
                    commands::admin::store_create(&client, &name, email, &address, owner, json)
                        .await?;
                }
                AdminStoresAction::Update {
                    id,
                    name,
                    email,
                    address,
                    owner,
                } => {
                    commands::admin::store_update(&client, id, name, email, address, owner, json)
                        .await?;
                }
                AdminStoresAction::Delete { id } => {
                    commands::admin::store_delete(&client, id).await?;
                }
            },
        },
        Commands::Owner { action } => match action {
            OwnerAction::Dashboard => commands::owner::dashboard(&client, json).await?,
            OwnerAction::Ratings {
                page,
                limit,
                sort,
                min_rating,
                search,
            } => {
                let filter = OwnerRatingFilter {
                    page,
                    limit,
                    sort,
                    min_rating,
                    search: search.unwrap_or_default(),
                };
                commands::owner::ratings(&client, &filter, json).await?;
            }
        },
    }
    Ok(())
}
