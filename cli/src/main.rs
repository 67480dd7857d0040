use std::io;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use fanimal::config::{
    ClientConfig, ConfigError, DEFAULT_BACKEND_URL, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_TOKEN_FILE, Timeouts,
};
use fanimal::forms::{LoginForm, RegisterForm, ShelterForm, SubscribeForm, UserUpdateForm};
use fanimal::net::transport::TransportError;
use fanimal::net::types::Tier;
use fanimal::notify::{Level, Notification};
use fanimal::{ApiError, CancellationToken, Fanimal};
use serde_json::{Value, json};

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Transport(#[from] TransportError),
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Failed(String),
    #[error("interrupted")]
    Interrupted,
}

#[derive(Parser, Debug)]
#[command(name = "fanimal-cli", about = "Fanimal shelter donation client")]
struct Cli {
    #[arg(long, env = "FANIMAL_BACKEND_URL", default_value = DEFAULT_BACKEND_URL)]
    backend_url: String,

    #[arg(long, env = "FANIMAL_TOKEN_FILE", default_value = DEFAULT_TOKEN_FILE)]
    token_file: PathBuf,

    #[arg(long, env = "FANIMAL_REQUEST_TIMEOUT_SECS", default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    request_timeout_secs: u64,

    #[arg(long, env = "FANIMAL_CONNECT_TIMEOUT_SECS", default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS)]
    connect_timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account. Does not sign in.
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        #[arg(long, env = "FANIMAL_PASSWORD")]
        password: String,
    },
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "FANIMAL_PASSWORD")]
        password: String,
    },
    Logout,
    /// Validate the persisted token and show the session.
    Verify,
    /// Print the signed-in user, after verifying the token.
    Whoami,
    Shelters(SheltersCommand),
    Subscriptions(SubscriptionsCommand),
    Users(UsersCommand),
}

#[derive(Args, Debug)]
struct SheltersCommand {
    #[command(subcommand)]
    command: SheltersSubcommand,
}

#[derive(Args, Debug)]
struct ShelterArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    description: String,
    #[arg(long)]
    address: String,
}

impl From<ShelterArgs> for ShelterForm {
    fn from(args: ShelterArgs) -> Self {
        Self { name: args.name, description: args.description, address: args.address }
    }
}

#[derive(Subcommand, Debug)]
enum SheltersSubcommand {
    List,
    Show {
        id: i64,
    },
    Create(ShelterArgs),
    Update {
        id: i64,
        #[command(flatten)]
        shelter: ShelterArgs,
    },
    Delete {
        id: i64,
    },
}

#[derive(Args, Debug)]
struct SubscriptionsCommand {
    #[command(subcommand)]
    command: SubscriptionsSubcommand,
}

#[derive(Subcommand, Debug)]
enum SubscriptionsSubcommand {
    List,
    Subscribe {
        #[command(flatten)]
        shelter: ShelterArgs,
        #[arg(long, default_value = "basic", help = "basic, standard, or premium")]
        tier: Tier,
    },
    Cancel {
        id: i64,
    },
}

#[derive(Args, Debug)]
struct UsersCommand {
    #[command(subcommand)]
    command: UsersSubcommand,
}

#[derive(Subcommand, Debug)]
enum UsersSubcommand {
    Me,
    Update {
        #[arg(long)]
        name: String,
    },
    Show {
        id: i64,
    },
    Delete {
        id: i64,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();
    let config = ClientConfig {
        token_file: cli.token_file,
        timeouts: Timeouts { request_secs: cli.request_timeout_secs, connect_secs: cli.connect_timeout_secs },
        ..ClientConfig::new(&cli.backend_url)?
    };
    let app = Fanimal::from_config(&config)?;
    let cancel = cancel_on_ctrl_c();

    let outcome = run(&app, cli.command, &cancel).await;
    let notes = app.notifications().drain();
    for note in &notes {
        print_note(note);
    }
    if cancel.is_cancelled() {
        return Err(CliError::Interrupted);
    }

    print_json(&outcome?)?;
    check_notes(&notes)
}

/// Any error note fails the command, including a follow-up verify that
/// reported before the operation's own success.
fn check_notes(notes: &[Notification]) -> Result<(), CliError> {
    match notes.iter().find(|note| note.is_error()) {
        Some(note) => Err(CliError::Failed(note.message.clone())),
        None => Ok(()),
    }
}

fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });
    cancel
}

async fn run(app: &Fanimal, command: Command, cancel: &CancellationToken) -> Result<Value, CliError> {
    let session = app.session();
    match command {
        Command::Register { name, email, username, password } => {
            let form = RegisterForm { name, email, username, password };
            session.register(&form, cancel).await?;
            Ok(json!({ "registered": form.username }))
        }
        Command::Login { username, password } => {
            session.login(&LoginForm { username, password }, cancel).await;
            session_json(app)
        }
        Command::Logout => {
            session.logout(cancel).await;
            session_json(app)
        }
        Command::Verify => {
            session.verify(cancel).await;
            session_json(app)
        }
        Command::Whoami => {
            session.verify(cancel).await;
            Ok(serde_json::to_value(session.user())?)
        }
        Command::Shelters(shelters) => run_shelters(app, shelters, cancel).await,
        Command::Subscriptions(subscriptions) => run_subscriptions(app, subscriptions, cancel).await,
        Command::Users(users) => run_users(app, users, cancel).await,
    }
}

async fn run_shelters(app: &Fanimal, shelters: SheltersCommand, cancel: &CancellationToken) -> Result<Value, CliError> {
    let store = app.shelters();
    match shelters.command {
        SheltersSubcommand::List => {
            store.find_all(cancel).await;
            Ok(serde_json::to_value(store.shelters())?)
        }
        SheltersSubcommand::Show { id } => {
            store.find_by_id(id, cancel).await;
            Ok(serde_json::to_value(store.shelter())?)
        }
        SheltersSubcommand::Create(shelter) => {
            // create only patches a list that is already in memory.
            store.find_all(cancel).await;
            store.create(&shelter.into(), cancel).await;
            Ok(serde_json::to_value(store.shelters())?)
        }
        SheltersSubcommand::Update { id, shelter } => {
            store.find_all(cancel).await;
            store.update(id, &shelter.into(), cancel).await;
            Ok(serde_json::to_value(store.shelters())?)
        }
        SheltersSubcommand::Delete { id } => {
            store.find_all(cancel).await;
            store.delete_by_id(id, cancel).await;
            Ok(serde_json::to_value(store.shelters())?)
        }
    }
}

async fn run_subscriptions(
    app: &Fanimal,
    subscriptions: SubscriptionsCommand,
    cancel: &CancellationToken,
) -> Result<Value, CliError> {
    let store = app.subscriptions();
    match subscriptions.command {
        SubscriptionsSubcommand::List => {
            store.find_all_by_user(cancel).await;
            Ok(json!({
                "subscriptions": store.subscriptions(),
                "monthlyTotal": store.monthly_total(),
            }))
        }
        SubscriptionsSubcommand::Subscribe { shelter, tier } => {
            let form = SubscribeForm { shelter_request: shelter.into(), tier };
            store.subscribe(&form, cancel).await;
            Ok(serde_json::to_value(store.subscription())?)
        }
        SubscriptionsSubcommand::Cancel { id } => {
            store.find_all_by_user(cancel).await;
            store.unsubscribe(id, cancel).await;
            Ok(serde_json::to_value(store.subscriptions())?)
        }
    }
}

async fn run_users(app: &Fanimal, users: UsersCommand, cancel: &CancellationToken) -> Result<Value, CliError> {
    let store = app.users();
    match users.command {
        UsersSubcommand::Me => {
            store.get_current_user(cancel).await;
            Ok(serde_json::to_value(store.user())?)
        }
        UsersSubcommand::Update { name } => {
            store.update_current_user(&UserUpdateForm { name }, cancel).await;
            Ok(serde_json::to_value(store.user())?)
        }
        UsersSubcommand::Show { id } => {
            store.find_by_id(id, cancel).await;
            Ok(serde_json::to_value(store.profile())?)
        }
        UsersSubcommand::Delete { id } => {
            store.delete_by_id(id, cancel).await;
            session_json(app)
        }
    }
}

fn session_json(app: &Fanimal) -> Result<Value, CliError> {
    let session = app.session();
    Ok(json!({
        "phase": session.phase(),
        "authenticated": session.token().is_some(),
        "user": serde_json::to_value(session.user())?,
    }))
}

fn print_note(note: &Notification) {
    let tag = match note.level {
        Level::Success => "ok",
        Level::Error => "error",
    };
    eprintln!("[{tag}] {}", note.message);
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
