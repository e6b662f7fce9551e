//! Command-line interface parsing and dispatch.

pub mod account;
pub mod conversations;
pub mod mood;

use std::error::Error;
use std::io::IsTerminal;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::api::ApiClient;
use crate::core::config::Config;
use crate::core::message::ConversationStyle;
use crate::core::session::AuthSession;
use crate::core::store::KeyringSessionStore;
use crate::ui::chat_loop::run_chat;
use crate::ui::mood::show_chart;

#[derive(Parser)]
#[command(name = "maum")]
#[command(about = "마음돌봄이 - 터미널에서 쓰는 마음 돌봄 대화 친구")]
#[command(
    long_about = "Maum is a full-screen terminal client for the 마음돌봄이 emotional \
support service: chat with the companion, keep a mood diary, and review how \
you have been feeling.\n\n\
Accounts are optional. Without logging in you get a small daily number of \
conversations; `maum login` unlocks more and keeps your history.\n\n\
Environment Variables:\n\
  MAUM_API_URL      Override the API base URL (e.g. http://localhost:4000/api)\n\
  RUST_LOG          Log filter for diagnostics, written to stderr\n\n\
Chat Controls:\n\
  Enter             Send the message\n\
  Up/Down/Mouse     Scroll through chat history\n\
  Ctrl+R            Retry connecting after a failure\n\
  Ctrl+C            Quit\n\n\
Chat Commands:\n\
  /new              Start a fresh conversation\n\
  /style [name]     Switch conversation style (default, cheerful, calm, wise)\n\
  /log [filename]   Enable or toggle transcript logging\n\
  /help             Show the in-chat help"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable transcript logging to the specified file
    #[arg(short = 'l', long, global = true)]
    pub log: Option<String>,

    /// Conversation style to start with
    #[arg(short = 's', long, global = true, value_name = "STYLE")]
    pub style: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat {
        /// Continue an existing conversation by id
        #[arg(long, value_name = "ID")]
        resume: Option<u64>,
    },
    /// Log in to your account
    Login,
    /// Create an account
    Register,
    /// Log out and clear the stored session
    Logout,
    /// Show who is currently logged in
    Whoami,
    /// Manage saved conversations
    Conversations {
        #[command(subcommand)]
        command: Option<ConversationsCommand>,
    },
    /// Record and review your mood
    Mood {
        #[command(subcommand)]
        command: MoodCommand,
    },
    /// View or change your profile
    Profile {
        #[command(subcommand)]
        command: Option<ProfileCommand>,
    },
}

#[derive(Subcommand)]
pub enum ConversationsCommand {
    /// List saved conversations (default)
    List,
    /// Delete a conversation
    Delete {
        id: u64,
    },
    /// Rename a conversation
    Retitle {
        id: u64,
        title: String,
    },
}

#[derive(Subcommand)]
pub enum MoodCommand {
    /// Record how you feel today
    Record {
        /// Emotion score from 1 (worst) to 10 (best)
        score: u8,
        /// Date of the entry, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<chrono::NaiveDate>,
        /// Free-form note
        #[arg(long)]
        comment: Option<String>,
        /// Emotion keywords, repeatable
        #[arg(long = "keyword")]
        keywords: Vec<String>,
    },
    /// List recorded entries
    List {
        /// Earliest date to include, YYYY-MM-DD
        #[arg(long)]
        start: Option<chrono::NaiveDate>,
        /// Latest date to include, YYYY-MM-DD
        #[arg(long)]
        end: Option<chrono::NaiveDate>,
    },
    /// Show averages and frequent keywords
    Summary,
    /// Draw a full-screen score chart
    Chart,
}

#[derive(Subcommand)]
pub enum ProfileCommand {
    /// Show the profile (default)
    Show,
    /// Change the display name
    SetName {
        name: String,
    },
    /// Change the password
    ChangePassword,
    /// Permanently delete the account
    DeleteAccount,
}

pub async fn run() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let args = Args::parse();

    let config = Config::load()?;
    let store = Arc::new(KeyringSessionStore::new()?);
    let client = ApiClient::new(config.api_base_url(), store)?;

    let style = args
        .style
        .as_deref()
        .or(config.default_style.as_deref())
        .map(ConversationStyle::parse)
        .unwrap_or_default();
    let log_file = args.log.or(config.log_file);

    match args.command.unwrap_or(Commands::Chat { resume: None }) {
        Commands::Chat { resume } => {
            let mut session = AuthSession::new(client);
            session.load_user().await;
            let user = session.user.clone();
            run_chat(session.client().clone(), user, style, log_file, resume).await
        }
        Commands::Login => account::login(client).await,
        Commands::Register => account::register(client).await,
        Commands::Logout => account::logout(client).await,
        Commands::Whoami => account::whoami(client).await,
        Commands::Conversations { command } => {
            match command.unwrap_or(ConversationsCommand::List) {
                ConversationsCommand::List => conversations::list(&client).await,
                ConversationsCommand::Delete { id } => conversations::delete(&client, id).await,
                ConversationsCommand::Retitle { id, title } => {
                    conversations::retitle(&client, id, &title).await
                }
            }
        }
        Commands::Mood { command } => match command {
            MoodCommand::Record {
                score,
                date,
                comment,
                keywords,
            } => mood::record(&client, score, date, comment.as_deref(), &keywords).await,
            MoodCommand::List { start, end } => mood::list(&client, start, end).await,
            MoodCommand::Summary => mood::summary(&client).await,
            MoodCommand::Chart => show_chart(&client).await,
        },
        Commands::Profile { command } => match command.unwrap_or(ProfileCommand::Show) {
            ProfileCommand::Show => account::profile(&client).await,
            ProfileCommand::SetName { name } => account::set_name(&client, &name).await,
            ProfileCommand::ChangePassword => account::change_password(&client).await,
            ProfileCommand::DeleteAccount => account::delete_account(&client).await,
        },
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();
}
