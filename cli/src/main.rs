//! Command-line interface for myNotes.
//!
//! Commands:
//! - register: Register an account
//! - create: Write a new note
//! - read: Read a note, optionally with its discussion
//! - search: Search notes
//! - like: Toggle a like on a note or comment
//! - comment: Comment on a note or reply to a comment
//! - delete: Delete a note or comment
//!
//! Configuration via environment:
//! - MYNOTES_URL: Base URL of the server (default: http://localhost:3000)
//! - MYNOTES_USER: Account ID sent as X-User-Id

mod commands;

use clap::{Parser, Subcommand};
use mynotes_core::Id;

use commands::{
    comment::CommentArgs, create::CreateArgs, delete::DeleteArgs, like::LikeArgs,
    read::ReadArgs, register::RegisterArgs, search::SearchArgs,
};

/// myNotes CLI
///
/// JSON output by default; --human for formatted output.
#[derive(Parser)]
#[command(name = "mynotes")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Output human-readable formatted text instead of JSON
    #[arg(long, global = true)]
    human: bool,

    /// myNotes server URL
    #[arg(
        long,
        env = "MYNOTES_URL",
        default_value = "http://localhost:3000",
        global = true
    )]
    url: String,

    /// Account ID to act as
    #[arg(long, env = "MYNOTES_USER", global = true)]
    user: Option<Id>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new account
    Register(RegisterArgs),

    /// Create a new note
    Create(CreateArgs),

    /// Read a note
    Read(ReadArgs),

    /// Search notes
    Search(SearchArgs),

    /// Like a note or comment, or take the like back
    Like(LikeArgs),

    /// Comment on a note or reply to a comment
    Comment(CommentArgs),

    /// Delete a note or comment
    Delete(DeleteArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let client = match commands::build_client(cli.user) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let (url, human) = (cli.url.trim_end_matches('/'), cli.human);
    let result = match cli.command {
        Commands::Register(args) => commands::register::execute(&client, url, human, args).await,
        Commands::Create(args) => commands::create::execute(&client, url, human, args).await,
        Commands::Read(args) => commands::read::execute(&client, url, human, args).await,
        Commands::Search(args) => commands::search::execute(&client, url, human, args).await,
        Commands::Like(args) => commands::like::execute(&client, url, human, args).await,
        Commands::Comment(args) => commands::comment::execute(&client, url, human, args).await,
        Commands::Delete(args) => commands::delete::execute(&client, url, human, args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
