//! DELETE command - Delete a note or comment.
//!
//! Deleting a note deletes its whole discussion; deleting a comment deletes
//! the replies to it.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use mynotes_core::{Id, Target, TargetType};
use serde::{Deserialize, Serialize};

use super::{HumanReadable, make_request, output};

/// Arguments for the delete command.
#[derive(Args)]
pub struct DeleteArgs {
    /// What to delete: note or comment
    pub target: TargetType,

    /// ID of the note or comment
    pub id: Id,

    /// Skip confirmation prompt (for non-interactive use)
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(Deserialize)]
struct DeleteNoteResponse {
    comments_deleted: Vec<Id>,
}

#[derive(Deserialize)]
struct DeleteCommentResponse {
    deleted: Vec<Id>,
}

/// What a delete removed.
#[derive(Debug, Serialize)]
pub struct DeleteOutput {
    pub target: Target,
    /// Comments removed along with the target, the target itself excluded.
    pub comments_deleted: Vec<Id>,
}

impl HumanReadable for DeleteOutput {
    fn print_human(&self) {
        println!(
            "{} {} {}",
            "Deleted".green().bold(),
            self.target.kind,
            self.target.id
        );
        if !self.comments_deleted.is_empty() {
            println!(
                "  {} {}",
                "Comments removed:".cyan(),
                self.comments_deleted.len()
            );
        }
    }
}

fn confirm(target: Target) -> Result<bool> {
    use std::io::Write;

    eprint!(
        "{} Are you sure you want to delete {} {} and its replies? [y/N] ",
        "Warning:".yellow().bold(),
        target.kind,
        target.id
    );
    std::io::stderr().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;

    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// Execute the delete command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: DeleteArgs,
) -> Result<()> {
    let target = Target {
        kind: args.target,
        id: args.id,
    };

    if human && !args.yes && !confirm(target)? {
        eprintln!("Aborted.");
        return Ok(());
    }

    let comments_deleted = match target.kind {
        TargetType::Note => {
            let url = format!("{}/notes/{}", base_url, target.id);
            let response: DeleteNoteResponse = make_request(client.delete(&url)).await?;
            response.comments_deleted
        }
        TargetType::Comment => {
            let url = format!("{}/comments/{}", base_url, target.id);
            let response: DeleteCommentResponse = make_request(client.delete(&url)).await?;
            response
                .deleted
                .into_iter()
                .filter(|id| *id != target.id)
                .collect()
        }
    };

    output(
        &DeleteOutput {
            target,
            comments_deleted,
        },
        human,
    )
}
