//! COMMENT command - Comment on a note or reply to a comment.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use mynotes_core::{Comment, Id, Target, TargetType};
use serde::Serialize;

use super::{HumanReadable, format_timestamp, make_request, output};

/// Arguments for the comment command.
#[derive(Args)]
pub struct CommentArgs {
    /// What to comment on: note or comment
    pub target: TargetType,

    /// ID of the note or comment
    pub id: Id,

    /// Comment text
    pub content: String,
}

#[derive(Serialize)]
struct CreateCommentRequest {
    target: Target,
    content: String,
}

impl HumanReadable for Comment {
    fn print_human(&self) {
        println!("{}", "Comment posted!".green().bold());
        println!();
        println!("  {} {}", "ID:".cyan(), self.id);
        println!("  {} {}", "On:".cyan(), self.target);
        println!("  {} {}", "Note:".cyan(), self.note);
        println!(
            "  {} {}",
            "Created:".cyan(),
            format_timestamp(&self.created)
        );
    }
}

/// Execute the comment command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: CommentArgs,
) -> Result<()> {
    let url = format!("{}/comments", base_url);
    let request_body = CreateCommentRequest {
        target: Target {
            kind: args.target,
            id: args.id,
        },
        content: args.content,
    };

    let comment: Comment = make_request(client.post(&url).json(&request_body)).await?;

    output(&comment, human)
}
