//! LIKE command - Like a note or comment, or take the like back.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use mynotes_core::{Id, LikeState, Target, TargetType};
use serde::{Deserialize, Serialize};

use super::{HumanReadable, make_request, output};

/// Arguments for the like command.
#[derive(Args)]
pub struct LikeArgs {
    /// What to like: note or comment
    pub target: TargetType,

    /// ID of the note or comment
    pub id: Id,

    /// Only show the current like status
    #[arg(long)]
    pub status: bool,
}

/// Like state returned by the server.
#[derive(Debug, Deserialize, Serialize)]
pub struct LikeResponse {
    pub target: Target,
    #[serde(flatten)]
    pub state: LikeState,
}

impl HumanReadable for LikeResponse {
    fn print_human(&self) {
        let verdict = if self.state.liked {
            "You like".green().bold()
        } else {
            "You don't like".yellow().bold()
        };
        println!(
            "{} {} {} ({} total)",
            verdict, self.target.kind, self.target.id, self.state.count
        );
    }
}

/// Execute the like command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: LikeArgs,
) -> Result<()> {
    let url = format!("{}/likes/{}/{}", base_url, args.target, args.id);

    let request = if args.status {
        client.get(&url)
    } else {
        client.post(&url)
    };
    let response: LikeResponse = make_request(request).await?;

    output(&response, human)
}
