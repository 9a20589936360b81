//! SEARCH command - Search notes.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use mynotes_core::NotePreview;
use serde::{Deserialize, Serialize};

use super::{HumanReadable, make_request, output, print_preview};

/// Arguments for the search command.
///
/// Text filters match by prefix; start a term with `!` for an exact match.
/// `--author '!me'` lists your own notes, drafts included.
#[derive(Args, Default)]
pub struct SearchArgs {
    /// Author account name
    #[arg(long)]
    pub author: Option<String>,

    /// Note title
    #[arg(long)]
    pub name: Option<String>,

    /// Theme
    #[arg(long)]
    pub theme: Option<String>,

    /// Subject
    #[arg(long)]
    pub subject: Option<String>,

    /// School level: elementary-middle, high or university
    #[arg(long)]
    pub school: Option<String>,

    /// School year
    #[arg(long)]
    pub year: Option<i32>,

    /// Month of the school year
    #[arg(long)]
    pub month: Option<i32>,
}

impl SearchArgs {
    /// Query string pairs for the filters that are set.
    fn query(&self) -> Vec<(&'static str, String)> {
        let text = [
            ("author", &self.author),
            ("name", &self.name),
            ("theme", &self.theme),
            ("subject", &self.subject),
            ("school", &self.school),
        ];
        let numbers = [("year", self.year), ("month", self.month)];

        text.into_iter()
            .filter_map(|(key, value)| value.clone().map(|v| (key, v)))
            .chain(
                numbers
                    .into_iter()
                    .filter_map(|(key, value)| value.map(|v| (key, v.to_string()))),
            )
            .collect()
    }
}

/// Response from searching notes.
#[derive(Debug, Deserialize, Serialize)]
pub struct SearchResponse {
    pub results: Vec<NotePreview>,
}

impl HumanReadable for SearchResponse {
    fn print_human(&self) {
        if self.results.is_empty() {
            println!("{}", "No notes found.".yellow());
            return;
        }

        println!(
            "{} ({})",
            "Search Results".green().bold(),
            self.results.len()
        );
        println!();
        for preview in &self.results {
            print_preview(preview);
        }
    }
}

/// Execute the search command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: SearchArgs,
) -> Result<()> {
    let url = format!("{}/search", base_url);

    let response: SearchResponse = make_request(client.get(&url).query(&args.query())).await?;

    output(&response, human)
}
