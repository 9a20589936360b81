//! REGISTER command - Register a new account.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use mynotes_core::Account;
use serde::Serialize;

use super::{HumanReadable, format_timestamp, make_request, output};

/// Arguments for the register command.
#[derive(Args)]
pub struct RegisterArgs {
    /// Account name, unique across accounts
    pub name: String,

    /// E-mail address, unique across accounts
    pub email: String,
}

/// Request body for registering an account.
#[derive(Serialize)]
struct RegisterRequest {
    name: String,
    email: String,
}

impl HumanReadable for Account {
    fn print_human(&self) {
        println!("{}", "Account".green().bold());
        println!();
        println!("  {} {}", "ID:".cyan(), self.id);
        println!("  {} {}", "Name:".cyan(), self.name);
        if !self.email.is_empty() {
            println!("  {} {}", "E-mail:".cyan(), self.email);
        }
        if !self.config.colors.is_empty() {
            println!("  {} {}", "Colors:".cyan(), self.config.colors.join(" "));
        }
        println!(
            "  {} {}",
            "Created:".cyan(),
            format_timestamp(&self.created)
        );
        println!();
        println!(
            "Use it with {}",
            format!("MYNOTES_USER={}", self.id).yellow()
        );
    }
}

/// Execute the register command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: RegisterArgs,
) -> Result<()> {
    let url = format!("{}/accounts", base_url);
    let request_body = RegisterRequest {
        name: args.name,
        email: args.email,
    };

    let account: Account = make_request(client.post(&url).json(&request_body)).await?;

    output(&account, human)
}
