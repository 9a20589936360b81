//! READ command - Read a note, optionally with its discussion.

use std::collections::HashMap;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use mynotes_core::{Comment, Id, Note, School, TargetType};
use serde::{Deserialize, Serialize};

use super::{HumanReadable, format_likes, format_timestamp, make_request, output};

/// Arguments for the read command.
#[derive(Args)]
pub struct ReadArgs {
    /// Note ID to read
    pub id: Id,

    /// Also fetch every comment on the note
    #[arg(long, short = 'c')]
    pub comments: bool,
}

#[derive(Debug, Deserialize)]
struct CommentsResponse {
    comments: Vec<Comment>,
}

/// A note with its discussion, when requested.
#[derive(Debug, Serialize)]
pub struct ReadNoteOutput {
    #[serde(flatten)]
    pub note: Note,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discussion: Option<Vec<Comment>>,
}

fn school_label(school: School) -> &'static str {
    match school {
        School::None => "-",
        School::ElementaryMiddle => "elementary/middle school",
        School::High => "high school",
        School::University => "university",
    }
}

impl HumanReadable for Note {
    fn print_human(&self) {
        let status = if self.published {
            "published".green()
        } else {
            "draft".yellow()
        };

        println!("{} [{}]", self.name.green().bold(), status);
        println!("{}", "=".repeat(60));
        println!();
        println!("  {} {}", "ID:".cyan(), self.id);
        println!("  {} {}", "Author:".cyan(), self.author);
        if !self.subject.is_empty() {
            println!("  {} {}", "Subject:".cyan(), self.subject);
        }
        if !self.theme.is_empty() {
            println!("  {} {}", "Theme:".cyan(), self.theme);
        }
        println!(
            "  {} {}, year {}, month {}",
            "School:".cyan(),
            school_label(self.school),
            self.year,
            self.month
        );
        println!("  {} {}", "Likes:".cyan(), format_likes(&self.likes));
        println!(
            "  {} {}",
            "Created:".cyan(),
            format_timestamp(&self.created)
        );
        println!();
        println!("{}", "-".repeat(60));
        println!("{}", self.content);
        println!("{}", "-".repeat(60));
    }
}

/// Groups replies under the comment they answer; top level comments are
/// keyed by `None`.
fn thread(comments: &[Comment]) -> HashMap<Option<Id>, Vec<&Comment>> {
    let mut children: HashMap<Option<Id>, Vec<&Comment>> = HashMap::new();
    for comment in comments {
        let parent = match comment.target.kind {
            TargetType::Note => None,
            TargetType::Comment => Some(comment.target.id),
        };
        children.entry(parent).or_default().push(comment);
    }
    for replies in children.values_mut() {
        replies.sort_by_key(|c| c.id);
    }
    children
}

fn print_thread(children: &HashMap<Option<Id>, Vec<&Comment>>, parent: Option<Id>, depth: usize) {
    let Some(replies) = children.get(&parent) else {
        return;
    };
    let indent = "  ".repeat(depth + 1);
    for comment in replies {
        println!(
            "{}{} {} {}",
            indent,
            format!("#{}", comment.id).cyan(),
            format!("by {}", comment.author).dimmed(),
            format!("({})", format_likes(&comment.likes)).yellow()
        );
        for line in comment.content.lines() {
            println!("{}  {}", indent, line);
        }
        print_thread(children, Some(comment.id), depth + 1);
    }
}

impl HumanReadable for ReadNoteOutput {
    fn print_human(&self) {
        self.note.print_human();

        if let Some(discussion) = &self.discussion {
            println!();
            println!(
                "{} ({})",
                "Discussion".yellow().bold(),
                discussion.len()
            );
            print_thread(&thread(discussion), None, 0);
        }
    }
}

/// Execute the read command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: ReadArgs,
) -> Result<()> {
    let url = format!("{}/notes/{}", base_url, args.id);
    let note: Note = make_request(client.get(&url)).await?;

    let discussion = if args.comments {
        let url = format!("{}/notes/{}/comments", base_url, args.id);
        let response: CommentsResponse = make_request(client.get(&url)).await?;
        Some(response.comments)
    } else {
        None
    };

    output(&ReadNoteOutput { note, discussion }, human)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mynotes_core::{Likes, Target};

    fn comment(id: u64, target: Target) -> Comment {
        Comment {
            id: Id::new(id),
            author: Id::new(0),
            note: Id::new(1),
            target,
            content: String::new(),
            likes: Likes::new(),
            created: Utc::now(),
        }
    }

    #[test]
    fn test_thread_groups_replies() {
        let comments = vec![
            comment(4, Target::comment(Id::new(2))),
            comment(2, Target::note(Id::new(1))),
            comment(3, Target::note(Id::new(1))),
            comment(5, Target::comment(Id::new(2))),
        ];
        let children = thread(&comments);

        let roots: Vec<Id> = children[&None].iter().map(|c| c.id).collect();
        assert_eq!(roots, vec![Id::new(2), Id::new(3)]);
        let replies: Vec<Id> = children[&Some(Id::new(2))].iter().map(|c| c.id).collect();
        assert_eq!(replies, vec![Id::new(4), Id::new(5)]);
        assert!(!children.contains_key(&Some(Id::new(3))));
    }
}
