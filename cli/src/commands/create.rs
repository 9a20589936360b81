//! CREATE command - Write a new note.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use mynotes_core::{Draft, Note, NoteFields, School};
use serde::Serialize;

use super::{make_request, output};

/// Arguments for the create command.
#[derive(Args)]
pub struct CreateArgs {
    /// Note title
    pub name: String,

    /// Theme within the subject
    #[arg(long, default_value = "")]
    pub theme: String,

    /// Subject, e.g. math
    #[arg(long, default_value = "")]
    pub subject: String,

    /// School level: elementary-middle, high or university
    #[arg(long)]
    pub school: Option<String>,

    /// School year
    #[arg(long, default_value_t = 0)]
    pub year: i32,

    /// Month of the school year, 1-12 (0 = unspecified)
    #[arg(long, default_value_t = 0)]
    pub month: i32,

    /// Note content
    #[arg(long, conflicts_with = "file")]
    pub content: Option<String>,

    /// Read note content from a file
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,

    /// Publish the note right away
    #[arg(long)]
    pub publish: bool,
}

#[derive(Serialize)]
struct PublishRequest {
    published: bool,
}

impl CreateArgs {
    fn into_fields(self) -> Result<NoteFields> {
        let content = match (self.content, self.file) {
            (Some(content), _) => content,
            (None, Some(path)) => std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?,
            (None, None) => String::new(),
        };

        Ok(NoteFields {
            name: self.name,
            theme: self.theme,
            subject: self.subject,
            school: self
                .school
                .as_deref()
                .map(School::from_name)
                .unwrap_or_default(),
            year: self.year,
            month: self.month,
            content,
        })
    }
}

/// Execute the create command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: CreateArgs,
) -> Result<()> {
    let publish = args.publish;
    let fields = args.into_fields()?;

    let url = format!("{}/notes", base_url);
    let mut note: Note = make_request(client.post(&url).json(&fields)).await?;

    if publish {
        let url = format!("{}/notes/{}/published", base_url, note.id);
        let draft: Draft =
            make_request(client.put(&url).json(&PublishRequest { published: true })).await?;
        note.published = draft.published;
    }

    output(&note, human)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> CreateArgs {
        CreateArgs {
            name: "algebra".to_string(),
            theme: "equations".to_string(),
            subject: "math".to_string(),
            school: Some("High".to_string()),
            year: 2,
            month: 10,
            content: Some("x + 1 = 2".to_string()),
            file: None,
            publish: false,
        }
    }

    #[test]
    fn test_into_fields() {
        let fields = args().into_fields().unwrap();
        assert_eq!(fields.school, School::High);
        assert_eq!(fields.content, "x + 1 = 2");
        assert_eq!(fields.month, 10);
    }

    #[test]
    fn test_into_fields_without_content() {
        let fields = CreateArgs {
            content: None,
            school: None,
            ..args()
        }
        .into_fields()
        .unwrap();
        assert!(fields.content.is_empty());
        assert_eq!(fields.school, School::None);
    }

    #[test]
    fn test_into_fields_missing_file() {
        let result = CreateArgs {
            content: None,
            file: Some(PathBuf::from("/nonexistent/mynotes/note.txt")),
            ..args()
        }
        .into_fields();
        assert!(result.is_err());
    }
}
