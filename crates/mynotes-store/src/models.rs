//! Database models for the storage layer.
//!
//! These types map directly to database rows and are used for sqlx
//! queries. They convert into the domain types of mynotes-core, checking
//! that stored BIGINTs are valid identifiers on the way.

use chrono::{DateTime, Utc};
use mynotes_core::{
    Account, AccountConfig, Comment, CounterRecord, Id, Likes, Note, NotePreview, School, Target,
    TargetType,
};
use sqlx::FromRow;

use crate::error::{StoreError, StoreResult, from_db, id_from_db};

fn ids_from_db(values: Vec<i64>) -> StoreResult<Vec<Id>> {
    values.into_iter().map(id_from_db).collect()
}

fn likes_from_db(values: Vec<i64>) -> StoreResult<Likes> {
    Ok(Likes::from_unsorted(ids_from_db(values)?))
}

/// Database row for the `id_counters` table.
#[derive(Debug, Clone, FromRow)]
pub struct CounterRow {
    pub key: String,
    pub next_value: i64,
    pub free: Vec<i64>,
    pub version: i64,
}

impl TryFrom<CounterRow> for CounterRecord {
    type Error = StoreError;

    fn try_from(row: CounterRow) -> StoreResult<Self> {
        Ok(CounterRecord {
            key: row.key,
            next_value: from_db(row.next_value)?,
            free: ids_from_db(row.free)?,
            version: from_db(row.version)?,
        })
    }
}

/// Database row for the `accounts` table.
#[derive(Debug, Clone, FromRow)]
pub struct AccountRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub colors: Vec<String>,
    pub created: DateTime<Utc>,
    pub last_action: Option<DateTime<Utc>>,
}

impl TryFrom<AccountRow> for Account {
    type Error = StoreError;

    fn try_from(row: AccountRow) -> StoreResult<Self> {
        Ok(Account {
            id: id_from_db(row.id)?,
            name: row.name,
            email: row.email,
            created: row.created,
            last_action: row.last_action,
            config: AccountConfig { colors: row.colors },
        })
    }
}

/// Input for inserting a new account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub id: Id,
    pub name: String,
    pub email: String,
}

/// Database row for the `notes` table, with the IDs of comments attached
/// directly to the note.
#[derive(Debug, Clone, FromRow)]
pub struct NoteRow {
    pub id: i64,
    pub author: i64,
    pub likes: Vec<i64>,
    pub school: i16,
    pub year: i32,
    pub month: i32,
    pub name: String,
    pub theme: String,
    pub subject: String,
    pub content: String,
    pub published: bool,
    pub created: DateTime<Utc>,
    pub comments: Vec<i64>,
}

impl TryFrom<NoteRow> for Note {
    type Error = StoreError;

    fn try_from(row: NoteRow) -> StoreResult<Self> {
        Ok(Note {
            id: id_from_db(row.id)?,
            author: id_from_db(row.author)?,
            likes: likes_from_db(row.likes)?,
            school: School::from_code(row.school),
            year: row.year,
            month: row.month,
            name: row.name,
            theme: row.theme,
            subject: row.subject,
            content: row.content,
            published: row.published,
            created: row.created,
            comments: ids_from_db(row.comments)?,
        })
    }
}

/// Search result row; `content` is already truncated by the query.
#[derive(Debug, Clone, FromRow)]
pub struct NotePreviewRow {
    pub id: i64,
    pub author: i64,
    pub name: String,
    pub likes: Vec<i64>,
    pub created: DateTime<Utc>,
    pub content: String,
}

impl TryFrom<NotePreviewRow> for NotePreview {
    type Error = StoreError;

    fn try_from(row: NotePreviewRow) -> StoreResult<Self> {
        Ok(NotePreview {
            id: id_from_db(row.id)?,
            author: id_from_db(row.author)?,
            name: row.name,
            likes: likes_from_db(row.likes)?,
            created: row.created,
            content: row.content,
        })
    }
}

/// Database row for the `comments` table.
#[derive(Debug, Clone, FromRow)]
pub struct CommentRow {
    pub id: i64,
    pub author: i64,
    pub note: i64,
    pub target_type: String,
    pub target_id: i64,
    pub content: String,
    pub likes: Vec<i64>,
    pub created: DateTime<Utc>,
}

impl TryFrom<CommentRow> for Comment {
    type Error = StoreError;

    fn try_from(row: CommentRow) -> StoreResult<Self> {
        let kind: TargetType = row
            .target_type
            .parse()
            .map_err(|e| StoreError::InvalidData(format!("comment {}: {e}", row.id)))?;

        Ok(Comment {
            id: id_from_db(row.id)?,
            author: id_from_db(row.author)?,
            note: id_from_db(row.note)?,
            target: Target {
                kind,
                id: id_from_db(row.target_id)?,
            },
            content: row.content,
            likes: likes_from_db(row.likes)?,
            created: row.created,
        })
    }
}

/// Input for inserting a new comment.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub id: Id,
    pub author: Id,
    /// Discussion the comment belongs to.
    pub note: Id,
    pub target: Target,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment_row(target_type: &str) -> CommentRow {
        CommentRow {
            id: 4,
            author: 1,
            note: 2,
            target_type: target_type.to_string(),
            target_id: 3,
            content: "nice".to_string(),
            likes: vec![9, 2, 5],
            created: Utc::now(),
        }
    }

    #[test]
    fn test_comment_row_conversion() {
        let comment = Comment::try_from(comment_row("comment")).unwrap();
        assert_eq!(comment.target, Target::comment(Id::new(3)));
        assert_eq!(comment.note, Id::new(2));
        assert_eq!(
            comment.likes.as_slice(),
            &[Id::new(2), Id::new(5), Id::new(9)]
        );
    }

    #[test]
    fn test_comment_row_rejects_unknown_target() {
        assert!(matches!(
            Comment::try_from(comment_row("account")),
            Err(StoreError::InvalidData(_))
        ));
    }

    #[test]
    fn test_counter_row_conversion() {
        let record = CounterRecord::try_from(CounterRow {
            key: "notes".to_string(),
            next_value: 5,
            free: vec![1, 3],
            version: 7,
        })
        .unwrap();
        assert_eq!(record.next_value, 5);
        assert_eq!(record.free, vec![Id::new(1), Id::new(3)]);

        let corrupt = CounterRow {
            key: "notes".to_string(),
            next_value: -1,
            free: Vec::new(),
            version: 0,
        };
        assert!(CounterRecord::try_from(corrupt).is_err());
    }

    #[test]
    fn test_note_row_school_code() {
        let note = Note::try_from(NoteRow {
            id: 1,
            author: 0,
            likes: Vec::new(),
            school: 2,
            year: 3,
            month: 9,
            name: "algebra".to_string(),
            theme: String::new(),
            subject: "math".to_string(),
            content: String::new(),
            published: false,
            created: Utc::now(),
            comments: vec![4, 6],
        })
        .unwrap();
        assert_eq!(note.school, School::High);
        assert_eq!(note.comments, vec![Id::new(4), Id::new(6)]);
    }
}
