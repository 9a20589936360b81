//! Core data types for myNotes.
//!
//! Every persisted entity is named by a dense [`Id`] handed out by the
//! identifier allocator of its collection. Notes and comments embed an
//! [`OrderedSet`] of the account IDs that liked them.
//!
//! All types derive `Debug`, `Clone`, `Serialize`, and `Deserialize` for
//! inspection, copying, and JSON serialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use crate::ordered::OrderedSet;

/// Maximum number of results returned by a note search.
pub const MAX_SEARCH_RESULTS: usize = 50;

/// Maximum number of content characters kept in a [`NotePreview`].
pub const MAX_PREVIEW_CHARS: usize = 400;

/// Prefix marking a search term that must match exactly.
pub const EXACT_LABEL: char = '!';

// ============================================================================
// ID Types
// ============================================================================

/// Dense identifier of an entity within one collection.
///
/// Identifiers start at `0` and are recycled after release. [`Id::NONE`]
/// (the maximum `u64`) is never allocated and marks "no entity".
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Id(pub u64);

impl Id {
    /// Sentinel that never names a live entity.
    pub const NONE: Id = Id(u64::MAX);

    /// Creates an Id from a raw value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Whether this is the [`Id::NONE`] sentinel.
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == u64::MAX
    }
}

impl From<u64> for Id {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Id {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// Set of account IDs that liked a note or comment.
pub type Likes = OrderedSet<Id>;

/// Collections that own an identifier counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Accounts,
    Notes,
    Comments,
}

impl Collection {
    /// Counter key used for this collection's identifier allocator.
    #[must_use]
    pub const fn counter_key(self) -> &'static str {
        match self {
            Self::Accounts => "accounts",
            Self::Notes => "notes",
            Self::Comments => "comments",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.counter_key())
    }
}

// ============================================================================
// Like Targets
// ============================================================================

/// Kind of document a like or comment is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetType {
    Note,
    Comment,
}

impl TargetType {
    /// Collection holding documents of this kind.
    #[must_use]
    pub const fn collection(self) -> Collection {
        match self {
            Self::Note => Collection::Notes,
            Self::Comment => Collection::Comments,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Comment => "comment",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetType {
    type Err = TargetTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "note" => Ok(Self::Note),
            "comment" => Ok(Self::Comment),
            other => Err(TargetTypeParseError(other.to_string())),
        }
    }
}

/// Error returned when a target type string is neither `note` nor `comment`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to parse target type: {0:?}")]
pub struct TargetTypeParseError(pub String);

/// A concrete document that can carry likes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    #[serde(rename = "type")]
    pub kind: TargetType,
    pub id: Id,
}

impl Target {
    #[must_use]
    pub const fn note(id: Id) -> Self {
        Self {
            kind: TargetType::Note,
            id,
        }
    }

    #[must_use]
    pub const fn comment(id: Id) -> Self {
        Self {
            kind: TargetType::Comment,
            id,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

// ============================================================================
// Accounts
// ============================================================================

/// Per-account presentation settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Accent colors as `#rrggbb` strings.
    pub colors: Vec<String>,
}

impl AccountConfig {
    /// Parses a space separated list of hex colors, adding the `#` prefix.
    #[must_use]
    pub fn from_color_list(raw: &str) -> Self {
        Self {
            colors: raw
                .split_whitespace()
                .map(|c| format!("#{}", c.trim_start_matches('#')))
                .collect(),
        }
    }
}

/// A registered account. Names and e-mails are unique across accounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: Id,
    pub name: String,
    pub email: String,
    pub created: DateTime<Utc>,
    /// Last rate-limited action (note save), if any.
    pub last_action: Option<DateTime<Utc>>,
    pub config: AccountConfig,
}

impl Account {
    /// Returns a copy with private fields blanked for public responses.
    #[must_use]
    pub fn censored(mut self) -> Self {
        self.email = String::new();
        self
    }
}

// ============================================================================
// Notes
// ============================================================================

/// School level a note was written for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum School {
    #[default]
    None,
    ElementaryMiddle,
    High,
    University,
}

impl School {
    /// Parses a school name case-insensitively. Unknown names map to `None`.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "elementary-middle" => Self::ElementaryMiddle,
            "high" => Self::High,
            "university" => Self::University,
            _ => Self::None,
        }
    }

    /// Storage code of this school level.
    #[must_use]
    pub const fn code(self) -> i16 {
        match self {
            Self::None => 0,
            Self::ElementaryMiddle => 1,
            Self::High => 2,
            Self::University => 3,
        }
    }

    /// Inverse of [`School::code`]; unknown codes map to `None`.
    #[must_use]
    pub const fn from_code(code: i16) -> Self {
        match code {
            1 => Self::ElementaryMiddle,
            2 => Self::High,
            3 => Self::University,
            _ => Self::None,
        }
    }
}

/// Editable fields of a note, as submitted by its author.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteFields {
    pub name: String,
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub school: School,
    #[serde(default)]
    pub year: i32,
    #[serde(default)]
    pub month: i32,
    #[serde(default)]
    pub content: String,
}

/// A note written by an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: Id,
    pub author: Id,
    pub likes: Likes,
    pub school: School,
    pub year: i32,
    pub month: i32,
    pub name: String,
    pub theme: String,
    pub subject: String,
    pub content: String,
    pub published: bool,
    pub created: DateTime<Utc>,
    /// Comments attached directly to this note, oldest first.
    pub comments: Vec<Id>,
}

impl Note {
    /// Metadata view without content or likes.
    #[must_use]
    pub fn draft(&self) -> Draft {
        Draft {
            id: self.id,
            name: self.name.clone(),
            theme: self.theme.clone(),
            subject: self.subject.clone(),
            school: self.school,
            year: self.year,
            month: self.month,
            published: self.published,
        }
    }

    /// Search result view with content cut to [`MAX_PREVIEW_CHARS`].
    #[must_use]
    pub fn preview(&self) -> NotePreview {
        NotePreview {
            id: self.id,
            author: self.author,
            name: self.name.clone(),
            likes: self.likes.clone(),
            created: self.created,
            content: truncate_chars(&self.content, MAX_PREVIEW_CHARS).to_string(),
        }
    }
}

/// Note metadata shown in the editor before the content loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub id: Id,
    pub name: String,
    pub theme: String,
    pub subject: String,
    pub school: School,
    pub year: i32,
    pub month: i32,
    pub published: bool,
}

/// Compact note representation returned by search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotePreview {
    pub id: Id,
    pub author: Id,
    pub name: String,
    pub likes: Likes,
    pub created: DateTime<Utc>,
    pub content: String,
}

/// Returns the longest prefix of `s` holding at most `max` characters.
#[must_use]
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((byte_idx, _)) => &s[..byte_idx],
        None => s,
    }
}

// ============================================================================
// Comments
// ============================================================================

/// A comment on a note or on another comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Id,
    pub author: Id,
    /// Note the discussion belongs to, even when replying to a comment.
    pub note: Id,
    pub target: Target,
    pub content: String,
    pub likes: Likes,
    pub created: DateTime<Utc>,
}

// ============================================================================
// Search
// ============================================================================

/// How a text search term matches a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextFilter {
    /// Field equals the term.
    Exact(String),
    /// Field starts with the term.
    Prefix(String),
}

impl TextFilter {
    /// Parses a raw search term. A leading [`EXACT_LABEL`] requests an exact
    /// match; blank terms produce no filter.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match raw.strip_prefix(EXACT_LABEL) {
            Some(exact) => Some(Self::Exact(exact.to_string())),
            None => Some(Self::Prefix(raw.to_string())),
        }
    }

    /// The term without its matching mode.
    #[must_use]
    pub fn term(&self) -> &str {
        match self {
            Self::Exact(t) | Self::Prefix(t) => t,
        }
    }
}

/// Parsed note search filters. `None` fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Restricts results to one account's notes.
    pub author_id: Option<Id>,
    /// Matches the author's account name.
    pub author: Option<TextFilter>,
    pub name: Option<TextFilter>,
    pub theme: Option<TextFilter>,
    pub subject: Option<TextFilter>,
    pub school: Option<School>,
    pub year: Option<i32>,
    pub month: Option<i32>,
    /// Restrict to published notes.
    pub published_only: bool,
}

// ============================================================================
// Tests
// ============================================================================
