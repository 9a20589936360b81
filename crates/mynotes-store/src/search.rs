//! Note search.
//!
//! Filters are appended to a base query with numbered placeholders; the
//! matching values are collected in the same order and bound afterwards.

use mynotes_core::{MAX_PREVIEW_CHARS, MAX_SEARCH_RESULTS, NotePreview, SearchRequest, TextFilter};

use crate::error::{StoreResult, id_to_db};
use crate::models::NotePreviewRow;
use crate::store::Store;

/// A value bound to one placeholder of a built search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchBind {
    Text(String),
    SmallInt(i16),
    Int(i32),
    BigInt(i64),
}

/// Escapes LIKE wildcards so user input only ever matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn push_text_filter(
    sql: &mut String,
    binds: &mut Vec<SearchBind>,
    param_idx: &mut usize,
    column: &str,
    filter: &TextFilter,
) {
    *param_idx += 1;
    match filter {
        TextFilter::Exact(term) => {
            sql.push_str(&format!("{} = ${}", column, param_idx));
            binds.push(SearchBind::Text(term.clone()));
        }
        TextFilter::Prefix(term) => {
            sql.push_str(&format!("{} LIKE ${} ESCAPE '\\'", column, param_idx));
            binds.push(SearchBind::Text(format!("{}%", escape_like(term))));
        }
    }
}

/// Builds the SQL and bind values for a note search.
///
/// Results are ordered by note ID and capped at [`MAX_SEARCH_RESULTS`];
/// content is cut to [`MAX_PREVIEW_CHARS`] characters by the database.
pub fn build_search_sql(request: &SearchRequest) -> StoreResult<(String, Vec<SearchBind>)> {
    let mut sql = format!(
        "SELECT n.id, n.author, n.name, n.likes, n.created, \
         LEFT(n.content, {}) AS content FROM notes n WHERE 1=1",
        MAX_PREVIEW_CHARS
    );
    let mut binds = Vec::new();
    let mut param_idx = 0;

    if request.published_only {
        sql.push_str(" AND n.published = TRUE");
    }
    if let Some(author_id) = request.author_id {
        param_idx += 1;
        sql.push_str(&format!(" AND n.author = ${}", param_idx));
        binds.push(SearchBind::BigInt(id_to_db(author_id)?));
    }
    if let Some(author) = &request.author {
        sql.push_str(" AND n.author IN (SELECT a.id FROM accounts a WHERE ");
        push_text_filter(&mut sql, &mut binds, &mut param_idx, "a.name", author);
        sql.push(')');
    }
    for (column, filter) in [
        ("n.name", &request.name),
        ("n.theme", &request.theme),
        ("n.subject", &request.subject),
    ] {
        if let Some(filter) = filter {
            sql.push_str(" AND ");
            push_text_filter(&mut sql, &mut binds, &mut param_idx, column, filter);
        }
    }
    if let Some(school) = request.school {
        param_idx += 1;
        sql.push_str(&format!(" AND n.school = ${}", param_idx));
        binds.push(SearchBind::SmallInt(school.code()));
    }
    if let Some(year) = request.year {
        param_idx += 1;
        sql.push_str(&format!(" AND n.year = ${}", param_idx));
        binds.push(SearchBind::Int(year));
    }
    if let Some(month) = request.month {
        param_idx += 1;
        sql.push_str(&format!(" AND n.month = ${}", param_idx));
        binds.push(SearchBind::Int(month));
    }

    sql.push_str(&format!(" ORDER BY n.id LIMIT ${}", param_idx + 1));
    binds.push(SearchBind::BigInt(MAX_SEARCH_RESULTS as i64));

    Ok((sql, binds))
}

impl Store {
    /// Search notes, returning previews.
    pub async fn search_notes(&self, request: &SearchRequest) -> StoreResult<Vec<NotePreview>> {
        let (sql, binds) = build_search_sql(request)?;
        tracing::debug!(sql = %sql, binds = binds.len(), "Running note search");

        let mut q = sqlx::query_as::<_, NotePreviewRow>(&sql);
        for bind in binds {
            q = match bind {
                SearchBind::Text(v) => q.bind(v),
                SearchBind::SmallInt(v) => q.bind(v),
                SearchBind::Int(v) => q.bind(v),
                SearchBind::BigInt(v) => q.bind(v),
            };
        }

        q.fetch_all(self.pool())
            .await?
            .into_iter()
            .map(NotePreview::try_from)
            .collect()
    }
}
