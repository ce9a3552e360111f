use serde::Serialize;
use sqlx::{Postgres, QueryBuilder};

use super::cursor::{SeekCursor, Seekable};

/// SQL spelling of [`super::MIN_CREATED_AT`]; matches the expression index in the migrations.
pub const MIN_CREATED_AT_SQL: &str = "'0001-01-01 00:00:00+00'::timestamptz";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u32,
    pub cursor: Option<SeekCursor>,
}

impl PageRequest {
    pub fn first(limit: u32) -> Self {
        Self {
            limit,
            cursor: None,
        }
    }

    pub fn after(limit: u32, cursor: SeekCursor) -> Self {
        Self {
            limit,
            cursor: Some(cursor),
        }
    }

    /// Builds a request from the raw `start` query value. A cursor that fails to
    /// decode is dropped and the request starts from the first page.
    pub fn from_query(start: Option<&str>, limit: u32) -> Self {
        Self {
            limit,
            cursor: start.and_then(SeekCursor::decode),
        }
    }

    /// Rows to pull from the store: one more than the page, so the extra row
    /// tells us whether another page exists. `None` for an empty page, which
    /// must not touch the store at all.
    pub fn fetch_limit(&self) -> Option<i64> {
        if self.limit == 0 {
            None
        } else {
            Some(i64::from(self.limit) + 1)
        }
    }

    /// Seek predicate: `created_at < c.created_at OR (created_at = c.created_at AND id < c.id)`.
    pub fn admits(&self, key: &SeekCursor) -> bool {
        match &self.cursor {
            Some(cursor) => key < cursor,
            None => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_more: bool,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            has_more: false,
        }
    }

    /// Turns a `limit + 1` fetch into a page, dropping the probe row if present.
    pub fn from_overfetch(mut rows: Vec<T>, limit: u32) -> Self {
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        let has_more = rows.len() > limit;
        rows.truncate(limit);
        Self {
            items: rows,
            has_more,
        }
    }
}

impl<T: Seekable> Page<T> {
    /// Cursor for the page after this one, if there is one.
    pub fn next_cursor(&self) -> Option<SeekCursor> {
        if !self.has_more {
            return None;
        }
        self.items.last().map(Seekable::seek_key)
    }
}

/// Evaluates a page over rows already matching the base predicate.
pub fn paginate<T, I>(rows: I, request: &PageRequest) -> Page<T>
where
    T: Seekable,
    I: IntoIterator<Item = T>,
{
    let Some(fetch) = request.fetch_limit() else {
        return Page::empty();
    };
    let mut matching: Vec<T> = rows
        .into_iter()
        .filter(|row| request.admits(&row.seek_key()))
        .collect();
    matching.sort_by(|a, b| b.seek_key().cmp(&a.seek_key()));
    matching.truncate(usize::try_from(fetch).unwrap_or(usize::MAX));
    Page::from_overfetch(matching, request.limit)
}

/// Appends the seek predicate, the `(created_at DESC, id DESC)` ordering and the
/// `LIMIT` to a query whose `WHERE` clause is already open.
///
/// `alias` is the table alias carrying `created_at` and `id`.
pub fn push_keyset(
    qb: &mut QueryBuilder<'_, Postgres>,
    alias: &str,
    request: &PageRequest,
    fetch: i64,
) {
    let created_at = format!("COALESCE({alias}.created_at, {MIN_CREATED_AT_SQL})");
    if let Some(cursor) = request.cursor {
        qb.push(" AND (")
            .push(&created_at)
            .push(", ")
            .push(alias)
            .push(".id) < (")
            .push_bind(cursor.last_created_at)
            .push(", ")
            .push_bind(cursor.last_id)
            .push(")");
    }
    qb.push(" ORDER BY ")
        .push(&created_at)
        .push(" DESC, ")
        .push(alias)
        .push(".id DESC LIMIT ")
        .push_bind(fetch);
}
