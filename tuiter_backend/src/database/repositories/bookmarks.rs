use super::tuits::{tuit_from_row, TUIT_COLUMNS};
use super::users::{user_from_row, USER_COLUMNS};
use crate::database::models::{BookmarkRecord, TuitRecord, UserRecord};
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};

const BOOKMARK_COLUMN_COUNT: usize = 4;

fn bookmark_from_row(row: &Row<'_>) -> rusqlite::Result<BookmarkRecord> {
    Ok(BookmarkRecord {
        id: row.get(0)?,
        tuit_id: row.get(1)?,
        bookmarked_by: row.get(2)?,
        bookmarked_on: row.get(3)?,
    })
}

pub(super) struct SqliteBookmarkRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

impl<'conn> super::BookmarkRepository for SqliteBookmarkRepository<'conn> {
    fn create_if_absent(&self, record: &BookmarkRecord) -> Result<bool> {
        let inserted = self.conn.execute(
            r#"
            INSERT INTO bookmarks (id, tuit_id, bookmarked_by, bookmarked_on)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(bookmarked_by, tuit_id) DO NOTHING
            "#,
            params![
                record.id,
                record.tuit_id,
                record.bookmarked_by,
                record.bookmarked_on,
            ],
        )?;
        Ok(inserted > 0)
    }

    fn get(&self, user_id: &str, tuit_id: &str) -> Result<Option<BookmarkRecord>> {
        let row = self
            .conn
            .query_row(
                r#"
                SELECT id, tuit_id, bookmarked_by, bookmarked_on
                FROM bookmarks
                WHERE bookmarked_by = ?1 AND tuit_id = ?2
                "#,
                params![user_id, tuit_id],
                bookmark_from_row,
            )
            .optional()?;
        Ok(row)
    }

    fn list_for_user(&self, user_id: &str) -> Result<Vec<(BookmarkRecord, TuitRecord)>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT b.id, b.tuit_id, b.bookmarked_by, b.bookmarked_on, {TUIT_COLUMNS}
            FROM bookmarks b
            INNER JOIN tuits t ON t.id = b.tuit_id
            WHERE b.bookmarked_by = ?1
            ORDER BY b.bookmarked_on DESC, b.rowid DESC
            "#
        ))?;
        let rows = stmt.query_map(params![user_id], |row| {
            Ok((bookmark_from_row(row)?, tuit_from_row(row, BOOKMARK_COLUMN_COUNT)?))
        })?;
        let mut bookmarks = Vec::new();
        for row in rows {
            bookmarks.push(row?);
        }
        Ok(bookmarks)
    }

    fn list_for_tuit(&self, tuit_id: &str) -> Result<Vec<(BookmarkRecord, UserRecord)>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT b.id, b.tuit_id, b.bookmarked_by, b.bookmarked_on, {USER_COLUMNS}
            FROM bookmarks b
            INNER JOIN users u ON u.id = b.bookmarked_by
            WHERE b.tuit_id = ?1
            ORDER BY b.bookmarked_on DESC, b.rowid DESC
            "#
        ))?;
        let rows = stmt.query_map(params![tuit_id], |row| {
            Ok((bookmark_from_row(row)?, user_from_row(row, BOOKMARK_COLUMN_COUNT)?))
        })?;
        let mut bookmarks = Vec::new();
        for row in rows {
            bookmarks.push(row?);
        }
        Ok(bookmarks)
    }

    fn delete(&self, user_id: &str, tuit_id: &str) -> Result<usize> {
        Ok(self.conn.execute(
            "DELETE FROM bookmarks WHERE bookmarked_by = ?1 AND tuit_id = ?2",
            params![user_id, tuit_id],
        )?)
    }
}
