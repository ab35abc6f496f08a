use super::users::{user_from_row, USER_COLUMNS};
use crate::database::models::{FollowRecord, UserRecord};
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};

const FOLLOW_COLUMN_COUNT: usize = 4;

fn follow_from_row(row: &Row<'_>) -> rusqlite::Result<FollowRecord> {
    Ok(FollowRecord {
        id: row.get(0)?,
        follower_id: row.get(1)?,
        followee_id: row.get(2)?,
        followed_on: row.get(3)?,
    })
}

pub(super) struct SqliteFollowRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

impl<'conn> SqliteFollowRepository<'conn> {
    fn list_joined(
        &self,
        filter_column: &str,
        join_column: &str,
        user_id: &str,
    ) -> Result<Vec<(FollowRecord, UserRecord)>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT f.id, f.follower_id, f.followee_id, f.followed_on, {USER_COLUMNS}
            FROM follows f
            INNER JOIN users u ON u.id = f.{join_column}
            WHERE f.{filter_column} = ?1
            ORDER BY f.followed_on ASC, f.rowid ASC
            "#
        ))?;
        let rows = stmt.query_map(params![user_id], |row| {
            Ok((follow_from_row(row)?, user_from_row(row, FOLLOW_COLUMN_COUNT)?))
        })?;
        let mut follows = Vec::new();
        for row in rows {
            follows.push(row?);
        }
        Ok(follows)
    }
}

impl<'conn> super::FollowRepository for SqliteFollowRepository<'conn> {
    fn create_if_absent(&self, record: &FollowRecord) -> Result<bool> {
        let inserted = self.conn.execute(
            r#"
            INSERT INTO follows (id, follower_id, followee_id, followed_on)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(follower_id, followee_id) DO NOTHING
            "#,
            params![
                record.id,
                record.follower_id,
                record.followee_id,
                record.followed_on,
            ],
        )?;
        Ok(inserted > 0)
    }

    fn get(&self, follower_id: &str, followee_id: &str) -> Result<Option<FollowRecord>> {
        let row = self
            .conn
            .query_row(
                r#"
                SELECT id, follower_id, followee_id, followed_on
                FROM follows
                WHERE follower_id = ?1 AND followee_id = ?2
                "#,
                params![follower_id, followee_id],
                follow_from_row,
            )
            .optional()?;
        Ok(row)
    }

    fn list_following(&self, follower_id: &str) -> Result<Vec<(FollowRecord, UserRecord)>> {
        self.list_joined("follower_id", "followee_id", follower_id)
    }

    fn list_followers(&self, followee_id: &str) -> Result<Vec<(FollowRecord, UserRecord)>> {
        self.list_joined("followee_id", "follower_id", followee_id)
    }

    fn delete(&self, follower_id: &str, followee_id: &str) -> Result<usize> {
        Ok(self.conn.execute(
            "DELETE FROM follows WHERE follower_id = ?1 AND followee_id = ?2",
            params![follower_id, followee_id],
        )?)
    }
}
