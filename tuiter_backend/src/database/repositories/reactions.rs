use super::tuits::{tuit_from_row, TUIT_COLUMNS};
use super::users::{user_from_row, USER_COLUMNS};
use crate::database::models::{ReactionKind, ReactionRecord, TuitRecord, UserRecord};
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};

const REACTION_COLUMN_COUNT: usize = 5;

fn reaction_from_row(row: &Row<'_>) -> rusqlite::Result<ReactionRecord> {
    Ok(ReactionRecord {
        id: row.get(0)?,
        tuit_id: row.get(1)?,
        user_id: row.get(2)?,
        kind: row.get(3)?,
        reacted_on: row.get(4)?,
    })
}

pub(super) struct SqliteReactionRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

impl<'conn> super::ReactionRepository for SqliteReactionRepository<'conn> {
    fn get(&self, user_id: &str, tuit_id: &str) -> Result<Option<ReactionRecord>> {
        let row = self
            .conn
            .query_row(
                r#"
                SELECT id, tuit_id, user_id, kind, reacted_on
                FROM reactions
                WHERE user_id = ?1 AND tuit_id = ?2
                "#,
                params![user_id, tuit_id],
                reaction_from_row,
            )
            .optional()?;
        Ok(row)
    }

    fn upsert(&self, record: &ReactionRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO reactions (id, tuit_id, user_id, kind, reacted_on)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(user_id, tuit_id) DO UPDATE SET
                id = excluded.id,
                kind = excluded.kind,
                reacted_on = excluded.reacted_on
            "#,
            params![
                record.id,
                record.tuit_id,
                record.user_id,
                record.kind,
                record.reacted_on,
            ],
        )?;
        Ok(())
    }

    fn delete(&self, user_id: &str, tuit_id: &str) -> Result<usize> {
        Ok(self.conn.execute(
            "DELETE FROM reactions WHERE user_id = ?1 AND tuit_id = ?2",
            params![user_id, tuit_id],
        )?)
    }

    fn list_tuits_for_user(
        &self,
        user_id: &str,
        kind: ReactionKind,
    ) -> Result<Vec<(ReactionRecord, TuitRecord)>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT r.id, r.tuit_id, r.user_id, r.kind, r.reacted_on, {TUIT_COLUMNS}
            FROM reactions r
            INNER JOIN tuits t ON t.id = r.tuit_id
            WHERE r.user_id = ?1 AND r.kind = ?2
            ORDER BY r.reacted_on DESC, r.rowid DESC
            "#
        ))?;
        let rows = stmt.query_map(params![user_id, kind], |row| {
            Ok((reaction_from_row(row)?, tuit_from_row(row, REACTION_COLUMN_COUNT)?))
        })?;
        let mut reactions = Vec::new();
        for row in rows {
            reactions.push(row?);
        }
        Ok(reactions)
    }

    fn list_users_for_tuit(
        &self,
        tuit_id: &str,
        kind: ReactionKind,
    ) -> Result<Vec<(ReactionRecord, UserRecord)>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT r.id, r.tuit_id, r.user_id, r.kind, r.reacted_on, {USER_COLUMNS}
            FROM reactions r
            INNER JOIN users u ON u.id = r.user_id
            WHERE r.tuit_id = ?1 AND r.kind = ?2
            ORDER BY r.reacted_on DESC, r.rowid DESC
            "#
        ))?;
        let rows = stmt.query_map(params![tuit_id, kind], |row| {
            Ok((reaction_from_row(row)?, user_from_row(row, REACTION_COLUMN_COUNT)?))
        })?;
        let mut reactions = Vec::new();
        for row in rows {
            reactions.push(row?);
        }
        Ok(reactions)
    }

    fn count_for_tuit(&self, tuit_id: &str, kind: ReactionKind) -> Result<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM reactions WHERE tuit_id = ?1 AND kind = ?2",
            params![tuit_id, kind],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn tuit_ids_for_user(&self, user_id: &str) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT tuit_id FROM reactions WHERE user_id = ?1")?;
        let rows = stmt.query_map(params![user_id], |row| row.get::<_, String>(0))?;
        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }
}
