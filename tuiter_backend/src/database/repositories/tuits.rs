use super::users::{user_from_row, USER_COLUMNS};
use crate::database::models::{TuitPatch, TuitRecord, TuitStats, UserRecord};
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};

pub(super) const TUIT_COLUMNS: &str = "t.id, t.tuit, t.posted_by, t.posted_on, t.image, \
     t.youtube, t.avatar_logo, t.image_overlay, t.replies, t.retuits, t.likes, t.dislikes";

pub(super) const TUIT_COLUMN_COUNT: usize = 12;

pub(super) fn tuit_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<TuitRecord> {
    Ok(TuitRecord {
        id: row.get(offset)?,
        tuit: row.get(offset + 1)?,
        posted_by: row.get(offset + 2)?,
        posted_on: row.get(offset + 3)?,
        image: row.get(offset + 4)?,
        youtube: row.get(offset + 5)?,
        avatar_logo: row.get(offset + 6)?,
        image_overlay: row.get(offset + 7)?,
        stats: TuitStats {
            replies: row.get(offset + 8)?,
            retuits: row.get(offset + 9)?,
            likes: row.get(offset + 10)?,
            dislikes: row.get(offset + 11)?,
        },
    })
}

pub(super) struct SqliteTuitRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

impl<'conn> super::TuitRepository for SqliteTuitRepository<'conn> {
    fn create(&self, record: &TuitRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO tuits (id, tuit, posted_by, posted_on, image, youtube, avatar_logo,
                image_overlay, replies, retuits, likes, dislikes)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                record.id,
                record.tuit,
                record.posted_by,
                record.posted_on,
                record.image,
                record.youtube,
                record.avatar_logo,
                record.image_overlay,
                record.stats.replies,
                record.stats.retuits,
                record.stats.likes,
                record.stats.dislikes,
            ],
        )?;
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<TuitRecord>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {TUIT_COLUMNS} FROM tuits t WHERE t.id = ?1"),
                params![id],
                |row| tuit_from_row(row, 0),
            )
            .optional()?;
        Ok(row)
    }

    fn list(&self) -> Result<Vec<TuitRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TUIT_COLUMNS} FROM tuits t ORDER BY t.posted_on DESC, t.rowid DESC"
        ))?;
        let rows = stmt.query_map([], |row| tuit_from_row(row, 0))?;
        let mut tuits = Vec::new();
        for row in rows {
            tuits.push(row?);
        }
        Ok(tuits)
    }

    fn list_by_author(&self, user_id: &str) -> Result<Vec<(TuitRecord, UserRecord)>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {TUIT_COLUMNS}, {USER_COLUMNS}
            FROM tuits t
            INNER JOIN users u ON u.id = t.posted_by
            WHERE t.posted_by = ?1
            ORDER BY t.posted_on DESC, t.rowid DESC
            "#
        ))?;
        let rows = stmt.query_map(params![user_id], |row| {
            Ok((
                tuit_from_row(row, 0)?,
                user_from_row(row, TUIT_COLUMN_COUNT)?,
            ))
        })?;
        let mut tuits = Vec::new();
        for row in rows {
            tuits.push(row?);
        }
        Ok(tuits)
    }

    fn update(&self, id: &str, patch: &TuitPatch) -> Result<usize> {
        let stats = patch.stats;
        let changed = self.conn.execute(
            r#"
            UPDATE tuits SET
                tuit = COALESCE(?2, tuit),
                image = COALESCE(?3, image),
                youtube = COALESCE(?4, youtube),
                avatar_logo = COALESCE(?5, avatar_logo),
                image_overlay = COALESCE(?6, image_overlay),
                replies = COALESCE(?7, replies),
                retuits = COALESCE(?8, retuits),
                likes = COALESCE(?9, likes),
                dislikes = COALESCE(?10, dislikes)
            WHERE id = ?1
            "#,
            params![
                id,
                patch.tuit,
                patch.image,
                patch.youtube,
                patch.avatar_logo,
                patch.image_overlay,
                stats.map(|s| s.replies),
                stats.map(|s| s.retuits),
                stats.map(|s| s.likes),
                stats.map(|s| s.dislikes),
            ],
        )?;
        Ok(changed)
    }

    fn update_stats(&self, id: &str, stats: &TuitStats) -> Result<usize> {
        let changed = self.conn.execute(
            r#"
            UPDATE tuits
            SET replies = ?2, retuits = ?3, likes = ?4, dislikes = ?5
            WHERE id = ?1
            "#,
            params![id, stats.replies, stats.retuits, stats.likes, stats.dislikes],
        )?;
        Ok(changed)
    }

    fn delete(&self, id: &str) -> Result<usize> {
        Ok(self
            .conn
            .execute("DELETE FROM tuits WHERE id = ?1", params![id])?)
    }
}
