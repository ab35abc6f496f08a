use super::users::{user_from_row, USER_COLUMNS};
use crate::database::models::{MessageRecord, UserRecord};
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};

const MESSAGE_COLUMN_COUNT: usize = 5;

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<MessageRecord> {
    Ok(MessageRecord {
        id: row.get(0)?,
        message: row.get(1)?,
        sent_by: row.get(2)?,
        sent_to: row.get(3)?,
        sent_on: row.get(4)?,
    })
}

pub(super) struct SqliteMessageRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

impl<'conn> SqliteMessageRepository<'conn> {
    fn list_joined(
        &self,
        filter_column: &str,
        join_column: &str,
        user_id: &str,
    ) -> Result<Vec<(MessageRecord, UserRecord)>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT m.id, m.message, m.sent_by, m.sent_to, m.sent_on, {USER_COLUMNS}
            FROM messages m
            INNER JOIN users u ON u.id = m.{join_column}
            WHERE m.{filter_column} = ?1
            ORDER BY m.sent_on ASC, m.rowid ASC
            "#
        ))?;
        let rows = stmt.query_map(params![user_id], |row| {
            Ok((message_from_row(row)?, user_from_row(row, MESSAGE_COLUMN_COUNT)?))
        })?;
        let mut messages = Vec::new();
        for row in rows {
            messages.push(row?);
        }
        Ok(messages)
    }
}

impl<'conn> super::MessageRepository for SqliteMessageRepository<'conn> {
    fn create(&self, record: &MessageRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO messages (id, message, sent_by, sent_to, sent_on)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                record.id,
                record.message,
                record.sent_by,
                record.sent_to,
                record.sent_on,
            ],
        )?;
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<MessageRecord>> {
        let row = self
            .conn
            .query_row(
                r#"
                SELECT id, message, sent_by, sent_to, sent_on
                FROM messages
                WHERE id = ?1
                "#,
                params![id],
                message_from_row,
            )
            .optional()?;
        Ok(row)
    }

    fn list_sent(&self, user_id: &str) -> Result<Vec<(MessageRecord, UserRecord)>> {
        self.list_joined("sent_by", "sent_to", user_id)
    }

    fn list_received(&self, user_id: &str) -> Result<Vec<(MessageRecord, UserRecord)>> {
        self.list_joined("sent_to", "sent_by", user_id)
    }

    fn delete(&self, sender_id: &str, message_id: &str) -> Result<usize> {
        Ok(self.conn.execute(
            "DELETE FROM messages WHERE sent_by = ?1 AND id = ?2",
            params![sender_id, message_id],
        )?)
    }
}
