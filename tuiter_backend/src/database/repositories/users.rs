use crate::database::models::{UserPatch, UserRecord};
use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Column list for `users` aliased as `u`, in the order [`user_from_row`]
/// expects.
pub(super) const USER_COLUMNS: &str = "u.id, u.username, u.password_hash, u.email, \
     u.first_name, u.last_name, u.profile_photo, u.header_image, u.biography, \
     u.date_of_birth, u.account_type, u.marital_status, u.latitude, u.longitude, \
     u.salary, u.joined";

pub(super) fn user_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        id: row.get(offset)?,
        username: row.get(offset + 1)?,
        password_hash: row.get(offset + 2)?,
        email: row.get(offset + 3)?,
        first_name: row.get(offset + 4)?,
        last_name: row.get(offset + 5)?,
        profile_photo: row.get(offset + 6)?,
        header_image: row.get(offset + 7)?,
        biography: row.get(offset + 8)?,
        date_of_birth: row.get(offset + 9)?,
        account_type: row.get(offset + 10)?,
        marital_status: row.get(offset + 11)?,
        latitude: row.get(offset + 12)?,
        longitude: row.get(offset + 13)?,
        salary: row.get(offset + 14)?,
        joined: row.get(offset + 15)?,
    })
}

pub(super) struct SqliteUserRepository<'conn> {
    pub(super) conn: &'conn Connection,
}

impl<'conn> super::UserRepository for SqliteUserRepository<'conn> {
    fn create(&self, record: &UserRecord) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO users (id, username, password_hash, email, first_name, last_name,
                profile_photo, header_image, biography, date_of_birth, account_type,
                marital_status, latitude, longitude, salary, joined)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
            "#,
            params![
                record.id,
                record.username,
                record.password_hash,
                record.email,
                record.first_name,
                record.last_name,
                record.profile_photo,
                record.header_image,
                record.biography,
                record.date_of_birth,
                record.account_type,
                record.marital_status,
                record.latitude,
                record.longitude,
                record.salary,
                record.joined,
            ],
        )?;
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<UserRecord>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users u WHERE u.id = ?1"),
                params![id],
                |row| user_from_row(row, 0),
            )
            .optional()?;
        Ok(row)
    }

    fn get_by_username(&self, username: &str) -> Result<Option<UserRecord>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users u WHERE u.username = ?1"),
                params![username],
                |row| user_from_row(row, 0),
            )
            .optional()?;
        Ok(row)
    }

    fn list(&self) -> Result<Vec<UserRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users u ORDER BY u.joined ASC, u.rowid ASC"
        ))?;
        let rows = stmt.query_map([], |row| user_from_row(row, 0))?;
        let mut users = Vec::new();
        for row in rows {
            users.push(row?);
        }
        Ok(users)
    }

    fn update(&self, id: &str, patch: &UserPatch) -> Result<usize> {
        let changed = self.conn.execute(
            r#"
            UPDATE users SET
                username = COALESCE(?2, username),
                password_hash = COALESCE(?3, password_hash),
                email = COALESCE(?4, email),
                first_name = COALESCE(?5, first_name),
                last_name = COALESCE(?6, last_name),
                profile_photo = COALESCE(?7, profile_photo),
                header_image = COALESCE(?8, header_image),
                biography = COALESCE(?9, biography),
                date_of_birth = COALESCE(?10, date_of_birth),
                account_type = COALESCE(?11, account_type),
                marital_status = COALESCE(?12, marital_status),
                latitude = COALESCE(?13, latitude),
                longitude = COALESCE(?14, longitude),
                salary = COALESCE(?15, salary)
            WHERE id = ?1
            "#,
            params![
                id,
                patch.username,
                patch.password_hash,
                patch.email,
                patch.first_name,
                patch.last_name,
                patch.profile_photo,
                patch.header_image,
                patch.biography,
                patch.date_of_birth,
                patch.account_type,
                patch.marital_status,
                patch.latitude,
                patch.longitude,
                patch.salary,
            ],
        )?;
        Ok(changed)
    }

    fn delete(&self, id: &str) -> Result<usize> {
        Ok(self
            .conn
            .execute("DELETE FROM users WHERE id = ?1", params![id])?)
    }

    fn delete_all(&self) -> Result<usize> {
        Ok(self.conn.execute("DELETE FROM users", [])?)
    }

    fn delete_by_username(&self, username: &str) -> Result<usize> {
        Ok(self
            .conn
            .execute("DELETE FROM users WHERE username = ?1", params![username])?)
    }
}
