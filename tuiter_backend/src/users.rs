use crate::database::models::{AccountType, MaritalStatus, UserPatch, UserRecord};
use crate::database::repositories::{ReactionRepository, SqliteRepositories, UserRepository};
use crate::database::Database;
use crate::error::{is_constraint_violation, ServiceError, ServiceResult};
use crate::likes::recount_reactions;
use crate::utils::now_utc_iso;
use crate::views::{DeleteStatus, UpdateStatus};
use argon2::Argon2;
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone)]
pub struct UserService {
    database: Database,
}

impl UserService {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    pub fn list_users(&self) -> ServiceResult<Vec<UserView>> {
        self.database.with_repositories(|repos| {
            let users = repos.users().list()?;
            Ok(users.into_iter().map(UserView::from_record).collect())
        })
    }

    pub fn get_user(&self, user_id: &str) -> ServiceResult<UserView> {
        self.database.with_repositories(|repos| {
            repos
                .users()
                .get(user_id)?
                .map(UserView::from_record)
                .ok_or_else(|| ServiceError::not_found("user", user_id))
        })
    }

    pub fn find_by_username(&self, username: &str) -> ServiceResult<Option<UserView>> {
        self.database.with_repositories(|repos| {
            Ok(repos
                .users()
                .get_by_username(username)?
                .map(UserView::from_record))
        })
    }

    pub fn create_user(&self, input: CreateUserInput) -> ServiceResult<UserView> {
        let record = input.into_record()?;
        self.database.with_repositories(|repos| {
            repos.users().create(&record).map_err(|err| {
                if is_constraint_violation(&err) {
                    ServiceError::Conflict(format!("username already taken: {}", record.username))
                } else {
                    ServiceError::Internal(err)
                }
            })
        })?;
        tracing::info!(user_id = %record.id, username = %record.username, "user created");
        Ok(UserView::from_record(record))
    }

    /// Registers a new account. Unlike [`UserService::create_user`], a taken
    /// username is reported as `Forbidden`.
    pub fn signup(&self, input: CreateUserInput) -> ServiceResult<UserView> {
        if self.find_by_username(input.username.trim())?.is_some() {
            return Err(ServiceError::Forbidden(format!(
                "username already taken: {}",
                input.username.trim()
            )));
        }
        match self.create_user(input) {
            Err(ServiceError::Conflict(msg)) => Err(ServiceError::Forbidden(msg)),
            other => other,
        }
    }

    pub fn update_user(&self, user_id: &str, input: UpdateUserInput) -> ServiceResult<UpdateStatus> {
        let patch = input.into_patch()?;
        let changed = self.database.with_repositories(|repos| {
            repos.users().update(user_id, &patch).map_err(|err| {
                if is_constraint_violation(&err) {
                    ServiceError::Conflict("username already taken".into())
                } else {
                    ServiceError::Internal(err)
                }
            })
        })?;
        Ok(UpdateStatus::matched(changed))
    }

    pub fn delete_user(&self, user_id: &str) -> ServiceResult<DeleteStatus> {
        let deleted = self.database.with_transaction(|repos| {
            let reacted = repos.reactions().tuit_ids_for_user(user_id)?;
            let deleted = repos.users().delete(user_id)?;
            refresh_counters(&repos, &reacted)?;
            Ok::<_, ServiceError>(deleted)
        })?;
        if deleted > 0 {
            tracing::info!(user_id, "user deleted");
        }
        Ok(DeleteStatus::deleted(deleted))
    }

    /// Every tuit goes with its author, so no counters are left to refresh.
    pub fn delete_all_users(&self) -> ServiceResult<DeleteStatus> {
        let deleted = self
            .database
            .with_repositories(|repos| Ok::<_, ServiceError>(repos.users().delete_all()?))?;
        tracing::warn!(deleted, "all users deleted");
        Ok(DeleteStatus::deleted(deleted))
    }

    pub fn delete_users_by_username(&self, username: &str) -> ServiceResult<DeleteStatus> {
        let deleted = self.database.with_transaction(|repos| {
            let reacted = match repos.users().get_by_username(username)? {
                Some(user) => repos.reactions().tuit_ids_for_user(&user.id)?,
                None => Vec::new(),
            };
            let deleted = repos.users().delete_by_username(username)?;
            refresh_counters(&repos, &reacted)?;
            Ok::<_, ServiceError>(deleted)
        })?;
        if deleted > 0 {
            tracing::info!(username, "user deleted");
        }
        Ok(DeleteStatus::deleted(deleted))
    }

    /// Looks the user up by username and checks the password against the
    /// stored argon2 hash. Any mismatch is `Forbidden` without saying which
    /// half was wrong.
    pub fn find_by_credentials(&self, username: &str, password: &str) -> ServiceResult<UserView> {
        let record = self
            .database
            .with_repositories(|repos| Ok::<_, ServiceError>(repos.users().get_by_username(username)?))?;
        match record {
            Some(record) if verify_password(password, &record.password_hash) => {
                Ok(UserView::from_record(record))
            }
            _ => {
                tracing::debug!(username, "rejected credentials");
                Err(ServiceError::Forbidden("invalid username or password".into()))
            }
        }
    }
}

/// Reactions vanish with their user through the cascade; the tuits they
/// pointed at need their stored counters rewritten.
fn refresh_counters(repos: &SqliteRepositories<'_>, tuit_ids: &[String]) -> anyhow::Result<()> {
    for tuit_id in tuit_ids {
        recount_reactions(repos, tuit_id)?;
    }
    Ok(())
}

fn hash_password(password: &str) -> ServiceResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| ServiceError::Internal(anyhow::anyhow!("failed to hash password: {err}")))
}

fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

fn require_non_blank(field: &str, value: &str) -> ServiceResult<()> {
    if value.trim().is_empty() {
        return Err(ServiceError::Validation(format!("{field} may not be empty")));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// Incoming coordinates. A coordinate left out keeps its stored value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct LocationInput {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Optional profile fields accepted on both create and update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_photo: Option<String>,
    pub header_image: Option<String>,
    pub biography: Option<String>,
    pub date_of_birth: Option<String>,
    pub account_type: Option<AccountType>,
    pub marital_status: Option<MaritalStatus>,
    pub location: Option<LocationInput>,
    pub salary: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateUserInput {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub email: String,
    #[serde(flatten)]
    pub profile: ProfileInput,
}

impl CreateUserInput {
    fn into_record(self) -> ServiceResult<UserRecord> {
        require_non_blank("username", &self.username)?;
        require_non_blank("password", &self.password)?;
        require_non_blank("email", &self.email)?;
        let password_hash = hash_password(&self.password)?;
        let profile = self.profile;
        Ok(UserRecord {
            id: Uuid::new_v4().to_string(),
            username: self.username.trim().to_string(),
            password_hash,
            email: self.email.trim().to_string(),
            first_name: profile.first_name,
            last_name: profile.last_name,
            profile_photo: profile.profile_photo,
            header_image: profile.header_image,
            biography: profile.biography,
            date_of_birth: profile.date_of_birth,
            account_type: profile.account_type,
            marital_status: profile.marital_status,
            latitude: profile.location.and_then(|loc| loc.latitude),
            longitude: profile.location.and_then(|loc| loc.longitude),
            salary: profile.salary,
            joined: now_utc_iso(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserInput {
    pub username: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
    #[serde(flatten)]
    pub profile: ProfileInput,
}

impl UpdateUserInput {
    fn into_patch(self) -> ServiceResult<UserPatch> {
        if let Some(username) = &self.username {
            require_non_blank("username", username)?;
        }
        if let Some(email) = &self.email {
            require_non_blank("email", email)?;
        }
        let password_hash = match &self.password {
            Some(password) => {
                require_non_blank("password", password)?;
                Some(hash_password(password)?)
            }
            None => None,
        };
        let profile = self.profile;
        Ok(UserPatch {
            username: self.username.map(|u| u.trim().to_string()),
            password_hash,
            email: self.email.map(|e| e.trim().to_string()),
            first_name: profile.first_name,
            last_name: profile.last_name,
            profile_photo: profile.profile_photo,
            header_image: profile.header_image,
            biography: profile.biography,
            date_of_birth: profile.date_of_birth,
            account_type: profile.account_type,
            marital_status: profile.marital_status,
            latitude: profile.location.and_then(|loc| loc.latitude),
            longitude: profile.location.and_then(|loc| loc.longitude),
            salary: profile.salary,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_photo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub biography: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_type: Option<AccountType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marital_status: Option<MaritalStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<f64>,
    pub joined: String,
}

impl UserView {
    pub(crate) fn from_record(record: UserRecord) -> Self {
        let location = match (record.latitude, record.longitude) {
            (None, None) => None,
            (latitude, longitude) => Some(Location {
                latitude: latitude.unwrap_or_default(),
                longitude: longitude.unwrap_or_default(),
            }),
        };
        Self {
            id: record.id,
            username: record.username,
            email: record.email,
            first_name: record.first_name,
            last_name: record.last_name,
            profile_photo: record.profile_photo,
            header_image: record.header_image,
            biography: record.biography,
            date_of_birth: record.date_of_birth,
            account_type: record.account_type,
            marital_status: record.marital_status,
            location,
            salary: record.salary,
            joined: record.joined,
        }
    }
}
