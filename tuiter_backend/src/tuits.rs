use crate::database::models::{TuitPatch, TuitRecord, TuitStats};
use crate::database::repositories::{TuitRepository, UserRepository};
use crate::database::Database;
use crate::error::{ServiceError, ServiceResult};
use crate::users::UserView;
use crate::utils::{normalize_timestamp, now_utc_iso};
use crate::views::{DeleteStatus, Reference, UpdateStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone)]
pub struct TuitService {
    database: Database,
}

impl TuitService {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Every tuit, most recent first. Authors are left as ids.
    pub fn list_tuits(&self) -> ServiceResult<Vec<TuitView>> {
        self.database.with_repositories(|repos| {
            let tuits = repos.tuits().list()?;
            Ok(tuits.into_iter().map(TuitView::from_record).collect())
        })
    }

    pub fn get_tuit(&self, tuit_id: &str) -> ServiceResult<TuitView> {
        self.database.with_repositories(|repos| {
            repos
                .tuits()
                .get(tuit_id)?
                .map(TuitView::from_record)
                .ok_or_else(|| ServiceError::not_found("tuit", tuit_id))
        })
    }

    /// Tuits posted by `user_id`, most recent first, with the author joined in.
    pub fn list_tuits_by_user(&self, user_id: &str) -> ServiceResult<Vec<TuitView>> {
        self.database.with_repositories(|repos| {
            let rows = repos.tuits().list_by_author(user_id)?;
            Ok(rows
                .into_iter()
                .map(|(tuit, author)| TuitView::with_author(tuit, UserView::from_record(author)))
                .collect())
        })
    }

    pub fn create_tuit(&self, user_id: &str, input: CreateTuitInput) -> ServiceResult<TuitView> {
        if input.tuit.trim().is_empty() {
            return Err(ServiceError::Validation("tuit may not be empty".into()));
        }
        let posted_on = match input.posted_on.as_deref() {
            Some(raw) => normalize_timestamp(raw)
                .map_err(|err| ServiceError::Validation(err.to_string()))?,
            None => now_utc_iso(),
        };
        let record = TuitRecord {
            id: Uuid::new_v4().to_string(),
            tuit: input.tuit,
            posted_by: user_id.to_string(),
            posted_on,
            image: input.image,
            youtube: input.youtube,
            avatar_logo: input.avatar_logo,
            image_overlay: input.image_overlay,
            stats: input.stats.unwrap_or_default(),
        };

        self.database.with_repositories(|repos| {
            if repos.users().get(user_id)?.is_none() {
                return Err(ServiceError::not_found("user", user_id));
            }
            repos.tuits().create(&record)?;
            Ok(())
        })?;
        tracing::info!(tuit_id = %record.id, user_id, "tuit posted");
        Ok(TuitView::from_record(record))
    }

    pub fn update_tuit(&self, tuit_id: &str, input: UpdateTuitInput) -> ServiceResult<UpdateStatus> {
        if matches!(input.tuit.as_deref(), Some(text) if text.trim().is_empty()) {
            return Err(ServiceError::Validation("tuit may not be empty".into()));
        }
        let patch = TuitPatch {
            tuit: input.tuit,
            image: input.image,
            youtube: input.youtube,
            avatar_logo: input.avatar_logo,
            image_overlay: input.image_overlay,
            stats: input.stats,
        };
        let changed = self
            .database
            .with_repositories(|repos| Ok::<_, ServiceError>(repos.tuits().update(tuit_id, &patch)?))?;
        Ok(UpdateStatus::matched(changed))
    }

    pub fn update_stats(&self, tuit_id: &str, stats: TuitStats) -> ServiceResult<UpdateStatus> {
        let changed = self.database.with_repositories(|repos| {
            Ok::<_, ServiceError>(repos.tuits().update_stats(tuit_id, &stats)?)
        })?;
        Ok(UpdateStatus::matched(changed))
    }

    pub fn delete_tuit(&self, tuit_id: &str) -> ServiceResult<DeleteStatus> {
        let deleted = self
            .database
            .with_repositories(|repos| Ok::<_, ServiceError>(repos.tuits().delete(tuit_id)?))?;
        if deleted > 0 {
            tracing::info!(tuit_id, "tuit deleted");
        }
        Ok(DeleteStatus::deleted(deleted))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTuitInput {
    #[serde(default)]
    pub tuit: String,
    /// Only read by `POST /api/tuits`, where the author is not in the path.
    pub posted_by: Option<String>,
    /// RFC 3339; defaults to now.
    pub posted_on: Option<String>,
    pub image: Option<String>,
    pub youtube: Option<String>,
    pub avatar_logo: Option<String>,
    pub image_overlay: Option<String>,
    pub stats: Option<TuitStats>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTuitInput {
    pub tuit: Option<String>,
    pub image: Option<String>,
    pub youtube: Option<String>,
    pub avatar_logo: Option<String>,
    pub image_overlay: Option<String>,
    pub stats: Option<TuitStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TuitView {
    #[serde(rename = "_id")]
    pub id: String,
    pub tuit: String,
    pub posted_by: Reference<UserView>,
    pub posted_on: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_logo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_overlay: Option<String>,
    pub stats: TuitStats,
}

impl TuitView {
    pub(crate) fn from_record(record: TuitRecord) -> Self {
        let author = Reference::Id(record.posted_by.clone());
        Self::build(record, author)
    }

    pub(crate) fn with_author(record: TuitRecord, author: UserView) -> Self {
        Self::build(record, Reference::Populated(author))
    }

    fn build(record: TuitRecord, posted_by: Reference<UserView>) -> Self {
        Self {
            id: record.id,
            tuit: record.tuit,
            posted_by,
            posted_on: record.posted_on,
            image: record.image,
            youtube: record.youtube,
            avatar_logo: record.avatar_logo,
            image_overlay: record.image_overlay,
            stats: record.stats,
        }
    }
}
