use crate::database::models::{ReactionKind, ReactionRecord, TuitStats};
use crate::database::repositories::{
    ReactionRepository, SqliteRepositories, TuitRepository, UserRepository,
};
use crate::database::Database;
use crate::error::{ServiceError, ServiceResult};
use crate::tuits::TuitView;
use crate::users::UserView;
use crate::utils::now_utc_iso;
use crate::views::Reference;
use serde::Serialize;
use uuid::Uuid;

/// Likes and dislikes. Both live in one reactions table keyed by
/// (user, tuit), so a user holds at most one of the two on any tuit.
#[derive(Clone)]
pub struct LikeService {
    database: Database,
}

impl LikeService {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    pub fn list_liked_tuits(&self, user_id: &str) -> ServiceResult<Vec<LikeView>> {
        self.tuits_for_user(user_id, ReactionKind::Like)
    }

    pub fn list_disliked_tuits(&self, user_id: &str) -> ServiceResult<Vec<DislikeView>> {
        let likes = self.tuits_for_user(user_id, ReactionKind::Dislike)?;
        Ok(likes.into_iter().map(DislikeView::from).collect())
    }

    pub fn list_users_who_liked(&self, tuit_id: &str) -> ServiceResult<Vec<LikeView>> {
        self.users_for_tuit(tuit_id, ReactionKind::Like)
    }

    pub fn list_users_who_disliked(&self, tuit_id: &str) -> ServiceResult<Vec<DislikeView>> {
        let likes = self.users_for_tuit(tuit_id, ReactionKind::Dislike)?;
        Ok(likes.into_iter().map(DislikeView::from).collect())
    }

    pub fn find_user_likes_tuit(&self, user_id: &str, tuit_id: &str) -> ServiceResult<Option<LikeView>> {
        self.find_reaction(user_id, tuit_id, ReactionKind::Like)
    }

    pub fn find_user_dislikes_tuit(
        &self,
        user_id: &str,
        tuit_id: &str,
    ) -> ServiceResult<Option<DislikeView>> {
        Ok(self
            .find_reaction(user_id, tuit_id, ReactionKind::Dislike)?
            .map(DislikeView::from))
    }

    pub fn count_likes(&self, tuit_id: &str) -> ServiceResult<i64> {
        self.database.with_repositories(|repos| {
            Ok(repos.reactions().count_for_tuit(tuit_id, ReactionKind::Like)?)
        })
    }

    pub fn count_dislikes(&self, tuit_id: &str) -> ServiceResult<i64> {
        self.database.with_repositories(|repos| {
            Ok(repos.reactions().count_for_tuit(tuit_id, ReactionKind::Dislike)?)
        })
    }

    pub fn toggle_like(&self, user_id: &str, tuit_id: &str) -> ServiceResult<ToggleOutcome> {
        self.toggle(user_id, tuit_id, ReactionKind::Like)
    }

    pub fn toggle_dislike(&self, user_id: &str, tuit_id: &str) -> ServiceResult<ToggleOutcome> {
        self.toggle(user_id, tuit_id, ReactionKind::Dislike)
    }

    /// Removes `kind` when the user already holds it, otherwise sets it
    /// (replacing the opposite reaction if present). The tuit's like and
    /// dislike counters are recounted in the same transaction.
    fn toggle(&self, user_id: &str, tuit_id: &str, kind: ReactionKind) -> ServiceResult<ToggleOutcome> {
        let outcome = self.database.with_transaction(|repos| {
            if repos.users().get(user_id)?.is_none() {
                return Err(ServiceError::not_found("user", user_id));
            }
            if repos.tuits().get(tuit_id)?.is_none() {
                return Err(ServiceError::not_found("tuit", tuit_id));
            }

            let reactions = repos.reactions();
            let held = reactions.get(user_id, tuit_id)?;
            let reaction = match held {
                Some(existing) if existing.kind == kind => {
                    reactions.delete(user_id, tuit_id)?;
                    None
                }
                _ => {
                    reactions.upsert(&ReactionRecord {
                        id: Uuid::new_v4().to_string(),
                        tuit_id: tuit_id.to_string(),
                        user_id: user_id.to_string(),
                        kind,
                        reacted_on: now_utc_iso(),
                    })?;
                    Some(kind)
                }
            };

            let stats = recount_reactions(&repos, tuit_id)?
                .ok_or_else(|| ServiceError::not_found("tuit", tuit_id))?;
            Ok(ToggleOutcome { reaction, stats })
        })?;
        tracing::debug!(user_id, tuit_id, %kind, held = ?outcome.reaction, "reaction toggled");
        Ok(outcome)
    }

    fn tuits_for_user(&self, user_id: &str, kind: ReactionKind) -> ServiceResult<Vec<LikeView>> {
        self.database.with_repositories(|repos| {
            let rows = repos.reactions().list_tuits_for_user(user_id, kind)?;
            Ok(rows
                .into_iter()
                .map(|(reaction, tuit)| LikeView {
                    tuit: Reference::Populated(TuitView::from_record(tuit)),
                    ..LikeView::from_record(reaction)
                })
                .collect())
        })
    }

    fn users_for_tuit(&self, tuit_id: &str, kind: ReactionKind) -> ServiceResult<Vec<LikeView>> {
        self.database.with_repositories(|repos| {
            let rows = repos.reactions().list_users_for_tuit(tuit_id, kind)?;
            Ok(rows
                .into_iter()
                .map(|(reaction, user)| LikeView {
                    liked_by: Reference::Populated(UserView::from_record(user)),
                    ..LikeView::from_record(reaction)
                })
                .collect())
        })
    }

    fn find_reaction(
        &self,
        user_id: &str,
        tuit_id: &str,
        kind: ReactionKind,
    ) -> ServiceResult<Option<LikeView>> {
        self.database.with_repositories(|repos| {
            Ok(repos
                .reactions()
                .get(user_id, tuit_id)?
                .filter(|reaction| reaction.kind == kind)
                .map(LikeView::from_record))
        })
    }
}

/// Rewrites the tuit's like and dislike counters from the reactions table.
/// Returns `None` when the tuit no longer exists.
pub(crate) fn recount_reactions(
    repos: &SqliteRepositories<'_>,
    tuit_id: &str,
) -> anyhow::Result<Option<TuitStats>> {
    let tuits = repos.tuits();
    let Some(tuit) = tuits.get(tuit_id)? else {
        return Ok(None);
    };
    let reactions = repos.reactions();
    let stats = TuitStats {
        likes: reactions.count_for_tuit(tuit_id, ReactionKind::Like)?,
        dislikes: reactions.count_for_tuit(tuit_id, ReactionKind::Dislike)?,
        ..tuit.stats
    };
    tuits.update_stats(tuit_id, &stats)?;
    Ok(Some(stats))
}

/// Result of a like or dislike toggle: what the user holds now and the
/// tuit's refreshed counters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ToggleOutcome {
    pub reaction: Option<ReactionKind>,
    pub stats: TuitStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeView {
    #[serde(rename = "_id")]
    pub id: String,
    pub tuit: Reference<TuitView>,
    pub liked_by: Reference<UserView>,
}

impl LikeView {
    fn from_record(record: ReactionRecord) -> Self {
        Self {
            id: record.id,
            tuit: Reference::Id(record.tuit_id),
            liked_by: Reference::Id(record.user_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DislikeView {
    #[serde(rename = "_id")]
    pub id: String,
    pub tuit: Reference<TuitView>,
    pub disliked_by: Reference<UserView>,
}

impl From<LikeView> for DislikeView {
    fn from(view: LikeView) -> Self {
        Self {
            id: view.id,
            tuit: view.tuit,
            disliked_by: view.liked_by,
        }
    }
}
