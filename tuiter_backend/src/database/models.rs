use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    /// Argon2 PHC string. Never leaves the access layer.
    pub password_hash: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_photo: Option<String>,
    pub header_image: Option<String>,
    pub biography: Option<String>,
    pub date_of_birth: Option<String>,
    pub account_type: Option<AccountType>,
    pub marital_status: Option<MaritalStatus>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub salary: Option<f64>,
    pub joined: String,
}

/// Column-wise partial update for a user; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_photo: Option<String>,
    pub header_image: Option<String>,
    pub biography: Option<String>,
    pub date_of_birth: Option<String>,
    pub account_type: Option<AccountType>,
    pub marital_status: Option<MaritalStatus>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub salary: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    Personal,
    Academic,
    Professional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaritalStatus {
    Married,
    Single,
    Widowed,
}

/// Text column mapping for fieldless enums; the stored text is the wire name.
macro_rules! text_enum_sql {
    ($ty:ty { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl FromStr for $ty {
            type Err = anyhow::Error;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                match raw {
                    $($text => Ok(Self::$variant),)+
                    other => anyhow::bail!("unknown {} value: {other}", stringify!($ty)),
                }
            }
        }

        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                let raw = value.as_str()?;
                raw.parse()
                    .map_err(|err: anyhow::Error| FromSqlError::Other(err.into()))
            }
        }
    };
}

text_enum_sql!(AccountType {
    Personal => "PERSONAL",
    Academic => "ACADEMIC",
    Professional => "PROFESSIONAL",
});

text_enum_sql!(MaritalStatus {
    Married => "MARRIED",
    Single => "SINGLE",
    Widowed => "WIDOWED",
});

#[derive(Debug, Clone, PartialEq)]
pub struct TuitRecord {
    pub id: String,
    pub tuit: String,
    pub posted_by: String,
    pub posted_on: String,
    pub image: Option<String>,
    pub youtube: Option<String>,
    pub avatar_logo: Option<String>,
    pub image_overlay: Option<String>,
    pub stats: TuitStats,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuitStats {
    #[serde(default)]
    pub replies: i64,
    #[serde(default)]
    pub retuits: i64,
    #[serde(default)]
    pub likes: i64,
    #[serde(default)]
    pub dislikes: i64,
}

#[derive(Debug, Clone, Default)]
pub struct TuitPatch {
    pub tuit: Option<String>,
    pub image: Option<String>,
    pub youtube: Option<String>,
    pub avatar_logo: Option<String>,
    pub image_overlay: Option<String>,
    pub stats: Option<TuitStats>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FollowRecord {
    pub id: String,
    pub follower_id: String,
    pub followee_id: String,
    pub followed_on: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookmarkRecord {
    pub id: String,
    pub tuit_id: String,
    pub bookmarked_by: String,
    pub bookmarked_on: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageRecord {
    pub id: String,
    pub message: String,
    pub sent_by: String,
    pub sent_to: String,
    pub sent_on: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionKind {
    Like,
    Dislike,
}

text_enum_sql!(ReactionKind {
    Like => "like",
    Dislike => "dislike",
});

impl fmt::Display for ReactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReactionRecord {
    pub id: String,
    pub tuit_id: String,
    pub user_id: String,
    pub kind: ReactionKind,
    pub reacted_on: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub id: String,
    pub user_id: String,
    pub created_at: String,
}
