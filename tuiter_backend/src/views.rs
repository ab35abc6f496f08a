//! JSON shapes shared by every resource.

use serde::Serialize;

/// A link to another document: the bare id, or the whole document when the
/// query joined it in.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reference<T> {
    Id(String),
    Populated(T),
}

impl<T> Reference<T> {
    pub fn populated(&self) -> Option<&T> {
        match self {
            Reference::Populated(value) => Some(value),
            Reference::Id(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteStatus {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl DeleteStatus {
    pub fn deleted(count: usize) -> Self {
        Self {
            acknowledged: true,
            deleted_count: count as u64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatus {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
}

impl UpdateStatus {
    /// SQLite reports matched rows only, so both counts carry the same value.
    pub fn matched(count: usize) -> Self {
        Self {
            acknowledged: true,
            matched_count: count as u64,
            modified_count: count as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn statuses_use_camel_case() {
        assert_eq!(
            serde_json::to_value(DeleteStatus::deleted(0)).unwrap(),
            json!({"acknowledged": true, "deletedCount": 0})
        );
        assert_eq!(
            serde_json::to_value(UpdateStatus::matched(1)).unwrap(),
            json!({"acknowledged": true, "matchedCount": 1, "modifiedCount": 1})
        );
    }

    #[test]
    fn references_serialize_untagged() {
        let id: Reference<serde_json::Value> = Reference::Id("u1".into());
        assert_eq!(serde_json::to_value(&id).unwrap(), json!("u1"));
        let doc = Reference::Populated(json!({"_id": "u1"}));
        assert_eq!(serde_json::to_value(&doc).unwrap(), json!({"_id": "u1"}));
    }
}
