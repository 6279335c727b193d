//! Domain records returned by the Kasi API.
//!
//! Every entity implements [`Record`], which is the only way the rest of the
//! crate reads identity, labels and timestamps. Identity arrives as `id`,
//! `_id`, or both; [`normalize_identity`] folds them into `id` before any
//! record is deserialized.

pub mod category;
pub mod media;
pub mod order;
pub mod product;
pub mod user;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use category::Category;
pub use media::FileRecord;
pub use order::{Order, OrderStatus};
pub use product::Product;
pub use user::User;

/// Common accessors shared by every entity held in a collection.
pub trait Record: Clone + std::fmt::Debug + DeserializeOwned + Send + Sync + 'static {
    /// Server-assigned identity; `None` until the server confirms creation.
    fn id(&self) -> Option<&str>;

    /// Human-readable name used in lists and messages.
    fn label(&self) -> &str;

    /// Status flag: `isActive` for categories and users, availability for
    /// products, not-cancelled for orders, public visibility for files.
    fn is_active(&self) -> bool;

    fn created_at(&self) -> Option<&str>;

    fn updated_at(&self) -> Option<&str>;

    /// True when `id` names this record.
    fn has_id(&self, id: &str) -> bool {
        self.id() == Some(id)
    }
}

/// Fold `_id` into `id` on every JSON object in the tree.
///
/// Objects carrying only `_id` get it renamed; objects carrying both keep
/// `id` and drop `_id`.
pub fn normalize_identity(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if let Some(legacy) = map.remove("_id")
                && !map.contains_key("id")
            {
                let legacy = match legacy {
                    Value::Number(n) => Value::String(n.to_string()),
                    other => other,
                };
                map.insert("id".to_string(), legacy);
            }
            for child in map.values_mut() {
                normalize_identity(child);
            }
        }
        Value::Array(items) => {
            for item in items {
                normalize_identity(item);
            }
        }
        _ => {}
    }
}

/// SEO block shared by products and categories.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_renames_legacy_id() {
        let mut value = json!({"_id": "abc", "name": "Parfum"});
        normalize_identity(&mut value);
        assert_eq!(value, json!({"id": "abc", "name": "Parfum"}));
    }

    #[test]
    fn test_normalize_prefers_canonical_id_when_both_present() {
        let mut value = json!({"_id": "legacy", "id": "canonical"});
        normalize_identity(&mut value);
        assert_eq!(value, json!({"id": "canonical"}));
    }

    #[test]
    fn test_normalize_recurses_into_arrays_and_objects() {
        let mut value = json!({
            "orders": [
                {"_id": "o1", "statusHistory": [{"_id": "h1", "id": "h1", "status": "pending"}]},
                {"id": "o2"}
            ]
        });
        normalize_identity(&mut value);
        assert_eq!(value["orders"][0]["id"], "o1");
        assert!(value["orders"][0].get("_id").is_none());
        assert_eq!(value["orders"][0]["statusHistory"][0], json!({"id": "h1", "status": "pending"}));
        assert_eq!(value["orders"][1]["id"], "o2");
    }

    #[test]
    fn test_normalize_stringifies_numeric_ids() {
        let mut value = json!({"_id": 7});
        normalize_identity(&mut value);
        assert_eq!(value, json!({"id": "7"}));
    }

    #[test]
    fn test_normalize_leaves_scalars_alone() {
        let mut value = json!("plain");
        normalize_identity(&mut value);
        assert_eq!(value, json!("plain"));
    }
}
