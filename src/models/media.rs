use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Record;
use crate::list::criteria::{Filter, Sorter, compare_dates, compare_text, contains_ci};

/// A file stored by the media server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub original_name: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_filename: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    /// Built locally because the upload acknowledgment was not readable JSON.
    #[serde(skip)]
    pub synthesized: bool,
}

impl FileRecord {
    /// Custom filename when set, otherwise the original upload name.
    pub fn display_name(&self) -> &str {
        match self.custom_filename.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.original_name,
        }
    }
}

impl Record for FileRecord {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn label(&self) -> &str {
        self.display_name()
    }

    fn is_active(&self) -> bool {
        self.is_public
    }

    fn created_at(&self) -> Option<&str> {
        self.created_at.as_deref()
    }

    fn updated_at(&self) -> Option<&str> {
        self.updated_at.as_deref()
    }
}

/// Name search (custom or original name) with an optional server-side category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaFilter {
    pub search: String,
    pub category: Option<String>,
}

impl Filter<FileRecord> for MediaFilter {
    fn matches(&self, item: &FileRecord) -> bool {
        let custom_hit = item
            .custom_filename
            .as_deref()
            .is_some_and(|name| !self.search.trim().is_empty() && contains_ci(name, &self.search));
        custom_hit || contains_ci(&item.original_name, &self.search)
    }

    fn query_params(&self) -> Vec<(String, String)> {
        self.category
            .iter()
            .filter(|c| !c.is_empty())
            .map(|c| ("category".to_string(), c.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MediaSort {
    #[default]
    Newest,
    Oldest,
    NameAsc,
    NameDesc,
}

impl FromStr for MediaSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(Self::Newest),
            "oldest" => Ok(Self::Oldest),
            "name-asc" => Ok(Self::NameAsc),
            "name-desc" => Ok(Self::NameDesc),
            _ => Err(format!("Invalid media sort: {}", s)),
        }
    }
}

impl Sorter<FileRecord> for MediaSort {
    fn compare(&self, a: &FileRecord, b: &FileRecord) -> Ordering {
        match self {
            Self::Newest => compare_dates(b.created_at(), a.created_at()),
            Self::Oldest => compare_dates(a.created_at(), b.created_at()),
            Self::NameAsc => compare_text(a.display_name(), b.display_name()),
            Self::NameDesc => compare_text(b.display_name(), a.display_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, custom: Option<&str>, created: &str) -> FileRecord {
        FileRecord {
            id: Some(name.to_string()),
            original_name: name.to_string(),
            custom_filename: custom.map(str::to_string),
            created_at: Some(created.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_file_record_deserialize_skips_synthesized() {
        let json = r#"{
            "id": "f1",
            "originalName": "logo.png",
            "fileName": "1700000000-logo.png",
            "mimeType": "image/png",
            "size": 2048,
            "path": "uploads/1700000000-logo.png",
            "url": "/uploads/1700000000-logo.png",
            "category": "image",
            "isPublic": true,
            "customFilename": "brand-logo"
        }"#;
        let record: FileRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.display_name(), "brand-logo");
        assert!(!record.synthesized);
        assert!(record.is_active());
    }

    #[test]
    fn test_display_name_ignores_empty_custom_name() {
        let record = file("photo.jpg", Some(""), "2024-01-01T00:00:00Z");
        assert_eq!(record.display_name(), "photo.jpg");
    }

    #[test]
    fn test_filter_searches_custom_and_original_names() {
        let record = file("IMG_001.jpg", Some("flacon-bleu"), "2024-01-01T00:00:00Z");
        let by_custom = MediaFilter {
            search: "BLEU".into(),
            category: None,
        };
        let by_original = MediaFilter {
            search: "img_".into(),
            category: None,
        };
        let miss = MediaFilter {
            search: "rouge".into(),
            category: None,
        };
        assert!(by_custom.matches(&record));
        assert!(by_original.matches(&record));
        assert!(!miss.matches(&record));
    }

    #[test]
    fn test_category_goes_to_server_params() {
        let filter = MediaFilter {
            search: String::new(),
            category: Some("image".into()),
        };
        assert_eq!(
            filter.query_params(),
            vec![("category".to_string(), "image".to_string())]
        );
        assert!(MediaFilter::default().query_params().is_empty());
    }

    #[test]
    fn test_sort_newest_first_and_by_name() {
        let old = file("b.png", None, "2023-05-01T00:00:00Z");
        let new = file("A.png", None, "2024-05-01T00:00:00Z");
        assert_eq!(MediaSort::Newest.compare(&old, &new), Ordering::Greater);
        assert_eq!(MediaSort::Oldest.compare(&old, &new), Ordering::Less);
        assert_eq!(MediaSort::NameAsc.compare(&old, &new), Ordering::Greater);
        assert_eq!(MediaSort::NameDesc.compare(&old, &new), Ordering::Less);
    }
}
