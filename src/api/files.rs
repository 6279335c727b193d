use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};

use super::client::{ApiClient, Target, from_normalized};
use super::resource::{CollectionSource, ListQuery, Page, RemoveSource};
use crate::errors::ApiError;
use crate::models::FileRecord;

const RESOURCE: &str = "File";

/// A file read from disk, ready to be sent as multipart.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .context("Upload path has no file name")?;
        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok(Self {
            file_name,
            mime_type,
            bytes,
        })
    }
}

/// Options sent alongside the file.
#[derive(Debug, Clone)]
pub struct UploadOptions {
    pub custom_filename: Option<String>,
    pub is_public: bool,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            custom_filename: None,
            is_public: true,
        }
    }
}

/// Client for the media library (`/file-management`).
#[derive(Clone)]
pub struct FilesClient {
    api: ApiClient,
}

impl FilesClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self, category: Option<&str>) -> Result<Vec<FileRecord>, ApiError> {
        let mut request = self
            .api
            .authorized(Method::GET, &self.api.url("/file-management"))?;
        if let Some(category) = category.filter(|c| !c.is_empty()) {
            request = request.query(&[("category", category)]);
        }
        let response = self.api.dispatch(request, Target::collection(RESOURCE)).await?;
        let value = ApiClient::decode_value(response, "files").await?;
        let items = match value {
            serde_json::Value::Object(mut map) => ["files", "items", "data"]
                .iter()
                .find_map(|k| map.remove(*k))
                .unwrap_or(serde_json::Value::Array(Vec::new())),
            other => other,
        };
        from_normalized(items, "files")
    }

    /// Upload one file as multipart (`file`, `customFilename?`, `isPublic`).
    ///
    /// A 2xx whose body is not a readable JSON record still counts as
    /// success; the returned record is then built locally, has no id, and
    /// is flagged `synthesized`.
    pub async fn upload(
        &self,
        file: UploadFile,
        options: &UploadOptions,
    ) -> Result<FileRecord, ApiError> {
        let custom_filename = options
            .custom_filename
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.mime_type)
            .map_err(|e| ApiError::BadRequest(format!("Invalid MIME type: {}", e)))?;
        let mut form = Form::new().part("file", part);
        if let Some(name) = &custom_filename {
            form = form.text("customFilename", name.clone());
        }
        form = form.text("isPublic", options.is_public.to_string());

        tracing::debug!(file = %file.file_name, size = file.bytes.len(), "Uploading");
        let request = self
            .api
            .authorized(Method::POST, self.api.upload_url())?
            .multipart(form);
        let response = self.api.dispatch(request, Target::collection(RESOURCE)).await?;

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("application/json"));
        let body = response.bytes().await.map_err(ApiError::Network)?;

        let parsed = if is_json {
            serde_json::from_slice::<serde_json::Value>(&body)
                .ok()
                .and_then(|value| from_normalized::<FileRecord>(value, "upload").ok())
        } else {
            None
        };

        Ok(parsed.unwrap_or_else(|| {
            tracing::warn!(
                file = %file.file_name,
                "Upload acknowledged without a readable record; using a local placeholder"
            );
            synthesize_record(&file, custom_filename, options.is_public)
        }))
    }

    pub async fn remove(&self, id: &str) -> Result<(), ApiError> {
        let request = self.api.authorized(
            Method::DELETE,
            &self.api.url(&format!("/file-management/{}", id)),
        )?;
        self.api.dispatch(request, Target::item(RESOURCE, id)).await?;
        Ok(())
    }

    /// Delete several files concurrently, reporting each outcome in input order.
    pub async fn remove_many(&self, ids: &[String]) -> Vec<(String, Result<(), ApiError>)> {
        let results = join_all(ids.iter().map(|id| self.remove(id))).await;
        ids.iter().cloned().zip(results).collect()
    }
}

fn synthesize_record(file: &UploadFile, custom_filename: Option<String>, is_public: bool) -> FileRecord {
    let now = chrono::Utc::now().to_rfc3339();
    FileRecord {
        id: None,
        original_name: file.file_name.clone(),
        file_name: file.file_name.clone(),
        mime_type: file.mime_type.clone(),
        size: file.bytes.len() as u64,
        path: String::new(),
        url: String::new(),
        category: "default".to_string(),
        is_public,
        custom_filename,
        created_at: Some(now.clone()),
        updated_at: Some(now),
        synthesized: true,
    }
}

/// Cut one page out of the full library. Pages past the end are empty.
fn paginate_locally(items: Vec<FileRecord>, query: &ListQuery) -> Page<FileRecord> {
    let total = items.len() as u64;
    let limit = query.limit as usize;
    let start = (query.page.max(1) as usize - 1).saturating_mul(limit);
    Page {
        items: items.into_iter().skip(start).take(limit).collect(),
        total,
        page: query.page,
        limit: query.limit,
    }
}

#[async_trait]
impl CollectionSource<FileRecord> for FilesClient {
    /// The media endpoint returns the whole library, so paging happens here.
    async fn fetch_page(&self, query: &ListQuery) -> Result<Page<FileRecord>, ApiError> {
        query.validate()?;
        let category = query
            .params
            .iter()
            .find(|(k, _)| k == "category")
            .map(|(_, v)| v.as_str());
        let items = self.list(category).await?;
        Ok(paginate_locally(items, query))
    }
}

#[async_trait]
impl RemoveSource for FilesClient {
    async fn remove_one(&self, id: &str) -> Result<(), ApiError> {
        self.remove(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_upload_file_from_path_guesses_mime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flacon.png");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"\x89PNG")
            .unwrap();
        let file = UploadFile::from_path(&path).unwrap();
        assert_eq!(file.file_name, "flacon.png");
        assert_eq!(file.mime_type, "image/png");
        assert_eq!(file.bytes.len(), 4);
    }

    #[test]
    fn test_upload_file_missing_path_fails() {
        assert!(UploadFile::from_path(Path::new("/definitely/not/here.jpg")).is_err());
    }

    fn library(count: usize) -> Vec<FileRecord> {
        (0..count)
            .map(|i| FileRecord {
                id: Some(format!("f{}", i)),
                file_name: format!("f{}.jpg", i),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn test_paginate_locally_slices_pages() {
        let first = paginate_locally(library(12), &ListQuery::new(1, 10));
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.total, 12);

        let second = paginate_locally(library(12), &ListQuery::new(2, 10));
        let ids: Vec<&str> = second.items.iter().filter_map(|f| f.id.as_deref()).collect();
        assert_eq!(ids, vec!["f10", "f11"]);
        assert_eq!(second.page, 2);

        assert!(paginate_locally(library(12), &ListQuery::new(5, 10)).items.is_empty());
    }

    #[test]
    fn test_synthesized_record_has_no_identity() {
        let file = UploadFile {
            file_name: "a.jpg".into(),
            mime_type: "image/jpeg".into(),
            bytes: vec![0; 10],
        };
        let record = synthesize_record(&file, Some("hero".into()), false);
        assert!(record.id.is_none());
        assert!(record.synthesized);
        assert_eq!(record.size, 10);
        assert_eq!(record.display_name(), "hero");
        assert!(!record.is_public);
    }
}
