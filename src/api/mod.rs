//! Resource Client: typed access to the Kasi REST API.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | `client` | Shared reqwest plumbing, auth check, status and message mapping |
//! | `resource` | Generic CRUD client per entity, list queries, page decoding |
//! | `files` | Media library listing, multipart upload, deletion |
//! | `auth` | Login, logout, password change |
//!
//! Every response body is passed through
//! [`normalize_identity`](crate::models::normalize_identity) before it is
//! deserialized, so records only ever carry `id`.

pub mod auth;
pub mod client;
pub mod files;
pub mod resource;

pub use auth::AuthClient;
pub use client::ApiClient;
pub use files::{FilesClient, UploadFile, UploadOptions};
pub use resource::{
    Categories, CollectionSource, ListQuery, Orders, Page, Products, RemoveSource, Resource,
    ResourceClient, Users,
};
