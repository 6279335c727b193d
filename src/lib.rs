pub mod api;
pub mod errors;
pub mod form;
pub mod kasi_config;
pub mod list;
pub mod models;
pub mod mutation;
pub mod session;
pub mod util;
