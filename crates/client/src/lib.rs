//! HTTP client for the content API.
//!
//! [`HttpContentRepository`] implements the core
//! [`ContentRepository`](vowpage_core::repository::ContentRepository) trait
//! over `GET`/`PATCH /api/v1/content`, so an
//! [`EditSession`](vowpage_core::session::EditSession) runs unchanged against
//! a remote server.

pub mod error;
pub mod repository;

pub use error::ClientError;
pub use repository::{Credentials, HttpContentRepository};
