//! Trait definitions for the hosted backend.
//!
//! The data store, object storage and auth service are all external. Core
//! logic only talks to them through these traits, so the lifecycle and site
//! services can be exercised against in-memory doubles.
//!
//! # Example
//!
//! ```
//! use styragon_core::traits::ContentStore;
//! use styragon_core::{AppError, ContentFilter};
//!
//! async fn count_drafts<S: ContentStore>(store: &S) -> Result<u64, AppError> {
//!     let filter = ContentFilter {
//!         published: Some(false),
//!         ..ContentFilter::default()
//!     };
//!     Ok(store.list_posts(&filter).await?.total_count)
//! }
//! ```

use std::future::Future;

use uuid::Uuid;

use crate::models::{
    Author, AuthorPayload, Category, CategoryPayload, ContentFlag, ContentType, Lead, NewLead,
    Post, PostPayload, Project, ProjectPayload, Service, Testimonial, TestimonialPayload,
};
use crate::query::{ContentFilter, ListResult};
use crate::session::Session;
use crate::AppError;

/// Typed access to the hosted content tables.
///
/// Implementations hold no cache and never retry; store failures propagate
/// as [`AppError::DatabaseError`].
pub trait ContentStore: Send + Sync + Clone {
    /// Posts matching `filter`, with category and author attached.
    fn list_posts(
        &self,
        filter: &ContentFilter,
    ) -> impl Future<Output = Result<ListResult<Post>, AppError>> + Send;

    /// A single published post by slug.
    fn find_published_post(
        &self,
        slug: &str,
    ) -> impl Future<Output = Result<Option<Post>, AppError>> + Send;

    fn list_projects(
        &self,
        filter: &ContentFilter,
    ) -> impl Future<Output = Result<ListResult<Project>, AppError>> + Send;

    /// A single published project by slug.
    fn find_published_project(
        &self,
        slug: &str,
    ) -> impl Future<Output = Result<Option<Project>, AppError>> + Send;

    /// Categories ordered by name.
    fn list_categories(&self) -> impl Future<Output = Result<Vec<Category>, AppError>> + Send;

    /// Authors ordered by name.
    fn list_authors(&self) -> impl Future<Output = Result<Vec<Author>, AppError>> + Send;

    fn list_testimonials(
        &self,
        filter: &ContentFilter,
    ) -> impl Future<Output = Result<ListResult<Testimonial>, AppError>> + Send;

    /// Active services ordered by `order_index`.
    fn list_services(&self) -> impl Future<Output = Result<Vec<Service>, AppError>> + Send;

    /// Returns true if a record of `content_type` other than `exclude_id`
    /// already uses `slug`.
    fn slug_exists(
        &self,
        content_type: ContentType,
        slug: &str,
        exclude_id: Option<i64>,
    ) -> impl Future<Output = Result<bool, AppError>> + Send;

    fn insert_post(
        &self,
        payload: &PostPayload,
    ) -> impl Future<Output = Result<i64, AppError>> + Send;

    fn update_post(
        &self,
        id: i64,
        payload: &PostPayload,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    fn insert_project(
        &self,
        payload: &ProjectPayload,
    ) -> impl Future<Output = Result<i64, AppError>> + Send;

    fn update_project(
        &self,
        id: i64,
        payload: &ProjectPayload,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    fn insert_category(
        &self,
        payload: &CategoryPayload,
    ) -> impl Future<Output = Result<i64, AppError>> + Send;

    fn update_category(
        &self,
        id: i64,
        payload: &CategoryPayload,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    fn insert_author(
        &self,
        payload: &AuthorPayload,
    ) -> impl Future<Output = Result<i64, AppError>> + Send;

    fn update_author(
        &self,
        id: i64,
        payload: &AuthorPayload,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    fn insert_testimonial(
        &self,
        payload: &TestimonialPayload,
    ) -> impl Future<Output = Result<i64, AppError>> + Send;

    fn update_testimonial(
        &self,
        id: i64,
        payload: &TestimonialPayload,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Sets exactly one boolean column on one record.
    fn set_flag(
        &self,
        content_type: ContentType,
        id: i64,
        flag: ContentFlag,
        value: bool,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Deletes a record. Returns false if nothing matched.
    fn delete(
        &self,
        content_type: ContentType,
        id: i64,
    ) -> impl Future<Output = Result<bool, AppError>> + Send;

    fn insert_lead(&self, lead: &NewLead) -> impl Future<Output = Result<Uuid, AppError>> + Send;

    /// Leads, newest first.
    fn list_leads(&self) -> impl Future<Output = Result<Vec<Lead>, AppError>> + Send;
}

/// Hosted object storage (buckets of opaque keys).
pub trait ObjectStorage: Send + Sync + Clone {
    /// Stores `bytes` under `key` in `bucket`.
    fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Publicly resolvable URL for an uploaded key. Pure URL construction.
    fn public_url(&self, bucket: &str, key: &str) -> String;
}

/// Hosted authentication service.
pub trait AuthProvider: Send + Sync + Clone {
    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Session, AppError>> + Send;

    fn sign_out(&self, session: &Session) -> impl Future<Output = Result<(), AppError>> + Send;

    fn update_password(
        &self,
        session: &Session,
        new_password: &str,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Sends a password-recovery email.
    fn request_password_reset(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<(), AppError>> + Send;
}
