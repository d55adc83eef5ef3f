//! Admin list/create/edit lifecycle.
//!
//! One [`AdminPanel`] manages one content type. It owns the fetched items,
//! the open form and the image picked for it. Every mutation needs an
//! active session and re-fetches the list afterwards.
//!
//! Submitting a form runs validation, the slug check and the optional image
//! upload in that order, and only then writes. A failure at any step leaves
//! the store untouched and the form as it was.

pub mod entity;
pub mod forms;

use std::str::FromStr;

use tracing::{info, warn};

pub use entity::{AdminEntity, PayloadOf};
pub use forms::{
    AdminForm, AuthorForm, CategoryForm, ContentPayload, PostForm, ProjectForm, TestimonialForm,
};

use crate::error::ValidationError;
use crate::models::ContentFlag;
use crate::session::SessionContext;
use crate::slug::ensure_unique;
use crate::traits::{ContentStore, ObjectStorage};
use crate::upload::{ImageUploader, UploadFile};
use crate::AppError;

/// Which screen of the panel is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminView {
    List,
    Create,
    Edit(i64),
}

/// Status filter of the admin list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Published,
    Draft,
    Featured,
}

impl FromStr for StatusFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "" => Ok(StatusFilter::All),
            "published" => Ok(StatusFilter::Published),
            "draft" => Ok(StatusFilter::Draft),
            "featured" => Ok(StatusFilter::Featured),
            other => Err(ValidationError::InvalidValue {
                field: "status",
                reason: format!("'{}' is not one of all, published, draft, featured", other),
            }),
        }
    }
}

/// Client-side filter over the fetched admin list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminFilter {
    pub search_term: String,
    pub status: StatusFilter,
}

impl AdminFilter {
    /// Substring match over the entity's search fields plus an exact status
    /// match. Types without flags ignore the status filter.
    pub fn matches<E: AdminEntity>(&self, item: &E) -> bool {
        let term = self.search_term.trim().to_lowercase();
        let text_ok = term.is_empty()
            || item
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&term));

        let status_ok = match self.status {
            StatusFilter::All => true,
            StatusFilter::Published => item.published().is_none_or(|p| p),
            StatusFilter::Draft => item.published().is_none_or(|p| !p),
            StatusFilter::Featured => item.featured().is_none_or(|f| f),
        };

        text_ok && status_ok
    }
}

/// Admin screen for one content type.
pub struct AdminPanel<E: AdminEntity, S: ContentStore, O: ObjectStorage> {
    store: S,
    uploader: ImageUploader<O>,
    session: SessionContext,
    items: Vec<E>,
    view: AdminView,
    form: E::Form,
    image: Option<UploadFile>,
    filter: AdminFilter,
    error: Option<String>,
    pending_delete: Option<i64>,
}

impl<E, S, O> AdminPanel<E, S, O>
where
    E: AdminEntity,
    S: ContentStore,
    O: ObjectStorage,
{
    pub fn new(store: S, uploader: ImageUploader<O>, session: SessionContext) -> Self {
        Self {
            store,
            uploader,
            session,
            items: Vec::new(),
            view: AdminView::List,
            form: E::Form::default(),
            image: None,
            filter: AdminFilter::default(),
            error: None,
            pending_delete: None,
        }
    }

    pub fn items(&self) -> &[E] {
        &self.items
    }

    pub fn view(&self) -> AdminView {
        self.view
    }

    pub fn form(&self) -> &E::Form {
        &self.form
    }

    /// Message from the last failed action, shown inline.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn pending_delete(&self) -> Option<i64> {
        self.pending_delete
    }

    pub fn filter(&self) -> &AdminFilter {
        &self.filter
    }

    pub fn set_search(&mut self, term: &str) {
        self.filter.search_term = term.to_string();
    }

    pub fn set_status_filter(&mut self, status: StatusFilter) {
        self.filter.status = status;
    }

    /// Fetched items that pass the current filter. Never queries the store.
    pub fn visible_items(&self) -> Vec<&E> {
        self.items
            .iter()
            .filter(|item| self.filter.matches(*item))
            .collect()
    }

    /// Re-fetches the list. On failure the previous items stay in place.
    pub async fn refresh(&mut self) -> Result<(), AppError> {
        match E::fetch_all(&self.store).await {
            Ok(items) => {
                self.items = items;
                Ok(())
            }
            Err(e) => {
                warn!(content_type = %E::CONTENT_TYPE, error = %e, "admin list refresh failed");
                self.error = Some(e.user_message());
                Err(e)
            }
        }
    }

    fn reset_form(&mut self) {
        self.form = E::Form::default();
        self.image = None;
        self.error = None;
    }

    /// Opens an empty form with the type's defaults.
    pub fn open_create(&mut self) {
        self.reset_form();
        self.view = AdminView::Create;
    }

    /// Opens the form pre-filled from item `id`. No image is picked; the
    /// stored reference is kept unless a new one is uploaded.
    pub fn open_edit(&mut self, id: i64) -> Result<(), AppError> {
        let item = self.find(id)?;
        let form = item.to_form();
        self.reset_form();
        self.form = form;
        self.view = AdminView::Edit(id);
        Ok(())
    }

    /// Back to the list without saving.
    pub fn cancel(&mut self) {
        self.reset_form();
        self.view = AdminView::List;
    }

    pub fn set_field(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        self.form.set_field(key, value)?;
        Ok(())
    }

    /// Picks a file to upload on submit.
    pub fn set_image(&mut self, file: UploadFile) -> Result<(), AppError> {
        if E::IMAGE_DESTINATION.is_none() {
            return Err(ValidationError::InvalidValue {
                field: "image",
                reason: format!("a {} has no image", E::CONTENT_TYPE),
            }
            .into());
        }
        self.image = Some(file);
        Ok(())
    }

    /// Saves the open form. Returns the record id.
    ///
    /// On success the panel returns to the list and refreshes. On failure it
    /// stays in the form with the error set, and nothing was written.
    pub async fn submit(&mut self) -> Result<i64, AppError> {
        let id = match self.save().await {
            Ok(id) => id,
            Err(e) => {
                self.error = Some(e.user_message());
                return Err(e);
            }
        };

        self.reset_form();
        self.view = AdminView::List;
        // The write went through; a failed refresh only leaves the list stale.
        let _ = self.refresh().await;
        Ok(id)
    }

    async fn save(&self) -> Result<i64, AppError> {
        self.session.require()?;

        let editing = match self.view {
            AdminView::Create => None,
            AdminView::Edit(id) => Some(id),
            AdminView::List => {
                return Err(AppError::Generic("no form is open".to_string()));
            }
        };

        let mut payload = self.form.to_payload()?;

        if let Some(slug) = payload.slug() {
            ensure_unique(&self.store, E::CONTENT_TYPE, slug, editing).await?;
        }

        if let (Some(file), Some(destination)) = (self.image.clone(), E::IMAGE_DESTINATION) {
            let url = self.uploader.upload(file, destination).await?;
            payload.set_image_url(url);
        }

        match editing {
            None => {
                let id = E::insert(&self.store, &payload).await?;
                info!(content_type = %E::CONTENT_TYPE, id, "created");
                Ok(id)
            }
            Some(id) => {
                E::update(&self.store, id, &payload).await?;
                info!(content_type = %E::CONTENT_TYPE, id, "updated");
                Ok(id)
            }
        }
    }

    fn find(&self, id: i64) -> Result<&E, AppError> {
        self.items
            .iter()
            .find(|item| item.id() == id)
            .ok_or_else(|| AppError::NotFound {
                content_type: E::CONTENT_TYPE,
                key: id.to_string(),
            })
    }

    /// Flips `published` on item `id` and nothing else.
    pub async fn toggle_published(&mut self, id: i64) -> Result<bool, AppError> {
        self.toggle(id, ContentFlag::Published).await
    }

    /// Flips `featured` on item `id` and nothing else.
    pub async fn toggle_featured(&mut self, id: i64) -> Result<bool, AppError> {
        self.toggle(id, ContentFlag::Featured).await
    }

    async fn toggle(&mut self, id: i64, flag: ContentFlag) -> Result<bool, AppError> {
        self.session.require()?;

        let item = self.find(id)?;
        let current = match flag {
            ContentFlag::Published => item.published(),
            ContentFlag::Featured => item.featured(),
        }
        .ok_or(ValidationError::UnsupportedFlag {
            content_type: E::CONTENT_TYPE,
            flag: flag.column(),
        })?;

        let value = !current;
        self.store
            .set_flag(E::CONTENT_TYPE, id, flag, value)
            .await
            .inspect_err(|e| self.error = Some(e.user_message()))?;
        info!(content_type = %E::CONTENT_TYPE, id, flag = flag.column(), value, "flag toggled");

        let _ = self.refresh().await;
        Ok(value)
    }

    /// First step of a delete. Nothing happens until [`confirm_delete`].
    ///
    /// [`confirm_delete`]: AdminPanel::confirm_delete
    pub fn request_delete(&mut self, id: i64) -> Result<(), AppError> {
        self.find(id)?;
        self.pending_delete = Some(id);
        Ok(())
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Deletes the pending item. Returns false when nothing was pending or
    /// the record was already gone.
    pub async fn confirm_delete(&mut self) -> Result<bool, AppError> {
        self.session.require()?;

        let Some(id) = self.pending_delete.take() else {
            return Ok(false);
        };

        let deleted = self
            .store
            .delete(E::CONTENT_TYPE, id)
            .await
            .inspect_err(|e| self.error = Some(e.user_message()))?;
        info!(content_type = %E::CONTENT_TYPE, id, deleted, "deleted");

        let _ = self.refresh().await;
        Ok(deleted)
    }
}
