//! "Start a project" lead capture.

use tracing::info;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::models::{Lead, NewLead};
use crate::session::SessionContext;
use crate::traits::{ContentStore, ObjectStorage};
use crate::upload::{ImageUploader, UploadDestination, UploadFile};
use crate::AppError;

/// Project types offered by the lead form.
pub const PROJECT_TYPES: [&str; 5] = ["Website", "SaaS", "Ecommerce", "Branding", "Other"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadForm {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub website: Option<String>,
    pub project_type: String,
    pub budget_range: Option<String>,
    pub timeline: Option<String>,
    pub goals: Option<String>,
    pub details: Option<String>,
}

impl Default for LeadForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            phone: None,
            company: None,
            website: None,
            project_type: PROJECT_TYPES[0].to_string(),
            budget_range: None,
            timeline: None,
            goals: None,
            details: None,
        }
    }
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl LeadForm {
    pub fn set_field(&mut self, key: &str, value: &str) -> Result<(), ValidationError> {
        match key {
            "name" => self.name = value.trim().to_string(),
            "email" => self.email = value.trim().to_string(),
            "phone" => self.phone = optional(value),
            "company" => self.company = optional(value),
            "website" => self.website = optional(value),
            "project_type" => {
                self.project_type = PROJECT_TYPES
                    .iter()
                    .find(|t| t.eq_ignore_ascii_case(value.trim()))
                    .map(|t| t.to_string())
                    .ok_or_else(|| ValidationError::InvalidValue {
                        field: "project_type",
                        reason: format!("'{}' is not one of {}", value, PROJECT_TYPES.join(", ")),
                    })?
            }
            "budget_range" => self.budget_range = optional(value),
            "timeline" => self.timeline = optional(value),
            "goals" => self.goals = optional(value),
            "details" => self.details = optional(value),
            other => return Err(ValidationError::UnknownField(other.to_string())),
        }
        Ok(())
    }

    /// Required-field check. Name and a plausible email are mandatory.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField("name"));
        }
        let email = self.email.trim();
        if email.is_empty() {
            return Err(ValidationError::MissingField("email"));
        }
        match email.split_once('@') {
            Some((user, domain)) if !user.is_empty() && domain.contains('.') => Ok(()),
            _ => Err(ValidationError::InvalidValue {
                field: "email",
                reason: format!("'{}' is not an email address", email),
            }),
        }
    }

    fn into_new_lead(self, file_url: Option<String>) -> NewLead {
        NewLead {
            name: self.name,
            email: self.email,
            phone: self.phone,
            company: self.company,
            website: self.website,
            project_type: self.project_type,
            budget_range: self.budget_range,
            timeline: self.timeline,
            goals: self.goals,
            details: self.details,
            file_url,
        }
    }
}

/// Accepts lead submissions and serves the admin's read-only leads list.
#[derive(Clone)]
pub struct LeadService<S: ContentStore, O: ObjectStorage> {
    store: S,
    uploader: ImageUploader<O>,
}

impl<S: ContentStore, O: ObjectStorage> LeadService<S, O> {
    pub fn new(store: S, uploader: ImageUploader<O>) -> Self {
        Self { store, uploader }
    }

    /// Validates, uploads the attachment if any, then inserts. An upload
    /// failure means no lead is stored.
    pub async fn submit(
        &self,
        form: LeadForm,
        attachment: Option<UploadFile>,
    ) -> Result<Uuid, AppError> {
        form.validate()?;

        let file_url = match attachment {
            Some(file) => Some(
                self.uploader
                    .upload(file, UploadDestination::LeadAttachment)
                    .await?,
            ),
            None => None,
        };

        let id = self.store.insert_lead(&form.into_new_lead(file_url)).await?;
        info!(lead_id = %id, "lead captured");
        Ok(id)
    }

    /// Every lead, newest first. Admin only.
    pub async fn list(&self, session: &SessionContext) -> Result<Vec<Lead>, AppError> {
        session.require()?;
        self.store.list_leads().await
    }
}
