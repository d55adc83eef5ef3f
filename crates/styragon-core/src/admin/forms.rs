//! Editable admin forms and the payloads they produce.
//!
//! Every form accepts raw text through `set_field`, so any host (a CLI, a
//! web handler) can drive it. Validation of required fields happens in
//! `to_payload`; nothing here touches the store.

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::models::{
    AuthorPayload, CategoryPayload, PostPayload, ProjectPayload, ProjectStatus, TestimonialPayload,
};
use crate::slug::generate_slug;

/// Badge colour given to new categories.
pub const DEFAULT_CATEGORY_COLOR: &str = "#f59e0b";

/// A form that edits one content record.
pub trait AdminForm: Default + Clone + Send + Sync {
    type Payload: ContentPayload;

    /// Sets one field from raw text input.
    fn set_field(&mut self, key: &str, value: &str) -> Result<(), ValidationError>;

    /// Checks required fields and builds the write payload.
    fn to_payload(&self) -> Result<Self::Payload, ValidationError>;
}

/// What the lifecycle needs to know about a payload before writing it.
pub trait ContentPayload: Send + Sync {
    /// The slug to check for uniqueness, for slugged types.
    fn slug(&self) -> Option<&str>;

    /// Replaces the image reference with a freshly uploaded URL.
    fn set_image_url(&mut self, url: String);
}

fn parse_bool(field: &'static str, value: &str) -> Result<bool, ValidationError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" | "" => Ok(false),
        other => Err(ValidationError::InvalidValue {
            field,
            reason: format!("'{}' is not a boolean", other),
        }),
    }
}

fn parse_id(field: &'static str, value: &str) -> Result<Option<i64>, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| ValidationError::InvalidValue {
            field,
            reason: format!("'{}' is not an id", value),
        })
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(value.to_string())
    }
}

/// Explicit slug if given, otherwise derived from `title`. Either way the
/// result is normalized and must not be empty.
fn resolve_slug(slug: &str, title: &str) -> Result<String, ValidationError> {
    let source = if slug.trim().is_empty() { title } else { slug };
    let slug = generate_slug(source);
    if slug.is_empty() {
        Err(ValidationError::MissingField("slug"))
    } else {
        Ok(slug)
    }
}

// =============================================================================
// Posts
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct PostForm {
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    /// Existing image reference, kept unless a new file is uploaded.
    pub featured_image_url: Option<String>,
    pub category_id: Option<i64>,
    pub author_id: Option<i64>,
    pub featured: bool,
    pub published: bool,
    pub read_time: i32,
    pub tags: Vec<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
}

impl Default for PostForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            slug: String::new(),
            excerpt: String::new(),
            content: String::new(),
            featured_image_url: None,
            category_id: None,
            author_id: None,
            featured: false,
            published: false,
            read_time: 5,
            tags: Vec::new(),
            meta_title: None,
            meta_description: None,
        }
    }
}

impl AdminForm for PostForm {
    type Payload = PostPayload;

    fn set_field(&mut self, key: &str, value: &str) -> Result<(), ValidationError> {
        match key {
            "title" => self.title = value.to_string(),
            "slug" => self.slug = value.to_string(),
            "excerpt" => self.excerpt = value.to_string(),
            "content" => self.content = value.to_string(),
            "category_id" => self.category_id = parse_id("category_id", value)?,
            "author_id" => self.author_id = parse_id("author_id", value)?,
            "featured" => self.featured = parse_bool("featured", value)?,
            "published" => self.published = parse_bool("published", value)?,
            "read_time" => {
                self.read_time = value
                    .trim()
                    .parse()
                    .ok()
                    .filter(|m: &i32| *m > 0)
                    .ok_or_else(|| ValidationError::InvalidValue {
                        field: "read_time",
                        reason: "must be a positive number of minutes".to_string(),
                    })?
            }
            "tags" => self.tags = list(value),
            "meta_title" => self.meta_title = optional(value),
            "meta_description" => self.meta_description = optional(value),
            other => return Err(ValidationError::UnknownField(other.to_string())),
        }
        Ok(())
    }

    fn to_payload(&self) -> Result<PostPayload, ValidationError> {
        let title = required("title", &self.title)?;
        Ok(PostPayload {
            slug: resolve_slug(&self.slug, &title)?,
            excerpt: required("excerpt", &self.excerpt)?,
            content: required("content", &self.content)?,
            title,
            featured_image_url: self.featured_image_url.clone(),
            category_id: self.category_id,
            author_id: self.author_id,
            featured: self.featured,
            published: self.published,
            read_time: self.read_time,
            tags: self.tags.clone(),
            meta_title: self.meta_title.clone(),
            meta_description: self.meta_description.clone(),
        })
    }
}

impl ContentPayload for PostPayload {
    fn slug(&self) -> Option<&str> {
        Some(&self.slug)
    }

    fn set_image_url(&mut self, url: String) {
        self.featured_image_url = Some(url);
    }
}

// =============================================================================
// Projects
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectForm {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub featured_image_url: Option<String>,
    pub project_url: Option<String>,
    pub github_url: Option<String>,
    pub technologies: Vec<String>,
    pub status: ProjectStatus,
    pub featured: bool,
    pub published: bool,
    pub start_date: Option<NaiveDate>,
    pub client_name: Option<String>,
}

impl AdminForm for ProjectForm {
    type Payload = ProjectPayload;

    fn set_field(&mut self, key: &str, value: &str) -> Result<(), ValidationError> {
        match key {
            "title" => self.title = value.to_string(),
            "slug" => self.slug = value.to_string(),
            "description" => self.description = value.to_string(),
            "project_url" => self.project_url = optional(value),
            "github_url" => self.github_url = optional(value),
            "technologies" => self.technologies = list(value),
            "status" => self.status = value.trim().parse()?,
            "featured" => self.featured = parse_bool("featured", value)?,
            "published" => self.published = parse_bool("published", value)?,
            "start_date" => {
                self.start_date = match optional(value) {
                    None => None,
                    Some(v) => Some(NaiveDate::parse_from_str(&v, "%Y-%m-%d").map_err(|_| {
                        ValidationError::InvalidValue {
                            field: "start_date",
                            reason: format!("'{}' is not a YYYY-MM-DD date", v),
                        }
                    })?),
                }
            }
            "client_name" => self.client_name = optional(value),
            other => return Err(ValidationError::UnknownField(other.to_string())),
        }
        Ok(())
    }

    fn to_payload(&self) -> Result<ProjectPayload, ValidationError> {
        let title = required("title", &self.title)?;
        Ok(ProjectPayload {
            slug: resolve_slug(&self.slug, &title)?,
            description: required("description", &self.description)?,
            title,
            featured_image_url: self.featured_image_url.clone(),
            project_url: self.project_url.clone(),
            github_url: self.github_url.clone(),
            technologies: self.technologies.clone(),
            status: self.status,
            featured: self.featured,
            published: self.published,
            start_date: self.start_date,
            client_name: self.client_name.clone(),
        })
    }
}

impl ContentPayload for ProjectPayload {
    fn slug(&self) -> Option<&str> {
        Some(&self.slug)
    }

    fn set_image_url(&mut self, url: String) {
        self.featured_image_url = Some(url);
    }
}

// =============================================================================
// Categories
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryForm {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub color: String,
}

impl Default for CategoryForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            slug: String::new(),
            description: None,
            color: DEFAULT_CATEGORY_COLOR.to_string(),
        }
    }
}

impl AdminForm for CategoryForm {
    type Payload = CategoryPayload;

    fn set_field(&mut self, key: &str, value: &str) -> Result<(), ValidationError> {
        match key {
            "name" => self.name = value.to_string(),
            "slug" => self.slug = value.to_string(),
            "description" => self.description = optional(value),
            "color" => {
                let color = value.trim();
                let valid = color.len() == 7
                    && color.starts_with('#')
                    && color[1..].chars().all(|c| c.is_ascii_hexdigit());
                if !valid {
                    return Err(ValidationError::InvalidValue {
                        field: "color",
                        reason: format!("'{}' is not a #rrggbb colour", color),
                    });
                }
                self.color = color.to_ascii_lowercase();
            }
            other => return Err(ValidationError::UnknownField(other.to_string())),
        }
        Ok(())
    }

    fn to_payload(&self) -> Result<CategoryPayload, ValidationError> {
        let name = required("name", &self.name)?;
        Ok(CategoryPayload {
            slug: resolve_slug(&self.slug, &name)?,
            name,
            description: self.description.clone(),
            color: self.color.clone(),
        })
    }
}

impl ContentPayload for CategoryPayload {
    fn slug(&self) -> Option<&str> {
        Some(&self.slug)
    }

    fn set_image_url(&mut self, _url: String) {}
}

// =============================================================================
// Authors
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorForm {
    pub name: String,
    pub email: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

impl AdminForm for AuthorForm {
    type Payload = AuthorPayload;

    fn set_field(&mut self, key: &str, value: &str) -> Result<(), ValidationError> {
        match key {
            "name" => self.name = value.to_string(),
            "email" => self.email = value.to_string(),
            "bio" => self.bio = optional(value),
            other => return Err(ValidationError::UnknownField(other.to_string())),
        }
        Ok(())
    }

    fn to_payload(&self) -> Result<AuthorPayload, ValidationError> {
        let email = required("email", &self.email)?;
        if !email.contains('@') {
            return Err(ValidationError::InvalidValue {
                field: "email",
                reason: format!("'{}' is not an email address", email),
            });
        }
        Ok(AuthorPayload {
            name: required("name", &self.name)?,
            email,
            bio: self.bio.clone(),
            avatar_url: self.avatar_url.clone(),
        })
    }
}

impl ContentPayload for AuthorPayload {
    fn slug(&self) -> Option<&str> {
        None
    }

    fn set_image_url(&mut self, url: String) {
        self.avatar_url = Some(url);
    }
}

// =============================================================================
// Testimonials
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestimonialForm {
    pub client_name: String,
    pub client_title: Option<String>,
    pub client_company: Option<String>,
    pub client_avatar_url: Option<String>,
    pub content: String,
    pub rating: i32,
    pub featured: bool,
    pub published: bool,
}

impl Default for TestimonialForm {
    fn default() -> Self {
        Self {
            client_name: String::new(),
            client_title: None,
            client_company: None,
            client_avatar_url: None,
            content: String::new(),
            rating: 5,
            featured: false,
            published: true,
        }
    }
}

impl AdminForm for TestimonialForm {
    type Payload = TestimonialPayload;

    fn set_field(&mut self, key: &str, value: &str) -> Result<(), ValidationError> {
        match key {
            "client_name" => self.client_name = value.to_string(),
            "client_title" => self.client_title = optional(value),
            "client_company" => self.client_company = optional(value),
            "content" => self.content = value.to_string(),
            "rating" => {
                self.rating = value
                    .trim()
                    .parse()
                    .ok()
                    .filter(|r| (1..=5).contains(r))
                    .ok_or_else(|| ValidationError::InvalidValue {
                        field: "rating",
                        reason: "must be between 1 and 5".to_string(),
                    })?
            }
            "featured" => self.featured = parse_bool("featured", value)?,
            "published" => self.published = parse_bool("published", value)?,
            other => return Err(ValidationError::UnknownField(other.to_string())),
        }
        Ok(())
    }

    fn to_payload(&self) -> Result<TestimonialPayload, ValidationError> {
        Ok(TestimonialPayload {
            client_name: required("client_name", &self.client_name)?,
            client_title: self.client_title.clone(),
            client_company: self.client_company.clone(),
            client_avatar_url: self.client_avatar_url.clone(),
            content: required("content", &self.content)?,
            rating: self.rating,
            featured: self.featured,
            published: self.published,
        })
    }
}

impl ContentPayload for TestimonialPayload {
    fn slug(&self) -> Option<&str> {
        None
    }

    fn set_image_url(&mut self, url: String) {
        self.client_avatar_url = Some(url);
    }
}
