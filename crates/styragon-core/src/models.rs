//! Content entities as read from and written to the hosted store.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::ValidationError;

/// The five managed content collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Post,
    Project,
    Category,
    Author,
    Testimonial,
}

impl ContentType {
    /// Backing table name in the hosted store.
    pub fn table(&self) -> &'static str {
        match self {
            ContentType::Post => "blog_posts",
            ContentType::Project => "projects",
            ContentType::Category => "categories",
            ContentType::Author => "authors",
            ContentType::Testimonial => "testimonials",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Post => "post",
            ContentType::Project => "project",
            ContentType::Category => "category",
            ContentType::Author => "author",
            ContentType::Testimonial => "testimonial",
        }
    }

    /// Whether records of this type carry a unique slug.
    pub fn has_slug(&self) -> bool {
        matches!(
            self,
            ContentType::Post | ContentType::Project | ContentType::Category
        )
    }

    /// Whether records of this type carry `published` and `featured` flags.
    pub fn has_flags(&self) -> bool {
        matches!(
            self,
            ContentType::Post | ContentType::Project | ContentType::Testimonial
        )
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single boolean column that the admin toggles without touching the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentFlag {
    Published,
    Featured,
}

impl ContentFlag {
    pub fn column(&self) -> &'static str {
        match self {
            ContentFlag::Published => "published",
            ContentFlag::Featured => "featured",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    /// Hex colour used for the category badge.
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Author {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

/// A blog post. `category` and `author` are resolved by the repository
/// after the row is read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub featured_image_url: Option<String>,
    pub category_id: Option<i64>,
    pub author_id: Option<i64>,
    pub featured: bool,
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
    /// Estimated reading time in minutes.
    pub read_time: i32,
    pub tags: Vec<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub category: Option<Category>,
    #[sqlx(skip)]
    pub author: Option<Author>,
}

impl Post {
    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.name.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    NotStarted,
    InProgress,
    #[default]
    Completed,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::NotStarted => "not_started",
            ProjectStatus::InProgress => "in_progress",
            ProjectStatus::Completed => "completed",
        }
    }
}

impl FromStr for ProjectStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(ProjectStatus::NotStarted),
            "in_progress" => Ok(ProjectStatus::InProgress),
            "completed" => Ok(ProjectStatus::Completed),
            other => Err(ValidationError::InvalidValue {
                field: "status",
                reason: format!("'{}' is not one of not_started, in_progress, completed", other),
            }),
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A case study / portfolio project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
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
    pub challenge: Option<String>,
    pub solution: Option<String>,
    pub results: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Testimonial {
    pub id: i64,
    pub client_name: String,
    pub client_title: Option<String>,
    pub client_company: Option<String>,
    pub client_avatar_url: Option<String>,
    pub content: String,
    /// 1 to 5 stars.
    pub rating: i32,
    pub featured: bool,
    pub published: bool,
    pub created_at: DateTime<Utc>,
}

/// Contact-form submission. Created once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Lead {
    pub id: Uuid,
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
    pub file_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Icons the services section knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceIcon {
    Sparkles,
    Layers,
    Code2,
    Zap,
}

impl ServiceIcon {
    pub const ALL: [ServiceIcon; 4] = [
        ServiceIcon::Sparkles,
        ServiceIcon::Layers,
        ServiceIcon::Code2,
        ServiceIcon::Zap,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceIcon::Sparkles => "Sparkles",
            ServiceIcon::Layers => "Layers",
            ServiceIcon::Code2 => "Code2",
            ServiceIcon::Zap => "Zap",
        }
    }
}

impl FromStr for ServiceIcon {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ServiceIcon::ALL
            .into_iter()
            .find(|icon| icon.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownIcon(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub icon: Option<ServiceIcon>,
    pub order_index: i32,
    pub active: bool,
}

// =============================================================================
// Write payloads
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostPayload {
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
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

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectPayload {
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

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryPayload {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorPayload {
    pub name: String,
    pub email: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestimonialPayload {
    pub client_name: String,
    pub client_title: Option<String>,
    pub client_company: Option<String>,
    pub client_avatar_url: Option<String>,
    pub content: String,
    pub rating: i32,
    pub featured: bool,
    pub published: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewLead {
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
    pub file_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_tables() {
        assert_eq!(ContentType::Post.table(), "blog_posts");
        assert_eq!(ContentType::Testimonial.table(), "testimonials");
        assert!(ContentType::Category.has_slug());
        assert!(!ContentType::Author.has_slug());
        assert!(ContentType::Testimonial.has_flags());
        assert!(!ContentType::Category.has_flags());
    }

    #[test]
    fn test_project_status_parse() {
        assert_eq!(
            "in_progress".parse::<ProjectStatus>().unwrap(),
            ProjectStatus::InProgress
        );
        assert!("done".parse::<ProjectStatus>().is_err());
        assert_eq!(ProjectStatus::NotStarted.to_string(), "not_started");
    }

    #[test]
    fn test_service_icon_rejects_unknown_tag() {
        assert_eq!("Zap".parse::<ServiceIcon>().unwrap(), ServiceIcon::Zap);
        assert_eq!(
            "Rocket".parse::<ServiceIcon>().unwrap_err(),
            ValidationError::UnknownIcon("Rocket".to_string())
        );
    }

    #[test]
    fn test_project_status_serialization() {
        let json = serde_json::to_string(&ProjectStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }
}
