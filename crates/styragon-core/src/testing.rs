//! In-memory doubles for the backend traits, used by unit tests.

use std::sync::{Arc, Mutex};

use chrono::{Duration, TimeZone, Utc};
use uuid::Uuid;

use crate::models::{
    Author, AuthorPayload, Category, CategoryPayload, ContentFlag, ContentType, Lead, NewLead,
    Post, PostPayload, Project, ProjectPayload, Service, Testimonial, TestimonialPayload,
};
use crate::query::{ContentFilter, Direction, ListResult};
use crate::session::Session;
use crate::traits::{AuthProvider, ContentStore, ObjectStorage};
use crate::AppError;

#[derive(Default)]
struct State {
    posts: Vec<Post>,
    projects: Vec<Project>,
    categories: Vec<Category>,
    authors: Vec<Author>,
    testimonials: Vec<Testimonial>,
    services: Vec<Service>,
    leads: Vec<Lead>,
    next_id: i64,
    writes: usize,
    reads: usize,
    fail_reads: bool,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    /// Monotonic fake clock so insertion order is also creation order.
    fn now(&self) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(self.next_id)
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

fn page<T: Clone>(mut items: Vec<T>, filter: &ContentFilter) -> ListResult<T> {
    let total = items.len() as u64;
    if let Some((limit, offset)) = filter.limit_offset() {
        items = items
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
    }
    ListResult::new(items, total)
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of mutations that reached the store.
    pub fn writes(&self) -> usize {
        self.state.lock().unwrap().writes
    }

    pub fn reads(&self) -> usize {
        self.state.lock().unwrap().reads
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.state.lock().unwrap().fail_reads = fail;
    }

    pub fn posts(&self) -> Vec<Post> {
        self.state.lock().unwrap().posts.clone()
    }

    pub fn projects(&self) -> Vec<Project> {
        self.state.lock().unwrap().projects.clone()
    }

    pub fn leads(&self) -> Vec<Lead> {
        self.state.lock().unwrap().leads.clone()
    }

    pub fn add_service(&self, service: Service) {
        self.state.lock().unwrap().services.push(service);
    }

    fn read(&self) -> Result<std::sync::MutexGuard<'_, State>, AppError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_reads {
            return Err(AppError::DatabaseError(sqlx::Error::PoolTimedOut));
        }
        state.reads += 1;
        Ok(state)
    }

    fn missing(content_type: ContentType, id: i64) -> AppError {
        AppError::NotFound {
            content_type,
            key: id.to_string(),
        }
    }
}

impl ContentStore for MemoryStore {
    async fn list_posts(&self, filter: &ContentFilter) -> Result<ListResult<Post>, AppError> {
        let state = self.read()?;
        let mut posts: Vec<Post> = state
            .posts
            .iter()
            .cloned()
            .map(|mut p| {
                p.category = state
                    .categories
                    .iter()
                    .find(|c| Some(c.id) == p.category_id)
                    .cloned();
                p.author = state
                    .authors
                    .iter()
                    .find(|a| Some(a.id) == p.author_id)
                    .cloned();
                p
            })
            .filter(|p| filter.published.is_none_or(|v| p.published == v))
            .filter(|p| filter.featured.is_none_or(|v| p.featured == v))
            .filter(|p| {
                filter
                    .search_term()
                    .is_none_or(|s| contains(&p.title, s) || contains(&p.content, s))
            })
            .filter(|p| {
                filter.category.as_deref().is_none_or(|slug| {
                    p.category.as_ref().is_some_and(|c| c.slug == slug)
                })
            })
            .collect();

        let ordering = filter.ordering_or_default();
        posts.sort_by(|a, b| {
            let ord = match ordering.field.as_str() {
                "title" => a.title.cmp(&b.title),
                "published_at" => a.published_at.cmp(&b.published_at),
                _ => a.created_at.cmp(&b.created_at),
            };
            match ordering.direction {
                Direction::Ascending => ord,
                Direction::Descending => ord.reverse(),
            }
        });

        Ok(page(posts, filter))
    }

    async fn find_published_post(&self, slug: &str) -> Result<Option<Post>, AppError> {
        let filter = ContentFilter::published_only();
        let posts = self.list_posts(&filter).await?;
        Ok(posts.items.into_iter().find(|p| p.slug == slug))
    }

    async fn list_projects(&self, filter: &ContentFilter) -> Result<ListResult<Project>, AppError> {
        let state = self.read()?;
        let mut projects: Vec<Project> = state
            .projects
            .iter()
            .filter(|p| filter.published.is_none_or(|v| p.published == v))
            .filter(|p| filter.featured.is_none_or(|v| p.featured == v))
            .filter(|p| filter.status.as_deref().is_none_or(|s| p.status.as_str() == s))
            .filter(|p| {
                filter
                    .search_term()
                    .is_none_or(|s| contains(&p.title, s) || contains(&p.description, s))
            })
            .cloned()
            .collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page(projects, filter))
    }

    async fn find_published_project(&self, slug: &str) -> Result<Option<Project>, AppError> {
        let projects = self.list_projects(&ContentFilter::published_only()).await?;
        Ok(projects.items.into_iter().find(|p| p.slug == slug))
    }

    async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        let state = self.read()?;
        let mut categories = state.categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn list_authors(&self) -> Result<Vec<Author>, AppError> {
        let state = self.read()?;
        let mut authors = state.authors.clone();
        authors.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(authors)
    }

    async fn list_testimonials(
        &self,
        filter: &ContentFilter,
    ) -> Result<ListResult<Testimonial>, AppError> {
        let state = self.read()?;
        let mut items: Vec<Testimonial> = state
            .testimonials
            .iter()
            .filter(|t| filter.published.is_none_or(|v| t.published == v))
            .filter(|t| filter.featured.is_none_or(|v| t.featured == v))
            .filter(|t| filter.rating.is_none_or(|v| t.rating == v))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page(items, filter))
    }

    async fn list_services(&self) -> Result<Vec<Service>, AppError> {
        let state = self.read()?;
        let mut services: Vec<Service> =
            state.services.iter().filter(|s| s.active).cloned().collect();
        services.sort_by_key(|s| s.order_index);
        Ok(services)
    }

    async fn slug_exists(
        &self,
        content_type: ContentType,
        slug: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, AppError> {
        let state = self.read()?;
        let other = |id: i64| exclude_id != Some(id);
        Ok(match content_type {
            ContentType::Post => state.posts.iter().any(|p| p.slug == slug && other(p.id)),
            ContentType::Project => state.projects.iter().any(|p| p.slug == slug && other(p.id)),
            ContentType::Category => state
                .categories
                .iter()
                .any(|c| c.slug == slug && other(c.id)),
            ContentType::Author | ContentType::Testimonial => false,
        })
    }

    async fn insert_post(&self, payload: &PostPayload) -> Result<i64, AppError> {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        let now = state.now();
        state.writes += 1;
        state.posts.push(Post {
            id,
            title: payload.title.clone(),
            slug: payload.slug.clone(),
            excerpt: payload.excerpt.clone(),
            content: payload.content.clone(),
            featured_image_url: payload.featured_image_url.clone(),
            category_id: payload.category_id,
            author_id: payload.author_id,
            featured: payload.featured,
            published: payload.published,
            published_at: payload.published.then_some(now),
            read_time: payload.read_time,
            tags: payload.tags.clone(),
            meta_title: payload.meta_title.clone(),
            meta_description: payload.meta_description.clone(),
            created_at: now,
            updated_at: now,
            category: None,
            author: None,
        });
        Ok(id)
    }

    async fn update_post(&self, id: i64, payload: &PostPayload) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        state.writes += 1;
        let post = state
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| Self::missing(ContentType::Post, id))?;
        post.title = payload.title.clone();
        post.slug = payload.slug.clone();
        post.excerpt = payload.excerpt.clone();
        post.content = payload.content.clone();
        post.featured_image_url = payload.featured_image_url.clone();
        post.category_id = payload.category_id;
        post.author_id = payload.author_id;
        post.featured = payload.featured;
        post.published = payload.published;
        post.read_time = payload.read_time;
        post.tags = payload.tags.clone();
        post.meta_title = payload.meta_title.clone();
        post.meta_description = payload.meta_description.clone();
        Ok(())
    }

    async fn insert_project(&self, payload: &ProjectPayload) -> Result<i64, AppError> {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        let now = state.now();
        state.writes += 1;
        state.projects.push(Project {
            id,
            title: payload.title.clone(),
            slug: payload.slug.clone(),
            description: payload.description.clone(),
            featured_image_url: payload.featured_image_url.clone(),
            project_url: payload.project_url.clone(),
            github_url: payload.github_url.clone(),
            technologies: payload.technologies.clone(),
            status: payload.status,
            featured: payload.featured,
            published: payload.published,
            start_date: payload.start_date,
            client_name: payload.client_name.clone(),
            challenge: None,
            solution: None,
            results: None,
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }

    async fn update_project(&self, id: i64, payload: &ProjectPayload) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        state.writes += 1;
        let project = state
            .projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| Self::missing(ContentType::Project, id))?;
        project.title = payload.title.clone();
        project.slug = payload.slug.clone();
        project.description = payload.description.clone();
        project.featured_image_url = payload.featured_image_url.clone();
        project.project_url = payload.project_url.clone();
        project.github_url = payload.github_url.clone();
        project.technologies = payload.technologies.clone();
        project.status = payload.status;
        project.featured = payload.featured;
        project.published = payload.published;
        project.start_date = payload.start_date;
        project.client_name = payload.client_name.clone();
        Ok(())
    }

    async fn insert_category(&self, payload: &CategoryPayload) -> Result<i64, AppError> {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.writes += 1;
        state.categories.push(Category {
            id,
            name: payload.name.clone(),
            slug: payload.slug.clone(),
            description: payload.description.clone(),
            color: payload.color.clone(),
        });
        Ok(id)
    }

    async fn update_category(&self, id: i64, payload: &CategoryPayload) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        state.writes += 1;
        let category = state
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| Self::missing(ContentType::Category, id))?;
        category.name = payload.name.clone();
        category.slug = payload.slug.clone();
        category.description = payload.description.clone();
        category.color = payload.color.clone();
        Ok(())
    }

    async fn insert_author(&self, payload: &AuthorPayload) -> Result<i64, AppError> {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        state.writes += 1;
        state.authors.push(Author {
            id,
            name: payload.name.clone(),
            email: payload.email.clone(),
            bio: payload.bio.clone(),
            avatar_url: payload.avatar_url.clone(),
        });
        Ok(id)
    }

    async fn update_author(&self, id: i64, payload: &AuthorPayload) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        state.writes += 1;
        let author = state
            .authors
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| Self::missing(ContentType::Author, id))?;
        author.name = payload.name.clone();
        author.email = payload.email.clone();
        author.bio = payload.bio.clone();
        author.avatar_url = payload.avatar_url.clone();
        Ok(())
    }

    async fn insert_testimonial(&self, payload: &TestimonialPayload) -> Result<i64, AppError> {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        let now = state.now();
        state.writes += 1;
        state.testimonials.push(Testimonial {
            id,
            client_name: payload.client_name.clone(),
            client_title: payload.client_title.clone(),
            client_company: payload.client_company.clone(),
            client_avatar_url: payload.client_avatar_url.clone(),
            content: payload.content.clone(),
            rating: payload.rating,
            featured: payload.featured,
            published: payload.published,
            created_at: now,
        });
        Ok(id)
    }

    async fn update_testimonial(
        &self,
        id: i64,
        payload: &TestimonialPayload,
    ) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        state.writes += 1;
        let item = state
            .testimonials
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| Self::missing(ContentType::Testimonial, id))?;
        item.client_name = payload.client_name.clone();
        item.client_title = payload.client_title.clone();
        item.client_company = payload.client_company.clone();
        item.client_avatar_url = payload.client_avatar_url.clone();
        item.content = payload.content.clone();
        item.rating = payload.rating;
        item.featured = payload.featured;
        item.published = payload.published;
        Ok(())
    }

    async fn set_flag(
        &self,
        content_type: ContentType,
        id: i64,
        flag: ContentFlag,
        value: bool,
    ) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        state.writes += 1;
        let target = match content_type {
            ContentType::Post => state
                .posts
                .iter_mut()
                .find(|p| p.id == id)
                .map(|p| (&mut p.published, &mut p.featured)),
            ContentType::Project => state
                .projects
                .iter_mut()
                .find(|p| p.id == id)
                .map(|p| (&mut p.published, &mut p.featured)),
            ContentType::Testimonial => state
                .testimonials
                .iter_mut()
                .find(|t| t.id == id)
                .map(|t| (&mut t.published, &mut t.featured)),
            ContentType::Category | ContentType::Author => None,
        };
        let (published, featured) = target.ok_or_else(|| Self::missing(content_type, id))?;
        match flag {
            ContentFlag::Published => *published = value,
            ContentFlag::Featured => *featured = value,
        }
        Ok(())
    }

    async fn delete(&self, content_type: ContentType, id: i64) -> Result<bool, AppError> {
        let mut state = self.state.lock().unwrap();
        state.writes += 1;
        let before = match content_type {
            ContentType::Post => state.posts.len(),
            ContentType::Project => state.projects.len(),
            ContentType::Category => state.categories.len(),
            ContentType::Author => state.authors.len(),
            ContentType::Testimonial => state.testimonials.len(),
        };
        let after = match content_type {
            ContentType::Post => {
                state.posts.retain(|p| p.id != id);
                state.posts.len()
            }
            ContentType::Project => {
                state.projects.retain(|p| p.id != id);
                state.projects.len()
            }
            ContentType::Category => {
                state.categories.retain(|c| c.id != id);
                state.categories.len()
            }
            ContentType::Author => {
                state.authors.retain(|a| a.id != id);
                state.authors.len()
            }
            ContentType::Testimonial => {
                state.testimonials.retain(|t| t.id != id);
                state.testimonials.len()
            }
        };
        Ok(after < before)
    }

    async fn insert_lead(&self, lead: &NewLead) -> Result<Uuid, AppError> {
        let mut state = self.state.lock().unwrap();
        let id = Uuid::new_v4();
        let now = state.now();
        state.writes += 1;
        state.leads.push(Lead {
            id,
            name: lead.name.clone(),
            email: lead.email.clone(),
            phone: lead.phone.clone(),
            company: lead.company.clone(),
            website: lead.website.clone(),
            project_type: lead.project_type.clone(),
            budget_range: lead.budget_range.clone(),
            timeline: lead.timeline.clone(),
            goals: lead.goals.clone(),
            details: lead.details.clone(),
            file_url: lead.file_url.clone(),
            created_at: now,
        });
        Ok(id)
    }

    async fn list_leads(&self) -> Result<Vec<Lead>, AppError> {
        let state = self.read()?;
        let mut leads = state.leads.clone();
        leads.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(leads)
    }
}

/// Object storage double that records keys and can be told to fail.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    uploads: Arc<Mutex<Vec<(String, String, usize)>>>,
    fail: Arc<Mutex<Option<String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(reason: &str) -> Self {
        let storage = Self::default();
        *storage.fail.lock().unwrap() = Some(reason.to_string());
        storage
    }

    /// `(bucket, key, byte length)` of every successful upload.
    pub fn uploads(&self) -> Vec<(String, String, usize)> {
        self.uploads.lock().unwrap().clone()
    }
}

impl ObjectStorage for MemoryStorage {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        _content_type: Option<&str>,
    ) -> Result<(), AppError> {
        if let Some(reason) = self.fail.lock().unwrap().clone() {
            return Err(AppError::UploadError(reason));
        }
        self.uploads
            .lock()
            .unwrap()
            .push((bucket.to_string(), key.to_string(), bytes.len()));
        Ok(())
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("https://cdn.test/{}/{}", bucket, key)
    }
}

/// Auth double accepting a single email/password pair.
#[derive(Clone)]
pub struct StaticAuth {
    pub email: String,
    pub password: String,
}

impl StaticAuth {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
        }
    }
}

impl AuthProvider for StaticAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AppError> {
        if email == self.email && password == self.password {
            Ok(Session {
                access_token: "token".to_string(),
                refresh_token: None,
                user_id: "user-1".to_string(),
                email: Some(email.to_string()),
                expires_at: None,
            })
        } else {
            Err(AppError::AuthError("Invalid login credentials".to_string()))
        }
    }

    async fn sign_out(&self, _session: &Session) -> Result<(), AppError> {
        Ok(())
    }

    async fn update_password(&self, _session: &Session, new_password: &str) -> Result<(), AppError> {
        if new_password.len() < 6 {
            return Err(AppError::AuthError("Password too short".to_string()));
        }
        Ok(())
    }

    async fn request_password_reset(&self, _email: &str) -> Result<(), AppError> {
        Ok(())
    }
}

pub fn signed_in_session() -> crate::session::SessionContext {
    let ctx = crate::session::SessionContext::new();
    ctx.set_session(Some(Session {
        access_token: "token".to_string(),
        refresh_token: None,
        user_id: "user-1".to_string(),
        email: Some("admin@styragon.test".to_string()),
        expires_at: None,
    }));
    ctx
}
