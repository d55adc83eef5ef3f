//! Binds each managed record type to its form and store calls.

use std::future::Future;

use crate::admin::forms::{
    AdminForm, AuthorForm, CategoryForm, PostForm, ProjectForm, TestimonialForm,
};
use crate::models::{Author, Category, ContentType, Post, Project, Testimonial};
use crate::query::{ContentFilter, Ordering};
use crate::traits::ContentStore;
use crate::upload::UploadDestination;
use crate::AppError;

/// Write payload of an entity's form.
pub type PayloadOf<E> = <<E as AdminEntity>::Form as AdminForm>::Payload;

/// A record type the admin panel can list, create, edit and delete.
pub trait AdminEntity: Clone + Send + Sync + 'static {
    const CONTENT_TYPE: ContentType;

    /// Where a picked image for this type is uploaded, if it has one.
    const IMAGE_DESTINATION: Option<UploadDestination>;

    type Form: AdminForm;

    fn id(&self) -> i64;

    /// Form pre-filled from the record.
    fn to_form(&self) -> Self::Form;

    /// Primary title followed by the secondary text searched by the list filter.
    fn search_fields(&self) -> [&str; 2];

    /// `None` for types without a published flag.
    fn published(&self) -> Option<bool> {
        None
    }

    /// `None` for types without a featured flag.
    fn featured(&self) -> Option<bool> {
        None
    }

    /// Every record, newest first where the type has a creation time.
    fn fetch_all<S: ContentStore>(
        store: &S,
    ) -> impl Future<Output = Result<Vec<Self>, AppError>> + Send;

    fn insert<S: ContentStore>(
        store: &S,
        payload: &PayloadOf<Self>,
    ) -> impl Future<Output = Result<i64, AppError>> + Send;

    fn update<S: ContentStore>(
        store: &S,
        id: i64,
        payload: &PayloadOf<Self>,
    ) -> impl Future<Output = Result<(), AppError>> + Send;
}

fn admin_listing() -> ContentFilter {
    ContentFilter {
        ordering: Some(Ordering::default()),
        ..ContentFilter::default()
    }
}

impl AdminEntity for Post {
    const CONTENT_TYPE: ContentType = ContentType::Post;
    const IMAGE_DESTINATION: Option<UploadDestination> = Some(UploadDestination::Post);
    type Form = PostForm;

    fn id(&self) -> i64 {
        self.id
    }

    fn to_form(&self) -> PostForm {
        PostForm {
            title: self.title.clone(),
            slug: self.slug.clone(),
            excerpt: self.excerpt.clone(),
            content: self.content.clone(),
            featured_image_url: self.featured_image_url.clone(),
            category_id: self.category_id,
            author_id: self.author_id,
            featured: self.featured,
            published: self.published,
            read_time: self.read_time,
            tags: self.tags.clone(),
            meta_title: self.meta_title.clone(),
            meta_description: self.meta_description.clone(),
        }
    }

    fn search_fields(&self) -> [&str; 2] {
        [self.title.as_str(), self.excerpt.as_str()]
    }

    fn published(&self) -> Option<bool> {
        Some(self.published)
    }

    fn featured(&self) -> Option<bool> {
        Some(self.featured)
    }

    async fn fetch_all<S: ContentStore>(store: &S) -> Result<Vec<Self>, AppError> {
        Ok(store.list_posts(&admin_listing()).await?.items)
    }

    async fn insert<S: ContentStore>(store: &S, payload: &PayloadOf<Self>) -> Result<i64, AppError> {
        store.insert_post(payload).await
    }

    async fn update<S: ContentStore>(
        store: &S,
        id: i64,
        payload: &PayloadOf<Self>,
    ) -> Result<(), AppError> {
        store.update_post(id, payload).await
    }
}

impl AdminEntity for Project {
    const CONTENT_TYPE: ContentType = ContentType::Project;
    const IMAGE_DESTINATION: Option<UploadDestination> = Some(UploadDestination::Project);
    type Form = ProjectForm;

    fn id(&self) -> i64 {
        self.id
    }

    fn to_form(&self) -> ProjectForm {
        ProjectForm {
            title: self.title.clone(),
            slug: self.slug.clone(),
            description: self.description.clone(),
            featured_image_url: self.featured_image_url.clone(),
            project_url: self.project_url.clone(),
            github_url: self.github_url.clone(),
            technologies: self.technologies.clone(),
            status: self.status,
            featured: self.featured,
            published: self.published,
            start_date: self.start_date,
            client_name: self.client_name.clone(),
        }
    }

    fn search_fields(&self) -> [&str; 2] {
        [self.title.as_str(), self.description.as_str()]
    }

    fn published(&self) -> Option<bool> {
        Some(self.published)
    }

    fn featured(&self) -> Option<bool> {
        Some(self.featured)
    }

    async fn fetch_all<S: ContentStore>(store: &S) -> Result<Vec<Self>, AppError> {
        Ok(store.list_projects(&admin_listing()).await?.items)
    }

    async fn insert<S: ContentStore>(store: &S, payload: &PayloadOf<Self>) -> Result<i64, AppError> {
        store.insert_project(payload).await
    }

    async fn update<S: ContentStore>(
        store: &S,
        id: i64,
        payload: &PayloadOf<Self>,
    ) -> Result<(), AppError> {
        store.update_project(id, payload).await
    }
}

impl AdminEntity for Category {
    const CONTENT_TYPE: ContentType = ContentType::Category;
    const IMAGE_DESTINATION: Option<UploadDestination> = None;
    type Form = CategoryForm;

    fn id(&self) -> i64 {
        self.id
    }

    fn to_form(&self) -> CategoryForm {
        CategoryForm {
            name: self.name.clone(),
            slug: self.slug.clone(),
            description: self.description.clone(),
            color: self.color.clone(),
        }
    }

    fn search_fields(&self) -> [&str; 2] {
        [self.name.as_str(), self.description.as_deref().unwrap_or_default()]
    }

    async fn fetch_all<S: ContentStore>(store: &S) -> Result<Vec<Self>, AppError> {
        store.list_categories().await
    }

    async fn insert<S: ContentStore>(store: &S, payload: &PayloadOf<Self>) -> Result<i64, AppError> {
        store.insert_category(payload).await
    }

    async fn update<S: ContentStore>(
        store: &S,
        id: i64,
        payload: &PayloadOf<Self>,
    ) -> Result<(), AppError> {
        store.update_category(id, payload).await
    }
}

impl AdminEntity for Author {
    const CONTENT_TYPE: ContentType = ContentType::Author;
    const IMAGE_DESTINATION: Option<UploadDestination> = Some(UploadDestination::Avatar);
    type Form = AuthorForm;

    fn id(&self) -> i64 {
        self.id
    }

    fn to_form(&self) -> AuthorForm {
        AuthorForm {
            name: self.name.clone(),
            email: self.email.clone(),
            bio: self.bio.clone(),
            avatar_url: self.avatar_url.clone(),
        }
    }

    fn search_fields(&self) -> [&str; 2] {
        [self.name.as_str(), self.email.as_str()]
    }

    async fn fetch_all<S: ContentStore>(store: &S) -> Result<Vec<Self>, AppError> {
        store.list_authors().await
    }

    async fn insert<S: ContentStore>(store: &S, payload: &PayloadOf<Self>) -> Result<i64, AppError> {
        store.insert_author(payload).await
    }

    async fn update<S: ContentStore>(
        store: &S,
        id: i64,
        payload: &PayloadOf<Self>,
    ) -> Result<(), AppError> {
        store.update_author(id, payload).await
    }
}

impl AdminEntity for Testimonial {
    const CONTENT_TYPE: ContentType = ContentType::Testimonial;
    const IMAGE_DESTINATION: Option<UploadDestination> = Some(UploadDestination::Avatar);
    type Form = TestimonialForm;

    fn id(&self) -> i64 {
        self.id
    }

    fn to_form(&self) -> TestimonialForm {
        TestimonialForm {
            client_name: self.client_name.clone(),
            client_title: self.client_title.clone(),
            client_company: self.client_company.clone(),
            client_avatar_url: self.client_avatar_url.clone(),
            content: self.content.clone(),
            rating: self.rating,
            featured: self.featured,
            published: self.published,
        }
    }

    fn search_fields(&self) -> [&str; 2] {
        [self.client_name.as_str(), self.content.as_str()]
    }

    fn published(&self) -> Option<bool> {
        Some(self.published)
    }

    fn featured(&self) -> Option<bool> {
        Some(self.featured)
    }

    async fn fetch_all<S: ContentStore>(store: &S) -> Result<Vec<Self>, AppError> {
        Ok(store.list_testimonials(&admin_listing()).await?.items)
    }

    async fn insert<S: ContentStore>(store: &S, payload: &PayloadOf<Self>) -> Result<i64, AppError> {
        store.insert_testimonial(payload).await
    }

    async fn update<S: ContentStore>(
        store: &S,
        id: i64,
        payload: &PayloadOf<Self>,
    ) -> Result<(), AppError> {
        store.update_testimonial(id, payload).await
    }
}
