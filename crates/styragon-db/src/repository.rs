//! Content repository for the hosted PostgreSQL store.
//!
//! List queries are assembled with [`QueryBuilder`]: filter values are always
//! bound, and the only formatted fragments are table names and ordering
//! columns that passed [`Ordering::validate_for`].

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Pool, Postgres, QueryBuilder};
use styragon_core::error::{AppError, ValidationError};
use styragon_core::models::{
    Author, AuthorPayload, Category, CategoryPayload, ContentFlag, ContentType, Lead, NewLead,
    Post, PostPayload, Project, ProjectPayload, Service, ServiceIcon, Testimonial,
    TestimonialPayload,
};
use styragon_core::query::{ContentFilter, ListResult};
use styragon_core::traits::ContentStore;
use tracing::{debug, warn};
use uuid::Uuid;

/// Column lists for SELECT queries. Must remain const literals since they are
/// formatted into SQL.
const POST_COLUMNS: &str = "p.id, p.title, p.slug, p.excerpt, p.content, p.featured_image_url, \
     p.category_id, p.author_id, p.featured, p.published, p.published_at, p.read_time, p.tags, \
     p.meta_title, p.meta_description, p.created_at, p.updated_at";

const PROJECT_COLUMNS: &str = "id, title, slug, description, featured_image_url, project_url, \
     github_url, technologies, status, featured, published, start_date, client_name, challenge, \
     solution, results, created_at, updated_at";

const TESTIMONIAL_COLUMNS: &str = "id, client_name, client_title, client_company, \
     client_avatar_url, content, rating, featured, published, created_at";

/// Repository over the content tables.
///
/// # Examples
///
/// ```no_run
/// use sqlx::postgres::PgPoolOptions;
/// use styragon_db::ContentRepository;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = PgPoolOptions::new()
///     .max_connections(5)
///     .connect("postgresql://localhost/styragon")
///     .await?;
///
/// let repo = ContentRepository::new(pool);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ContentRepository {
    pool: Pool<Postgres>,
}

impl ContentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the schema in `migrations/`.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.into()))
    }

    /// Resolves category and author for each post with one query per table.
    async fn attach_relations(&self, posts: &mut [Post]) -> Result<(), AppError> {
        let category_ids: Vec<i64> = posts.iter().filter_map(|p| p.category_id).collect();
        let author_ids: Vec<i64> = posts.iter().filter_map(|p| p.author_id).collect();

        let categories: HashMap<i64, Category> = if category_ids.is_empty() {
            HashMap::new()
        } else {
            sqlx::query_as::<_, Category>(
                "SELECT id, name, slug, description, color FROM categories WHERE id = ANY($1)",
            )
            .bind(&category_ids)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::DatabaseError)?
            .into_iter()
            .map(|c| (c.id, c))
            .collect()
        };

        let authors: HashMap<i64, Author> = if author_ids.is_empty() {
            HashMap::new()
        } else {
            sqlx::query_as::<_, Author>(
                "SELECT id, name, email, bio, avatar_url FROM authors WHERE id = ANY($1)",
            )
            .bind(&author_ids)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::DatabaseError)?
            .into_iter()
            .map(|a| (a.id, a))
            .collect()
        };

        for post in posts.iter_mut() {
            post.category = post.category_id.and_then(|id| categories.get(&id).cloned());
            post.author = post.author_id.and_then(|id| authors.get(&id).cloned());
        }
        Ok(())
    }

    /// Total for a paged query; the page length otherwise.
    async fn total<'a>(
        &self,
        filter: &ContentFilter,
        mut count_query: QueryBuilder<'a, Postgres>,
        page_len: usize,
    ) -> Result<u64, AppError> {
        if filter.limit_offset().is_none() {
            return Ok(page_len as u64);
        }
        let count: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::DatabaseError)?;
        Ok(count.max(0) as u64)
    }
}

/// `%term%` with LIKE wildcards in the term escaped.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// ` ORDER BY ...` for `filter`, after checking the column whitelist.
fn order_clause(
    filter: &ContentFilter,
    content_type: ContentType,
    alias: &str,
) -> Result<String, AppError> {
    let ordering = filter.ordering_or_default();
    ordering.validate_for(content_type)?;
    Ok(format!(
        " ORDER BY {alias}{} {} NULLS LAST, {alias}id DESC",
        ordering.field,
        ordering.direction.as_sql(),
    ))
}

fn push_page(query: &mut QueryBuilder<'_, Postgres>, filter: &ContentFilter) {
    if let Some((limit, offset)) = filter.limit_offset() {
        query.push(" LIMIT ").push_bind(limit);
        query.push(" OFFSET ").push_bind(offset);
    }
}

fn post_query<'a>(select: &str, filter: &ContentFilter) -> QueryBuilder<'a, Postgres> {
    let mut query = QueryBuilder::new(select);
    query.push(" FROM blog_posts p LEFT JOIN categories c ON c.id = p.category_id WHERE TRUE");

    if let Some(published) = filter.published {
        query.push(" AND p.published = ").push_bind(published);
    }
    if let Some(featured) = filter.featured {
        query.push(" AND p.featured = ").push_bind(featured);
    }
    if let Some(term) = filter.search_term() {
        let pattern = like_pattern(term);
        query.push(" AND (p.title ILIKE ").push_bind(pattern.clone());
        query.push(" OR p.content ILIKE ").push_bind(pattern).push(")");
    }
    if let Some(slug) = filter.category.as_deref() {
        query.push(" AND c.slug = ").push_bind(slug.to_string());
    }
    query
}

fn project_query<'a>(select: &str, filter: &ContentFilter) -> QueryBuilder<'a, Postgres> {
    let mut query = QueryBuilder::new(select);
    query.push(" FROM projects WHERE TRUE");

    if let Some(published) = filter.published {
        query.push(" AND published = ").push_bind(published);
    }
    if let Some(featured) = filter.featured {
        query.push(" AND featured = ").push_bind(featured);
    }
    if let Some(status) = filter.status.as_deref() {
        query.push(" AND status = ").push_bind(status.to_string());
    }
    if let Some(term) = filter.search_term() {
        let pattern = like_pattern(term);
        query.push(" AND (title ILIKE ").push_bind(pattern.clone());
        query.push(" OR description ILIKE ").push_bind(pattern).push(")");
    }
    query
}

fn testimonial_query<'a>(select: &str, filter: &ContentFilter) -> QueryBuilder<'a, Postgres> {
    let mut query = QueryBuilder::new(select);
    query.push(" FROM testimonials WHERE TRUE");

    if let Some(published) = filter.published {
        query.push(" AND published = ").push_bind(published);
    }
    if let Some(featured) = filter.featured {
        query.push(" AND featured = ").push_bind(featured);
    }
    if let Some(rating) = filter.rating {
        query.push(" AND rating = ").push_bind(rating);
    }
    query
}

/// Maps a `UNIQUE(slug)` violation to [`AppError::DuplicateSlug`]; a
/// concurrent write can take the slug after the availability check.
fn write_error(content_type: ContentType, slug: &str, e: sqlx::Error) -> AppError {
    let unique_violation = e
        .as_database_error()
        .is_some_and(|db| db.is_unique_violation());
    if !unique_violation {
        return AppError::DatabaseError(e);
    }

    warn!(content_type = %content_type, slug = %slug, "slug taken by a concurrent write");
    AppError::DuplicateSlug {
        content_type,
        slug: slug.to_string(),
    }
}

fn not_found(content_type: ContentType, id: i64) -> AppError {
    AppError::NotFound {
        content_type,
        key: id.to_string(),
    }
}

impl ContentStore for ContentRepository {
    async fn list_posts(&self, filter: &ContentFilter) -> Result<ListResult<Post>, AppError> {
        let order = order_clause(filter, ContentType::Post, "p.")?;

        let mut query = post_query(&format!("SELECT {}", POST_COLUMNS), filter);
        query.push(order);
        push_page(&mut query, filter);

        let mut posts: Vec<Post> = query
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::DatabaseError)?;

        let total = self
            .total(filter, post_query("SELECT COUNT(*)", filter), posts.len())
            .await?;
        self.attach_relations(&mut posts).await?;

        debug!(count = posts.len(), total, "listed posts");
        Ok(ListResult::new(posts, total))
    }

    async fn find_published_post(&self, slug: &str) -> Result<Option<Post>, AppError> {
        let query = format!(
            "SELECT {} FROM blog_posts p WHERE p.slug = $1 AND p.published = TRUE",
            POST_COLUMNS
        );
        let post = sqlx::query_as::<_, Post>(&query)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::DatabaseError)?;

        match post {
            Some(post) => {
                let mut posts = [post];
                self.attach_relations(&mut posts).await?;
                let [post] = posts;
                Ok(Some(post))
            }
            None => Ok(None),
        }
    }

    async fn list_projects(&self, filter: &ContentFilter) -> Result<ListResult<Project>, AppError> {
        let order = order_clause(filter, ContentType::Project, "")?;

        let mut query = project_query(&format!("SELECT {}", PROJECT_COLUMNS), filter);
        query.push(order);
        push_page(&mut query, filter);

        let rows: Vec<ProjectRow> = query
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::DatabaseError)?;

        let projects = rows
            .into_iter()
            .map(Project::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let total = self
            .total(filter, project_query("SELECT COUNT(*)", filter), projects.len())
            .await?;
        Ok(ListResult::new(projects, total))
    }

    async fn find_published_project(&self, slug: &str) -> Result<Option<Project>, AppError> {
        let query = format!(
            "SELECT {} FROM projects WHERE slug = $1 AND published = TRUE",
            PROJECT_COLUMNS
        );
        let row = sqlx::query_as::<_, ProjectRow>(&query)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::DatabaseError)?;

        row.map(Project::try_from).transpose()
    }

    async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        sqlx::query_as::<_, Category>(
            "SELECT id, name, slug, description, color FROM categories ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::DatabaseError)
    }

    async fn list_authors(&self) -> Result<Vec<Author>, AppError> {
        sqlx::query_as::<_, Author>(
            "SELECT id, name, email, bio, avatar_url FROM authors ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::DatabaseError)
    }

    async fn list_testimonials(
        &self,
        filter: &ContentFilter,
    ) -> Result<ListResult<Testimonial>, AppError> {
        let order = order_clause(filter, ContentType::Testimonial, "")?;

        let mut query = testimonial_query(&format!("SELECT {}", TESTIMONIAL_COLUMNS), filter);
        query.push(order);
        push_page(&mut query, filter);

        let items: Vec<Testimonial> = query
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::DatabaseError)?;

        let total = self
            .total(filter, testimonial_query("SELECT COUNT(*)", filter), items.len())
            .await?;
        Ok(ListResult::new(items, total))
    }

    async fn list_services(&self) -> Result<Vec<Service>, AppError> {
        let rows: Vec<ServiceRow> = sqlx::query_as(
            r#"
            SELECT id, title, description, icon, order_index, active
            FROM services
            WHERE active = TRUE
            ORDER BY order_index ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::DatabaseError)?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id;
                Service::try_from(row)
                    .inspect_err(|e| warn!(service_id = %id, error = %e, "skipping service"))
                    .ok()
            })
            .collect())
    }

    async fn slug_exists(
        &self,
        content_type: ContentType,
        slug: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, AppError> {
        if !content_type.has_slug() {
            return Ok(false);
        }

        let query = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE slug = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
            content_type.table()
        );
        let (exists,): (bool,) = sqlx::query_as(&query)
            .bind(slug)
            .bind(exclude_id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::DatabaseError)?;

        Ok(exists)
    }

    async fn insert_post(&self, payload: &PostPayload) -> Result<i64, AppError> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO blog_posts (
                title, slug, excerpt, content, featured_image_url, category_id, author_id,
                featured, published, read_time, tags, meta_title, meta_description
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id
            "#,
        )
        .bind(&payload.title)
        .bind(&payload.slug)
        .bind(&payload.excerpt)
        .bind(&payload.content)
        .bind(&payload.featured_image_url)
        .bind(payload.category_id)
        .bind(payload.author_id)
        .bind(payload.featured)
        .bind(payload.published)
        .bind(payload.read_time)
        .bind(&payload.tags)
        .bind(&payload.meta_title)
        .bind(&payload.meta_description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error(ContentType::Post, &payload.slug, e))?;

        Ok(id)
    }

    async fn update_post(&self, id: i64, payload: &PostPayload) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE blog_posts SET
                title = $2, slug = $3, excerpt = $4, content = $5, featured_image_url = $6,
                category_id = $7, author_id = $8, featured = $9, published = $10,
                read_time = $11, tags = $12, meta_title = $13, meta_description = $14
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&payload.title)
        .bind(&payload.slug)
        .bind(&payload.excerpt)
        .bind(&payload.content)
        .bind(&payload.featured_image_url)
        .bind(payload.category_id)
        .bind(payload.author_id)
        .bind(payload.featured)
        .bind(payload.published)
        .bind(payload.read_time)
        .bind(&payload.tags)
        .bind(&payload.meta_title)
        .bind(&payload.meta_description)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(ContentType::Post, &payload.slug, e))?;

        if result.rows_affected() == 0 {
            return Err(not_found(ContentType::Post, id));
        }
        Ok(())
    }

    async fn insert_project(&self, payload: &ProjectPayload) -> Result<i64, AppError> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO projects (
                title, slug, description, featured_image_url, project_url, github_url,
                technologies, status, featured, published, start_date, client_name
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id
            "#,
        )
        .bind(&payload.title)
        .bind(&payload.slug)
        .bind(&payload.description)
        .bind(&payload.featured_image_url)
        .bind(&payload.project_url)
        .bind(&payload.github_url)
        .bind(&payload.technologies)
        .bind(payload.status.as_str())
        .bind(payload.featured)
        .bind(payload.published)
        .bind(payload.start_date)
        .bind(&payload.client_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error(ContentType::Project, &payload.slug, e))?;

        Ok(id)
    }

    async fn update_project(&self, id: i64, payload: &ProjectPayload) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE projects SET
                title = $2, slug = $3, description = $4, featured_image_url = $5,
                project_url = $6, github_url = $7, technologies = $8, status = $9,
                featured = $10, published = $11, start_date = $12, client_name = $13
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&payload.title)
        .bind(&payload.slug)
        .bind(&payload.description)
        .bind(&payload.featured_image_url)
        .bind(&payload.project_url)
        .bind(&payload.github_url)
        .bind(&payload.technologies)
        .bind(payload.status.as_str())
        .bind(payload.featured)
        .bind(payload.published)
        .bind(payload.start_date)
        .bind(&payload.client_name)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(ContentType::Project, &payload.slug, e))?;

        if result.rows_affected() == 0 {
            return Err(not_found(ContentType::Project, id));
        }
        Ok(())
    }

    async fn insert_category(&self, payload: &CategoryPayload) -> Result<i64, AppError> {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO categories (name, slug, description, color) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&payload.name)
        .bind(&payload.slug)
        .bind(&payload.description)
        .bind(&payload.color)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error(ContentType::Category, &payload.slug, e))?;

        Ok(id)
    }

    async fn update_category(&self, id: i64, payload: &CategoryPayload) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE categories SET name = $2, slug = $3, description = $4, color = $5 WHERE id = $1",
        )
        .bind(id)
        .bind(&payload.name)
        .bind(&payload.slug)
        .bind(&payload.description)
        .bind(&payload.color)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(ContentType::Category, &payload.slug, e))?;

        if result.rows_affected() == 0 {
            return Err(not_found(ContentType::Category, id));
        }
        Ok(())
    }

    async fn insert_author(&self, payload: &AuthorPayload) -> Result<i64, AppError> {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO authors (name, email, bio, avatar_url) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&payload.name)
        .bind(&payload.email)
        .bind(&payload.bio)
        .bind(&payload.avatar_url)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::DatabaseError)?;

        Ok(id)
    }

    async fn update_author(&self, id: i64, payload: &AuthorPayload) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE authors SET name = $2, email = $3, bio = $4, avatar_url = $5 WHERE id = $1",
        )
        .bind(id)
        .bind(&payload.name)
        .bind(&payload.email)
        .bind(&payload.bio)
        .bind(&payload.avatar_url)
        .execute(&self.pool)
        .await
        .map_err(AppError::DatabaseError)?;

        if result.rows_affected() == 0 {
            return Err(not_found(ContentType::Author, id));
        }
        Ok(())
    }

    async fn insert_testimonial(&self, payload: &TestimonialPayload) -> Result<i64, AppError> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO testimonials (
                client_name, client_title, client_company, client_avatar_url,
                content, rating, featured, published
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(&payload.client_name)
        .bind(&payload.client_title)
        .bind(&payload.client_company)
        .bind(&payload.client_avatar_url)
        .bind(&payload.content)
        .bind(payload.rating)
        .bind(payload.featured)
        .bind(payload.published)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::DatabaseError)?;

        Ok(id)
    }

    async fn update_testimonial(
        &self,
        id: i64,
        payload: &TestimonialPayload,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE testimonials SET
                client_name = $2, client_title = $3, client_company = $4,
                client_avatar_url = $5, content = $6, rating = $7, featured = $8, published = $9
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&payload.client_name)
        .bind(&payload.client_title)
        .bind(&payload.client_company)
        .bind(&payload.client_avatar_url)
        .bind(&payload.content)
        .bind(payload.rating)
        .bind(payload.featured)
        .bind(payload.published)
        .execute(&self.pool)
        .await
        .map_err(AppError::DatabaseError)?;

        if result.rows_affected() == 0 {
            return Err(not_found(ContentType::Testimonial, id));
        }
        Ok(())
    }

    async fn set_flag(
        &self,
        content_type: ContentType,
        id: i64,
        flag: ContentFlag,
        value: bool,
    ) -> Result<(), AppError> {
        if !content_type.has_flags() {
            return Err(ValidationError::UnsupportedFlag {
                content_type,
                flag: flag.column(),
            }
            .into());
        }

        let query = format!(
            "UPDATE {} SET {} = $1 WHERE id = $2",
            content_type.table(),
            flag.column()
        );
        let result = sqlx::query(&query)
            .bind(value)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::DatabaseError)?;

        if result.rows_affected() == 0 {
            return Err(not_found(content_type, id));
        }
        Ok(())
    }

    async fn delete(&self, content_type: ContentType, id: i64) -> Result<bool, AppError> {
        let query = format!("DELETE FROM {} WHERE id = $1", content_type.table());
        let result = sqlx::query(&query)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::DatabaseError)?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_lead(&self, lead: &NewLead) -> Result<Uuid, AppError> {
        let (id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO leads (
                name, email, phone, company, website, project_type,
                budget_range, timeline, goals, details, file_url
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id
            "#,
        )
        .bind(&lead.name)
        .bind(&lead.email)
        .bind(&lead.phone)
        .bind(&lead.company)
        .bind(&lead.website)
        .bind(&lead.project_type)
        .bind(&lead.budget_range)
        .bind(&lead.timeline)
        .bind(&lead.goals)
        .bind(&lead.details)
        .bind(&lead.file_url)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::DatabaseError)?;

        Ok(id)
    }

    async fn list_leads(&self) -> Result<Vec<Lead>, AppError> {
        sqlx::query_as::<_, Lead>(
            r#"
            SELECT id, name, email, phone, company, website, project_type, budget_range,
                   timeline, goals, details, file_url, created_at
            FROM leads
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::DatabaseError)
    }
}

/// Helper struct for project rows; `status` is stored as text.
#[derive(sqlx::FromRow)]
struct ProjectRow {
    id: i64,
    title: String,
    slug: String,
    description: String,
    featured_image_url: Option<String>,
    project_url: Option<String>,
    github_url: Option<String>,
    technologies: Vec<String>,
    status: String,
    featured: bool,
    published: bool,
    start_date: Option<NaiveDate>,
    client_name: Option<String>,
    challenge: Option<String>,
    solution: Option<String>,
    results: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProjectRow> for Project {
    type Error = AppError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        Ok(Project {
            status: row.status.parse()?,
            id: row.id,
            title: row.title,
            slug: row.slug,
            description: row.description,
            featured_image_url: row.featured_image_url,
            project_url: row.project_url,
            github_url: row.github_url,
            technologies: row.technologies,
            featured: row.featured,
            published: row.published,
            start_date: row.start_date,
            client_name: row.client_name,
            challenge: row.challenge,
            solution: row.solution,
            results: row.results,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Helper struct for service rows; `icon` is a free-text tag in the table.
#[derive(sqlx::FromRow)]
struct ServiceRow {
    id: Uuid,
    title: String,
    description: String,
    icon: Option<String>,
    order_index: i32,
    active: bool,
}

impl TryFrom<ServiceRow> for Service {
    type Error = ValidationError;

    fn try_from(row: ServiceRow) -> Result<Self, Self::Error> {
        let icon = row
            .icon
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse::<ServiceIcon>)
            .transpose()?;

        Ok(Service {
            id: row.id,
            title: row.title,
            description: row.description,
            icon,
            order_index: row.order_index,
            active: row.active,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use styragon_core::models::ProjectStatus;
    use styragon_core::query::Ordering;

    fn service_row(icon: Option<&str>) -> ServiceRow {
        ServiceRow {
            id: Uuid::new_v4(),
            title: "Web apps".to_string(),
            description: "We build them".to_string(),
            icon: icon.map(str::to_string),
            order_index: 1,
            active: true,
        }
    }

    #[test]
    fn test_post_query_binds_filters() {
        let filter = ContentFilter {
            search: Some("rust".to_string()),
            category: Some("design".to_string()),
            published: Some(true),
            ..ContentFilter::default()
        };
        let query = post_query("SELECT COUNT(*)", &filter);
        assert_eq!(
            query.sql(),
            "SELECT COUNT(*) FROM blog_posts p LEFT JOIN categories c ON c.id = p.category_id \
             WHERE TRUE AND p.published = $1 AND (p.title ILIKE $2 OR p.content ILIKE $3) \
             AND c.slug = $4"
        );
    }

    #[test]
    fn test_blank_search_adds_no_clause() {
        let filter = ContentFilter {
            search: Some("   ".to_string()),
            ..ContentFilter::default()
        };
        let query = project_query("SELECT id", &filter);
        assert_eq!(query.sql(), "SELECT id FROM projects WHERE TRUE");
    }

    #[test]
    fn test_project_status_filter() {
        let filter = ContentFilter {
            status: Some("in_progress".to_string()),
            featured: Some(true),
            ..ContentFilter::default()
        };
        let query = project_query("SELECT id", &filter);
        assert!(query.sql().ends_with("AND featured = $1 AND status = $2"));
    }

    #[test]
    fn test_testimonial_rating_filter() {
        let filter = ContentFilter {
            published: Some(true),
            rating: Some(5),
            ..ContentFilter::default()
        };
        let query = testimonial_query("SELECT id", &filter);
        assert_eq!(
            query.sql(),
            "SELECT id FROM testimonials WHERE TRUE AND published = $1 AND rating = $2"
        );
    }

    #[derive(Debug)]
    struct UniqueViolation;

    impl std::fmt::Display for UniqueViolation {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("duplicate key value violates unique constraint \"projects_slug_key\"")
        }
    }

    impl std::error::Error for UniqueViolation {}

    impl sqlx::error::DatabaseError for UniqueViolation {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint \"projects_slug_key\""
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            sqlx::error::ErrorKind::UniqueViolation
        }
    }

    #[test]
    fn test_unique_violation_maps_to_duplicate_slug() {
        let err = write_error(
            ContentType::Project,
            "site",
            sqlx::Error::Database(Box::new(UniqueViolation)),
        );
        assert!(matches!(
            err,
            AppError::DuplicateSlug { content_type: ContentType::Project, ref slug } if slug == "site"
        ));
    }

    #[test]
    fn test_other_write_errors_stay_database_errors() {
        let err = write_error(ContentType::Post, "hello", sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::DatabaseError(sqlx::Error::RowNotFound)));
    }

    #[test]
    fn test_paging_binds_limit_offset() {
        let filter = ContentFilter {
            page: Some(3),
            page_size: Some(9),
            ..ContentFilter::default()
        };
        let mut query = testimonial_query("SELECT id", &filter);
        push_page(&mut query, &filter);
        assert_eq!(
            query.sql(),
            "SELECT id FROM testimonials WHERE TRUE LIMIT $1 OFFSET $2"
        );
    }

    #[test]
    fn test_order_clause() {
        let filter = ContentFilter {
            ordering: Some(Ordering::desc("published_at")),
            ..ContentFilter::default()
        };
        assert_eq!(
            order_clause(&filter, ContentType::Post, "p.").unwrap(),
            " ORDER BY p.published_at DESC NULLS LAST, p.id DESC"
        );
        assert_eq!(
            order_clause(&ContentFilter::default(), ContentType::Project, "").unwrap(),
            " ORDER BY created_at DESC NULLS LAST, id DESC"
        );
    }

    #[test]
    fn test_order_clause_rejects_unlisted_column() {
        let filter = ContentFilter {
            ordering: Some(Ordering::asc("password")),
            ..ContentFilter::default()
        };
        let err = order_clause(&filter, ContentType::Post, "p.").unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::UnsupportedOrdering { .. })
        ));
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("plain"), "%plain%");
    }

    #[test]
    fn test_service_row_conversion() {
        let service = Service::try_from(service_row(Some("Layers"))).unwrap();
        assert_eq!(service.icon, Some(ServiceIcon::Layers));

        let service = Service::try_from(service_row(Some(" "))).unwrap();
        assert_eq!(service.icon, None);

        let err = Service::try_from(service_row(Some("Rocket"))).unwrap_err();
        assert_eq!(err, ValidationError::UnknownIcon("Rocket".to_string()));
    }

    #[test]
    fn test_project_row_conversion() {
        let now = Utc::now();
        let row = ProjectRow {
            id: 1,
            title: "Site".to_string(),
            slug: "site".to_string(),
            description: "A site".to_string(),
            featured_image_url: None,
            project_url: None,
            github_url: None,
            technologies: vec!["Rust".to_string()],
            status: "in_progress".to_string(),
            featured: false,
            published: true,
            start_date: None,
            client_name: None,
            challenge: None,
            solution: None,
            results: None,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(
            Project::try_from(row).unwrap().status,
            ProjectStatus::InProgress
        );
    }
}
