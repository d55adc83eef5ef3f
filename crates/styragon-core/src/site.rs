//! Read-only public surfaces of the marketing site.
//!
//! List surfaces never fail: a store error is logged and the surface renders
//! empty. Single-record lookups return [`AppError::NotFound`] so the host can
//! show its not-found page.

use chrono::{DateTime, Utc};
use futures::future::join;
use serde::Serialize;
use tracing::warn;

use crate::config::SiteConfig;
use crate::listing::ListingState;
use crate::models::{Category, ContentType, Post, Project, Service, Testimonial};
use crate::pagination::{paginate, Pagination};
use crate::query::{ContentFilter, ListResult, Ordering};
use crate::selection::{select_for_display, CategorySelection, DisplaySet};
use crate::traits::ContentStore;
use crate::AppError;

/// Static routes listed in the sitemap before the post routes.
pub const STATIC_ROUTES: [&str; 3] = ["", "/blog", "/blog-section"];

/// One page of the blog index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlogIndexPage {
    pub posts: Vec<Post>,
    /// Every category, for the selector.
    pub categories: Vec<Category>,
    pub pagination: Pagination,
}

/// The condensed blog listing on the homepage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlogSection {
    pub display: DisplaySet<Post>,
    /// Selector labels: "All" followed by every category name.
    pub category_labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SitemapEntry {
    pub url: String,
    pub last_modified: DateTime<Utc>,
    pub change_frequency: &'static str,
    pub priority: f32,
}

/// Public-facing queries over a [`ContentStore`].
#[derive(Clone)]
pub struct SiteService<S: ContentStore> {
    store: S,
    config: SiteConfig,
}

fn or_empty<T: Default>(surface: &'static str, result: Result<T, AppError>) -> T {
    result.unwrap_or_else(|e| {
        warn!(surface, error = %e, "store query failed, rendering empty");
        T::default()
    })
}

impl<S: ContentStore> SiteService<S> {
    pub fn new(store: S, config: SiteConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// The paginated blog index for the current listing state.
    ///
    /// Published posts only, newest publication first. A requested page past
    /// the end is clamped and fetched again once.
    pub async fn blog_index(&self, state: &mut ListingState) -> BlogIndexPage {
        let categories = or_empty("blog_index", self.store.list_categories().await);

        let slug = match state.category() {
            CategorySelection::All => None,
            CategorySelection::Named(wanted) => {
                match categories
                    .iter()
                    .find(|c| c.name.eq_ignore_ascii_case(wanted) || c.slug == *wanted)
                {
                    Some(category) => Some(category.slug.clone()),
                    None => {
                        return BlogIndexPage {
                            posts: Vec::new(),
                            categories,
                            pagination: paginate(0, state.page_size(), 1),
                        };
                    }
                }
            }
        };

        let requested = state.requested_page();
        let ticket = state.begin_load();
        let mut result: ListResult<Post> = or_empty(
            "blog_index",
            self.store.list_posts(&state.to_filter(slug.as_deref())).await,
        );
        let pagination = state
            .complete_load(ticket, result.total_count)
            .unwrap_or_else(|| paginate(result.total_count, state.page_size(), requested));

        if pagination.effective_page != requested {
            result = or_empty(
                "blog_index",
                self.store.list_posts(&state.to_filter(slug.as_deref())).await,
            );
        }

        BlogIndexPage {
            posts: result.items,
            categories,
            pagination,
        }
    }

    /// A published post by slug.
    pub async fn post(&self, slug: &str) -> Result<Post, AppError> {
        self.store
            .find_published_post(slug)
            .await?
            .ok_or_else(|| AppError::NotFound {
                content_type: ContentType::Post,
                key: slug.to_string(),
            })
    }

    /// A published project by slug.
    pub async fn project(&self, slug: &str) -> Result<Project, AppError> {
        self.store
            .find_published_project(slug)
            .await?
            .ok_or_else(|| AppError::NotFound {
                content_type: ContentType::Project,
                key: slug.to_string(),
            })
    }

    /// Featured-first homepage listing with the display-slot cap.
    pub async fn blog_section(&self, selection: &CategorySelection) -> BlogSection {
        let filter = ContentFilter::published_only();
        let (posts, categories) =
            join(self.store.list_posts(&filter), self.store.list_categories()).await;

        let posts: ListResult<Post> = or_empty("blog_section", posts);
        let categories: Vec<Category> = or_empty("blog_section", categories);

        let category_labels = std::iter::once("All".to_string())
            .chain(categories.into_iter().map(|c| c.name))
            .collect();

        BlogSection {
            display: select_for_display(posts.items, selection),
            category_labels,
        }
    }

    /// Featured, published projects, newest first.
    pub async fn case_studies(&self) -> Vec<Project> {
        let filter = ContentFilter {
            published: Some(true),
            featured: Some(true),
            ..ContentFilter::default()
        };
        or_empty("case_studies", self.store.list_projects(&filter).await).items
    }

    /// Published testimonials, featured first, then newest first.
    pub async fn testimonials(&self) -> Vec<Testimonial> {
        let filter = ContentFilter {
            published: Some(true),
            ordering: Some(Ordering::desc("created_at")),
            ..ContentFilter::default()
        };
        let mut items = or_empty("testimonials", self.store.list_testimonials(&filter).await).items;
        // Stable, so creation order survives within each group.
        items.sort_by_key(|t| !t.featured);
        items
    }

    /// Active services in display order.
    pub async fn services(&self) -> Vec<Service> {
        or_empty("services", self.store.list_services().await)
    }

    /// Static routes stamped with `now`, then one route per published post.
    pub async fn sitemap(&self, now: DateTime<Utc>) -> Vec<SitemapEntry> {
        let origin = self.config.origin();

        let mut entries: Vec<SitemapEntry> = STATIC_ROUTES
            .iter()
            .map(|route| SitemapEntry {
                url: format!("{}{}", origin, route),
                last_modified: now,
                change_frequency: "weekly",
                priority: if route.is_empty() { 1.0 } else { 0.7 },
            })
            .collect();

        let posts = or_empty(
            "sitemap",
            self.store.list_posts(&ContentFilter::published_only()).await,
        );
        entries.extend(posts.items.into_iter().map(|post| SitemapEntry {
            url: format!("{}/blog/{}", origin, post.slug),
            last_modified: post.updated_at.max(post.created_at),
            change_frequency: "weekly",
            priority: 0.8,
        }));

        entries
    }

    pub fn robots(&self) -> String {
        let origin = self.config.origin();
        format!(
            "User-agent: *\nAllow: /\n\nSitemap: {origin}/sitemap.xml\nHost: {origin}\n"
        )
    }
}

/// Renders sitemap entries as a `urlset` document.
pub fn render_sitemap(entries: &[SitemapEntry]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for entry in entries {
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&entry.url)));
        xml.push_str(&format!(
            "    <lastmod>{}</lastmod>\n",
            entry.last_modified.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
        ));
        xml.push_str(&format!(
            "    <changefreq>{}</changefreq>\n",
            entry.change_frequency
        ));
        xml.push_str(&format!("    <priority>{:.1}</priority>\n", entry.priority));
        xml.push_str("  </url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
