//! Styragon Core - content rules of the Styragon marketing site.
//!
//! Models, errors and configuration, plus the pure engines (slugs,
//! featured-first selection, pagination) and the stateful flows built on the
//! backend traits (admin lifecycle, lead capture, public surfaces).

pub mod admin;
pub mod config;
pub mod error;
pub mod leads;
pub mod listing;
pub mod models;
pub mod pagination;
pub mod query;
pub mod selection;
pub mod session;
pub mod site;
pub mod slug;
pub mod traits;
pub mod upload;

#[cfg(test)]
mod testing;

pub use admin::{AdminEntity, AdminFilter, AdminPanel, AdminView, StatusFilter};
pub use config::{default_config_path, load_site_config, DbConfig, HttpConfig, SiteConfig, StorageConfig};
pub use error::{AppError, ErrorKind, ValidationError};
pub use leads::{LeadForm, LeadService};
pub use listing::ListingState;
pub use models::{
    Author, Category, ContentFlag, ContentType, Lead, NewLead, Post, Project, ProjectStatus,
    Service, ServiceIcon, Testimonial,
};
pub use pagination::{paginate, Pagination};
pub use query::{ContentFilter, ListResult, Ordering};
pub use selection::{select_for_display, CategorySelection, DisplaySet};
pub use session::{Session, SessionContext, SessionEvent, Subscription};
pub use site::{render_sitemap, SiteService};
pub use slug::{ensure_unique, generate_slug};
pub use traits::{AuthProvider, ContentStore, ObjectStorage};
pub use upload::{ImageUploader, UploadDestination, UploadFile};
