//! Filter, ordering and paging parameters for store queries.

use std::str::FromStr;

use serde::Serialize;

use crate::error::ValidationError;
use crate::models::ContentType;

/// Page size used by the public blog index.
pub const DEFAULT_PAGE_SIZE: u32 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Direction::Ascending => "ASC",
            Direction::Descending => "DESC",
        }
    }
}

/// Sort column plus direction.
///
/// Parsed from the `-field` / `field` notation used by list endpoints:
///
/// ```
/// use styragon_core::query::{Direction, Ordering};
///
/// let ordering: Ordering = "-published_at".parse().unwrap();
/// assert_eq!(ordering.field, "published_at");
/// assert_eq!(ordering.direction, Direction::Descending);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ordering {
    pub field: String,
    pub direction: Direction,
}

impl Ordering {
    pub fn asc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            direction: Direction::Ascending,
        }
    }

    pub fn desc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            direction: Direction::Descending,
        }
    }

    /// Checks the column against the whitelist for `content_type`.
    ///
    /// Column names end up formatted into SQL, so anything outside the
    /// whitelist is rejected here.
    pub fn validate_for(&self, content_type: ContentType) -> Result<(), ValidationError> {
        let allowed: &[&str] = match content_type {
            ContentType::Post => &[
                "created_at",
                "updated_at",
                "published_at",
                "title",
                "read_time",
            ],
            ContentType::Project => &["created_at", "updated_at", "start_date", "title"],
            ContentType::Category | ContentType::Author => &["name", "created_at"],
            ContentType::Testimonial => &["created_at", "rating", "client_name"],
        };

        if allowed.contains(&self.field.as_str()) {
            Ok(())
        } else {
            Err(ValidationError::UnsupportedOrdering {
                content_type,
                field: self.field.clone(),
            })
        }
    }
}

impl Default for Ordering {
    fn default() -> Self {
        Self::desc("created_at")
    }
}

impl FromStr for Ordering {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (field, direction) = match s.strip_prefix('-') {
            Some(rest) => (rest, Direction::Descending),
            None => (s, Direction::Ascending),
        };

        if field.is_empty() || !field.chars().all(|c| c.is_ascii_lowercase() || c == '_') {
            return Err(ValidationError::InvalidValue {
                field: "ordering",
                reason: format!("'{}' is not a column name", s),
            });
        }

        Ok(Self {
            field: field.to_string(),
            direction,
        })
    }
}

/// Server-side filter for public listing queries. All set filters are ANDed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentFilter {
    /// Case-insensitive substring over title and the secondary text field.
    pub search: Option<String>,
    /// Category slug (posts only).
    pub category: Option<String>,
    pub featured: Option<bool>,
    pub published: Option<bool>,
    /// Project status (projects only).
    pub status: Option<String>,
    /// Exact star rating (testimonials only).
    pub rating: Option<i32>,
    pub ordering: Option<Ordering>,
    /// 1-based page. `None` returns the whole filtered set.
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl ContentFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published_only() -> Self {
        Self {
            published: Some(true),
            ..Self::default()
        }
    }

    /// Search term with surrounding whitespace removed; blank terms count as unset.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn ordering_or_default(&self) -> Ordering {
        self.ordering.clone().unwrap_or_default()
    }

    pub fn page_size_or_default(&self) -> u32 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1)
    }

    /// SQL `(LIMIT, OFFSET)` for the requested page, if paging was asked for.
    pub fn limit_offset(&self) -> Option<(i64, i64)> {
        self.page.map(|page| {
            let size = i64::from(self.page_size_or_default());
            let page = i64::from(page.max(1));
            (size, (page - 1) * size)
        })
    }
}

/// Items plus the size of the whole filtered set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListResult<T> {
    pub items: Vec<T>,
    pub total_count: u64,
}

impl<T> ListResult<T> {
    pub fn new(items: Vec<T>, total_count: u64) -> Self {
        Self { items, total_count }
    }

    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
        }
    }
}

impl<T> Default for ListResult<T> {
    fn default() -> Self {
        Self::empty()
    }
}
