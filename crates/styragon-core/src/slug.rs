//! Slug derivation and uniqueness checks.

use tracing::debug;

use crate::models::ContentType;
use crate::traits::ContentStore;
use crate::AppError;

/// Derives a URL-safe slug from a title.
///
/// Lowercases, drops everything outside `[a-z0-9 -]`, turns whitespace runs
/// into a single hyphen, squeezes repeated hyphens and trims hyphens from
/// both ends. The output is a fixed point: feeding it back in returns it
/// unchanged.
///
/// ```
/// use styragon_core::slug::generate_slug;
///
/// assert_eq!(generate_slug("Hello,   World!! 2024"), "hello-world-2024");
/// assert_eq!(generate_slug("--Rust & You--"), "rust-you");
/// ```
pub fn generate_slug(title: &str) -> String {
    let kept: String = title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == ' ' || *c == '-')
        .collect();

    let mut slug = String::with_capacity(kept.len());
    for c in kept.chars() {
        let c = if c == ' ' { '-' } else { c };
        if c == '-' && (slug.is_empty() || slug.ends_with('-')) {
            continue;
        }
        slug.push(c);
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    slug
}

/// Returns true if no other record of `content_type` uses `slug`.
///
/// `exclude_id` is the record being edited, so an unchanged slug on update
/// does not collide with itself.
pub async fn is_unique<S: ContentStore>(
    store: &S,
    content_type: ContentType,
    slug: &str,
    exclude_id: Option<i64>,
) -> Result<bool, AppError> {
    let exists = store.slug_exists(content_type, slug, exclude_id).await?;
    Ok(!exists)
}

/// Fails with [`AppError::DuplicateSlug`] when the slug is taken.
///
/// Callers must not attempt the write when this returns an error.
pub async fn ensure_unique<S: ContentStore>(
    store: &S,
    content_type: ContentType,
    slug: &str,
    exclude_id: Option<i64>,
) -> Result<(), AppError> {
    if is_unique(store, content_type, slug, exclude_id).await? {
        Ok(())
    } else {
        debug!(%content_type, slug, ?exclude_id, "slug collision");
        Err(AppError::DuplicateSlug {
            content_type,
            slug: slug.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CategoryPayload;
    use crate::testing::MemoryStore;

    #[test]
    fn test_generate_slug_punctuation_and_spaces() {
        assert_eq!(generate_slug("Hello,   World!! 2024"), "hello-world-2024");
    }

    #[test]
    fn test_generate_slug_hyphen_runs() {
        assert_eq!(generate_slug("a - - b"), "a-b");
        assert_eq!(generate_slug("  leading and trailing  "), "leading-and-trailing");
        assert_eq!(generate_slug("---"), "");
    }

    #[test]
    fn test_generate_slug_drops_non_ascii_and_tabs() {
        assert_eq!(generate_slug("Café Déjà Vu"), "caf-dj-vu");
        assert_eq!(generate_slug("tab\tseparated"), "tabseparated");
    }

    #[test]
    fn test_generate_slug_idempotent() {
        let inputs = [
            "Hello,   World!! 2024",
            "  --Mixed CASE & symbols--  ",
            "already-a-slug",
            "",
            "Ünïcödé only",
            "a  -  b -- c",
        ];
        for input in inputs {
            let once = generate_slug(input);
            assert_eq!(generate_slug(&once), once, "input: {:?}", input);
        }
    }

    #[tokio::test]
    async fn test_ensure_unique_detects_collision() {
        let store = MemoryStore::new();
        let id = store
            .insert_category(&CategoryPayload {
                name: "Design".into(),
                slug: "design".into(),
                description: None,
                color: "#f59e0b".into(),
            })
            .await
            .unwrap();

        let err = ensure_unique(&store, ContentType::Category, "design", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateSlug { .. }));

        // Editing the same record keeps its own slug.
        assert!(ensure_unique(&store, ContentType::Category, "design", Some(id))
            .await
            .is_ok());

        // Slugs are scoped per content type.
        assert!(is_unique(&store, ContentType::Post, "design", None)
            .await
            .unwrap());
    }
}
