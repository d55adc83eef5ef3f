//! Which posts and projects a public listing shows.
//!
//! The unfiltered feed always surfaces every featured item and fills the
//! remaining display slots with regular items. Once a category is picked,
//! featured items fold back into the regular stream and the cap no longer
//! applies.

use serde::Serialize;

use crate::models::{Post, Project};

/// Maximum number of items (featured + regular) in the unfiltered listing.
pub const DISPLAY_SLOT_CAP: usize = 6;

/// Category selector of a listing surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategorySelection {
    #[default]
    All,
    Named(String),
}

impl CategorySelection {
    /// Parses user input; `"All"` (any case) or an empty string selects everything.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            CategorySelection::All
        } else {
            CategorySelection::Named(trimmed.to_string())
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, CategorySelection::All)
    }
}

/// An item that can appear on a selection-driven listing.
pub trait Selectable {
    fn is_featured(&self) -> bool;

    /// Whether the item belongs to the named category.
    fn in_category(&self, name: &str) -> bool;
}

impl Selectable for Post {
    fn is_featured(&self) -> bool {
        self.featured
    }

    fn in_category(&self, name: &str) -> bool {
        self.category_name() == Some(name)
    }
}

/// Projects have no category column; the technology tags play that role.
impl Selectable for Project {
    fn is_featured(&self) -> bool {
        self.featured
    }

    fn in_category(&self, name: &str) -> bool {
        self.technologies.iter().any(|t| t == name)
    }
}

/// The two ordered groups a listing renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplaySet<T> {
    pub featured: Vec<T>,
    pub regular: Vec<T>,
    /// Regular slots left after featured items, in "All" mode. Zero otherwise.
    pub remaining_slots: usize,
}

impl<T> DisplaySet<T> {
    pub fn len(&self) -> usize {
        self.featured.len() + self.regular.len()
    }

    pub fn is_empty(&self) -> bool {
        self.featured.is_empty() && self.regular.is_empty()
    }

    /// Featured then regular, in display order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.featured.iter().chain(self.regular.iter())
    }
}

/// Computes the display set for `items` (already filtered and sorted).
///
/// ```
/// use styragon_core::selection::{select_for_display, CategorySelection, Selectable};
///
/// #[derive(Clone)]
/// struct Item(bool);
/// impl Selectable for Item {
///     fn is_featured(&self) -> bool { self.0 }
///     fn in_category(&self, _: &str) -> bool { false }
/// }
///
/// let items: Vec<Item> = (0..10).map(|i| Item(i < 2)).collect();
/// let set = select_for_display(items, &CategorySelection::All);
/// assert_eq!(set.featured.len(), 2);
/// assert_eq!(set.regular.len(), 4);
/// ```
pub fn select_for_display<T: Selectable>(
    items: Vec<T>,
    selection: &CategorySelection,
) -> DisplaySet<T> {
    let (featured, regular): (Vec<T>, Vec<T>) = items.into_iter().partition(|i| i.is_featured());

    match selection {
        CategorySelection::All => {
            let remaining_slots = DISPLAY_SLOT_CAP.saturating_sub(featured.len());
            let regular = regular.into_iter().take(remaining_slots).collect();
            DisplaySet {
                featured,
                regular,
                remaining_slots,
            }
        }
        CategorySelection::Named(name) => {
            let regular = featured
                .into_iter()
                .chain(regular)
                .filter(|i| i.in_category(name))
                .collect();
            DisplaySet {
                featured: Vec::new(),
                regular,
                remaining_slots: 0,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: usize,
        featured: bool,
        category: &'static str,
    }

    impl Selectable for Item {
        fn is_featured(&self) -> bool {
            self.featured
        }

        fn in_category(&self, name: &str) -> bool {
            self.category == name
        }
    }

    fn items(featured: usize, regular: usize, category: &'static str) -> Vec<Item> {
        (0..featured)
            .map(|id| Item {
                id,
                featured: true,
                category,
            })
            .chain((featured..featured + regular).map(|id| Item {
                id,
                featured: false,
                category,
            }))
            .collect()
    }

    fn ids(items: &[Item]) -> Vec<usize> {
        items.iter().map(|i| i.id).collect()
    }

    #[test]
    fn test_all_fills_remaining_slots() {
        let set = select_for_display(items(3, 10, "Design"), &CategorySelection::All);
        assert_eq!(set.featured.len(), 3);
        assert_eq!(set.regular.len(), 3);
        assert_eq!(set.remaining_slots, 3);
        assert_eq!(ids(&set.regular), vec![3, 4, 5]);
    }

    #[test]
    fn test_all_with_cap_exhausted() {
        let set = select_for_display(items(8, 5, "Design"), &CategorySelection::All);
        assert_eq!(set.featured.len(), 8);
        assert_eq!(set.remaining_slots, 0);
        assert!(set.regular.is_empty());
    }

    #[test]
    fn test_all_preserves_order_within_partitions() {
        let mut mixed = items(0, 4, "Design");
        mixed[1].featured = true;
        mixed[3].featured = true;
        let set = select_for_display(mixed, &CategorySelection::All);
        assert_eq!(ids(&set.featured), vec![1, 3]);
        assert_eq!(ids(&set.regular), vec![0, 2]);
    }

    #[test]
    fn test_category_folds_featured_into_regular() {
        let mut all = items(2, 3, "Design");
        all.extend(
            items(2, 4, "Engineering")
                .into_iter()
                .map(|i| Item { id: i.id + 100, ..i }),
        );
        // Interleave so the featured-first concatenation is visible.
        all.swap(0, 6);

        let set = select_for_display(all, &CategorySelection::Named("Design".into()));
        assert!(set.featured.is_empty());
        assert_eq!(set.regular.len(), 5);
        assert!(set.regular.iter().all(|i| i.category == "Design"));
        // Featured Design items come first.
        assert!(set.regular[0].featured && set.regular[1].featured);
    }

    #[test]
    fn test_category_lifts_cap() {
        let set = select_for_display(items(4, 20, "Design"), &CategorySelection::Named("Design".into()));
        assert_eq!(set.len(), 24);
    }

    #[test]
    fn test_unknown_category_is_empty() {
        let set = select_for_display(items(2, 2, "Design"), &CategorySelection::Named("Nope".into()));
        assert!(set.is_empty());
    }

    #[test]
    fn test_parse_selection() {
        assert_eq!(CategorySelection::parse("All"), CategorySelection::All);
        assert_eq!(CategorySelection::parse("  "), CategorySelection::All);
        assert_eq!(
            CategorySelection::parse("Design"),
            CategorySelection::Named("Design".into())
        );
    }
}
