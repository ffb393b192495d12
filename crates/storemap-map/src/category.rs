//! Business category filter.
//!
//! The filter keeps a user's choice across selection changes while the
//! category is still offered, falls back to "all" when it disappears, and
//! otherwise picks a sensible default. It only reconciles when the set of
//! relevant categories actually changes.

use std::collections::BTreeSet;

use serde::Serialize;
use thiserror::Error;

/// Pseudo-category meaning "no restriction".
pub const ALL_CATEGORIES: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CategoryError {
    #[error("category \"{category}\" is not offered; available: {available:?}")]
    Unavailable {
        category: String,
        available: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "category", rename_all = "snake_case")]
pub enum CategoryState {
    /// The default is chosen by the filter.
    Automatic,
    /// The user picked this category.
    UserOverridden(String),
    /// The user's pick vanished from the offered set. The filter shows "all"
    /// and no longer honours the pick; this state is what Automatic looks
    /// like until the next reconcile, when it becomes [`Self::Automatic`]
    /// and picks the default again. Kept separate so plans can tell a reset
    /// pick apart from an automatic "all".
    Invalidated,
}

/// What the POI layer is restricted to after zoom is taken into account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "category", rename_all = "snake_case")]
pub enum CategoryRestriction {
    All,
    Only(String),
}

impl CategoryRestriction {
    #[must_use]
    pub fn admits(&self, category: &str) -> bool {
        match self {
            CategoryRestriction::All => true,
            CategoryRestriction::Only(only) => only == category,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CategoryFilter {
    preferred: String,
    state: CategoryState,
    current: String,
    available: Option<BTreeSet<String>>,
}

impl CategoryFilter {
    #[must_use]
    pub fn new(preferred: &str) -> Self {
        Self {
            preferred: normalize_category(preferred),
            state: CategoryState::Automatic,
            current: ALL_CATEGORIES.to_string(),
            available: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> &CategoryState {
        &self.state
    }

    /// The selected category, or [`ALL_CATEGORIES`].
    #[must_use]
    pub fn current(&self) -> &str {
        &self.current
    }

    /// Categories offered at the last reconcile, sorted.
    pub fn available(&self) -> impl Iterator<Item = &str> {
        self.available.iter().flatten().map(String::as_str)
    }

    /// Bring the state in line with a new relevant category set. Returns
    /// `false` (and changes nothing) when the set is the one seen last time.
    pub fn reconcile(&mut self, available: &BTreeSet<String>) -> bool {
        if self.available.as_ref() == Some(available) {
            return false;
        }

        let next = match &self.state {
            CategoryState::UserOverridden(choice)
                if choice == ALL_CATEGORIES || available.contains(choice) =>
            {
                self.state.clone()
            }
            CategoryState::UserOverridden(choice) => {
                tracing::debug!(category = %choice, "category override no longer offered");
                CategoryState::Invalidated
            }
            CategoryState::Automatic | CategoryState::Invalidated => CategoryState::Automatic,
        };

        self.current = match &next {
            CategoryState::UserOverridden(choice) => choice.clone(),
            CategoryState::Invalidated => ALL_CATEGORIES.to_string(),
            CategoryState::Automatic => self.automatic_default(available),
        };
        self.state = next;
        self.available = Some(available.clone());
        true
    }

    /// Record an explicit user choice. [`ALL_CATEGORIES`] is always valid.
    ///
    /// # Errors
    ///
    /// Returns [`CategoryError::Unavailable`] when the category is not in the
    /// currently offered set; the state is left untouched.
    pub fn set_category(&mut self, category: &str) -> Result<(), CategoryError> {
        let category = normalize_category(category);
        let offered = self
            .available
            .as_ref()
            .is_some_and(|set| set.contains(&category));
        if category != ALL_CATEGORIES && !offered {
            return Err(CategoryError::Unavailable {
                category,
                available: self.available().map(str::to_string).collect(),
            });
        }
        self.current.clone_from(&category);
        self.state = CategoryState::UserOverridden(category);
        Ok(())
    }

    /// The restriction to apply at `zoom`. At or beyond `close_zoom` nothing
    /// is filtered, whatever the state.
    #[must_use]
    pub fn effective(&self, zoom: f64, close_zoom: f64) -> CategoryRestriction {
        if zoom >= close_zoom || self.current == ALL_CATEGORIES {
            CategoryRestriction::All
        } else {
            CategoryRestriction::Only(self.current.clone())
        }
    }

    fn automatic_default(&self, available: &BTreeSet<String>) -> String {
        if available.contains(&self.preferred) {
            return self.preferred.clone();
        }
        available
            .iter()
            .next()
            .cloned()
            .unwrap_or_else(|| ALL_CATEGORIES.to_string())
    }
}

fn normalize_category(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn automatic_prefers_configured_category() {
        let mut filter = CategoryFilter::new("Supermarket");
        filter.reconcile(&set(&["bakery", "supermarket"]));
        assert_eq!(filter.current(), "supermarket");
        assert_eq!(filter.state(), &CategoryState::Automatic);
    }

    #[test]
    fn automatic_falls_back_to_first_then_all() {
        let mut filter = CategoryFilter::new("supermarket");
        filter.reconcile(&set(&["pharmacy", "bakery"]));
        assert_eq!(filter.current(), "bakery");
        filter.reconcile(&set(&[]));
        assert_eq!(filter.current(), ALL_CATEGORIES);
    }

    #[test]
    fn override_survives_while_still_offered() {
        let mut filter = CategoryFilter::new("supermarket");
        filter.reconcile(&set(&["bakery", "supermarket"]));
        filter.set_category("Bakery").unwrap();
        filter.reconcile(&set(&["bakery", "pharmacy"]));
        assert_eq!(filter.current(), "bakery");
        assert_eq!(
            filter.state(),
            &CategoryState::UserOverridden("bakery".to_string())
        );
    }

    #[test]
    fn vanished_override_resets_to_all_then_automatic() {
        let mut filter = CategoryFilter::new("supermarket");
        filter.reconcile(&set(&["bakery", "supermarket"]));
        filter.set_category("bakery").unwrap();

        filter.reconcile(&set(&["pharmacy", "supermarket"]));
        assert_eq!(filter.state(), &CategoryState::Invalidated);
        assert_eq!(filter.current(), ALL_CATEGORIES);

        filter.reconcile(&set(&["pharmacy", "supermarket", "kiosk"]));
        assert_eq!(filter.state(), &CategoryState::Automatic);
        assert_eq!(filter.current(), "supermarket");
    }

    #[test]
    fn same_set_does_not_reconcile() {
        let mut filter = CategoryFilter::new("supermarket");
        let offered = set(&["bakery", "supermarket"]);
        assert!(filter.reconcile(&offered));
        filter.set_category(ALL_CATEGORIES).unwrap();
        assert!(!filter.reconcile(&offered));
        assert_eq!(filter.current(), ALL_CATEGORIES);
    }

    #[test]
    fn unknown_category_is_rejected() {
        let mut filter = CategoryFilter::new("supermarket");
        filter.reconcile(&set(&["bakery"]));
        let err = filter.set_category("casino").unwrap_err();
        assert!(matches!(err, CategoryError::Unavailable { .. }));
        assert_eq!(filter.state(), &CategoryState::Automatic);
        assert_eq!(filter.current(), "bakery");
    }

    #[test]
    fn close_zoom_lifts_any_restriction() {
        let mut filter = CategoryFilter::new("supermarket");
        filter.reconcile(&set(&["bakery", "supermarket"]));
        filter.set_category("bakery").unwrap();
        assert_eq!(
            filter.effective(12.0, 14.5),
            CategoryRestriction::Only("bakery".to_string())
        );
        assert_eq!(filter.effective(14.5, 14.5), CategoryRestriction::All);
        assert_eq!(filter.effective(17.0, 14.5), CategoryRestriction::All);
    }
}
