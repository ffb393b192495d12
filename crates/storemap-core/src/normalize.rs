//! Name canonicalization for matching names across feeds.
//!
//! Every cross-source comparison (store city tags vs. selected city, POI area
//! tags vs. zone member areas, boundary feature names) goes through
//! [`normalize_name`].

use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Canonical matching form of a free-text name: trimmed, inner whitespace
/// collapsed to single spaces, lower-cased.
#[must_use]
pub fn normalize_name(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Sort key approximating locale-aware ordering for Latin-script names:
/// the normalized name with common diacritics folded to their base letter.
#[must_use]
pub fn collation_key(raw: &str) -> String {
    normalize_name(raw).chars().map(fold_diacritic).collect()
}

/// Locale-aware name comparison: folded key first, raw name as tiebreak so
/// the ordering is total and deterministic.
#[must_use]
pub fn compare_names(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

fn fold_diacritic(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => 'a',
        'ç' | 'ć' | 'č' | 'ĉ' | 'ċ' => 'c',
        'ď' | 'đ' => 'd',
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ė' | 'ę' | 'ě' => 'e',
        'ğ' | 'ĝ' | 'ġ' | 'ģ' => 'g',
        'ì' | 'í' | 'î' | 'ï' | 'ī' | 'į' | 'ı' => 'i',
        'ľ' | 'ĺ' | 'ł' | 'ļ' => 'l',
        'ñ' | 'ń' | 'ň' | 'ņ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => 'o',
        'ŕ' | 'ř' => 'r',
        'ś' | 'š' | 'ş' | 'ș' => 's',
        'ť' | 'ţ' | 'ț' => 't',
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' | 'ų' => 'u',
        'ý' | 'ÿ' => 'y',
        'ź' | 'ż' | 'ž' => 'z',
        other => other,
    }
}

/// A set of normalized names with a membership test that normalizes its
/// probe. Blank names are never members.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameSet(BTreeSet<String>);

impl NameSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from raw names, skipping blanks.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for name in names {
            set.insert(name.as_ref());
        }
        set
    }

    /// Insert a raw name. Returns `false` if it was blank or already present.
    pub fn insert(&mut self, raw: &str) -> bool {
        let normalized = normalize_name(raw);
        if normalized.is_empty() {
            return false;
        }
        self.0.insert(normalized)
    }

    /// Membership test for an optional raw tag; `None` and blank never match.
    #[must_use]
    pub fn contains(&self, raw: Option<&str>) -> bool {
        match raw {
            Some(raw) => {
                let normalized = normalize_name(raw);
                !normalized.is_empty() && self.0.contains(&normalized)
            }
            None => false,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Normalized members in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}
