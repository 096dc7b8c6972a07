// 🔎 Query Engine - Search and category filtering over the catalogue
// Pure functions, catalogue order is always preserved

use crate::catalogue::{Catalogue, Category, Item};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// Starter set shown when there is no search text and no category filter
pub const DEFAULT_NAMES: [&str; 12] = [
    "Paper cup",
    "Pizza box (oily)",
    "Milk pouch (clean)",
    "Tetra pack (clean)",
    "Plastic bottle (PET)",
    "Cardboard box (clean)",
    "Aluminium foil (clean)",
    "Multilayered wrappers",
    "Broken glass shards",
    "Battery (AA/AAA)",
    "Sanitary pad",
    "Vegetable peels",
];

/// Items people commonly put in the wrong bin
pub const CONFUSING_NAMES: [&str; 10] = [
    "Paper cup",
    "Pizza box (oily)",
    "Milk pouch (clean)",
    "Tetra pack (clean)",
    "Multilayered wrappers",
    "Aluminium foil (clean)",
    "Aluminium foil (oily)",
    "Broken glass shards",
    "Toothpaste tube",
    "Thermocol",
];

// ============================================================================
// CATEGORY KEY
// ============================================================================

/// Category selector: every item, or a single category
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum CategoryKey {
    #[default]
    All,
    Only(Category),
}

impl CategoryKey {
    /// `all` plus the five categories, in tab order
    pub fn tabs() -> Vec<CategoryKey> {
        std::iter::once(CategoryKey::All)
            .chain(Category::KNOWN.iter().cloned().map(CategoryKey::Only))
            .collect()
    }

    /// Exact, case-sensitive. Anything other than `all` is a category.
    pub fn parse(raw: &str) -> Self {
        if raw == "all" {
            CategoryKey::All
        } else {
            CategoryKey::Only(Category::from(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CategoryKey::All => "all",
            CategoryKey::Only(category) => category.as_str(),
        }
    }

    pub fn matches(&self, category: &Category) -> bool {
        match self {
            CategoryKey::All => true,
            CategoryKey::Only(wanted) => wanted == category,
        }
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// QUERY
// ============================================================================

/// Items matching the search text and category, in catalogue order.
///
/// With no search text and the `all` key this returns the curated default
/// set instead, or the whole catalogue when none of those names exist.
pub fn query<'a>(catalogue: &'a Catalogue, search_text: &str, key: &CategoryKey) -> Vec<&'a Item> {
    let needle = search_text.to_lowercase();

    if needle.is_empty() && *key == CategoryKey::All {
        let defaults = default_items(catalogue);
        if !defaults.is_empty() {
            return defaults;
        }
    }

    catalogue
        .iter()
        .filter(|item| key.matches(&item.category) && matches_text(item, &needle))
        .collect()
}

// `needle` must already be lowercase
fn matches_text(item: &Item, needle: &str) -> bool {
    needle.is_empty()
        || item.name.to_lowercase().contains(needle)
        || item
            .aliases
            .iter()
            .any(|alias| alias.to_lowercase().contains(needle))
}

/// Catalogue items named in `DEFAULT_NAMES`
pub fn default_items(catalogue: &Catalogue) -> Vec<&Item> {
    named_items(catalogue, &DEFAULT_NAMES)
}

/// Catalogue items named in `CONFUSING_NAMES`. Missing names are skipped.
pub fn confusing_items(catalogue: &Catalogue) -> Vec<&Item> {
    named_items(catalogue, &CONFUSING_NAMES)
}

fn named_items<'a>(catalogue: &'a Catalogue, names: &[&str]) -> Vec<&'a Item> {
    catalogue
        .iter()
        .filter(|item| names.contains(&item.name.as_str()))
        .collect()
}

// ============================================================================
// COUNTS
// ============================================================================

/// Item count per category tab
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CategoryCounts {
    all: usize,
    known: [usize; 5],
}

impl CategoryCounts {
    /// Count for a key. Unrecognized categories always give 0.
    pub fn get(&self, key: &CategoryKey) -> usize {
        match key {
            CategoryKey::All => self.all,
            CategoryKey::Only(category) => Category::KNOWN
                .iter()
                .position(|known| known == category)
                .map(|i| self.known[i])
                .unwrap_or(0),
        }
    }

    pub fn total(&self) -> usize {
        self.all
    }

    /// `(key, count)` for every tab, `all` first
    pub fn entries(&self) -> Vec<(CategoryKey, usize)> {
        CategoryKey::tabs()
            .into_iter()
            .map(|key| {
                let count = self.get(&key);
                (key, count)
            })
            .collect()
    }
}

impl Serialize for CategoryCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entries = self.entries();
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (key, count) in &entries {
            map.serialize_entry(key.as_str(), count)?;
        }
        map.end()
    }
}

/// Count items per category. `all` is the catalogue size, items with an
/// unrecognized category only count towards `all`.
pub fn category_counts(catalogue: &Catalogue) -> CategoryCounts {
    let mut counts = CategoryCounts::default();

    for item in catalogue {
        counts.all += 1;
        if let Some(i) = Category::KNOWN.iter().position(|known| *known == item.category) {
            counts.known[i] += 1;
        }
    }

    counts
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, name: &str, category: &str, aliases: &[&str]) -> Item {
        Item {
            id,
            name: name.to_string(),
            category: Category::from(category),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            rules: vec![],
            mistakes: vec![],
        }
    }

    fn sample() -> Catalogue {
        Catalogue::new(vec![
            item(1, "Paper cup", "dry-nonrecyclable", &["coffee cup", "Tea Cup"]),
            item(2, "Pizza box (oily)", "dry-nonrecyclable", &[]),
            item(3, "Banana peel", "wet", &["fruit waste"]),
            item(4, "Vegetable peels", "wet", &[]),
            item(5, "Old phone", "e-waste", &["mobile", "smartphone"]),
            item(6, "Cardboard box (clean)", "dry-recyclable", &["carton"]),
            item(7, "Aluminium foil (clean)", "dry-recyclable", &[]),
            item(8, "Aluminium foil (oily)", "dry-recyclable", &[]),
            item(9, "Glitter", "sparkly", &[]),
            item(10, "Thermocol", "dry-nonrecyclable", &["styrofoam", "pizza tray"]),
        ])
    }

    fn ids(items: &[&Item]) -> Vec<i64> {
        items.iter().map(|i| i.id).collect()
    }

    #[test]
    fn test_empty_query_returns_default_subset() {
        let catalogue = sample();
        let result = query(&catalogue, "", &CategoryKey::All);

        // Catalogue order, not DEFAULT_NAMES order
        assert_eq!(ids(&result), vec![1, 2, 4, 6, 7]);
    }

    #[test]
    fn test_empty_query_without_defaults_returns_everything() {
        let catalogue = Catalogue::new(vec![
            item(20, "Zeta", "wet", &[]),
            item(10, "Alpha", "e-waste", &[]),
            item(30, "Mu", "unknown", &[]),
        ]);

        let result = query(&catalogue, "", &CategoryKey::All);
        assert_eq!(ids(&result), vec![20, 10, 30]);
    }

    #[test]
    fn test_empty_query_on_empty_catalogue() {
        let catalogue = Catalogue::default();
        assert!(query(&catalogue, "", &CategoryKey::All).is_empty());
    }

    #[test]
    fn test_search_bypasses_default_view() {
        let catalogue = sample();
        let result = query(&catalogue, "peel", &CategoryKey::All);

        // "Banana peel" is not a default name but still matches
        assert_eq!(ids(&result), vec![3, 4]);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let catalogue = sample();
        let upper = query(&catalogue, "PIZZA", &CategoryKey::All);
        let lower = query(&catalogue, "pizza", &CategoryKey::All);

        assert_eq!(upper, lower);
        // Name match and alias match ("pizza tray")
        assert_eq!(ids(&lower), vec![2, 10]);
    }

    #[test]
    fn test_search_matches_aliases() {
        let catalogue = sample();

        assert_eq!(ids(&query(&catalogue, "smart", &CategoryKey::All)), vec![5]);
        assert_eq!(ids(&query(&catalogue, "tea cup", &CategoryKey::All)), vec![1]);
        assert!(query(&catalogue, "nothing like this", &CategoryKey::All).is_empty());
    }

    #[test]
    fn test_category_and_search_compose() {
        let catalogue = sample();
        let wet = CategoryKey::parse("wet");

        // "box" matches two dry items, none of them wet
        assert!(query(&catalogue, "box", &wet).is_empty());
        assert_eq!(ids(&query(&catalogue, "peel", &wet)), vec![3, 4]);

        let dry = CategoryKey::parse("dry-recyclable");
        assert_eq!(ids(&query(&catalogue, "foil", &dry)), vec![7, 8]);
    }

    #[test]
    fn test_category_without_search_lists_whole_category() {
        let catalogue = sample();
        let result = query(&catalogue, "", &CategoryKey::parse("dry-nonrecyclable"));

        assert_eq!(ids(&result), vec![1, 2, 10]);
    }

    #[test]
    fn test_unknown_category_key() {
        let catalogue = sample();

        assert!(query(&catalogue, "", &CategoryKey::parse("plastic")).is_empty());
        // Raw category strings still match exactly
        assert_eq!(ids(&query(&catalogue, "", &CategoryKey::parse("sparkly"))), vec![9]);
        // Keys are case-sensitive
        assert!(query(&catalogue, "", &CategoryKey::parse("WET")).is_empty());
    }

    #[test]
    fn test_category_counts() {
        let catalogue = sample();
        let counts = category_counts(&catalogue);

        assert_eq!(counts.get(&CategoryKey::All), 10);
        assert_eq!(counts.total(), catalogue.len());
        assert_eq!(counts.get(&CategoryKey::parse("wet")), 2);
        assert_eq!(counts.get(&CategoryKey::parse("dry-recyclable")), 3);
        assert_eq!(counts.get(&CategoryKey::parse("dry-nonrecyclable")), 3);
        assert_eq!(counts.get(&CategoryKey::parse("e-waste")), 1);
        assert_eq!(counts.get(&CategoryKey::parse("biomedical")), 0);
        assert_eq!(counts.get(&CategoryKey::parse("sparkly")), 0);
        assert_eq!(counts.get(&CategoryKey::parse("bogus")), 0);
    }

    #[test]
    fn test_category_counts_serialize_in_tab_order() {
        let counts = category_counts(&sample());
        let json = serde_json::to_string(&counts).unwrap();

        assert_eq!(
            json,
            r#"{"all":10,"wet":2,"dry-recyclable":3,"dry-nonrecyclable":3,"e-waste":1,"biomedical":0}"#
        );
    }

    #[test]
    fn test_confusing_items_keep_catalogue_order() {
        let catalogue = sample();
        let result = confusing_items(&catalogue);

        assert_eq!(ids(&result), vec![1, 2, 7, 8, 10]);
    }

    #[test]
    fn test_confusing_items_may_be_empty() {
        let catalogue = Catalogue::new(vec![item(1, "paper cup", "wet", &[])]);

        // Exact, case-sensitive name match
        assert!(confusing_items(&catalogue).is_empty());
    }

    #[test]
    fn test_bundled_catalogue_has_every_curated_name() {
        let catalogue = Catalogue::from_json_str(include_str!("../items.json")).unwrap();

        assert_eq!(query(&catalogue, "", &CategoryKey::All).len(), DEFAULT_NAMES.len());
        assert_eq!(confusing_items(&catalogue).len(), CONFUSING_NAMES.len());
        assert_eq!(category_counts(&catalogue).total(), catalogue.len());
    }

    #[test]
    fn test_category_key_roundtrip() {
        for key in CategoryKey::tabs() {
            assert_eq!(CategoryKey::parse(key.as_str()), key);
        }
        assert_eq!(CategoryKey::tabs().len(), 6);
    }
}
