// 🏷️ Disposal Advice - Rules as Data
// Maps an item's category (and, for some categories, its name) to a verdict,
// a destination bin and do/avoid tips

use crate::catalogue::{Category, Item};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ============================================================================
// RULE DEFINITION
// ============================================================================

/// Case-insensitive predicate on an item's display name
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "words", rename_all = "snake_case")]
pub enum NameMatch {
    /// Matches every name
    #[default]
    Always,

    /// Name contains every word
    ContainsAll(Vec<String>),

    /// Name contains at least one word
    ContainsAny(Vec<String>),
}

impl NameMatch {
    pub fn matches(&self, name: &str) -> bool {
        let name_lower = name.to_lowercase();

        match self {
            NameMatch::Always => true,
            NameMatch::ContainsAll(words) => words
                .iter()
                .all(|w| name_lower.contains(&w.to_lowercase())),
            NameMatch::ContainsAny(words) => words
                .iter()
                .any(|w| name_lower.contains(&w.to_lowercase())),
        }
    }
}

/// One `(predicate, verdict)` pair. Within a category the first match wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictRule {
    /// Rule ID for tracking
    pub id: String,

    #[serde(default)]
    pub when: NameMatch,

    pub verdict: String,
}

impl VerdictRule {
    pub fn new(id: &str, when: NameMatch, verdict: &str) -> Self {
        VerdictRule {
            id: id.to_string(),
            when,
            verdict: verdict.to_string(),
        }
    }
}

/// Everything the detail view says about one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryAdvice {
    pub category: Category,

    /// Ordered verdict rules
    pub verdicts: Vec<VerdictRule>,

    pub destination: String,
    pub do_message: String,
    pub avoid_message: String,
}

// ============================================================================
// ADVICE RESULT
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Advice {
    pub verdict: String,
    pub destination: String,
    pub do_message: String,
    pub avoid_message: String,
}

impl Advice {
    /// True for items whose category has no advice
    pub fn is_empty(&self) -> bool {
        self.verdict.is_empty()
            && self.destination.is_empty()
            && self.do_message.is_empty()
            && self.avoid_message.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum AdviceError {
    #[error("failed to read advice file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse advice JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

// ============================================================================
// ADVICE BOOK
// ============================================================================

/// Advice table keyed by category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdviceBook {
    entries: Vec<CategoryAdvice>,
}

impl AdviceBook {
    pub fn from_entries(entries: Vec<CategoryAdvice>) -> Self {
        AdviceBook { entries }
    }

    /// Load an advice table from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AdviceError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| AdviceError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let entries: Vec<CategoryAdvice> = serde_json::from_str(&content)?;
        tracing::debug!(path = ?path, categories = entries.len(), "advice table loaded");

        Ok(AdviceBook::from_entries(entries))
    }

    pub fn entries(&self) -> &[CategoryAdvice] {
        &self.entries
    }

    /// Resolve advice for an item. Never fails: a category without an entry
    /// gets empty strings, as does an entry whose rules all miss.
    pub fn resolve(&self, item: &Item) -> Advice {
        let entry = match self.entries.iter().find(|e| e.category == item.category) {
            Some(e) => e,
            None => return Advice::default(),
        };

        let verdict = entry
            .verdicts
            .iter()
            .find(|rule| rule.when.matches(&item.name))
            .map(|rule| rule.verdict.clone())
            .unwrap_or_default();

        Advice {
            verdict,
            destination: entry.destination.clone(),
            do_message: entry.do_message.clone(),
            avoid_message: entry.avoid_message.clone(),
        }
    }
}

impl Default for AdviceBook {
    /// The built-in household table
    fn default() -> Self {
        let words = |ws: &[&str]| ws.iter().map(|w| w.to_string()).collect::<Vec<_>>();

        AdviceBook::from_entries(vec![
            CategoryAdvice {
                category: Category::DryRecyclable,
                verdicts: vec![
                    VerdictRule::new(
                        "foil-clean",
                        NameMatch::ContainsAll(words(&["foil", "clean"])),
                        "Recyclable if clean (no food/oil).",
                    ),
                    VerdictRule::new(
                        "foil-soiled",
                        NameMatch::ContainsAll(words(&["foil"])),
                        "Not recyclable if oily/soiled.",
                    ),
                    VerdictRule::new(
                        "liquid-carton",
                        NameMatch::ContainsAny(words(&["milk pouch", "tetra"])),
                        "Recyclable only if rinsed, drained, and dry.",
                    ),
                    VerdictRule::new("recyclable", NameMatch::Always, "Recyclable if clean and dry."),
                ],
                destination: "Dry bin (recyclables). Keep away from moisture.".to_string(),
                do_message: "Keep items clean & dry".to_string(),
                avoid_message: "No food or liquid residue".to_string(),
            },
            CategoryAdvice {
                category: Category::DryNonRecyclable,
                verdicts: vec![VerdictRule::new(
                    "non-recyclable",
                    NameMatch::Always,
                    "Not recyclable through household collection.",
                )],
                destination: "Dry bin (non-recyclables). Keep separate from clean recyclables."
                    .to_string(),
                do_message: "Keep separate from recyclables".to_string(),
                avoid_message: "Do not mix with clean items".to_string(),
            },
            CategoryAdvice {
                category: Category::Wet,
                verdicts: vec![VerdictRule::new("wet", NameMatch::Always, "Organic/wet waste.")],
                destination: "Wet bin (compost preferred).".to_string(),
                do_message: "Compost if possible, tie securely".to_string(),
                avoid_message: "Do not mix with dry bin".to_string(),
            },
            CategoryAdvice {
                category: Category::EWaste,
                verdicts: vec![VerdictRule::new(
                    "e-waste",
                    NameMatch::Always,
                    "Do not bin: e-waste only.",
                )],
                destination: "Store separately, give to authorized e-waste recycler.".to_string(),
                do_message: "Store separately for e-waste recycler".to_string(),
                avoid_message: "Do not put in bins".to_string(),
            },
            CategoryAdvice {
                category: Category::Biomedical,
                verdicts: vec![VerdictRule::new(
                    "biomedical",
                    NameMatch::Always,
                    "Biomedical waste — handle carefully.",
                )],
                destination: "Double-wrap, label \"BIOMEDICAL\", and hand over to: (1) municipal collection or designated sanitary-waste pickup, (2) nearest hospital/clinic if they accept community sanitary waste, or (3) your authorized waste collection service. Never mix with dry/wet bins.".to_string(),
                do_message: "Double-wrap, label “BIOMEDICAL”, and hand over to municipal/authorized service or a clinic that accepts it.".to_string(),
                avoid_message: "Do not flush, burn, or mix with household dry/wet bins.".to_string(),
            },
        ])
    }
}

/// Resolve advice with the built-in table
pub fn resolve(item: &Item) -> Advice {
    AdviceBook::default().resolve(item)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn item(id: i64, name: &str, category: &str) -> Item {
        Item {
            id,
            name: name.to_string(),
            category: Category::from(category),
            aliases: vec![],
            rules: vec![],
            mistakes: vec![],
        }
    }

    #[test]
    fn test_clean_foil() {
        let advice = resolve(&item(7, "Aluminium foil (clean)", "dry-recyclable"));

        assert_eq!(advice.verdict, "Recyclable if clean (no food/oil).");
        assert_eq!(advice.destination, "Dry bin (recyclables). Keep away from moisture.");
        assert_eq!(advice.do_message, "Keep items clean & dry");
        assert_eq!(advice.avoid_message, "No food or liquid residue");
    }

    #[test]
    fn test_oily_foil() {
        let advice = resolve(&item(8, "Aluminium foil (oily)", "dry-recyclable"));
        assert_eq!(advice.verdict, "Not recyclable if oily/soiled.");
    }

    #[test]
    fn test_foil_check_wins_over_tetra() {
        // Both foil and tetra appear; foil is evaluated first
        let advice = resolve(&item(1, "Tetra foil lid", "dry-recyclable"));
        assert_eq!(advice.verdict, "Not recyclable if oily/soiled.");
    }

    #[test]
    fn test_liquid_cartons() {
        let pouch = resolve(&item(1, "Milk pouch (clean)", "dry-recyclable"));
        let tetra = resolve(&item(2, "TETRA pack (clean)", "dry-recyclable"));
        let plain = resolve(&item(3, "Cardboard box (clean)", "dry-recyclable"));

        assert_eq!(pouch.verdict, "Recyclable only if rinsed, drained, and dry.");
        assert_eq!(tetra.verdict, "Recyclable only if rinsed, drained, and dry.");
        assert_eq!(plain.verdict, "Recyclable if clean and dry.");
    }

    #[test]
    fn test_name_rules_only_apply_to_dry_recyclable() {
        let advice = resolve(&item(1, "Aluminium foil (oily)", "dry-nonrecyclable"));
        assert_eq!(advice.verdict, "Not recyclable through household collection.");
    }

    #[test]
    fn test_every_known_category_has_full_advice() {
        for category in Category::KNOWN.iter() {
            let advice = resolve(&item(1, "Anything", category.as_str()));

            assert!(!advice.verdict.is_empty(), "{} verdict", category);
            assert!(!advice.destination.is_empty(), "{} destination", category);
            assert!(!advice.do_message.is_empty(), "{} do", category);
            assert!(!advice.avoid_message.is_empty(), "{} avoid", category);
        }
    }

    #[test]
    fn test_category_table() {
        let wet = resolve(&item(1, "Vegetable peels", "wet"));
        assert_eq!(wet.verdict, "Organic/wet waste.");
        assert_eq!(wet.destination, "Wet bin (compost preferred).");

        let ewaste = resolve(&item(2, "Battery (AA/AAA)", "e-waste"));
        assert_eq!(ewaste.verdict, "Do not bin: e-waste only.");
        assert_eq!(ewaste.avoid_message, "Do not put in bins");

        let bio = resolve(&item(3, "Sanitary pad", "biomedical"));
        assert_eq!(bio.verdict, "Biomedical waste — handle carefully.");
        assert!(bio.destination.starts_with("Double-wrap, label \"BIOMEDICAL\""));
        assert!(bio.destination.ends_with("Never mix with dry/wet bins."));
        assert_eq!(bio.avoid_message, "Do not flush, burn, or mix with household dry/wet bins.");
    }

    #[test]
    fn test_unknown_category_gives_empty_advice() {
        let advice = resolve(&item(1, "Aluminium foil (clean)", "metal"));

        assert!(advice.is_empty());
        assert_eq!(advice, Advice::default());
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let it = item(1, "Tetra pack (clean)", "dry-recyclable");
        assert_eq!(resolve(&it), resolve(&it));
    }

    #[test]
    fn test_name_match() {
        assert!(NameMatch::Always.matches(""));
        assert!(NameMatch::ContainsAll(vec!["FOIL".into(), "clean".into()]).matches("Foil (Clean)"));
        assert!(!NameMatch::ContainsAll(vec!["foil".into(), "clean".into()]).matches("Foil (oily)"));
        assert!(NameMatch::ContainsAny(vec!["x".into(), "oil".into()]).matches("Foil"));
        assert!(!NameMatch::ContainsAny(vec![]).matches("Foil"));
    }

    #[test]
    fn test_advice_book_from_file() {
        let json = r#"[
            {
                "category": "wet",
                "verdicts": [
                    {"id": "bones", "when": {"kind": "contains_any", "words": ["bone"]}, "verdict": "Wet, but slow to compost."},
                    {"id": "wet", "verdict": "Compost it."}
                ],
                "destination": "Green bin",
                "do_message": "Drain first",
                "avoid_message": "No plastic bags"
            }
        ]"#;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let book = AdviceBook::from_file(file.path()).unwrap();
        assert_eq!(book.entries().len(), 1);

        let bones = book.resolve(&item(1, "Chicken bones", "wet"));
        assert_eq!(bones.verdict, "Wet, but slow to compost.");
        assert_eq!(bones.destination, "Green bin");

        let peels = book.resolve(&item(2, "Peels", "wet"));
        assert_eq!(peels.verdict, "Compost it.");

        // Categories missing from the file get nothing
        assert!(book.resolve(&item(3, "Phone", "e-waste")).is_empty());
    }

    #[test]
    fn test_advice_book_bad_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();

        assert!(matches!(AdviceBook::from_file(file.path()), Err(AdviceError::Parse(_))));

        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            AdviceBook::from_file(dir.path().join("advice.json")),
            Err(AdviceError::Io { .. })
        ));
    }

    #[test]
    fn test_default_table_roundtrips_through_json() {
        let book = AdviceBook::default();
        let json = serde_json::to_string(book.entries()).unwrap();
        let entries: Vec<CategoryAdvice> = serde_json::from_str(&json).unwrap();

        assert_eq!(AdviceBook::from_entries(entries), book);
    }
}
