// 📦 Catalogue - Waste items loaded once per view
// Items are read from a JSON array (file or HTTP) and never mutated afterwards

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ============================================================================
// CATEGORY
// ============================================================================

/// Waste category of an item.
///
/// The five known categories drive counts and advice. Anything else in the
/// catalogue is kept verbatim in `Other` so the item still loads and can be
/// searched, it just gets no advice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Wet,
    DryRecyclable,
    DryNonRecyclable,
    EWaste,
    Biomedical,
    Other(String),
}

impl Category {
    /// The five fixed categories, in tab order
    pub const KNOWN: [Category; 5] = [
        Category::Wet,
        Category::DryRecyclable,
        Category::DryNonRecyclable,
        Category::EWaste,
        Category::Biomedical,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Category::Wet => "wet",
            Category::DryRecyclable => "dry-recyclable",
            Category::DryNonRecyclable => "dry-nonrecyclable",
            Category::EWaste => "e-waste",
            Category::Biomedical => "biomedical",
            Category::Other(raw) => raw.as_str(),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Category::Other(_))
    }
}

impl From<&str> for Category {
    fn from(raw: &str) -> Self {
        match raw {
            "wet" => Category::Wet,
            "dry-recyclable" => Category::DryRecyclable,
            "dry-nonrecyclable" => Category::DryNonRecyclable,
            "e-waste" => Category::EWaste,
            "biomedical" => Category::Biomedical,
            other => Category::Other(other.to_string()),
        }
    }
}

impl From<String> for Category {
    fn from(raw: String) -> Self {
        Category::from(raw.as_str())
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.as_str().to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// ITEM
// ============================================================================

/// One catalogue entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Stable lookup key, used as the `id=` reference between views
    pub id: i64,

    /// Display name, matched exactly against the curated name lists
    pub name: String,

    pub category: Category,

    /// Alternate names, only used for search
    #[serde(default, deserialize_with = "lenient_strings")]
    pub aliases: Vec<String>,

    /// Disposal rules, shown verbatim
    #[serde(default, deserialize_with = "lenient_strings")]
    pub rules: Vec<String>,

    /// Common mistakes, shown verbatim
    #[serde(default, deserialize_with = "lenient_strings")]
    pub mistakes: Vec<String>,
}

// `null` lists become empty and `null` entries become empty strings
fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<Option<String>>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect())
}

// ============================================================================
// ERRORS
// ============================================================================

/// The catalogue could not be loaded. Callers turn this into a message,
/// never into a crash.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read catalogue file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch catalogue from {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("catalogue request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("catalogue is not a valid item list: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("failed to start catalogue fetch runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("catalogue read task did not finish: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// No item carries the requested id
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("item {id} not found")]
pub struct NotFound {
    pub id: i64,
}

// ============================================================================
// CATALOGUE
// ============================================================================

/// Immutable snapshot of every item, in document order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalogue {
    items: Vec<Item>,
}

impl Catalogue {
    pub fn new(items: Vec<Item>) -> Self {
        Catalogue { items }
    }

    /// Parse a JSON array of items
    pub fn from_json_str(content: &str) -> Result<Self, LoadError> {
        let items: Vec<Item> = serde_json::from_str(content)?;
        Ok(Catalogue::new(items))
    }

    /// Load catalogue from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Catalogue::from_json_str(&content)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up an item by exact id
    pub fn find(&self, id: i64) -> Result<&Item, NotFound> {
        self.items
            .iter()
            .find(|item| item.id == id)
            .ok_or(NotFound { id })
    }
}

impl<'a> IntoIterator for &'a Catalogue {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Parse the `id=` parameter of a detail link.
///
/// Missing, empty or non-numeric values give 0, which normally resolves to
/// "not found". Integral decimals such as `7.0` are accepted.
pub fn parse_item_id(raw: Option<&str>) -> i64 {
    let raw = match raw.map(str::trim) {
        Some(r) if !r.is_empty() => r,
        _ => return 0,
    };

    if let Ok(id) = raw.parse::<i64>() {
        return id;
    }

    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value.fract() == 0.0 => value as i64,
        _ => 0,
    }
}

// ============================================================================
// SOURCE
// ============================================================================

/// Where the catalogue comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogueSource {
    File(PathBuf),
    Url(String),
}

impl CatalogueSource {
    /// `http://` and `https://` values are URLs, everything else is a path
    pub fn parse(raw: &str) -> Self {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            CatalogueSource::Url(raw.to_string())
        } else {
            CatalogueSource::File(PathBuf::from(raw))
        }
    }

    /// Single-shot load. Not retried, no partial results.
    pub async fn load(&self) -> Result<Catalogue, LoadError> {
        let result = match self {
            CatalogueSource::File(path) => read_file(path.clone()).await,
            CatalogueSource::Url(url) => fetch(url).await,
        };

        self.report(result)
    }

    /// Same as `load`, for callers without a runtime. URLs are fetched on a
    /// throwaway current-thread runtime.
    pub fn load_blocking(&self) -> Result<Catalogue, LoadError> {
        match self {
            CatalogueSource::File(path) => self.report(Catalogue::from_file(path)),
            CatalogueSource::Url(_) => {
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .map_err(LoadError::Runtime)?;
                runtime.block_on(self.load())
            }
        }
    }

    fn report(&self, result: Result<Catalogue, LoadError>) -> Result<Catalogue, LoadError> {
        match &result {
            Ok(catalogue) => {
                tracing::info!(source = %self, items = catalogue.len(), "catalogue loaded")
            }
            Err(e) => tracing::warn!(source = %self, error = %e, "catalogue load failed"),
        }
        result
    }
}

impl fmt::Display for CatalogueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogueSource::File(path) => write!(f, "{}", path.display()),
            CatalogueSource::Url(url) => f.write_str(url),
        }
    }
}

// File reads run on the blocking pool so server workers stay free
async fn read_file(path: PathBuf) -> Result<Catalogue, LoadError> {
    tokio::task::spawn_blocking(move || Catalogue::from_file(path)).await?
}

async fn fetch(url: &str) -> Result<Catalogue, LoadError> {
    let network = |source: reqwest::Error| LoadError::Network {
        url: url.to_string(),
        source,
    };

    let response = reqwest::get(url).await.map_err(network)?;

    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(network)?;
    Catalogue::from_json_str(&body)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const SAMPLE: &str = r#"[
        {"id": 1, "name": "Paper cup", "category": "dry-nonrecyclable",
         "aliases": ["coffee cup"], "rules": ["Empty it"], "mistakes": ["Putting it with paper"]},
        {"id": 2, "name": "Vegetable peels", "category": "wet"},
        {"id": 3, "name": "Mystery", "category": "glitter", "aliases": null, "rules": [null, "x"]}
    ]"#;

    // Serves exactly one HTTP response on a random local port
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        format!("http://{}/items.json", addr)
    }

    #[test]
    fn test_parse_catalogue_keeps_order_and_defaults() {
        let catalogue = Catalogue::from_json_str(SAMPLE).unwrap();

        assert_eq!(catalogue.len(), 3);
        let names: Vec<&str> = catalogue.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Paper cup", "Vegetable peels", "Mystery"]);

        let peels = &catalogue.items()[1];
        assert_eq!(peels.category, Category::Wet);
        assert!(peels.aliases.is_empty());
        assert!(peels.rules.is_empty());
        assert!(peels.mistakes.is_empty());
    }

    #[test]
    fn test_unknown_category_is_preserved() {
        let catalogue = Catalogue::from_json_str(SAMPLE).unwrap();
        let mystery = catalogue.find(3).unwrap();

        assert_eq!(mystery.category, Category::Other("glitter".to_string()));
        assert!(!mystery.category.is_known());
        assert_eq!(mystery.category.as_str(), "glitter");
        assert!(mystery.aliases.is_empty());
        assert_eq!(mystery.rules, vec!["".to_string(), "x".to_string()]);
    }

    #[test]
    fn test_category_serializes_as_plain_string() {
        let json = serde_json::to_string(&Category::DryRecyclable).unwrap();
        assert_eq!(json, "\"dry-recyclable\"");

        for category in Category::KNOWN.iter() {
            assert_eq!(&Category::from(category.as_str()), category);
        }
    }

    #[test]
    fn test_find_missing_id_is_not_found() {
        let catalogue = Catalogue::from_json_str(SAMPLE).unwrap();

        assert_eq!(catalogue.find(999), Err(NotFound { id: 999 }));
        assert_eq!(catalogue.find(0), Err(NotFound { id: 0 }));
        assert_eq!(catalogue.find(2).unwrap().name, "Vegetable peels");
    }

    #[test]
    fn test_parse_item_id() {
        assert_eq!(parse_item_id(Some("7")), 7);
        assert_eq!(parse_item_id(Some(" 42 ")), 42);
        assert_eq!(parse_item_id(Some("7.0")), 7);
        assert_eq!(parse_item_id(Some("-3")), -3);
        assert_eq!(parse_item_id(Some("7.5")), 0);
        assert_eq!(parse_item_id(Some("abc")), 0);
        assert_eq!(parse_item_id(Some("")), 0);
        assert_eq!(parse_item_id(None), 0);
    }

    #[test]
    fn test_malformed_json_is_load_error() {
        let err = Catalogue::from_json_str("{\"id\": 1}").unwrap_err();
        assert!(matches!(err, LoadError::Malformed(_)));

        let err = Catalogue::from_json_str("[{\"name\": \"no id\"}]").unwrap_err();
        assert!(matches!(err, LoadError::Malformed(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let catalogue = Catalogue::from_file(file.path()).unwrap();
        assert_eq!(catalogue.len(), 3);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Catalogue::from_file(dir.path().join("items.json")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_source_parse() {
        assert_eq!(
            CatalogueSource::parse("https://example.org/items.json"),
            CatalogueSource::Url("https://example.org/items.json".to_string())
        );
        assert_eq!(
            CatalogueSource::parse("data/items.json"),
            CatalogueSource::File(PathBuf::from("data/items.json"))
        );
    }

    #[test]
    fn test_load_blocking_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let source = CatalogueSource::File(file.path().to_path_buf());
        assert_eq!(source.load_blocking().unwrap().len(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_load_file_on_server_runtime() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let source = CatalogueSource::File(file.path().to_path_buf());
        let catalogue = source.load().await.unwrap();
        assert_eq!(catalogue.find(2).unwrap().name, "Vegetable peels");

        let dir = tempfile::tempdir().unwrap();
        let missing = CatalogueSource::File(dir.path().join("items.json"));
        assert!(matches!(missing.load().await, Err(LoadError::Io { .. })));
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let url = serve_once("200 OK", r#"[{"id": 9, "name": "Thermocol", "category": "dry-nonrecyclable"}]"#).await;

        let catalogue = CatalogueSource::parse(&url).load().await.unwrap();
        assert_eq!(catalogue.len(), 1);
        assert_eq!(catalogue.find(9).unwrap().name, "Thermocol");
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let url = serve_once("404 Not Found", "").await;

        let err = CatalogueSource::parse(&url).load().await.unwrap_err();
        assert!(matches!(err, LoadError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_fetch_malformed_body() {
        let url = serve_once("200 OK", "not json").await;

        let err = CatalogueSource::parse(&url).load().await.unwrap_err();
        assert!(matches!(err, LoadError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        // Bind then drop to get a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let source = CatalogueSource::Url(format!("http://{}/items.json", addr));
        let err = source.load().await.unwrap_err();
        assert!(matches!(err, LoadError::Network { .. }));
    }
}
