use super::{Category, NamedCode, Taxonomy, TaxonomyItem};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Conventional relative locations of the taxonomy document, tried in order.
/// The directory of the running executable is tried last.
pub const SEARCH_PATHS: &[&str] = &["format.json", "config/format.json", "data/format.json"];

#[derive(Debug, thiserror::Error)]
pub enum TaxonomyError {
    #[error("taxonomy document not found (searched {searched:?})")]
    NotFound { searched: Vec<PathBuf> },
    #[error("failed to read taxonomy document {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("taxonomy document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Loads the taxonomy from the first conventional path that exists.
pub fn load_default() -> Result<Taxonomy, TaxonomyError> {
    let mut searched = Vec::new();

    for relative in SEARCH_PATHS {
        let path = PathBuf::from(relative);
        if path.is_file() {
            return load_from_path(&path);
        }
        searched.push(path);
    }

    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        let path = exe_dir.join("format.json");
        if path.is_file() {
            return load_from_path(&path);
        }
        searched.push(path);
    }

    Err(TaxonomyError::NotFound { searched })
}

pub fn load_from_path(path: &Path) -> Result<Taxonomy, TaxonomyError> {
    let contents = std::fs::read_to_string(path).map_err(|source| TaxonomyError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let taxonomy = load_from_str(&contents)?;
    debug!(path = %path.display(), "taxonomy document loaded");
    Ok(taxonomy)
}

pub fn load_from_str(contents: &str) -> Result<Taxonomy, TaxonomyError> {
    let document: Map<String, Value> = serde_json::from_str(contents)?;
    let mut taxonomy = Taxonomy::empty();

    for category in Category::ALL {
        let Some(entries) = document.get(category.key()).and_then(Value::as_array) else {
            debug!(category = category.key(), "taxonomy category missing, left empty");
            continue;
        };

        let mut seen_codes: HashSet<String> = HashSet::new();
        for entry in entries {
            let Some(item) = decode_item(category, entry) else {
                warn!(category = category.key(), "skipping malformed taxonomy entry");
                continue;
            };
            // Codes are unique within a category; first occurrence wins.
            if !seen_codes.insert(item.code.clone()) {
                warn!(
                    category = category.key(),
                    code = %item.code,
                    "duplicate taxonomy code, keeping the first occurrence"
                );
                continue;
            }
            taxonomy.push(category, item);
        }
    }

    Ok(taxonomy)
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    name: String,
    code: String,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

fn decode_item(category: Category, entry: &Value) -> Option<TaxonomyItem> {
    let raw: RawEntry = serde_json::from_value(entry.clone()).ok()?;
    if raw.name.is_empty() || raw.code.is_empty() {
        return None;
    }

    // Any object-valued field carrying its own name/code pair is kept as a
    // nested sub-record; the parent reference is one of them.
    let nested: Vec<NamedCode> = raw
        .extra
        .values()
        .filter_map(named_code_of)
        .collect();

    let parent = category.parent().and_then(|parent_category| {
        raw.extra
            .get(parent_category.key())
            .and_then(named_code_of)
            .map(|reference| reference.code)
    });

    Some(TaxonomyItem {
        name: raw.name,
        code: raw.code,
        parent,
        nested,
    })
}

fn named_code_of(value: &Value) -> Option<NamedCode> {
    let object = value.as_object()?;
    let name = object.get("name")?.as_str()?;
    let code = object.get("code")?.as_str()?;
    if name.is_empty() || code.is_empty() {
        return None;
    }
    Some(NamedCode {
        name: name.to_string(),
        code: code.to_string(),
    })
}
