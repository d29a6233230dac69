//! In-process document store.
//!
//! [`MemoryStore`] answers the same queries as MongoDB for the subset of the
//! query language the browser emits: field equality (including "array
//! contains" for array fields), `$eq` and `$in`, and inclusion/exclusion
//! projections. Dotted paths reach into embedded documents. Anything else,
//! including dotted paths that cross an array in a filter, is rejected with
//! [`MongoError::Query`] rather than silently mismatching.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use bson::{Bson, Document};
use tracing::{debug, info};

use crate::error::{MongoError, MongoResult};
use crate::extjson;
use crate::store::DocumentStore;

/// Collections of documents held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: HashMap<String, Vec<Document>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add documents to `collection`, builder style.
    pub fn with_documents(
        mut self,
        collection: &str,
        docs: impl IntoIterator<Item = Document>,
    ) -> Self {
        self.collections
            .entry(collection.to_string())
            .or_default()
            .extend(docs);
        self
    }

    /// Append one document to `collection`.
    pub fn insert(&mut self, collection: &str, doc: Document) {
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(doc);
    }

    /// Number of documents in `collection`.
    pub fn count(&self, collection: &str) -> usize {
        self.collections.get(collection).map_or(0, Vec::len)
    }

    /// Load every `<collection>.json` file in `dir`.
    ///
    /// Each file holds a JSON array of documents in extended JSON, the same
    /// form the API serves.
    pub fn load_dir(dir: impl AsRef<Path>) -> MongoResult<Self> {
        let dir = dir.as_ref();
        let mut store = Self::new();

        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(collection) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let text = std::fs::read_to_string(&path)?;
            let docs = extjson::from_extended_json(&text)?;
            info!(collection = %collection, documents = docs.len(), "Loaded fixture collection");
            store = store.with_documents(collection, docs);
        }

        Ok(store)
    }

    fn documents(&self, collection: &str) -> &[Document] {
        self.collections
            .get(collection)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(
        &self,
        collection: &str,
        filter: Document,
        projection: Option<Document>,
    ) -> MongoResult<Vec<Document>> {
        debug!(collection = %collection, filter = %filter, projection = ?projection, "Executing find");

        let mut results = Vec::new();
        for doc in self.documents(collection) {
            if matches(doc, &filter)? {
                results.push(match projection {
                    Some(ref p) => project(doc, p)?,
                    None => doc.clone(),
                });
            }
        }
        Ok(results)
    }

    async fn find_one(&self, collection: &str, filter: Document) -> MongoResult<Option<Document>> {
        debug!(collection = %collection, filter = %filter, "Executing find_one");

        for doc in self.documents(collection) {
            if matches(doc, &filter)? {
                return Ok(Some(doc.clone()));
            }
        }
        Ok(None)
    }

    async fn ping(&self) -> MongoResult<()> {
        Ok(())
    }
}

fn matches(doc: &Document, filter: &Document) -> MongoResult<bool> {
    for (field, condition) in filter {
        if field.starts_with('$') {
            return Err(MongoError::query(format!(
                "unsupported top-level operator '{}'",
                field
            )));
        }

        let value = lookup(doc, field)?;
        let matched = match condition {
            Bson::Document(ops) if is_operator_document(ops) => {
                let mut all = true;
                for (op, operand) in ops {
                    all &= match (op.as_str(), operand) {
                        ("$eq", expected) => value_matches(value, expected),
                        ("$in", Bson::Array(options)) => {
                            options.iter().any(|o| value_matches(value, o))
                        }
                        ("$in", _) => return Err(MongoError::query("$in needs an array")),
                        (other, _) => {
                            return Err(MongoError::query(format!(
                                "unsupported operator '{}'",
                                other
                            )));
                        }
                    };
                }
                all
            }
            expected => value_matches(value, expected),
        };

        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Resolve a dotted path through embedded documents.
fn lookup<'a>(doc: &'a Document, path: &str) -> MongoResult<Option<&'a Bson>> {
    let mut segments = path.split('.');
    let Some(first) = segments.next() else {
        return Ok(None);
    };
    let mut value = doc.get(first);
    for segment in segments {
        value = match value {
            Some(Bson::Document(inner)) => inner.get(segment),
            Some(Bson::Array(_)) => {
                return Err(MongoError::query(format!(
                    "path '{}' crosses an array",
                    path
                )));
            }
            _ => None,
        };
    }
    Ok(value)
}

fn is_operator_document(doc: &Document) -> bool {
    doc.keys().next().is_some_and(|k| k.starts_with('$'))
}

fn value_matches(value: Option<&Bson>, expected: &Bson) -> bool {
    match value {
        Some(actual) if actual == expected => true,
        Some(Bson::Array(items)) => items.iter().any(|item| item == expected),
        Some(_) => false,
        None => matches!(expected, Bson::Null),
    }
}

fn truthy(value: &Bson) -> bool {
    match value {
        Bson::Boolean(b) => *b,
        Bson::Int32(n) => *n != 0,
        Bson::Int64(n) => *n != 0,
        Bson::Double(f) => *f != 0.0,
        _ => true,
    }
}

fn project(doc: &Document, projection: &Document) -> MongoResult<Document> {
    let id_flag = projection.get("_id").map(truthy);
    let include_id = id_flag.unwrap_or(true);

    let mut included = Vec::new();
    let mut excluded = Vec::new();
    for (field, flag) in projection.iter().filter(|(k, _)| k.as_str() != "_id") {
        if field.is_empty() || field.split('.').any(str::is_empty) {
            return Err(MongoError::query(format!("invalid projection path '{}'", field)));
        }
        if truthy(flag) {
            included.push(field.as_str());
        } else {
            excluded.push(field.as_str());
        }
    }

    if !included.is_empty() && !excluded.is_empty() {
        return Err(MongoError::query(
            "cannot mix inclusion and exclusion in a projection",
        ));
    }
    for paths in [&included, &excluded] {
        check_collisions(paths)?;
    }

    let inclusive = !included.is_empty() || (excluded.is_empty() && id_flag == Some(true));

    let mut projected = if inclusive {
        include_paths(doc, &included)
    } else {
        exclude_paths(doc, &excluded)
    };
    if !include_id {
        projected.remove("_id");
    } else if inclusive {
        if let Some(id) = doc.get("_id") {
            let mut with_id = Document::new();
            with_id.insert("_id", id.clone());
            with_id.extend(projected);
            projected = with_id;
        }
    }
    Ok(projected)
}

/// Reject projections naming both a field and one of its subfields.
fn check_collisions(paths: &[&str]) -> MongoResult<()> {
    for a in paths {
        for b in paths {
            if b.len() > a.len() && b.starts_with(a) && b.as_bytes()[a.len()] == b'.' {
                return Err(MongoError::query(format!(
                    "projection paths '{}' and '{}' collide",
                    a, b
                )));
            }
        }
    }
    Ok(())
}

/// Paths below `field`, with the `field.` prefix stripped.
fn subpaths<'a>(paths: &[&'a str], field: &str) -> Vec<&'a str> {
    paths
        .iter()
        .copied()
        .filter_map(|path| path.strip_prefix(field)?.strip_prefix('.'))
        .collect()
}

fn include_paths(doc: &Document, paths: &[&str]) -> Document {
    let mut out = Document::new();
    for (field, value) in doc {
        if field == "_id" {
            continue;
        }
        if paths.contains(&field.as_str()) {
            out.insert(field.clone(), value.clone());
            continue;
        }
        let nested = subpaths(paths, field);
        if nested.is_empty() {
            continue;
        }
        match value {
            Bson::Document(inner) => {
                out.insert(field.clone(), include_paths(inner, &nested));
            }
            Bson::Array(items) => {
                let kept: Vec<Bson> = items
                    .iter()
                    .filter_map(|item| match item {
                        Bson::Document(inner) => Some(Bson::Document(include_paths(inner, &nested))),
                        _ => None,
                    })
                    .collect();
                out.insert(field.clone(), kept);
            }
            _ => {}
        }
    }
    out
}

fn exclude_paths(doc: &Document, paths: &[&str]) -> Document {
    let mut out = Document::new();
    for (field, value) in doc {
        if paths.contains(&field.as_str()) {
            continue;
        }
        let nested = subpaths(paths, field);
        let value = match value {
            Bson::Document(inner) if !nested.is_empty() => {
                Bson::Document(exclude_paths(inner, &nested))
            }
            Bson::Array(items) if !nested.is_empty() => Bson::Array(
                items
                    .iter()
                    .map(|item| match item {
                        Bson::Document(inner) => Bson::Document(exclude_paths(inner, &nested)),
                        other => other.clone(),
                    })
                    .collect(),
            ),
            other => other.clone(),
        };
        out.insert(field.clone(), value);
    }
    out
}
