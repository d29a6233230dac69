//! Filter document building.

use bson::{Bson, Document, doc};

/// Builder for filter documents.
///
/// Only the two predicates the browser needs are offered: field equality and
/// set membership.
///
/// # Example
///
/// ```rust
/// use microscopium_query::FilterBuilder;
///
/// let filter = FilterBuilder::new()
///     .eq("screen", "BBBC017")
///     .eq_opt("_id", None::<String>)
///     .build();
///
/// // Produces: { "screen": "BBBC017" }
/// assert_eq!(filter.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FilterBuilder {
    doc: Document,
}

impl FilterBuilder {
    /// Create a new empty filter builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality condition.
    pub fn eq(mut self, field: &str, value: impl Into<Bson>) -> Self {
        self.doc.insert(field, value.into());
        self
    }

    /// Add an equality condition when a value is present.
    pub fn eq_opt(self, field: &str, value: Option<impl Into<Bson>>) -> Self {
        match value {
            Some(value) => self.eq(field, value),
            None => self,
        }
    }

    /// Add an "in" condition (value in array).
    pub fn in_array(mut self, field: &str, values: Vec<impl Into<Bson>>) -> Self {
        let bson_values: Vec<Bson> = values.into_iter().map(Into::into).collect();
        self.doc.insert(field, doc! { "$in": bson_values });
        self
    }

    /// Build the filter document.
    pub fn build(self) -> Document {
        self.doc
    }

    /// Check if the filter is empty.
    pub fn is_empty(&self) -> bool {
        self.doc.is_empty()
    }
}

/// Create an empty filter (matches all documents).
pub fn all() -> Document {
    doc! {}
}
