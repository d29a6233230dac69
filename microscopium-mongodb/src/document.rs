//! Document access helpers.

use bson::{Bson, Document};

/// Extension trait for BSON documents.
///
/// The browser's collections are loosely typed, so accessors return `Option`
/// instead of failing on a missing or differently-typed field.
pub trait DocumentExt {
    /// Get an optional string value.
    fn get_str_opt(&self, key: &str) -> Option<&str>;

    /// Get an optional array value.
    fn get_array_opt(&self, key: &str) -> Option<&Vec<Bson>>;

    /// The `_id` rendered as text: strings as-is, ObjectIds as hex, anything
    /// else through its display form.
    fn id_string(&self) -> Option<String>;

    /// The `neighbours` list, empty when absent.
    fn neighbours(&self) -> Vec<Bson>;
}

impl DocumentExt for Document {
    fn get_str_opt(&self, key: &str) -> Option<&str> {
        self.get_str(key).ok()
    }

    fn get_array_opt(&self, key: &str) -> Option<&Vec<Bson>> {
        self.get_array(key).ok()
    }

    fn id_string(&self) -> Option<String> {
        match self.get("_id")? {
            Bson::String(s) => Some(s.clone()),
            Bson::ObjectId(oid) => Some(oid.to_hex()),
            other => Some(other.to_string()),
        }
    }

    fn neighbours(&self) -> Vec<Bson> {
        self.get_array_opt("neighbours").cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{doc, oid::ObjectId};

    #[test]
    fn test_get_str_opt() {
        let doc = doc! { "name": "BBBC017", "no_samples": 42 };
        assert_eq!(doc.get_str_opt("name"), Some("BBBC017"));
        assert_eq!(doc.get_str_opt("no_samples"), None);
        assert_eq!(doc.get_str_opt("missing"), None);
    }

    #[test]
    fn test_id_string() {
        assert_eq!(doc! { "_id": "s1" }.id_string(), Some("s1".to_string()));

        let oid = ObjectId::new();
        assert_eq!(doc! { "_id": oid }.id_string(), Some(oid.to_hex()));

        assert_eq!(doc! { "_id": 7 }.id_string(), Some("7".to_string()));
        assert_eq!(doc! {}.id_string(), None);
    }

    #[test]
    fn test_neighbours() {
        let doc = doc! { "neighbours": ["s2", "s3"] };
        assert_eq!(doc.neighbours(), vec![Bson::from("s2"), Bson::from("s3")]);
        assert!(doc! { "_id": "s1" }.neighbours().is_empty());
        assert!(doc! { "neighbours": "oops" }.neighbours().is_empty());
    }
}
