//! Field projections.

use bson::{Bson, Document, doc};

/// Which fields of the matching documents a query returns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Projection {
    /// Every stored field.
    #[default]
    All,
    /// The listed fields plus `_id`.
    Include(Vec<String>),
    /// Every field except the listed ones.
    Exclude(Vec<String>),
    /// Only the listed fields; `_id` is suppressed.
    Only(Vec<String>),
}

impl Projection {
    /// Projection for a list of `select` parameters.
    ///
    /// An empty list selects all fields, not none.
    pub fn from_select(fields: Vec<String>) -> Self {
        if fields.is_empty() {
            Self::All
        } else {
            Self::Include(fields)
        }
    }

    /// Only the `neighbours` field, without `_id`.
    pub fn neighbours_only() -> Self {
        Self::Only(vec!["neighbours".to_string()])
    }

    /// Everything but the given field.
    pub fn without(field: impl Into<String>) -> Self {
        Self::Exclude(vec![field.into()])
    }

    /// Check if this projection returns every field.
    pub fn is_all(&self) -> bool {
        self.to_document().is_none()
    }

    /// The projection document to send to the store, or `None` for all fields.
    pub fn to_document(&self) -> Option<Document> {
        match self {
            Self::All => None,
            Self::Include(fields) if fields.is_empty() => None,
            Self::Exclude(fields) if fields.is_empty() => None,
            Self::Include(fields) => Some(fields.iter().map(|f| (f.clone(), Bson::Int32(1))).collect()),
            Self::Exclude(fields) => Some(fields.iter().map(|f| (f.clone(), Bson::Int32(0))).collect()),
            Self::Only(fields) => {
                let mut projection = doc! { "_id": 0 };
                for field in fields {
                    projection.insert(field.clone(), 1);
                }
                Some(projection)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_select_is_all_fields() {
        assert_eq!(Projection::from_select(vec![]), Projection::All);
        assert_eq!(Projection::All.to_document(), None);
        assert!(Projection::Include(vec![]).is_all());
    }

    #[test]
    fn test_include() {
        let projection = Projection::from_select(vec!["image_thumb".into(), "sample_id".into()]);
        assert_eq!(
            projection.to_document(),
            Some(doc! { "image_thumb": 1, "sample_id": 1 })
        );
    }

    #[test]
    fn test_neighbours_only_suppresses_id() {
        assert_eq!(
            Projection::neighbours_only().to_document(),
            Some(doc! { "_id": 0, "neighbours": 1 })
        );
    }

    #[test]
    fn test_without() {
        assert_eq!(
            Projection::without("screen_features").to_document(),
            Some(doc! { "screen_features": 0 })
        );
    }
}
