//! Decoded URL query strings.

use url::form_urlencoded;

use crate::error::{QueryError, QueryResult};

/// The decoded pairs of a URL query string.
///
/// Keys may repeat (`?select=a&select=b`), so pairs are kept in order rather
/// than collapsed into a map. Empty values count as absent for the
/// single-valued accessors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Decode a raw query string (without the leading `?`).
    pub fn parse(query: Option<&str>) -> Self {
        let pairs = query
            .map(|q| {
                form_urlencoded::parse(q.as_bytes())
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default();
        Self { pairs }
    }

    /// Build from already-decoded pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// First non-empty value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .find(|v| !v.is_empty())
    }

    /// First non-empty value for any of `names`, in the order given.
    pub fn get_any(&self, names: &[&str]) -> Option<&str> {
        names.iter().find_map(|name| self.get(name))
    }

    /// Every value for `name`, including empty ones.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Owned copy of the first non-empty value for `name`.
    pub fn string(&self, name: &str) -> Option<String> {
        self.get(name).map(str::to_string)
    }

    /// Field names requested through `select`.
    ///
    /// Each `select` value may itself be a comma-separated list. Blank entries
    /// are dropped, so `?select=` yields an empty list.
    pub fn select(&self) -> Vec<String> {
        self.get_all("select")
            .flat_map(|v| v.split(','))
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Interpret `name` as a boolean flag; absent means `false`.
    pub fn flag(&self, name: &str) -> QueryResult<bool> {
        match self.get(name) {
            None => Ok(false),
            Some(v) if v.eq_ignore_ascii_case("true") || v == "1" => Ok(true),
            Some(v) if v.eq_ignore_ascii_case("false") || v == "0" => Ok(false),
            Some(v) => Err(QueryError::invalid(name, v)),
        }
    }

    /// Number of decoded pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Check if the query string had no pairs.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
