use std::fmt;

use url::form_urlencoded;

/// Ordered multimap of query parameters
///
/// Lookup ignores order; serialization keeps insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pairs: Vec<(String, String)>,
}

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a query string, with or without the leading `?`
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self {
            pairs: form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        }
    }

    /// First value stored under `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Replace every value of `key` with a single one, keeping the position
    /// of the first occurrence
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter().position(|(k, _)| *k == key) {
            Some(first) => {
                self.pairs[first].1 = value;
                let mut index = 0;
                self.pairs.retain(|(k, _)| {
                    let keep = index <= first || *k != key;
                    index += 1;
                    keep
                });
            }
            None => self.pairs.push((key, value)),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn remove(&mut self, key: &str) {
        self.pairs.retain(|(k, _)| k != key);
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `application/x-www-form-urlencoded` serialization without the `?`
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }
}

impl fmt::Display for SearchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SearchParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_or_without_question_mark() {
        let a = SearchParams::parse("?id=v1&t=42");
        let b = SearchParams::parse("id=v1&t=42");
        assert_eq!(a, b);
        assert_eq!(a.get("t"), Some("42"));
        assert_eq!(a.get("missing"), None);
    }

    #[test]
    fn repeated_keys_keep_every_value() {
        let params = SearchParams::parse("tag=a&x=1&tag=b");
        assert_eq!(params.get("tag"), Some("a"));
        assert_eq!(params.get_all("tag"), vec!["a", "b"]);
    }

    #[test]
    fn set_collapses_duplicates_in_place() {
        let mut params = SearchParams::parse("tag=a&x=1&tag=b");
        params.set("tag", "c");
        assert_eq!(params.to_query_string(), "tag=c&x=1");
    }

    #[test]
    fn values_are_form_encoded() {
        let params = SearchParams::new().with("q", "a b&c");
        assert_eq!(params.to_query_string(), "q=a+b%26c");
        assert_eq!(
            SearchParams::parse(&params.to_query_string()).get("q"),
            Some("a b&c")
        );
    }

    #[test]
    fn remove_drops_all_values() {
        let mut params = SearchParams::parse("id=1&t=2&id=3");
        params.remove("id");
        assert_eq!(params.to_query_string(), "t=2");
        assert!(!params.contains("id"));
    }
}
