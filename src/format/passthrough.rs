//! Prefixed query parameters that bypass the field model.

use std::collections::BTreeMap;

/// Query keys starting with this prefix become HTTP headers
pub const HEADER_PREFIX: &str = "@";
/// Query keys starting with this prefix become template data
pub const DATA_PREFIX: &str = "$";
/// Escapes an extension key that would otherwise be read as something else
pub const EXTENSION_PREFIX: &str = "__";

/// Free-form values carried next to the declared fields.
///
/// Header names are stored normalized, so a header inserted as
/// `authorization` reads back as `Authorization` and encodes that way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassThrough {
    headers: BTreeMap<String, String>,
    data: BTreeMap<String, String>,
    extensions: BTreeMap<String, String>,
}

/// What an incoming query key refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum QueryKey<'a> {
    Header(&'a str),
    Data(&'a str),
    /// An `__`-escaped extension; never matched against declared fields
    Escaped(&'a str),
    Plain(&'a str),
}

impl PassThrough {
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.data.is_empty() && self.extensions.is_empty()
    }

    /// Header name (normalized) to value
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Template data key (verbatim) to value
    pub fn data(&self) -> &BTreeMap<String, String> {
        &self.data
    }

    /// Undeclared query key to value, for models that allow extensions
    pub fn extensions(&self) -> &BTreeMap<String, String> {
        &self.extensions
    }

    pub fn insert_header(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        self.headers.insert(normalized_header_key(name), value.into());
        self
    }

    pub fn insert_data(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn insert_extension(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.extensions.insert(key.into(), value.into());
        self
    }

    pub(crate) fn classify(key: &str) -> QueryKey<'_> {
        if let Some(name) = key.strip_prefix(HEADER_PREFIX) {
            QueryKey::Header(name)
        } else if let Some(name) = key.strip_prefix(DATA_PREFIX) {
            QueryKey::Data(name)
        } else if let Some(name) = key.strip_prefix(EXTENSION_PREFIX) {
            QueryKey::Escaped(name)
        } else {
            QueryKey::Plain(key)
        }
    }

    /// Query pairs for every carried value: extensions, then headers, then data
    pub(crate) fn query_pairs(&self, is_declared: impl Fn(&str) -> bool) -> Vec<(String, &str)> {
        let mut pairs = Vec::with_capacity(
            self.extensions.len() + self.headers.len() + self.data.len(),
        );
        for (key, value) in &self.extensions {
            pairs.push((escape_extension_key(key, &is_declared), value.as_str()));
        }
        for (key, value) in &self.headers {
            pairs.push((format!("{HEADER_PREFIX}{key}"), value.as_str()));
        }
        for (key, value) in &self.data {
            pairs.push((format!("{DATA_PREFIX}{key}"), value.as_str()));
        }
        pairs
    }
}

fn escape_extension_key(key: &str, is_declared: impl Fn(&str) -> bool) -> String {
    let reserved = [HEADER_PREFIX, DATA_PREFIX, EXTENSION_PREFIX]
        .iter()
        .any(|prefix| key.starts_with(prefix));
    if reserved || is_declared(key) {
        format!("{EXTENSION_PREFIX}{key}")
    } else {
        key.to_string()
    }
}

/// Canonical HTTP header spelling: `contentType` and `content-type` both
/// become `Content-Type`.
pub fn normalized_header_key(key: &str) -> String {
    let mut normalized = String::with_capacity(key.len() + 4);
    let mut prev = None;
    for (i, c) in key.chars().enumerate() {
        if c.is_ascii_uppercase() && i > 0 && prev != Some('-') {
            normalized.push('-');
            normalized.push(c);
        } else if i == 0 || prev == Some('-') {
            normalized.push(c.to_ascii_uppercase());
        } else {
            normalized.push(c);
        }
        prev = Some(c);
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_header_key() {
        assert_eq!(normalized_header_key("contentType"), "Content-Type");
        assert_eq!(normalized_header_key("content-type"), "Content-Type");
        assert_eq!(normalized_header_key("authorization"), "Authorization");
        assert_eq!(normalized_header_key("Authorization"), "Authorization");
        assert_eq!(normalized_header_key("X-Api-Key"), "X-Api-Key");
        assert_eq!(normalized_header_key("xApiKey"), "X-Api-Key");
    }

    #[test]
    fn test_inserted_headers_are_normalized() {
        let mut pass_through = PassThrough::default();
        pass_through
            .insert_header("authorization", "frend")
            .insert_header("userAgent", "gozilla");

        let names: Vec<_> = pass_through.headers().keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Authorization", "User-Agent"]);
        assert!(!pass_through.is_empty());
    }

    #[test]
    fn test_classify_prefixes() {
        assert_eq!(
            PassThrough::classify("@authorization"),
            QueryKey::Header("authorization")
        );
        assert_eq!(PassThrough::classify("$userName"), QueryKey::Data("userName"));
        assert_eq!(PassThrough::classify("__title"), QueryKey::Escaped("title"));
        assert_eq!(PassThrough::classify("title"), QueryKey::Plain("title"));
    }

    #[test]
    fn test_query_pairs_escape_colliding_extensions() {
        let mut pass_through = PassThrough::default();
        pass_through
            .insert_extension("Title", "ext")
            .insert_extension("@weird", "w")
            .insert_extension("free", "f")
            .insert_header("authorization", "frend")
            .insert_data("name", "n");

        let pairs = pass_through.query_pairs(|key| key.eq_ignore_ascii_case("title"));
        let keys: Vec<_> = pairs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            vec!["__@weird", "__Title", "free", "@Authorization", "$name"]
        );
    }
}
