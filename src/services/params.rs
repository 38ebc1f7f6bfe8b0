use std::collections::BTreeMap;

/// Key of the message text inside [`Params`]
pub const MESSAGE_KEY: &str = "message";

/// Key of the message title inside [`Params`]
pub const TITLE_KEY: &str = "title";

/// Per-send parameters.
///
/// Keys that name a declared configuration field override that field for a
/// single send. The remaining keys are template data for the service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(BTreeMap<String, String>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.get(TITLE_KEY)
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.insert(TITLE_KEY, title)
    }

    pub fn message(&self) -> Option<&str> {
        self.get(MESSAGE_KEY)
    }

    pub fn set_message(&mut self, message: impl Into<String>) -> &mut Self {
        self.insert(MESSAGE_KEY, message)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
