//! Transport-neutral view of inbound request headers.

use std::collections::HashMap;

/// Case-insensitive header lookup.
#[derive(Clone, Debug, Default)]
pub struct WebhookHeaders {
    values: HashMap<String, String>,
}

impl WebhookHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.values.insert(name.to_ascii_lowercase(), value.into());
    }

    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Header value, treating an empty value as absent.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for WebhookHeaders {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.insert(name.as_ref(), value);
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case_and_empty_values() {
        let headers: WebhookHeaders = [("X-Signature", "abc"), ("X-Timestamp", "")]
            .into_iter()
            .collect();
        assert_eq!(headers.get("x-signature"), Some("abc"));
        assert_eq!(headers.get("X-SIGNATURE"), Some("abc"));
        assert_eq!(headers.get("x-timestamp"), None);
    }
}
