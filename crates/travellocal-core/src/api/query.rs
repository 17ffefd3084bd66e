//! Query-string construction.
//!
//! The backend binds list filters from repeated keys, so sequences are sent
//! as `hashtags=a&hashtags=b`, never `hashtags[]=a` or `hashtags=a,b`.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Scalar(String),
    Sequence(Vec<String>),
}

/// Ordered query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, QueryValue)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.pairs
            .push((key.into(), QueryValue::Scalar(value.to_string())));
        self
    }

    #[must_use]
    pub fn with_sequence<I, T>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        let values = values.into_iter().map(|value| value.to_string()).collect();
        self.pairs.push((key.into(), QueryValue::Sequence(values)));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.iter().all(|(_, value)| match value {
            QueryValue::Scalar(_) => false,
            QueryValue::Sequence(values) => values.is_empty(),
        })
    }

    /// Percent-encoded `key=value` pairs joined by `&`, without a leading `?`.
    pub fn to_query_string(&self) -> String {
        let mut parts = Vec::new();
        for (key, value) in &self.pairs {
            let key = urlencoding::encode(key);
            match value {
                QueryValue::Scalar(value) => {
                    parts.push(format!("{key}={}", urlencoding::encode(value)));
                }
                QueryValue::Sequence(values) => {
                    for value in values {
                        parts.push(format!("{key}={}", urlencoding::encode(value)));
                    }
                }
            }
        }
        parts.join("&")
    }

    /// Appends the serialized parameters to `url`.
    pub fn append_to(&self, url: &str) -> String {
        if self.is_empty() {
            return url.to_string();
        }
        let separator = if url.contains('?') { '&' } else { '?' };
        format!("{url}{separator}{}", self.to_query_string())
    }
}
