use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity and provenance of one stored resource.
///
/// Built once when a resource is accepted and never mutated afterwards; the
/// `with_*` methods consume and return a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceReference {
    uri: String,
    uid: String,
    hash: Option<String>,
    etag: Option<String>,
    submitted_at: DateTime<Utc>,
    processed_at: DateTime<Utc>,
    name: String,
    description: String,
}

impl ResourceReference {
    pub fn new(uri: impl Into<String>, uid: impl Into<String>, submitted_at: DateTime<Utc>) -> Self {
        let uri = uri.into();
        let name = name_from_uri(&uri);
        let description = default_description(&name);
        Self {
            uri,
            uid: uid.into(),
            hash: None,
            etag: None,
            submitted_at,
            processed_at: Utc::now(),
            name,
            description,
        }
    }

    /// Reference for a resource with no stable id of its own
    pub fn from_uri(uri: impl Into<String>) -> Self {
        let uri = uri.into();
        let uid = generate_uid(&uri);
        Self::new(uri, uid, Utc::now())
    }

    pub fn with_processed_at(mut self, processed_at: DateTime<Utc>) -> Self {
        self.processed_at = processed_at;
        self
    }

    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    /// Sets the display name; the description follows unless set explicitly later
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self.description = default_description(&self.name);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    pub fn processed_at(&self) -> DateTime<Utc> {
        self.processed_at
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// `"{uri}_{uuid}"` with the uuid in simple (hyphenless) form
pub fn generate_uid(uri: &str) -> String {
    format!("{}_{}", uri, Uuid::new_v4().simple())
}

fn name_from_uri(uri: &str) -> String {
    uri.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(uri)
        .to_string()
}

fn default_description(name: &str) -> String {
    format!("{}_description", name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_defaults_from_uri() {
        let ts = Utc.with_ymd_and_hms(2018, 5, 1, 10, 0, 0).unwrap();
        let resource = ResourceReference::new("https://store/images/cat.jpg", "uid-1", ts);

        assert_eq!(resource.name(), "cat.jpg");
        assert_eq!(resource.description(), "cat.jpg_description");
        assert_eq!(resource.submitted_at(), ts);
        assert!(resource.hash().is_none());
    }

    #[test]
    fn test_builder_methods() {
        let ts = Utc.with_ymd_and_hms(2018, 5, 1, 10, 0, 0).unwrap();
        let resource = ResourceReference::new("blob://img1", "abc", ts)
            .with_processed_at(ts)
            .with_hash("d41d8cd98f00b204e9800998ecf8427e")
            .with_etag("\"d41d8cd98f00b204e9800998ecf8427e\"")
            .with_name("holiday")
            .with_description("beach photo");

        assert_eq!(resource.processed_at(), ts);
        assert_eq!(resource.hash(), Some("d41d8cd98f00b204e9800998ecf8427e"));
        assert_eq!(resource.name(), "holiday");
        assert_eq!(resource.description(), "beach photo");
    }

    #[test]
    fn test_generated_uid() {
        let uid = generate_uid("gs://bucket/cat.jpg");
        let (prefix, suffix) = uid.rsplit_once('_').unwrap();
        assert_eq!(prefix, "gs://bucket/cat.jpg");
        assert_eq!(suffix.len(), 32);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));

        let a = ResourceReference::from_uri("gs://bucket/cat.jpg");
        let b = ResourceReference::from_uri("gs://bucket/cat.jpg");
        assert_ne!(a.uid(), b.uid());
    }
}
