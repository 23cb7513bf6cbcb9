use std::fmt;

use serde::Serialize;

/// A (bucket, key) pair addressing one object.
///
/// The key is the caller supplied prefix followed directly by the name. Nothing is
/// inserted between them, so `("group-images/", "Hello.pdf")` and `("group-images", "Hello.pdf")`
/// address two different objects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ObjectRef {
    pub bucket: String,
    pub key: String,
}

impl ObjectRef {
    pub fn new(bucket: impl Into<String>, prefix: &str, name: &str) -> Self {
        Self { bucket: bucket.into(), key: object_key(prefix, name) }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

pub fn object_key(prefix: &str, name: &str) -> String {
    let mut key = String::with_capacity(prefix.len() + name.len());
    key.push_str(prefix);
    key.push_str(name);
    key
}
