use std::fmt;

/// Image handed to the vision service, either by reference or inline
#[derive(Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Publicly reachable location (`https://`, `gs://`)
    Uri(String),
    Bytes(Vec<u8>),
}

impl ImageSource {
    pub fn uri(uri: impl Into<String>) -> Self {
        ImageSource::Uri(uri.into())
    }

    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        ImageSource::Bytes(bytes.into())
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, ImageSource::Bytes(_))
    }
}

impl fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::Uri(uri) => f.debug_tuple("Uri").field(uri).finish(),
            ImageSource::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
        }
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::Uri(uri) => write!(f, "{}", uri),
            ImageSource::Bytes(bytes) => write!(f, "<{} inline bytes>", bytes.len()),
        }
    }
}
