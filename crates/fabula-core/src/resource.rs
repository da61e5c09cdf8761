use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of a generated scene asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Image,
    Audio,
}

impl ResourceKind {
    /// Wire name used in backend payloads and storage keys.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Audio => "audio",
        }
    }

    /// File extension of the durable object.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Image => "png",
            Self::Audio => "mp3",
        }
    }

    /// Content type sent with the presigned upload.
    #[must_use]
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Image => "image/png",
            Self::Audio => "audio/mpeg",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one scene asset: the unit uploads are keyed and deduplicated
/// by.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResourceId {
    pub book_id: String,
    pub scene_number: u32,
    pub kind: ResourceKind,
}

impl ResourceId {
    #[must_use]
    pub fn new(book_id: impl Into<String>, scene_number: u32, kind: ResourceKind) -> Self {
        Self {
            book_id: book_id.into(),
            scene_number,
            kind,
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.book_id, self.scene_number, self.kind)
    }
}
