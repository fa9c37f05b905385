use std::cmp::Ordering;
use std::fmt;
use std::iter;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::MaplistError;

/// Maximum number of member ids sent in one details request.
pub const BATCH_SIZE: usize = 50;

/// File name of the generated manifest inside the output directory.
pub const MANIFEST_FILE_NAME: &str = "maplist.txt";

static WORKSHOP_ID_QUERY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]id=(\d+)").expect("valid workshop id pattern"));

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionId(String);

impl CollectionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CollectionId {
    type Err = MaplistError;

    /// Accepts a bare id, a workshop URL carrying `id=<digits>`, or any text
    /// whose digits form the id (what a pasted clipboard usually holds).
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if !trimmed.is_empty() && trimmed.chars().all(|ch| ch.is_ascii_digit()) {
            return Ok(Self(trimmed.to_string()));
        }
        if let Some(caps) = WORKSHOP_ID_QUERY.captures(trimmed) {
            return Ok(Self(caps[1].to_string()));
        }
        let digits: String = trimmed.chars().filter(|ch| ch.is_ascii_digit()).collect();
        if digits.is_empty() {
            return Err(MaplistError::InvalidCollectionId(value.to_string()));
        }
        Ok(Self(digits))
    }
}

/// Opaque id of one collection member. Steam sends these as decimal strings,
/// but plain JSON numbers are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MemberId(String);

impl MemberId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for MemberId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(value) => MemberId(value),
            Raw::Number(value) => MemberId(value.to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRecord {
    #[serde(rename = "publishedfileid")]
    pub id: MemberId,
    #[serde(default)]
    pub title: Option<String>,
}

impl MemberRecord {
    pub fn new(id: impl Into<String>, title: Option<&str>) -> Self {
        Self {
            id: MemberId::new(id),
            title: title.map(str::to_string),
        }
    }

    /// `None` when the title is missing or blank once trimmed.
    pub fn manifest_line(&self) -> Option<ManifestLine> {
        let title = self.title.as_deref()?.trim();
        if title.is_empty() {
            return None;
        }
        Some(ManifestLine {
            title: title.to_string(),
            id: self.id.clone(),
        })
    }
}

/// Compares and orders by the rendered `title:id` bytes, so two lines that
/// render identically are equal.
#[derive(Debug, Clone)]
pub struct ManifestLine {
    pub title: String,
    pub id: MemberId,
}

impl ManifestLine {
    pub fn render(&self) -> String {
        self.to_string()
    }

    fn rendered_bytes(&self) -> impl Iterator<Item = u8> + '_ {
        self.title
            .bytes()
            .chain(iter::once(b':'))
            .chain(self.id.as_str().bytes())
    }
}

impl PartialEq for ManifestLine {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ManifestLine {}

impl PartialOrd for ManifestLine {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ManifestLine {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rendered_bytes().cmp(other.rendered_bytes())
    }
}

impl fmt::Display for ManifestLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.title, self.id)
    }
}
