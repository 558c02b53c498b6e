//! Order tags.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Tag recording that an order has already been split.
pub const SPLIT_PROCESSED_TAG: &str = "Split-Processed";

/// Separator used when rendering tags for the platform.
const TAG_SEPARATOR: &str = ", ";

/// Ordered, duplicate-free set of order tags.
///
/// The platform stores tags as a single comma-separated string. Parsing
/// trims each tag and drops empty entries; the first occurrence of a
/// duplicate wins. Rendering joins with `", "` in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet(Vec<String>);

impl TagSet {
    /// Creates an empty tag set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a comma-separated tag string.
    pub fn parse(raw: &str) -> Self {
        raw.split(',').collect()
    }

    /// Returns true if the exact tag is present.
    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag.trim())
    }

    /// Appends a tag if it is not already present.
    ///
    /// Returns true if the tag was added.
    pub fn insert(&mut self, tag: impl AsRef<str>) -> bool {
        let tag = tag.as_ref().trim();
        if tag.is_empty() || self.contains(tag) {
            return false;
        }
        self.0.push(tag.to_string());
        true
    }

    /// Returns a copy of this set with `tag` appended.
    pub fn with(&self, tag: impl AsRef<str>) -> Self {
        let mut tags = self.clone();
        tags.insert(tag);
        tags
    }

    /// Returns true if the order has already been split.
    pub fn is_split_processed(&self) -> bool {
        self.contains(SPLIT_PROCESSED_TAG)
    }

    /// Renders the tags as the platform's comma-separated string.
    pub fn render(&self) -> String {
        self.0.join(TAG_SEPARATOR)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut tags = TagSet::new();
        for tag in iter {
            tags.insert(tag);
        }
        tags
    }
}

impl std::fmt::Display for TagSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

impl Serialize for TagSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.render())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTags {
    Joined(String),
    List(Vec<String>),
}

impl<'de> Deserialize<'de> for TagSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<RawTags>::deserialize(deserializer)? {
            Some(RawTags::Joined(raw)) => TagSet::parse(&raw),
            Some(RawTags::List(list)) => list.into_iter().collect(),
            None => TagSet::new(),
        })
    }
}
