//! Site model types.
//!
//! The walker fills a [`SiteModel`] from the content tree; the binary
//! serializes it to `site.json` so later tooling (templating, feeds) can
//! consume it without re-walking the tree.
//!
//! Model types are generic over the section id type and the host-defined
//! item metadata type. [`crate::site::Website`] ties the two together and the
//! `*Of<S>` aliases in that module spell out the concrete types for a site.

use crate::metadata::{Decodable, DecodeError, FromMetadata, MetadataDecoder, ScalarValue};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// A logical, `/`-separated content path such as `posts/2024/recap`.
///
/// Leading and trailing slashes are stripped on construction, so the empty
/// path is the site root and joining never produces doubled separators.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ContentPath(String);

impl ContentPath {
    pub fn new(path: impl AsRef<str>) -> Self {
        let segments: Vec<&str> = path
            .as_ref()
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();
        Self(segments.join("/"))
    }

    /// The site root.
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Build a content path from a relative filesystem path, one segment per
    /// path component.
    pub fn from_relative(path: &Path) -> Self {
        let segments: Vec<String> = path
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Self::new(segments.join("/"))
    }

    /// Append a component (which may itself contain `/`).
    pub fn append(&self, component: impl AsRef<str>) -> Self {
        if self.0.is_empty() {
            Self::new(component)
        } else {
            Self::new(format!("{}/{}", self.0, component.as_ref()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether no segment is `.` or `..`, so joining the path onto a
    /// directory always stays below that directory.
    pub fn is_contained(&self) -> bool {
        self.0.split('/').all(|s| s != "." && s != "..")
    }
}

impl fmt::Display for ContentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A tag attached to an item. Compared case-sensitively, stored trimmed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Tag(String);

impl Tag {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Render-ready content shared by the home index, sections, items and pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Content {
    pub title: String,
    pub description: String,
    /// HTML body produced by the content parser.
    pub body: String,
    /// Publish date.
    pub date: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ContentPath>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<Audio>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<Video>,
}

/// An audio attachment, e.g. a podcast episode.
///
/// Decoded from `audio: <url>` or from the `audio.*` keys
/// (`url`, `format`, `duration`, `byte_size`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Audio {
    pub url: String,
    /// File format, derived from the URL extension when not given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Duration in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byte_size: Option<u64>,
}

/// A video attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Video {
    Hosted(String),
    YouTube(String),
    Vimeo(String),
}

/// Per-item overrides used when the item is syndicated in a feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ItemRssProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_suffix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_suffix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// A tagged, dated content unit belonging to exactly one section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Item<Id, M> {
    pub path: ContentPath,
    pub section_id: Id,
    pub metadata: M,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    pub content: Content,
    pub rss: ItemRssProperties,
}

/// A standalone page with no section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub path: ContentPath,
    pub content: Content,
}

/// The home entry, built from the root `index` bundle.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Index {
    pub path: ContentPath,
    pub content: Content,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section<Id, M> {
    pub id: Id,
    pub path: ContentPath,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    pub items: Vec<Item<Id, M>>,
}

/// Two items resolved to the same path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicatePath<Id> {
    pub path: ContentPath,
    pub first: Id,
    pub second: Id,
}

/// The aggregated site.
///
/// Every section the site schema knows about exists from construction on,
/// whether or not the content tree has a folder for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteModel<Id: Ord, M> {
    pub index: Index,
    pub sections: BTreeMap<Id, Section<Id, M>>,
    pub pages: Vec<Page>,
    /// Item output path → owning section, for duplicate detection.
    #[serde(skip)]
    item_paths: BTreeMap<ContentPath, Id>,
}

impl<Id: Ord + Clone, M> SiteModel<Id, M> {
    /// Create an empty model with one section per `(id, path)` pair.
    pub fn new(
        home_path: ContentPath,
        sections: impl IntoIterator<Item = (Id, ContentPath)>,
    ) -> Self {
        let sections = sections
            .into_iter()
            .map(|(id, path)| {
                let section = Section {
                    id: id.clone(),
                    path,
                    content: None,
                    items: Vec::new(),
                };
                (id, section)
            })
            .collect();
        Self {
            index: Index {
                path: home_path,
                content: Content::default(),
            },
            sections,
            pages: Vec::new(),
            item_paths: BTreeMap::new(),
        }
    }

    /// Append an item to its section.
    ///
    /// Uniqueness is checked on the item's output path (section path joined
    /// with the item path). Items whose section is unknown are dropped; the
    /// walker only produces items for ids the schema recognized.
    pub fn add_item(&mut self, item: Item<Id, M>) -> Result<(), DuplicatePath<Id>> {
        let Some(section) = self.sections.get_mut(&item.section_id) else {
            return Ok(());
        };
        let output_path = section.path.append(item.path.as_str());
        if let Some(first) = self.item_paths.get(&output_path) {
            return Err(DuplicatePath {
                path: output_path,
                first: first.clone(),
                second: item.section_id.clone(),
            });
        }
        self.item_paths
            .insert(output_path, item.section_id.clone());
        section.items.push(item);
        Ok(())
    }

}

impl<Id: Ord, M> SiteModel<Id, M> {
    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    pub fn item_count(&self) -> usize {
        self.sections.values().map(|s| s.items.len()).sum()
    }
}

// =============================================================================
// Metadata decoding for the structured model types
// =============================================================================

impl ScalarValue for ContentPath {
    const EXPECTED: &'static str = "relative path";

    fn parse_value(raw: &str, _date_format: &str) -> Option<Self> {
        let path = ContentPath::new(raw.trim());
        (!path.is_root() && path.is_contained()).then_some(path)
    }
}

impl ScalarValue for Tag {
    const EXPECTED: &'static str = "tag";

    fn parse_value(raw: &str, _date_format: &str) -> Option<Self> {
        let tag = Tag::new(raw);
        (!tag.0.is_empty()).then_some(tag)
    }
}

impl FromMetadata for Audio {
    fn from_metadata(decoder: &MetadataDecoder<'_>) -> Result<Self, DecodeError> {
        let url = match decoder.self_value() {
            Some(url) => url.trim().to_string(),
            None => decoder.decode::<String>("url")?,
        };
        let format = decoder
            .decode_if_present::<String>("format")?
            .or_else(|| format_from_url(&url));
        let duration = match decoder.raw("duration") {
            Some(raw) => Some(parse_duration(raw).ok_or_else(|| DecodeError::DataCorrupted {
                key: decoder.qualified("duration"),
                reason: format!("`{raw}` is not a duration (HH:MM:SS, MM:SS or seconds)"),
            })?),
            None => None,
        };
        let byte_size = decoder.decode_if_present::<u64>("byte_size")?;
        Ok(Audio {
            url,
            format,
            duration,
            byte_size,
        })
    }
}

impl Decodable for Audio {
    const EXPECTED: &'static str = "audio";

    fn decode_at(decoder: &MetadataDecoder<'_>, key: &str) -> Result<Option<Self>, DecodeError> {
        decoder.decode_structured(key)
    }
}

impl FromMetadata for Video {
    fn from_metadata(decoder: &MetadataDecoder<'_>) -> Result<Self, DecodeError> {
        if let Some(id) = decoder.decode_if_present::<String>("youtube")? {
            return Ok(Video::YouTube(id.trim().to_string()));
        }
        if let Some(id) = decoder.decode_if_present::<String>("vimeo")? {
            return Ok(Video::Vimeo(id.trim().to_string()));
        }
        let url = match decoder.self_value() {
            Some(url) => url.trim().to_string(),
            None => decoder.decode::<String>("url")?,
        };
        Ok(Video::Hosted(url))
    }
}

impl Decodable for Video {
    const EXPECTED: &'static str = "video";

    fn decode_at(decoder: &MetadataDecoder<'_>, key: &str) -> Result<Option<Self>, DecodeError> {
        decoder.decode_structured(key)
    }
}

impl FromMetadata for ItemRssProperties {
    fn from_metadata(decoder: &MetadataDecoder<'_>) -> Result<Self, DecodeError> {
        Ok(ItemRssProperties {
            guid: decoder.decode_if_present("guid")?,
            title_prefix: decoder.decode_if_present("title_prefix")?,
            title_suffix: decoder.decode_if_present("title_suffix")?,
            body_prefix: decoder.decode_if_present("body_prefix")?,
            body_suffix: decoder.decode_if_present("body_suffix")?,
            link: decoder.decode_if_present("link")?,
        })
    }
}

impl Decodable for ItemRssProperties {
    const EXPECTED: &'static str = "rss properties";

    fn decode_at(decoder: &MetadataDecoder<'_>, key: &str) -> Result<Option<Self>, DecodeError> {
        decoder.decode_structured(key)
    }
}

fn format_from_url(url: &str) -> Option<String> {
    let file = url.rsplit('/').next()?;
    let (_, ext) = file.rsplit_once('.')?;
    let ext = ext.split(['?', '#']).next().unwrap_or_default();
    (!ext.is_empty()).then(|| ext.to_ascii_lowercase())
}

/// Parse `HH:MM:SS`, `MM:SS` or plain seconds into seconds.
fn parse_duration(raw: &str) -> Option<u64> {
    let parts: Vec<&str> = raw.trim().split(':').collect();
    if parts.len() > 3 || parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    parts.iter().try_fold(0u64, |total, part| {
        let value: u64 = part.parse().ok()?;
        Some(total * 60 + value)
    })
}
