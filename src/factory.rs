//! Content factory: one bundle → [`Content`], [`Item`](crate::types::Item) or [`Page`].
//!
//! The factory reads a bundle's main text file, runs it through the injected
//! [`ContentParser`] and resolves every field from the decoded metadata,
//! falling back tier by tier:
//!
//! | Field | Tiers |
//! |---|---|
//! | `title` | `title` metadata → parser-inferred title → bundle base name |
//! | `description` | `description` metadata → empty |
//! | `date` | `date` metadata → main file mtime → now |
//! | `last_modified` | main file mtime → resolved `date` |
//!
//! Each chain is a small function below so the tiers can be tested on their
//! own. The factory is pure: it never touches the site model and never copies
//! assets. Errors come back without path context; the walker adds it.

use crate::config::BundleConfig;
use crate::metadata::{DecodeError, FromMetadata, MetadataDecoder};
use crate::parser::{ContentParser, ParsedContent};
use crate::site::{ItemOf, Website};
use crate::types::{Audio, Content, ContentPath, Item, ItemRssProperties, Page, Tag, Video};
use chrono::{DateTime, Utc};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FactoryError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// A recognized bundle folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    pub folder: PathBuf,
    /// Folder name without the bundle extension.
    pub name: String,
    pub main_file: PathBuf,
    pub assets: Option<PathBuf>,
}

impl Bundle {
    /// Recognize `path` as a bundle. The folder extension is the only signal
    /// and is compared case-insensitively.
    pub fn recognize(path: &Path, layout: &BundleConfig) -> Option<Bundle> {
        let extension = path.extension()?.to_string_lossy();
        if !extension.eq_ignore_ascii_case(&layout.extension) || !path.is_dir() {
            return None;
        }
        let name = path.file_stem()?.to_string_lossy().into_owned();
        let assets = path.join(&layout.assets_dir);
        Some(Bundle {
            folder: path.to_path_buf(),
            name,
            main_file: path.join(&layout.main_file),
            assets: assets.is_dir().then_some(assets),
        })
    }

    pub fn is_index(&self) -> bool {
        self.name == "index"
    }
}

/// Builds model values from bundles.
///
/// Shared across all concurrent units of a walk, hence `Sync`.
pub trait ContentFactory<S: Website>: Sync {
    fn make_content(&self, bundle: &Bundle) -> Result<Content, FactoryError>;

    fn make_item(
        &self,
        bundle: &Bundle,
        path: ContentPath,
        section_id: S::SectionId,
    ) -> Result<ItemOf<S>, FactoryError>;

    fn make_page(&self, bundle: &Bundle, path: ContentPath) -> Result<Page, FactoryError> {
        Ok(Page {
            path,
            content: self.make_content(bundle)?,
        })
    }
}

/// [`ContentFactory`] for bundles whose main file a [`ContentParser`] reads.
#[derive(Debug)]
pub struct MarkdownContentFactory<P> {
    parser: P,
    date_format: String,
}

/// A bundle's main file after reading and parsing.
struct Loaded {
    parsed: ParsedContent,
    modified: Option<DateTime<Utc>>,
}

impl<P: ContentParser> MarkdownContentFactory<P> {
    pub fn new(parser: P, date_format: impl Into<String>) -> Self {
        Self {
            parser,
            date_format: date_format.into(),
        }
    }

    fn load(&self, bundle: &Bundle) -> Result<Loaded, FactoryError> {
        let text = fs::read_to_string(&bundle.main_file)?;
        let modified = fs::metadata(&bundle.main_file)
            .and_then(|m| m.modified())
            .ok()
            .map(DateTime::<Utc>::from);
        Ok(Loaded {
            parsed: self.parser.parse(&text),
            modified,
        })
    }

    fn decoder<'a>(&'a self, loaded: &'a Loaded) -> MetadataDecoder<'a> {
        MetadataDecoder::new(&loaded.parsed.metadata, &self.date_format)
    }

    fn content_from(
        &self,
        bundle: &Bundle,
        loaded: &Loaded,
        decoder: &MetadataDecoder<'_>,
    ) -> Result<Content, DecodeError> {
        let date = resolve_publish_date(
            decoder.decode_if_present("date")?,
            loaded.modified,
            Utc::now,
        );
        Ok(Content {
            title: resolve_title(
                decoder.decode_if_present("title")?,
                loaded.parsed.title.clone(),
                &bundle.name,
            ),
            description: resolve_description(decoder.decode_if_present("description")?),
            body: loaded.parsed.html.clone(),
            date,
            last_modified: resolve_last_modified(loaded.modified, date),
            image: decoder.decode_if_present::<ContentPath>("image")?,
            audio: decoder.decode_if_present::<Audio>("audio")?,
            video: decoder.decode_if_present::<Video>("video")?,
        })
    }
}

impl<S: Website, P: ContentParser> ContentFactory<S> for MarkdownContentFactory<P> {
    fn make_content(&self, bundle: &Bundle) -> Result<Content, FactoryError> {
        let loaded = self.load(bundle)?;
        let decoder = self.decoder(&loaded);
        Ok(self.content_from(bundle, &loaded, &decoder)?)
    }

    fn make_item(
        &self,
        bundle: &Bundle,
        path: ContentPath,
        section_id: S::SectionId,
    ) -> Result<ItemOf<S>, FactoryError> {
        let loaded = self.load(bundle)?;
        let decoder = self.decoder(&loaded);

        let metadata = S::ItemMetadata::from_metadata(&decoder)?;
        let path = decoder.decode_if_present::<ContentPath>("path")?.unwrap_or(path);
        let tags = decoder.decode_if_present::<Vec<Tag>>("tags")?.unwrap_or_default();
        let content = self.content_from(bundle, &loaded, &decoder)?;
        let rss = decoder
            .decode_if_present::<ItemRssProperties>("rss")?
            .unwrap_or_default();

        Ok(Item {
            path,
            section_id,
            metadata,
            tags,
            content,
            rss,
        })
    }
}

// =============================================================================
// Fallback chains
// =============================================================================

/// Explicit title, verbatim; else the parser's inferred title; else the
/// bundle's base name.
pub fn resolve_title(explicit: Option<String>, inferred: Option<String>, base_name: &str) -> String {
    explicit
        .or(inferred)
        .unwrap_or_else(|| base_name.to_string())
}

pub fn resolve_description(explicit: Option<String>) -> String {
    explicit.unwrap_or_default()
}

/// Explicit date; else the main file's modification time; else `now()`.
///
/// `now` is only called when both earlier tiers are missing.
pub fn resolve_publish_date(
    explicit: Option<DateTime<Utc>>,
    modified: Option<DateTime<Utc>>,
    now: impl FnOnce() -> DateTime<Utc>,
) -> DateTime<Utc> {
    explicit.or(modified).unwrap_or_else(now)
}

pub fn resolve_last_modified(
    modified: Option<DateTime<Utc>>,
    publish_date: DateTime<Utc>,
) -> DateTime<Utc> {
    modified.unwrap_or(publish_date)
}
