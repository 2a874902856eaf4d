//! Shared test utilities for the bundle-site test suite.
//!
//! Provides fixture setup, a bundle writer for ad-hoc trees, model lookups
//! that panic with a useful message, and a small hand-written [`Website`]
//! schema for exercising host-defined sections and metadata.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let config = load_config(tmp.path()).unwrap();
//! let model = build(tmp.path(), out.path(), &config, true).unwrap();
//!
//! let item = find_item(&model, "posts", "hello-world");
//! assert_eq!(item.content.title, "Hello, World");
//! assert_eq!(page_paths(&model), vec!["notes/x", "notes/deep/y", "about"]);
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::metadata::{DecodeError, FromMetadata, MetadataDecoder};
use crate::site::Website;
use crate::types::{Item, Page, SiteModel};
use serde::Serialize;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Create a bundle folder at `root/rel` with `text` as its main file.
/// Returns the bundle folder.
pub fn write_bundle(root: &Path, rel: &str, text: &str) -> PathBuf {
    let folder = root.join(rel);
    fs::create_dir_all(&folder).unwrap();
    fs::write(folder.join("text.md"), text).unwrap();
    folder
}

// =========================================================================
// Model lookups: panic with a clear message on miss
// =========================================================================

/// Find an item by path within a section. Panics if not found.
pub fn find_item<'a, Id, M, Q>(model: &'a SiteModel<Id, M>, section: &Q, path: &str) -> &'a Item<Id, M>
where
    Id: Ord + Borrow<Q>,
    Q: Ord + fmt::Display + ?Sized,
{
    let items = &model
        .sections
        .get(section)
        .unwrap_or_else(|| panic!("section '{section}' not in model"))
        .items;
    items
        .iter()
        .find(|i| i.path.as_str() == path)
        .unwrap_or_else(|| {
            let paths: Vec<&str> = items.iter().map(|i| i.path.as_str()).collect();
            panic!("item '{path}' not found in '{section}'. Available: {paths:?}")
        })
}

/// Find a page by path. Panics if not found.
pub fn find_page<'a, Id: Ord, M>(model: &'a SiteModel<Id, M>, path: &str) -> &'a Page {
    model
        .pages
        .iter()
        .find(|p| p.path.as_str() == path)
        .unwrap_or_else(|| {
            let paths: Vec<&str> = model.pages.iter().map(|p| p.path.as_str()).collect();
            panic!("page '{path}' not found. Available: {paths:?}")
        })
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// Item paths of a section keyed by a string id, in model order.
pub fn item_paths<M>(model: &SiteModel<String, M>, section: &str) -> Vec<String> {
    model.sections[section]
        .items
        .iter()
        .map(|i| i.path.to_string())
        .collect()
}

/// Page paths in model order.
pub fn page_paths<Id: Ord, M>(model: &SiteModel<Id, M>) -> Vec<String> {
    model.pages.iter().map(|p| p.path.to_string()).collect()
}

// =========================================================================
// A hand-written site schema
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlogSection {
    Posts,
    Projects,
}

impl fmt::Display for BlogSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlogSection::Posts => f.write_str("posts"),
            BlogSection::Projects => f.write_str("projects"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlogMetadata {
    pub author: String,
    pub featured: bool,
}

impl FromMetadata for BlogMetadata {
    fn from_metadata(decoder: &MetadataDecoder<'_>) -> Result<Self, DecodeError> {
        Ok(BlogMetadata {
            author: decoder.decode("author")?,
            featured: decoder.decode_if_present::<bool>("featured")?.unwrap_or(false),
        })
    }
}

/// Two fixed sections; every item must name an `author`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlogSite;

impl Website for BlogSite {
    type SectionId = BlogSection;
    type ItemMetadata = BlogMetadata;

    fn section_ids(&self) -> Vec<BlogSection> {
        vec![BlogSection::Posts, BlogSection::Projects]
    }

    fn section_id(&self, folder_name: &str) -> Option<BlogSection> {
        match folder_name.to_lowercase().as_str() {
            "posts" => Some(BlogSection::Posts),
            "projects" => Some(BlogSection::Projects),
            _ => None,
        }
    }
}
