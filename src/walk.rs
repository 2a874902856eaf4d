//! Bundle tree walker: classify a content tree and fill the site model.
//!
//! ## Content Layout
//!
//! ```text
//! content/
//! ├── config.toml
//! ├── index.textbundle/            # Home content, assets → <home>/assets
//! ├── about.textbundle/            # Top-level page `about`
//! ├── posts/                       # Known section id → section container
//! │   ├── index.textbundle/        # Section content, assets → posts/assets
//! │   ├── hello-world.textbundle/  # Item `hello-world`
//! │   └── 2024/
//! │       └── recap.textbundle/    # Item `2024/recap`
//! └── notes/                       # Unknown name → page container
//!     ├── index.textbundle/        # Reserved, skipped
//!     ├── x.textbundle/            # Page `notes/x`, listed first
//!     └── deep/
//!         └── y.textbundle/        # Page `notes/deep/y`
//! ```
//!
//! Only the bundle extension marks a bundle; the walker never descends into
//! one. Hidden entries are skipped and every enumeration is sorted by file
//! name.
//!
//! ## Concurrency
//!
//! Each non-bundle folder under the root is one rayon unit, run alongside the
//! batch of top-level pages. Inside a unit every bundle is its own task. Units
//! never touch the model: they return a [`FolderResult`] and the caller
//! applies all results after the join, folders in enumeration order and then
//! the top-level pages, so the model does not depend on scheduling.
//!
//! Within one batch the first failure stops rayon from starting further
//! siblings. Folder units are collected individually so that, when several
//! folders fail, the error reported is the first one in enumeration order.

use crate::assets::AssetCopier;
use crate::config::{BundleConfig, SiteConfig};
use crate::error::{BuildError, wrap};
use crate::factory::{Bundle, ContentFactory, MarkdownContentFactory};
use crate::parser::MarkdownParser;
use crate::site::{ConfigSite, ItemOf, ModelOf, Website};
use crate::types::{Content, ContentPath, Page};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

/// The outcome of one top-level folder unit.
enum FolderResult<S: Website> {
    Pages(Vec<Page>),
    Section {
        id: S::SectionId,
        content: Option<Content>,
        assets: Option<PathBuf>,
        items: Vec<ItemOf<S>>,
    },
}

pub struct BundleWalker<'a, S, F> {
    site: &'a S,
    factory: &'a F,
    layout: &'a BundleConfig,
    copier: &'a AssetCopier,
}

impl<'a, S, F> BundleWalker<'a, S, F>
where
    S: Website,
    F: ContentFactory<S>,
{
    pub fn new(site: &'a S, factory: &'a F, layout: &'a BundleConfig, copier: &'a AssetCopier) -> Self {
        Self {
            site,
            factory,
            layout,
            copier,
        }
    }

    /// Walk `root` and add everything it contains to `model`.
    ///
    /// On error the model may already hold the home content and the results
    /// merged before the failing one.
    pub fn add_textbundles(&self, root: &Path, model: &mut ModelOf<S>) -> Result<(), BuildError> {
        info!(root = %root.display(), "walking content tree");

        let mut root_bundles = Vec::new();
        let mut folders = Vec::new();
        for path in sorted_subfolders(root)? {
            match Bundle::recognize(&path, self.layout) {
                Some(bundle) => root_bundles.push(bundle),
                None => folders.push(path),
            }
        }

        let (index, root_bundles): (Vec<Bundle>, Vec<Bundle>) =
            root_bundles.into_iter().partition(Bundle::is_index);
        if let Some(index) = index.first() {
            let error_path = self.relative_path(root, &index.folder);
            model.index.content = self
                .factory
                .make_content(index)
                .map_err(|e| wrap(e, &error_path))?;
            if let Some(assets) = &index.assets {
                let destination = model.index.path.append(&self.layout.assets_dir);
                self.copier
                    .copy_folder(assets, &destination)
                    .map_err(|e| wrap(e, &error_path))?;
            }
            debug!(path = %error_path, "added home content");
        }

        let (folder_results, root_pages) = rayon::join(
            || {
                folders
                    .par_iter()
                    .map(|folder| self.process_folder(root, folder))
                    .collect::<Vec<_>>()
            },
            || self.make_root_pages(root, &root_bundles),
        );

        for result in folder_results {
            self.merge(result?, model)?;
        }
        for page in root_pages? {
            model.add_page(page);
        }

        info!(
            sections = model.sections.len(),
            items = model.item_count(),
            pages = model.pages.len(),
            "content tree walked"
        );
        Ok(())
    }

    fn process_folder(&self, root: &Path, folder: &Path) -> Result<FolderResult<S>, BuildError> {
        let name = folder
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        match self.site.section_id(&name) {
            Some(id) => self.process_section(root, folder, id),
            None => self.process_page_container(root, folder).map(FolderResult::Pages),
        }
    }

    fn process_section(
        &self,
        root: &Path,
        folder: &Path,
        id: S::SectionId,
    ) -> Result<FolderResult<S>, BuildError> {
        let section_path = self.site.section_path(&id);
        let (index, bundles): (Vec<Bundle>, Vec<Bundle>) = self
            .discover_bundles(folder)?
            .into_iter()
            .partition(|b| b.is_index() && b.folder.parent() == Some(folder));

        let mut content = None;
        let mut assets = None;
        if let Some(index) = index.into_iter().next() {
            let error_path = self.relative_path(root, &index.folder);
            content = Some(
                self.factory
                    .make_content(&index)
                    .map_err(|e| wrap(e, &error_path))?,
            );
            assets = index.assets;
        }

        let items = bundles
            .par_iter()
            .map(|bundle| self.make_item(root, folder, bundle, &id, &section_path))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(section = %id, items = items.len(), "processed section");
        Ok(FolderResult::Section {
            id,
            content,
            assets,
            items,
        })
    }

    fn make_item(
        &self,
        root: &Path,
        section_folder: &Path,
        bundle: &Bundle,
        id: &S::SectionId,
        section_path: &ContentPath,
    ) -> Result<ItemOf<S>, BuildError> {
        let error_path = self.relative_path(root, &bundle.folder);
        let path = self.location(section_folder, bundle);

        let item = self
            .factory
            .make_item(bundle, path, id.clone())
            .map_err(|e| wrap(e, &error_path))?;

        if let Some(assets) = &bundle.assets {
            let destination = section_path
                .append(item.path.as_str())
                .append(&self.layout.assets_dir);
            self.copier
                .copy_folder(assets, &destination)
                .map_err(|e| wrap(e, &error_path))?;
        }

        debug!(section = %id, path = %item.path, "added item");
        Ok(item)
    }

    /// Pages below `folder`. An `index` bundle directly inside the container
    /// is reserved and skipped.
    fn process_page_container(&self, root: &Path, folder: &Path) -> Result<Vec<Page>, BuildError> {
        let bundles: Vec<Bundle> = self
            .page_bundles(folder)?
            .into_iter()
            .filter(|b| !(b.is_index() && b.folder.parent() == Some(folder)))
            .collect();

        bundles
            .par_iter()
            .map(|bundle| self.make_page(root, bundle, self.location(root, bundle)))
            .collect()
    }

    fn make_root_pages(&self, root: &Path, bundles: &[Bundle]) -> Result<Vec<Page>, BuildError> {
        bundles
            .par_iter()
            .map(|bundle| self.make_page(root, bundle, ContentPath::new(&bundle.name)))
            .collect()
    }

    fn make_page(&self, root: &Path, bundle: &Bundle, path: ContentPath) -> Result<Page, BuildError> {
        let error_path = self.relative_path(root, &bundle.folder);
        let page = self
            .factory
            .make_page(bundle, path)
            .map_err(|e| wrap(e, &error_path))?;

        if let Some(assets) = &bundle.assets {
            let destination = page.path.append(&self.layout.assets_dir);
            self.copier
                .copy_folder(assets, &destination)
                .map_err(|e| wrap(e, &error_path))?;
        }

        debug!(path = %page.path, "added page");
        Ok(page)
    }

    fn merge(&self, result: FolderResult<S>, model: &mut ModelOf<S>) -> Result<(), BuildError> {
        match result {
            FolderResult::Pages(pages) => {
                for page in pages {
                    model.add_page(page);
                }
            }
            FolderResult::Section {
                id,
                content,
                assets,
                items,
            } => {
                let Some(section) = model.sections.get_mut(&id) else {
                    return Ok(());
                };
                if content.is_some() {
                    section.content = content;
                }
                let section_path = section.path.clone();

                for item in items {
                    model
                        .add_item(item)
                        .map_err(|dup| BuildError::DuplicateItemPath {
                            path: dup.path,
                            first: dup.first.to_string(),
                            second: dup.second.to_string(),
                        })?;
                }

                if let Some(assets) = assets {
                    self.copier
                        .copy_folder(&assets, &section_path.append(&self.layout.assets_dir))?;
                }
            }
        }
        Ok(())
    }

    /// Every bundle below `folder`, in sorted depth-first order. Bundles are
    /// not descended into.
    fn discover_bundles(&self, folder: &Path) -> Result<Vec<Bundle>, BuildError> {
        let mut bundles = Vec::new();
        let mut entries = WalkDir::new(folder)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_hidden(e));

        while let Some(entry) = entries.next() {
            let entry = entry?;
            if !entry.file_type().is_dir() {
                continue;
            }
            if let Some(bundle) = Bundle::recognize(entry.path(), self.layout) {
                bundles.push(bundle);
                entries.skip_current_dir();
            }
        }
        Ok(bundles)
    }

    /// Bundles below `folder`, each folder's own bundles ahead of those found
    /// in its subfolders. Siblings are sorted by name.
    fn page_bundles(&self, folder: &Path) -> Result<Vec<Bundle>, BuildError> {
        let mut bundles = Vec::new();
        let mut nested = Vec::new();
        for subfolder in sorted_subfolders(folder)? {
            match Bundle::recognize(&subfolder, self.layout) {
                Some(bundle) => bundles.push(bundle),
                None => nested.push(subfolder),
            }
        }
        for subfolder in nested {
            bundles.extend(self.page_bundles(&subfolder)?);
        }
        Ok(bundles)
    }

    /// Logical location of `bundle` below `base`: directory segments kept,
    /// bundle extension dropped.
    fn location(&self, base: &Path, bundle: &Bundle) -> ContentPath {
        let parent = bundle
            .folder
            .parent()
            .and_then(|p| p.strip_prefix(base).ok())
            .map(ContentPath::from_relative)
            .unwrap_or_default();
        parent.append(&bundle.name)
    }

    /// Path of a bundle folder relative to the content root, used in errors.
    fn relative_path(&self, root: &Path, folder: &Path) -> ContentPath {
        folder
            .strip_prefix(root)
            .map(ContentPath::from_relative)
            .unwrap_or_else(|_| ContentPath::new(folder.to_string_lossy()))
    }
}

/// Immediate, non-hidden subfolders of `root`, sorted by name.
fn sorted_subfolders(root: &Path) -> Result<Vec<PathBuf>, BuildError> {
    let mut folders = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        if entry.path().is_dir() {
            folders.push(entry.path());
        }
    }
    folders.sort();
    Ok(folders)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

/// Build the site model for the content tree at `source`, copying assets
/// into `output`.
///
/// With `dry_run` set, assets are enumerated but not written.
pub fn build(
    source: &Path,
    output: &Path,
    config: &SiteConfig,
    dry_run: bool,
) -> Result<ModelOf<ConfigSite>, BuildError> {
    let site = ConfigSite::from_config(config);
    let parser = MarkdownParser::new().with_hard_breaks(config.markdown.hard_breaks);
    let factory = MarkdownContentFactory::new(parser, &config.date_format);
    let copier = AssetCopier::new(output)
        .with_target_folder(config.target_folder.as_deref().map(ContentPath::new))
        .dry_run(dry_run);

    let mut model = site.empty_model();
    BundleWalker::new(&site, &factory, &config.bundles, &copier).add_textbundles(source, &mut model)?;
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ContentErrorReason, FileIoReason};
    use crate::site::NoMetadata;
    use crate::test_helpers::{
        BlogSection, BlogSite, find_item, find_page, item_paths, page_paths, setup_fixtures,
        write_bundle,
    };
    use crate::types::{Tag, Video};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn config(sections: &[&str]) -> SiteConfig {
        SiteConfig {
            sections: sections.iter().map(|s| s.to_string()).collect(),
            ..SiteConfig::default()
        }
    }

    fn walk(root: &Path, sections: &[&str]) -> Result<ModelOf<ConfigSite>, BuildError> {
        let out = root.join(".out");
        build(root, &out, &config(sections), false)
    }

    // =========================================================================
    // Classification
    // =========================================================================

    #[test]
    fn section_with_index_and_two_items() {
        let tmp = TempDir::new().unwrap();
        write_bundle(tmp.path(), "posts/index.textbundle", "---\ntitle: All Posts\n---\n");
        write_bundle(tmp.path(), "posts/a.textbundle", "# A");
        write_bundle(tmp.path(), "posts/b.textbundle", "# B");

        let model = walk(tmp.path(), &["posts"]).unwrap();
        let section = &model.sections["posts"];
        assert_eq!(section.content.as_ref().unwrap().title, "All Posts");
        assert_eq!(item_paths(&model, "posts"), vec!["a", "b"]);
        assert!(model.pages.is_empty());
    }

    #[test]
    fn nested_items_keep_directory_segments() {
        let tmp = TempDir::new().unwrap();
        write_bundle(tmp.path(), "posts/2024/03/recap.textbundle", "# Recap");
        write_bundle(tmp.path(), "posts/2024/index.textbundle", "# Nested index");

        let model = walk(tmp.path(), &["posts"]).unwrap();
        assert_eq!(item_paths(&model, "posts"), vec!["2024/03/recap", "2024/index"]);
        assert_eq!(model.sections["posts"].content, None);
    }

    #[test]
    fn section_folder_name_is_case_insensitive() {
        let tmp = TempDir::new().unwrap();
        write_bundle(tmp.path(), "Posts/a.textbundle", "# A");

        let model = walk(tmp.path(), &["posts"]).unwrap();
        assert_eq!(item_paths(&model, "posts"), vec!["a"]);
    }

    #[test]
    fn unknown_folder_is_page_container() {
        let tmp = TempDir::new().unwrap();
        write_bundle(tmp.path(), "notes/x.textbundle", "# X");
        write_bundle(tmp.path(), "notes/index.textbundle", "# Reserved");
        write_bundle(tmp.path(), "notes/deep/y.textbundle", "# Y");
        write_bundle(tmp.path(), "notes/deep/index.textbundle", "# Deep index");

        let model = walk(tmp.path(), &["posts"]).unwrap();
        assert_eq!(
            page_paths(&model),
            vec!["notes/x", "notes/deep/index", "notes/deep/y"]
        );
        assert_eq!(model.item_count(), 0);
    }

    #[test]
    fn root_bundles_are_pages_and_index_is_home() {
        let tmp = TempDir::new().unwrap();
        write_bundle(tmp.path(), "index.textbundle", "---\ntitle: Home\n---\n");
        write_bundle(tmp.path(), "about.textbundle", "# About");
        write_bundle(tmp.path(), "contact.textbundle", "# Contact");

        let model = walk(tmp.path(), &[]).unwrap();
        assert_eq!(model.index.content.title, "Home");
        assert_eq!(page_paths(&model), vec!["about", "contact"]);
    }

    #[test]
    fn root_pages_follow_folder_results() {
        let tmp = TempDir::new().unwrap();
        write_bundle(tmp.path(), "about.textbundle", "# About");
        write_bundle(tmp.path(), "zzz/last.textbundle", "# Last");

        let model = walk(tmp.path(), &[]).unwrap();
        assert_eq!(page_paths(&model), vec!["zzz/last", "about"]);
    }

    #[test]
    fn hidden_entries_and_plain_files_are_ignored() {
        let tmp = TempDir::new().unwrap();
        write_bundle(tmp.path(), ".drafts/a.textbundle", "# Draft");
        write_bundle(tmp.path(), "notes/.wip.textbundle", "# Wip");
        fs::write(tmp.path().join("README.md"), "# Not content").unwrap();

        let model = walk(tmp.path(), &[]).unwrap();
        assert!(model.pages.is_empty());
    }

    #[test]
    fn fixture_tree_is_classified() {
        let tmp = setup_fixtures();
        let out = TempDir::new().unwrap();
        let config = crate::config::load_config(tmp.path()).unwrap();
        let model = build(tmp.path(), out.path(), &config, true).unwrap();

        assert_eq!(model.index.content.title, "Bundle Site");
        assert_eq!(
            model.sections["posts"].content.as_ref().unwrap().description,
            "Everything we have written"
        );
        assert_eq!(item_paths(&model, "posts"), vec!["2024/recap", "hello-world"]);
        assert_eq!(item_paths(&model, "projects"), vec!["work/custom-path"]);
        assert_eq!(page_paths(&model), vec!["notes/x", "notes/deep/y", "about"]);

        let hello = find_item(&model, "posts", "hello-world");
        assert_eq!(hello.content.title, "Hello, World");
        assert_eq!(hello.tags, vec![Tag::new("rust"), Tag::new("web")]);

        let recap = find_item(&model, "posts", "2024/recap");
        assert_eq!(recap.content.title, "Year in Review");
        assert_eq!(recap.content.audio.as_ref().unwrap().duration, Some(750));

        let custom = find_item(&model, "projects", "work/custom-path");
        assert_eq!(custom.rss.guid.as_deref(), Some("project-custom"));

        let y = find_page(&model, "notes/deep/y");
        assert_eq!(y.content.video, Some(Video::Vimeo("76979871".into())));
        assert_eq!(find_page(&model, "about").content.title, "About");
    }

    #[test]
    fn sections_without_folders_still_exist() {
        let tmp = TempDir::new().unwrap();
        let model = walk(tmp.path(), &["posts", "projects"]).unwrap();
        assert_eq!(model.sections.len(), 2);
        assert!(model.sections["projects"].items.is_empty());
    }

    #[test]
    fn custom_website_schema() {
        let tmp = TempDir::new().unwrap();
        write_bundle(tmp.path(), "projects/tool.textbundle", "---\nauthor: Ada\nfeatured: yes\n---\n");

        let site = BlogSite;
        let factory = MarkdownContentFactory::new(MarkdownParser::new(), "%Y-%m-%d");
        let layout = BundleConfig::default();
        let copier = AssetCopier::new(tmp.path().join(".out"));
        let mut model = site.empty_model();
        BundleWalker::new(&site, &factory, &layout, &copier)
            .add_textbundles(tmp.path(), &mut model)
            .unwrap();

        let items = &model.sections[&BlogSection::Projects].items;
        assert_eq!(items.len(), 1);
        assert!(items[0].metadata.featured);
        assert_eq!(model.sections[&BlogSection::Posts].items.len(), 0);
    }

    // =========================================================================
    // Errors
    // =========================================================================

    #[test]
    fn unreadable_item_is_file_io_with_relative_path() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("posts/broken.textbundle")).unwrap();

        let err = walk(tmp.path(), &["posts"]).unwrap_err();
        match err {
            BuildError::FileIo { path, reason, .. } => {
                assert_eq!(path.as_str(), "posts/broken.textbundle");
                assert_eq!(reason, FileIoReason::FileCouldNotBeRead);
            }
            other => panic!("expected FileIo, got {other:?}"),
        }
    }

    #[test]
    fn bad_metadata_is_content_error_with_relative_path() {
        let tmp = TempDir::new().unwrap();
        write_bundle(tmp.path(), "notes/deep/y.textbundle", "---\ndate: whenever\n---\n");

        let err = walk(tmp.path(), &[]).unwrap_err();
        match err {
            BuildError::Content {
                path,
                reason: ContentErrorReason::MetadataDecodingFailed { error, value_found },
            } => {
                assert_eq!(path.as_str(), "notes/deep/y.textbundle");
                assert_eq!(error.key(), "date");
                assert!(value_found);
            }
            other => panic!("expected Content, got {other:?}"),
        }
    }

    #[test]
    fn failing_home_index_aborts() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("index.textbundle")).unwrap();
        write_bundle(tmp.path(), "about.textbundle", "# About");

        let err = walk(tmp.path(), &[]).unwrap_err();
        assert_eq!(err.path().map(ContentPath::as_str), Some("index.textbundle"));
    }

    #[test]
    fn first_failing_folder_in_order_is_reported() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("a/one.textbundle")).unwrap();
        fs::create_dir_all(tmp.path().join("b/two.textbundle")).unwrap();

        let err = walk(tmp.path(), &[]).unwrap_err();
        assert_eq!(err.path().map(ContentPath::as_str), Some("a/one.textbundle"));
    }

    #[test]
    fn duplicate_item_paths_are_rejected() {
        let tmp = TempDir::new().unwrap();
        write_bundle(tmp.path(), "posts/a.textbundle", "# A");
        write_bundle(tmp.path(), "posts/b.textbundle", "---\npath: a\n---\n");

        let err = walk(tmp.path(), &["posts"]).unwrap_err();
        match err {
            BuildError::DuplicateItemPath { path, first, second } => {
                assert_eq!(path.as_str(), "posts/a");
                assert_eq!(first, "posts");
                assert_eq!(second, "posts");
            }
            other => panic!("expected DuplicateItemPath, got {other:?}"),
        }
    }

    #[test]
    fn path_override_cannot_escape_output_root() {
        let tmp = TempDir::new().unwrap();
        let bundle = write_bundle(
            tmp.path(),
            "posts/a.textbundle",
            "---\npath: ../../escaped\n---\n",
        );
        fs::create_dir_all(bundle.join("assets")).unwrap();
        fs::write(bundle.join("assets/x.txt"), "x").unwrap();
        let out = TempDir::new().unwrap();

        let err = build(tmp.path(), &out.path().join("dist"), &config(&["posts"]), false)
            .unwrap_err();
        match err {
            BuildError::Content {
                path,
                reason: ContentErrorReason::MetadataDecodingFailed { error, value_found },
            } => {
                assert_eq!(path.as_str(), "posts/a.textbundle");
                assert_eq!(error.key(), "path");
                assert!(value_found);
            }
            other => panic!("expected Content, got {other:?}"),
        }
        assert!(!out.path().join("escaped").exists());
    }

    #[test]
    fn missing_root_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let err = walk(&tmp.path().join("nope"), &[]).unwrap_err();
        assert!(matches!(err, BuildError::Io(_)));
    }

    // =========================================================================
    // Assets
    // =========================================================================

    #[test]
    fn assets_land_at_resolved_paths() {
        let tmp = setup_fixtures();
        let out = TempDir::new().unwrap();
        let config = crate::config::load_config(tmp.path()).unwrap();
        build(tmp.path(), out.path(), &config, false).unwrap();

        let out = out.path();
        assert!(out.join("assets/logo.png").is_file());
        assert!(out.join("posts/assets/banner.png").is_file());
        assert!(out.join("posts/hello-world/assets/img.png").is_file());
        assert!(out.join("posts/hello-world/assets/sub/doc.txt").is_file());
        assert!(out.join("notes/x/assets/sketch.png").is_file());
    }

    #[test]
    fn target_folder_prefixes_asset_output() {
        let tmp = TempDir::new().unwrap();
        let bundle = write_bundle(tmp.path(), "about.textbundle", "# About");
        fs::create_dir_all(bundle.join("assets")).unwrap();
        fs::write(bundle.join("assets/me.png"), "png").unwrap();

        let out = TempDir::new().unwrap();
        let config = SiteConfig {
            target_folder: Some("site".into()),
            ..SiteConfig::default()
        };
        build(tmp.path(), out.path(), &config, false).unwrap();
        assert!(out.path().join("site/about/assets/me.png").is_file());
    }

    #[test]
    fn dry_run_writes_nothing() {
        let tmp = setup_fixtures();
        let out = TempDir::new().unwrap();
        let config = crate::config::load_config(tmp.path()).unwrap();
        let model = build(tmp.path(), &out.path().join("dist"), &config, true).unwrap();

        assert!(model.item_count() > 0);
        assert!(!out.path().join("dist").exists());
    }

    // =========================================================================
    // Determinism
    // =========================================================================

    #[test]
    fn repeated_walks_produce_identical_models() {
        let tmp = setup_fixtures();
        let config = crate::config::load_config(tmp.path()).unwrap();
        let out = TempDir::new().unwrap();

        let first = build(tmp.path(), out.path(), &config, true).unwrap();
        let second = build(tmp.path(), out.path(), &config, true).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.sections["posts"].items[0].metadata, NoMetadata);
    }

    #[test]
    fn wide_tree_merges_in_enumeration_order() {
        let tmp = TempDir::new().unwrap();
        let mut pages = Vec::new();
        let mut items = Vec::new();
        for folder in 0..50 {
            for bundle in 0..5 {
                let page = format!("f{folder:02}/b{bundle}");
                write_bundle(tmp.path(), &format!("{page}.textbundle"), "# Page");
                pages.push(page);

                let item = format!("d{folder:02}/b{bundle}");
                write_bundle(tmp.path(), &format!("posts/{item}.textbundle"), "# Item");
                items.push(item);
            }
        }

        for _ in 0..3 {
            let model = walk(tmp.path(), &["posts"]).unwrap();
            assert_eq!(page_paths(&model), pages);
            assert_eq!(item_paths(&model, "posts"), items);
        }
    }
}
