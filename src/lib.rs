//! # Bundle Site
//!
//! Builds an in-memory site model from a directory tree of textbundles and
//! mirrors each bundle's assets into an output directory.
//!
//! A textbundle is a folder named `<name>.textbundle` holding one main text
//! file (`text.md`) and an optional `assets/` folder. The folder a bundle
//! sits in decides what it becomes:
//!
//! ```text
//! content/index.textbundle        →  home content
//! content/about.textbundle        →  page `about`
//! content/posts/hello.textbundle  →  item `hello` in section `posts`
//! content/notes/x.textbundle      →  page `notes/x`
//! ```
//!
//! # Pipeline
//!
//! ```text
//! walk     content/  →  classify folders, fan out per bundle (rayon)
//! factory  bundle    →  parse main file, decode metadata, resolve fallbacks
//! walk     results   →  merge in enumeration order into the SiteModel
//! main     model     →  dist/site.json
//! ```
//!
//! Concurrent units never mutate the model. Each returns an immutable result
//! and a single aggregator applies them after the join, so two walks over an
//! unchanged tree produce identical models.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`walk`] | Bundle tree walker: classification, concurrent fan-out, ordered merge |
//! | [`factory`] | One bundle → `Content`, `Item` or `Page`, with explicit fallback chains |
//! | [`metadata`] | Typed decoding of front-matter values: scalars, lists, structured values |
//! | [`parser`] | `ContentParser` trait and the default markdown parser |
//! | [`site`] | `Website` schema trait: section ids, section paths, item metadata |
//! | [`types`] | Site model types serialized to `site.json` |
//! | [`assets`] | Recursive asset folder copying into the output tree |
//! | [`error`] | `BuildError` and the wrapper that attaches bundle paths to failures |
//! | [`config`] | `config.toml` loading, merging with stock defaults, validation |
//! | [`output`] | CLI output formatting of the built model |
//!
//! # Design Decisions
//!
//! ## Closed Section Space
//!
//! Sections are known before the walk starts. A [`site::Website`] lists them
//! and maps folder names onto them; every listed section exists in the model
//! even when no folder backs it. The binary uses [`site::ConfigSite`], which
//! reads the list from `config.toml`. Library users can define their own
//! section enum and a typed item metadata struct instead.
//!
//! ## Errors Carry Bundle Paths
//!
//! The factory and decoder report failures without location. The walker
//! attaches the bundle's path relative to the content root through
//! [`error::wrap`], so every content error names the bundle to fix.
//!
//! ## Item Paths Are Unique
//!
//! Two items resolving to the same output path fail the build with
//! [`error::BuildError::DuplicateItemPath`] instead of silently overwriting
//! each other's output.

pub mod assets;
pub mod config;
pub mod error;
pub mod factory;
pub mod metadata;
pub mod output;
pub mod parser;
pub mod site;
pub mod types;
pub mod walk;

#[cfg(test)]
pub(crate) mod test_helpers;
