//! Site schema: which folders are sections, and what item metadata looks like.
//!
//! The section id space is closed and fixed before a walk starts. A host
//! either implements [`Website`] for its own enum of sections and its own
//! metadata type, or uses [`ConfigSite`], which takes the section list from
//! `config.toml` and carries no extra item metadata.

use crate::config::SiteConfig;
use crate::metadata::{DecodeError, FromMetadata, MetadataDecoder};
use crate::types::{ContentPath, Item, SiteModel};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

pub trait Website: Sync {
    type SectionId: Clone + Ord + fmt::Debug + fmt::Display + Send + Sync + Serialize;
    /// Host-defined metadata decoded for every item. Decoding it is
    /// required: a failure fails the item.
    type ItemMetadata: FromMetadata + fmt::Debug + Clone + PartialEq + Send + Serialize;

    /// All section ids, in the order sections should be listed.
    fn section_ids(&self) -> Vec<Self::SectionId>;

    /// The section a content folder name maps to, if any.
    fn section_id(&self, folder_name: &str) -> Option<Self::SectionId>;

    /// Output path of a section. Defaults to the id's display form.
    fn section_path(&self, id: &Self::SectionId) -> ContentPath {
        ContentPath::new(id.to_string())
    }

    /// Output path of the home index.
    fn home_path(&self) -> ContentPath {
        ContentPath::root()
    }

    /// An empty model with every section pre-created.
    fn empty_model(&self) -> ModelOf<Self> {
        SiteModel::new(
            self.home_path(),
            self.section_ids()
                .into_iter()
                .map(|id| {
                    let path = self.section_path(&id);
                    (id, path)
                }),
        )
    }
}

pub type ItemOf<S> = Item<<S as Website>::SectionId, <S as Website>::ItemMetadata>;
pub type ModelOf<S> = SiteModel<<S as Website>::SectionId, <S as Website>::ItemMetadata>;

/// Item metadata for sites that don't define any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NoMetadata;

impl FromMetadata for NoMetadata {
    fn from_metadata(_decoder: &MetadataDecoder<'_>) -> Result<Self, DecodeError> {
        Ok(NoMetadata)
    }
}

/// A site whose sections come from the `sections` list in `config.toml`.
///
/// Folder names are matched case-insensitively against the (lowercased)
/// configured ids.
#[derive(Debug, Clone, Default)]
pub struct ConfigSite {
    sections: BTreeSet<String>,
}

impl ConfigSite {
    pub fn new<I, T>(sections: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        Self {
            sections: sections
                .into_iter()
                .map(|s| s.as_ref().trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    pub fn from_config(config: &SiteConfig) -> Self {
        Self::new(&config.sections)
    }
}

impl Website for ConfigSite {
    type SectionId = String;
    type ItemMetadata = NoMetadata;

    fn section_ids(&self) -> Vec<String> {
        self.sections.iter().cloned().collect()
    }

    fn section_id(&self, folder_name: &str) -> Option<String> {
        let name = folder_name.to_lowercase();
        self.sections.contains(&name).then_some(name)
    }
}
