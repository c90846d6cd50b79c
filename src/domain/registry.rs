//! Source-to-collection registry
//!
//! The registry is the single mapping between regulatory source documents
//! and the vector store collections that hold their chunks. It is an
//! explicit immutable value handed to each component at construction;
//! enumeration order is construction order, which makes cross-collection
//! ranking tie-breaks deterministic.

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Segmentation strategy selector for a source document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentationKind {
    /// Blank-line paragraphs with a sentence-aware size cap
    #[default]
    Paragraph,
    /// OCR'd legal text with `NN-NN-NNN ... .` section headings
    NumberedClause,
}

/// A single registered regulatory source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceEntry {
    /// Source document identifier, stored lowercased
    pub source_file: String,
    /// Vector store collection holding this source's chunks
    pub collection: String,
    /// Jurisdiction label used for location-guided retrieval (e.g. `UT`)
    pub region: String,
    /// How this source's text is segmented
    #[serde(default)]
    pub segmentation: SegmentationKind,
}

impl SourceEntry {
    pub fn new(
        source_file: impl Into<String>,
        collection: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            source_file: source_file.into().to_lowercase(),
            collection: collection.into(),
            region: region.into(),
            segmentation: SegmentationKind::Paragraph,
        }
    }

    pub fn with_segmentation(mut self, kind: SegmentationKind) -> Self {
        self.segmentation = kind;
        self
    }
}

/// Ordered, immutable source registry
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    entries: Vec<SourceEntry>,
}

impl SourceRegistry {
    /// Build a registry from entries, normalizing source identifiers to
    /// lowercase. Duplicate source identifiers are rejected.
    pub fn new(entries: Vec<SourceEntry>) -> Result<Self, DomainError> {
        let mut seen = Vec::with_capacity(entries.len());
        for entry in &entries {
            let key = entry.source_file.to_lowercase();
            if seen.contains(&key) {
                return Err(DomainError::configuration(format!(
                    "Duplicate source registered: {}",
                    key
                )));
            }
            seen.push(key);
        }

        let entries = entries
            .into_iter()
            .map(|mut e| {
                e.source_file = e.source_file.to_lowercase();
                e
            })
            .collect();

        Ok(Self { entries })
    }

    /// Resolve a source identifier to its registry entry, case-insensitive.
    pub fn resolve(&self, source_file: &str) -> Option<&SourceEntry> {
        let key = source_file.to_lowercase();
        self.entries.iter().find(|e| e.source_file == key)
    }

    /// Resolve or fail with a user-facing configuration error. Used by
    /// targeted retrieval; ingestion callers use `resolve` and skip misses.
    pub fn require(&self, source_file: &str) -> Result<&SourceEntry, DomainError> {
        self.resolve(source_file).ok_or_else(|| {
            DomainError::configuration(format!(
                "No collection mapped for source file: {}",
                source_file
            ))
        })
    }

    /// Find the entry whose region label matches, case-insensitive.
    pub fn entry_for_region(&self, region: &str) -> Option<&SourceEntry> {
        let region = region.trim();
        if region.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|e| e.region.eq_ignore_ascii_case(region))
    }

    /// All entries in registration order.
    pub fn entries(&self) -> &[SourceEntry] {
        &self.entries
    }

    /// All collection names in registration order.
    pub fn collections(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.collection.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for SourceRegistry {
    /// The five jurisdictions the pipeline ships with.
    fn default() -> Self {
        Self::new(vec![
            SourceEntry::new("eu_dsa.pdf", "eu_regulation", "EU"),
            SourceEntry::new("fl_bill.pdf", "fl_regulation", "FL"),
            SourceEntry::new("utah_regulation_act.pdf", "ut_regulation", "UT")
                .with_segmentation(SegmentationKind::NumberedClause),
            SourceEntry::new("ncmec.pdf", "ncmec_regulation", "US"),
            SourceEntry::new("ca_poksmaa.pdf", "ca_regulation", "CA"),
        ])
        .expect("default registry entries are unique")
    }
}
