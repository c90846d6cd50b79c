//! Numbered-clause segmentation for OCR'd legal text

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::ingestion::{Chunk, ChunkMetadata, ChunkingConfig, ChunkingStrategy};
use crate::domain::DomainError;

/// A section heading line: two-to-three digit group, dash, two-to-three
/// digit group, dash, three digit group, ending in a period.
/// E.g. `13-63-101 Definitions.`
static SECTION_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2,3}-\d{2,3}-\d{3}.*\.$").expect("valid heading regex"));

/// The section number prefix of a heading, e.g. `13-63-101`.
static SECTION_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{2,3}-\d{2,3}-\d{3})").expect("valid section number regex"));

/// Segmentation for documents whose OCR'd text has a numbered-section
/// structure: each heading starts a clause, and all following lines
/// accumulate into its body until the next heading or end of document.
#[derive(Debug, Clone, Default)]
pub struct NumberedClauseChunker;

impl NumberedClauseChunker {
    pub fn new() -> Self {
        Self
    }

    /// Scan lines into `(body, heading)` pairs. The final accumulated
    /// clause is always emitted, even with no trailing heading; text before
    /// the first heading becomes a clause without one.
    fn split_clauses(text: &str) -> Vec<(String, Option<String>)> {
        let mut clauses = Vec::new();
        let mut current_heading: Option<String> = None;
        let mut current_body = String::new();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if SECTION_HEADING.is_match(line) {
                if !current_body.is_empty() {
                    clauses.push((current_body.clone(), current_heading.take()));
                    current_body.clear();
                }
                current_heading = Some(line.to_string());
            } else if current_body.is_empty() {
                current_body.push_str(line);
            } else {
                current_body.push(' ');
                current_body.push_str(line);
            }
        }

        if !current_body.is_empty() {
            clauses.push((current_body, current_heading));
        }

        clauses
    }

    fn metadata(source_file: &str, heading: Option<String>) -> ChunkMetadata {
        let mut metadata = ChunkMetadata::new(source_file);

        if let Some(heading) = heading {
            if let Some(captures) = SECTION_NUMBER.captures(&heading) {
                metadata = metadata.with_section_number(&captures[1]);
            }
            metadata = metadata.with_section_heading(heading);
        }

        metadata
    }
}

impl ChunkingStrategy for NumberedClauseChunker {
    fn chunk(
        &self,
        text: &str,
        source_file: &str,
        config: &ChunkingConfig,
    ) -> Result<Vec<Chunk>, DomainError> {
        config.validate()?;

        Ok(Self::split_clauses(text)
            .into_iter()
            .map(|(body, heading)| Chunk::new(body, Self::metadata(source_file, heading)))
            .filter(|c| !c.is_empty())
            .collect())
    }

    fn name(&self) -> &'static str {
        "numbered_clause"
    }
}
