//! Paragraph segmentation with a sentence-aware size cap

use crate::domain::ingestion::{Chunk, ChunkMetadata, ChunkingConfig, ChunkingStrategy};
use crate::domain::DomainError;

/// Default strategy: blank lines delimit paragraphs, paragraph lines are
/// word-joined, and oversized paragraphs are split at sentence boundaries.
#[derive(Debug, Clone, Default)]
pub struct ParagraphChunker;

impl ParagraphChunker {
    pub fn new() -> Self {
        Self
    }

    /// Collect blank-line-delimited paragraphs, joining lines with spaces.
    fn split_paragraphs(text: &str) -> Vec<String> {
        let mut paragraphs = Vec::new();
        let mut current: Vec<&str> = Vec::new();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                if !current.is_empty() {
                    paragraphs.push(current.join(" "));
                    current.clear();
                }
            } else {
                current.push(line);
            }
        }

        if !current.is_empty() {
            paragraphs.push(current.join(" "));
        }

        paragraphs
    }

    /// Split a paragraph into sentences at `.` or `;` followed by
    /// whitespace, keeping the punctuation with the sentence.
    fn split_sentences(paragraph: &str) -> Vec<&str> {
        let mut sentences = Vec::new();
        let mut start = 0;
        let bytes = paragraph.as_bytes();

        let mut i = 0;
        while i < bytes.len() {
            if (bytes[i] == b'.' || bytes[i] == b';')
                && bytes.get(i + 1).is_some_and(|b| b.is_ascii_whitespace())
            {
                sentences.push(paragraph[start..=i].trim());
                i += 1;
                while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                    i += 1;
                }
                start = i;
            } else {
                i += 1;
            }
        }

        if start < paragraph.len() {
            let tail = paragraph[start..].trim();
            if !tail.is_empty() {
                sentences.push(tail);
            }
        }

        sentences
    }

    /// Greedily pack sentences into chunks of at most `max_chunk_size`
    /// characters. A single sentence above the cap is emitted whole: the cap
    /// is advisory, sentence integrity wins.
    fn split_long_paragraph(paragraph: &str, max_chunk_size: usize) -> Vec<String> {
        if paragraph.chars().count() <= max_chunk_size {
            return vec![paragraph.to_string()];
        }

        let mut chunks = Vec::new();
        let mut current = String::new();

        for sentence in Self::split_sentences(paragraph) {
            if current.is_empty() {
                current.push_str(sentence);
            } else if current.chars().count() + 1 + sentence.chars().count() <= max_chunk_size {
                current.push(' ');
                current.push_str(sentence);
            } else {
                chunks.push(current);
                current = sentence.to_string();
            }
        }

        if !current.is_empty() {
            chunks.push(current);
        }

        chunks
    }
}

impl ChunkingStrategy for ParagraphChunker {
    fn chunk(
        &self,
        text: &str,
        source_file: &str,
        config: &ChunkingConfig,
    ) -> Result<Vec<Chunk>, DomainError> {
        config.validate()?;

        let mut chunks = Vec::new();
        for paragraph in Self::split_paragraphs(text) {
            for piece in Self::split_long_paragraph(&paragraph, config.max_chunk_size) {
                let chunk = Chunk::new(piece, ChunkMetadata::new(source_file));
                if !chunk.is_empty() {
                    chunks.push(chunk);
                }
            }
        }

        Ok(chunks)
    }

    fn name(&self) -> &'static str {
        "paragraph"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(text: &str, max: usize) -> Vec<Chunk> {
        ParagraphChunker::new()
            .chunk(text, "eu_dsa.pdf", &ChunkingConfig::new(max))
            .unwrap()
    }

    #[test]
    fn test_empty_document_yields_no_chunks() {
        assert!(chunk("", 800).is_empty());
        assert!(chunk("\n\n  \n", 800).is_empty());
    }

    #[test]
    fn test_blank_lines_delimit_paragraphs() {
        let text = "First paragraph\nspans two lines.\n\nSecond paragraph.\n";
        let chunks = chunk(text, 800);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "First paragraph spans two lines.");
        assert_eq!(chunks[1].text, "Second paragraph.");
        assert_eq!(chunks[0].metadata.source_file, "eu_dsa.pdf");
        assert!(chunks[0].metadata.section_heading.is_none());
    }

    #[test]
    fn test_content_is_preserved() {
        // The concatenated chunk text equals the input with blank lines
        // removed, modulo whitespace normalization.
        let text = "Alpha beta gamma.\n\nDelta epsilon;\nzeta eta.\n\n\nTheta.";
        let chunks = chunk(text, 800);

        let rejoined = chunks
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let normalized_input = text.split_whitespace().collect::<Vec<_>>().join(" ");
        assert_eq!(rejoined, normalized_input);
    }

    #[test]
    fn test_long_paragraph_splits_at_sentence_boundaries() {
        let text = "One sentence here. Another sentence there; and a third one. A fourth sentence.";
        let chunks = chunk(text, 40);

        assert!(chunks.len() > 1);
        for c in &chunks {
            assert!(
                c.len() <= 40 || !c.text.contains(". "),
                "chunk exceeds cap and is not a single sentence: {:?}",
                c.text
            );
        }
        // Boundaries fall after punctuation
        assert!(chunks[0].text.ends_with('.') || chunks[0].text.ends_with(';'));
    }

    #[test]
    fn test_size_cap_respected_or_single_sentence() {
        let text = "Short one. Short two. Short three. Short four. Short five.";
        for c in chunk(text, 25) {
            assert!(c.len() <= 25);
        }
    }

    #[test]
    fn test_oversized_single_sentence_emitted_whole() {
        let long_sentence =
            "This single sentence has no internal boundary and just keeps going well past the cap without any terminator";
        let chunks = chunk(long_sentence, 30);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, long_sentence);
        assert!(chunks[0].len() > 30);
    }

    #[test]
    fn test_semicolon_is_a_sentence_boundary() {
        let text = "Clause one applies; clause two applies. Clause three applies.";
        let sentences = ParagraphChunker::split_sentences(text);
        assert_eq!(
            sentences,
            vec![
                "Clause one applies;",
                "clause two applies.",
                "Clause three applies."
            ]
        );
    }

    #[test]
    fn test_name() {
        assert_eq!(ParagraphChunker::new().name(), "paragraph");
    }
}
