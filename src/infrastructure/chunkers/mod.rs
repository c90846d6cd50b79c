//! Chunking strategy implementations

mod numbered_clause;
mod paragraph;

pub use numbered_clause::NumberedClauseChunker;
pub use paragraph::ParagraphChunker;

use crate::domain::ingestion::ChunkingStrategy;
use crate::domain::registry::SegmentationKind;

/// Select the chunking strategy for a registered segmentation kind.
pub fn strategy_for(kind: SegmentationKind) -> Box<dyn ChunkingStrategy> {
    match kind {
        SegmentationKind::Paragraph => Box::new(ParagraphChunker::new()),
        SegmentationKind::NumberedClause => Box::new(NumberedClauseChunker::new()),
    }
}
