pub mod in_memory;
pub mod qdrant;

pub use in_memory::InMemoryVectorStore;
pub use qdrant::QdrantVectorStore;
