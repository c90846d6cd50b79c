pub mod gemini;
pub mod ollama;

pub use gemini::GeminiChatProvider;
pub use ollama::OllamaChatProvider;
