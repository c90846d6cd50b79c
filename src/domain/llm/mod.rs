//! Chat completion oracle boundary

mod message;
mod provider;

pub use message::{Message, MessageRole};
pub use provider::ChatProvider;

#[cfg(test)]
pub use provider::mock;
