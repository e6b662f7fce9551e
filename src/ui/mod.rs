//! Terminal UI: the interactive chat loop and the mood chart screen.
//!
//! This layer owns terminals, keyboards, and drawing. Conversation state
//! lives in [`crate::core::chat`]; the loop here just feeds it tickets and
//! results.

pub mod chat_loop;
pub mod mood;
