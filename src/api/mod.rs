//! Lambda handlers and request processing.

pub mod chat;
pub mod escalate;
pub mod helpers;
pub mod parsing;
pub mod sessions;
pub mod summarize;
pub mod title;
pub mod users;
