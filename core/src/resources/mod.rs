//! Resource clients built on the shared request builder and decoders.

pub mod string_comments;

pub use string_comments::StringComments;
