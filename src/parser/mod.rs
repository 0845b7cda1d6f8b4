//! Script tokenizer
//!
//! There is no syntax tree: the interpreter pulls tokens from a
//! [`TokenStream`] and evaluates as it parses.

pub mod lexer;
pub mod stream;

// Re-exports
pub use lexer::{Lexer, Punct, SourcePos, Token};
pub use stream::TokenStream;
