//! Content-stream handling: assembling a page's effective content
//! stream and executing it.

pub mod interpreter;
pub mod stream;
