//! A lazy reader and interpreter for PDF documents: object model, xref
//! resolution, stream filters, the type layer over common dictionaries,
//! font decoding, and a content-stream interpreter that drives a
//! page-at-a-time [`Viewer`].
//!
//! ```no_run
//! use pdf::bytes::ByteSource;
//! use pdf::document::{Document, ParseOptions};
//! use pdf::viewer::Viewer;
//!
//! # fn main() -> anyhow::Result<()> {
//! let file = std::fs::File::open("example.pdf")?;
//! let source = ByteSource::new(file)?;
//! let document = Document::open(source, ParseOptions::default())?;
//! let mut viewer = Viewer::new(document)?;
//! viewer.navigate(1)?.render()?;
//! println!("{}", viewer.canvas.strings.join(""));
//! # Ok(())
//! # }
//! ```

pub mod bytes;
pub mod canvas;
pub mod catalog;
pub mod content;
pub mod document;
pub mod error;
pub mod filter;
pub mod font;
pub mod lexer;
pub mod object;
pub mod parser;
pub mod render;
pub mod viewer;
pub mod xref;

pub use bytes::ByteSource;
pub use canvas::Canvas;
pub use document::{Document, ParseOptions};
pub use error::{ParseError, PdfResult, Warning};
pub use viewer::Viewer;
