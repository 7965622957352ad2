//! The viewer: the stateful cursor over a document's page tree that the
//! content-stream interpreter runs against. A fresh [`Canvas`] is
//! produced on each [`Viewer::navigate`] and filled in by
//! [`Viewer::render`].

use crate::canvas::Canvas;
use crate::catalog::Page;
use crate::content::interpreter::Interpreter;
use crate::content::stream::ContentStream;
use crate::document::Document;
use crate::error::{ParseError, PdfResult};

/// Owns a [`Document`] and the viewer's current position within its
/// page tree.
pub struct Viewer {
    document: Document,
    pages: Vec<Page>,
    current: Option<usize>,
    pub canvas: Canvas,
}

impl Viewer {
    /// Takes ownership of an already-open [`Document`] and eagerly walks
    /// its page tree once: `Document::pages` is a one-shot walk, but the
    /// viewer needs random access for `navigate`/`next`/`prev`, so it
    /// materializes the walk up front.
    pub fn new(mut document: Document) -> PdfResult<Self> {
        let pages = document.pages()?;
        Ok(Viewer {
            document,
            pages,
            current: None,
            canvas: Canvas::new(),
        })
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn current_page_number(&self) -> Option<usize> {
        self.current.map(|idx| idx + 1)
    }

    pub fn current_page(&self) -> Option<&Page> {
        self.current.and_then(|idx| self.pages.get(idx))
    }

    /// Resolves the nth page (1-based), resets the canvas, and caches
    /// the page as current. Does not render — call [`Viewer::render`]
    /// afterward.
    pub fn navigate(&mut self, page_number_1_based: usize) -> PdfResult<&mut Self> {
        if page_number_1_based == 0 || page_number_1_based > self.pages.len() {
            anyhow::bail!(ParseError::UnsupportedFeature(format!(
                "page {page_number_1_based} out of range (document has {} pages)",
                self.pages.len()
            )));
        }
        self.current = Some(page_number_1_based - 1);
        self.canvas = Canvas::new();
        Ok(self)
    }

    /// Advances to the next page, per [`Viewer::navigate`]'s rules.
    pub fn next(&mut self) -> PdfResult<&mut Self> {
        let idx = self.current.unwrap_or(usize::MAX);
        let next_page = idx.wrapping_add(1).wrapping_add(1);
        self.navigate(next_page)
    }

    /// Returns to the previous page, per [`Viewer::navigate`]'s rules.
    pub fn prev(&mut self) -> PdfResult<&mut Self> {
        let current = self.current.ok_or_else(|| ParseError::UnsupportedFeature("prev() called before any navigate()".to_owned()))?;
        self.navigate(current) // current is 0-based index of the page we're on; current (not current+1) is the 1-based previous page
    }

    /// Runs the content-stream interpreter over the current page's
    /// concatenated `Contents` under its effective resources, filling in
    /// `self.canvas`.
    pub fn render(&mut self) -> PdfResult<()> {
        let idx = self
            .current
            .ok_or_else(|| ParseError::UnsupportedFeature("render() called before navigate()".to_owned()))?;
        let page = self.pages[idx].clone();
        let content = ContentStream::from_contents(&page.contents, &mut self.document)?;
        self.canvas = Canvas::new();

        // `Interpreter` wants its own `&mut Vec<Warning>` distinct from the
        // document's resolver borrow; collect into a scratch buffer and
        // fold it into `document.warnings` afterward.
        let mut interp_warnings = Vec::new();
        let result = {
            let mut interpreter = Interpreter::new(&mut self.document, &mut self.canvas, &mut interp_warnings, page.resources.clone());
            interpreter.run(&content.combined_buffer)
        };
        self.document.warnings.extend(interp_warnings);
        result
    }
}
