mod blocks;
mod inline;

use crate::application::render::types::{RenderService, RenderedBlock, RenderedDocument};

use blocks::scan_blocks;

/// Line-oriented converter for the small markdown vocabulary fragments use:
/// `#`..`####` headings, `**strong**`, `*em*`, single-character list markers
/// and blank-line separated paragraphs.
///
/// Fragment text is trusted operator input. Paragraph and list text is not
/// escaped, so inline HTML inside markdown passes through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderService;

impl MarkdownRenderService {
    pub fn new() -> Self {
        Self
    }

    /// Produce the block sequence for `raw`.
    pub fn render_document(&self, raw: &str) -> RenderedDocument {
        if is_html_passthrough(raw) {
            return RenderedDocument::new(vec![RenderedBlock::RawHtml(raw.to_string())]);
        }
        RenderedDocument::new(scan_blocks(raw))
    }
}

impl RenderService for MarkdownRenderService {
    fn render(&self, raw: &str) -> String {
        self.render_document(raw).to_html()
    }
}

/// Text whose trimmed form starts with `<` and that contains a `>` is
/// treated as finished HTML.
pub fn is_html_passthrough(raw: &str) -> bool {
    raw.trim_start().starts_with('<') && raw.contains('>')
}
