//! Fragment rendering.
//!
//! The pipeline is pure: raw fragment text in, deterministic HTML out. Text
//! that already looks like HTML is passed through untouched; everything else
//! is scanned line by line into [`RenderedBlock`]s, and adjacent list items
//! are coalesced into a single list when the document is written out.

mod service;
mod types;

pub use service::{MarkdownRenderService, is_html_passthrough};
pub use types::{HtmlBlock, RenderService, RenderedBlock, RenderedDocument};
