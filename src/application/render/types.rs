use std::fmt;

/// One block produced by the line scanner.
///
/// Text carried by `Heading`, `Paragraph` and `ListItem` has already been
/// through inline emphasis and is emitted as-is. Fragment text is trusted
/// operator input, so nothing here is HTML-escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedBlock {
    /// `#` to `####` heading.
    Heading { level: u8, text: String },
    Paragraph(String),
    ListItem(String),
    /// Input that was already HTML and bypassed conversion.
    RawHtml(String),
}

/// Block as emitted into HTML, after adjacent list items are coalesced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HtmlBlock<'a> {
    Heading { level: u8, text: &'a str },
    Paragraph(&'a str),
    List(&'a [RenderedBlock]),
    RawHtml(&'a str),
}

/// Ordered block sequence for a single fragment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderedDocument {
    blocks: Vec<RenderedBlock>,
}

impl RenderedDocument {
    pub fn new(blocks: Vec<RenderedBlock>) -> Self {
        Self { blocks }
    }

    pub fn blocks(&self) -> &[RenderedBlock] {
        &self.blocks
    }

    /// Group the block sequence for output: every maximal run of consecutive
    /// list items becomes one `List`.
    pub fn html_blocks(&self) -> Vec<HtmlBlock<'_>> {
        let mut grouped = Vec::new();
        let mut index = 0;
        while let Some(block) = self.blocks.get(index) {
            let (html_block, consumed) = match block {
                RenderedBlock::ListItem(_) => {
                    let run = self.blocks[index..]
                        .iter()
                        .take_while(|block| matches!(block, RenderedBlock::ListItem(_)))
                        .count();
                    (HtmlBlock::List(&self.blocks[index..index + run]), run)
                }
                RenderedBlock::Heading { level, text } => (
                    HtmlBlock::Heading {
                        level: *level,
                        text,
                    },
                    1,
                ),
                RenderedBlock::Paragraph(text) => (HtmlBlock::Paragraph(text), 1),
                RenderedBlock::RawHtml(html) => (HtmlBlock::RawHtml(html), 1),
            };
            grouped.push(html_block);
            index += consumed;
        }
        grouped
    }

    pub fn to_html(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for HtmlBlock<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HtmlBlock::Heading { level, text } => write!(f, "<h{level}>{text}</h{level}>"),
            HtmlBlock::Paragraph(text) => write!(f, "<p>{text}</p>"),
            HtmlBlock::List(items) => {
                writeln!(f, "<ul>")?;
                for item in items.iter() {
                    if let RenderedBlock::ListItem(text) = item {
                        writeln!(f, "<li>{text}</li>")?;
                    }
                }
                write!(f, "</ul>")
            }
            HtmlBlock::RawHtml(html) => f.write_str(html),
        }
    }
}

impl fmt::Display for RenderedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, block) in self.html_blocks().iter().enumerate() {
            if position > 0 {
                writeln!(f)?;
            }
            write!(f, "{block}")?;
        }
        Ok(())
    }
}

/// Converts raw fragment text into an HTML fragment. Implementations must be
/// pure and deterministic.
pub trait RenderService: Send + Sync {
    fn render(&self, raw: &str) -> String;
}
