use crate::application::render::types::RenderedBlock;

use super::inline::emphasize;

const MAX_HEADING_LEVEL: usize = 4;

/// Single pass over the source lines producing the block sequence.
///
/// Headings are recognised on the untrimmed line, so an indented `#` stays
/// paragraph text. Every other decision is made on the trimmed line.
pub(crate) fn scan_blocks(source: &str) -> Vec<RenderedBlock> {
    let mut scanner = Scanner::default();
    for line in source.lines() {
        scanner.push_line(line);
    }
    scanner.finish()
}

#[derive(Default)]
struct Scanner {
    blocks: Vec<RenderedBlock>,
    paragraph: Vec<String>,
}

impl Scanner {
    fn push_line(&mut self, raw: &str) {
        if let Some((level, text)) = heading(raw) {
            self.flush_paragraph();
            self.blocks.push(RenderedBlock::Heading {
                level,
                text: emphasize(text),
            });
            return;
        }

        let line = raw.trim();
        if line.is_empty() {
            self.flush_paragraph();
            return;
        }

        if let Some(item) = list_item(line) {
            self.flush_paragraph();
            self.blocks.push(RenderedBlock::ListItem(emphasize(item)));
            return;
        }

        if is_raw_heading(line) {
            self.flush_paragraph();
            self.blocks.push(RenderedBlock::RawHtml(emphasize(line)));
            return;
        }

        self.paragraph.push(emphasize(line));
    }

    fn flush_paragraph(&mut self) {
        if self.paragraph.is_empty() {
            return;
        }
        let text = self.paragraph.join(" ");
        self.paragraph.clear();
        self.blocks.push(RenderedBlock::Paragraph(text));
    }

    fn finish(mut self) -> Vec<RenderedBlock> {
        self.flush_paragraph();
        self.blocks
    }
}

/// `#`..`####` at the very start of the line followed by a space.
fn heading(line: &str) -> Option<(u8, &str)> {
    let level = line.bytes().take_while(|byte| *byte == b'#').count();
    if level == 0 || level > MAX_HEADING_LEVEL {
        return None;
    }
    let text = line[level..].strip_prefix(' ')?;
    let level = u8::try_from(level).ok()?;
    Some((level, text.trim()))
}

/// A hand-written `<h..>` tag line stands alone instead of joining the
/// surrounding paragraph.
fn is_raw_heading(line: &str) -> bool {
    line.starts_with("<h") || line.starts_with("<H")
}

/// One marker character (digit, `.`, `-`, `*`, `+`) and one whitespace
/// character; returns the text after them.
fn list_item(line: &str) -> Option<&str> {
    let mut chars = line.char_indices();
    let (_, marker) = chars.next()?;
    if !(marker.is_ascii_digit() || matches!(marker, '.' | '-' | '*' | '+')) {
        return None;
    }
    let (offset, separator) = chars.next()?;
    if !separator.is_whitespace() {
        return None;
    }
    Some(&line[offset + separator.len_utf8()..])
}
