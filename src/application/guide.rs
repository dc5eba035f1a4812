//! Static guidance for people writing fragment files.

const GUIDE_LINES: [&str; 5] = [
    "Headings: start a line with #, ##, ### or #### followed by a space.",
    "Emphasis: **bold** and *italic* work inside any line.",
    "Lists: start a line with -, *, + or a single digit followed by a space; \
     consecutive items form one list.",
    "Paragraphs: separate them with a blank line; adjacent lines are joined.",
    "HTML: a fragment whose first non-blank character is < is inserted as-is.",
];

/// Render the authoring guide, optionally addressed to one fragment.
pub fn authoring_guide(fragment: Option<&str>) -> String {
    let subject = fragment.unwrap_or("your content files");
    let mut guide = format!("Formatting help for {subject}:");
    for line in GUIDE_LINES {
        guide.push_str("\n  ");
        guide.push_str(line);
    }
    guide
}
