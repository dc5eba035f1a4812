//! Inline emphasis within a single line.

/// Apply `**strong**` then `*em*` to one line of text.
///
/// Strong runs first so the asterisks of a `**` pair are never taken as two
/// italic delimiters. Both passes pair each opener with the nearest closer
/// that leaves at least one character between them.
pub(crate) fn emphasize(line: &str) -> String {
    let strong = wrap_delimited(line, "**", "strong");
    wrap_delimited(&strong, "*", "em")
}

fn wrap_delimited(text: &str, delimiter: &str, tag: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find(delimiter) {
        let body = &rest[open + delimiter.len()..];
        let Some(first) = body.chars().next() else {
            break;
        };
        let skip = first.len_utf8();
        let Some(close) = body[skip..].find(delimiter).map(|offset| offset + skip) else {
            // No closer after this opener means none after any later opener.
            break;
        };

        output.push_str(&rest[..open]);
        output.push('<');
        output.push_str(tag);
        output.push('>');
        output.push_str(&body[..close]);
        output.push_str("</");
        output.push_str(tag);
        output.push('>');
        rest = &body[close + delimiter.len()..];
    }

    output.push_str(rest);
    output
}
