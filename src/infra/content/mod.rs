//! Content sources the loader fetches fragment text from.

mod fs;
mod http;

pub use fs::FsContentSource;
pub use http::HttpContentSource;

use std::path::Path;

use crate::{application::ports::FetchError, domain::fragments::FragmentId};

/// Fragment ids must name a single file; anything that could walk out of
/// the content root is refused.
fn plain_file_name(fragment: &FragmentId) -> Result<&str, FetchError> {
    let name = fragment.as_str();
    let is_plain = Path::new(name)
        .file_name()
        .is_some_and(|file_name| file_name == name)
        && name != "."
        && name != "..";
    if is_plain {
        Ok(name)
    } else {
        Err(FetchError::transport(format!(
            "fragment id `{name}` is not a plain file name"
        )))
    }
}

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// Decode a body the way browsers do for `text()`: a leading byte order mark
/// is dropped and invalid sequences become U+FFFD instead of failing the
/// fetch.
pub fn decode_body(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}
