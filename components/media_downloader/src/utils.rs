// components/media_downloader/src/utils.rs
use std::path::{Path, PathBuf};

use crate::types::Container;

/// Longest filename (in bytes) common filesystems accept
const MAX_FILENAME_BYTES: usize = 255;

/// Suffix of the file a transfer writes into before it is complete
pub const PARTIAL_SUFFIX: &str = ".part";

/// Filename a stream is saved under: the sanitized title plus the stream's own container tag.
///
/// The stem is cut so the name still fits with [`PARTIAL_SUFFIX`] appended.
pub fn default_filename(title: &str, subtype: &str) -> String {
    let budget = MAX_FILENAME_BYTES.saturating_sub(subtype.len() + 1 + PARTIAL_SUFFIX.len());

    let mut stem = sanitize_filename::sanitize(title.trim());
    truncate_on_char_boundary(&mut stem, budget);
    let stem = stem.trim_end_matches(['.', ' ']);

    if stem.is_empty() {
        format!("download.{}", subtype)
    } else {
        format!("{}.{}", stem, subtype)
    }
}

fn truncate_on_char_boundary(s: &mut String, max_bytes: usize) {
    if s.len() <= max_bytes {
        return;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
}

/// Where an in-progress transfer of `output` is written
pub fn partial_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_os_string();
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}

/// Path a transcoded file is written to. Only the structural extension is
/// swapped, so a title that happens to contain the source tag is left alone.
pub fn transcoded_path(downloaded: &Path, target: Container) -> PathBuf {
    downloaded.with_extension(target.extension())
}
