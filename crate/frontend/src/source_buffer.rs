use std::path::Path;
use std::sync::Arc;

use ziv_shared::LineSource;

const ALLOWED_EXTENSIONS: &[&str] = &["z", "ziv"];

/// Owns a compilation unit's raw bytes plus a precomputed line offset table,
/// so `line(i)` is O(log N) instead of rescanning on every call.
///
/// Construction fails (returns `None`) for an empty byte sequence or, for
/// files, an unrecognised extension; the caller is expected to report its
/// own "no buffer" error, the source buffer itself never emits a
/// diagnostic.
pub struct SourceBuffer {
    filename: Arc<str>,
    contents: Vec<u8>,
    is_regular_file: bool,
    line_offsets: Vec<(usize, usize)>,
}

impl SourceBuffer {
    /// Reads `path` from disk. Fails if the extension isn't `.z`/`.ziv`, if
    /// the file can't be read, or if it is empty.
    pub fn from_file(path: &Path) -> Option<SourceBuffer> {
        let extension = path.extension()?.to_str()?;
        if !ALLOWED_EXTENSIONS.contains(&extension) {
            return None;
        }
        let contents = std::fs::read(path).ok()?;
        let filename = path.to_string_lossy().into_owned();
        SourceBuffer::new(filename, contents, true)
    }

    /// Builds a buffer from already-read standard input bytes.
    pub fn from_stdin(contents: Vec<u8>) -> Option<SourceBuffer> {
        SourceBuffer::new("<stdin>".to_string(), contents, false)
    }

    fn new(filename: String, contents: Vec<u8>, is_regular_file: bool) -> Option<SourceBuffer> {
        if contents.is_empty() {
            return None;
        }
        let line_offsets = compute_line_offsets(&contents);
        Some(SourceBuffer {
            filename: Arc::from(filename),
            contents,
            is_regular_file,
            line_offsets,
        })
    }

    pub fn filename(&self) -> Arc<str> {
        Arc::clone(&self.filename)
    }

    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    pub fn is_regular_file(&self) -> bool {
        self.is_regular_file
    }

    pub fn line_count(&self) -> usize {
        self.line_offsets.len()
    }

    /// Returns the 1-based line's text, excluding its trailing newline.
    /// `None` if `line` is out of range.
    pub fn line(&self, line: usize) -> Option<&str> {
        if line == 0 {
            return None;
        }
        let (start, end) = *self.line_offsets.get(line - 1)?;
        std::str::from_utf8(&self.contents[start..end]).ok()
    }
}

impl LineSource for SourceBuffer {
    fn line(&self, number: usize) -> Option<&str> {
        SourceBuffer::line(self, number)
    }
}

/// Scans once for `\n` boundaries, recording each line's `[start, end)`
/// byte range with `\r` (if CRLF) and `\n` themselves excluded.
fn compute_line_offsets(contents: &[u8]) -> Vec<(usize, usize)> {
    let mut offsets = Vec::new();
    let mut start = 0;
    for (i, &byte) in contents.iter().enumerate() {
        if byte == b'\n' {
            let mut end = i;
            if end > start && contents[end - 1] == b'\r' {
                end -= 1;
            }
            offsets.push((start, end));
            start = i + 1;
        }
    }
    if start < contents.len() {
        offsets.push((start, contents.len()));
    } else if start == contents.len() && !contents.is_empty() {
        // trailing newline: no implicit final empty line
    }
    offsets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_contents() {
        assert!(SourceBuffer::from_stdin(Vec::new()).is_none());
    }

    #[test]
    fn line_lookup_excludes_newline() {
        let buffer = SourceBuffer::from_stdin(b"fn main\n    x\n".to_vec()).unwrap();
        assert_eq!(buffer.line(1), Some("fn main"));
        assert_eq!(buffer.line(2), Some("    x"));
        assert_eq!(buffer.line(3), None);
    }

    #[test]
    fn handles_missing_trailing_newline() {
        let buffer = SourceBuffer::from_stdin(b"single line".to_vec()).unwrap();
        assert_eq!(buffer.line_count(), 1);
        assert_eq!(buffer.line(1), Some("single line"));
    }

    #[test]
    fn rejects_disallowed_extension() {
        assert!(SourceBuffer::from_file(Path::new("foo.txt")).is_none());
    }
}
