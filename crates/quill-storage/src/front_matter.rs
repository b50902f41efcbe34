//! Front-matter block splitting.
//!
//! A document may open with a block bounded by `---` lines:
//!
//! ```text
//! ---
//! title: Post A
//! weight: 1
//! ---
//! Body text.
//! ```
//!
//! Only the split happens here. Decoding the block is the page factory's job.

/// Line marker bounding a front-matter block.
pub const DELIMITER: &str = "---";

/// Undecoded front-matter block of a document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RawFrontMatter {
    /// The first line of the file is not a delimiter.
    Absent,
    /// Text between the opening and closing delimiters.
    Block(String),
    /// An opening delimiter without a closing one.
    Unterminated,
}

/// Split a document into its front-matter block and body.
///
/// A leading byte-order mark is skipped. Delimiter lines may carry trailing
/// whitespace and `\r\n` line endings. For an unterminated block the body is
/// everything after the opening delimiter.
#[must_use]
pub fn split(source: &str) -> (RawFrontMatter, &str) {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let mut lines = source.split_inclusive('\n');

    let Some(first) = lines.next() else {
        return (RawFrontMatter::Absent, source);
    };
    if !is_delimiter(first) {
        return (RawFrontMatter::Absent, source);
    }

    let block_start = first.len();
    let mut offset = block_start;
    for line in lines {
        if is_delimiter(line) {
            let block = &source[block_start..offset];
            let body = &source[offset + line.len()..];
            return (RawFrontMatter::Block(block.to_owned()), body);
        }
        offset += line.len();
    }

    (RawFrontMatter::Unterminated, &source[block_start..])
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == DELIMITER
}
