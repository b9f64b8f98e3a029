//! Aggregate artifact block format.
//!
//! The artifact is a plain concatenation of one block per file:
//!
//! ```text
//! Path - src/main.py
//!
//! <file content, newline-terminated>
//! ---
//! ```
//!
//! Blocks follow each other directly. The parser splits on the exact
//! sequence `\n---\n`, so a file whose content contains a line consisting
//! only of `---` will be split in two when read back. This framing is kept
//! byte-for-byte stable so existing artifacts stay readable.
//!
//! # Example
//!
//! ```rust
//! use repodoc_core::block::{parse_blocks, serialize_blocks};
//! use repodoc_core::models::SourceFile;
//!
//! let files = vec![SourceFile { relative_path: "a.py".into(), content: "print(1)".into() }];
//! let text = serialize_blocks(&files);
//! assert_eq!(text, "Path - a.py\n\nprint(1)\n---\n");
//!
//! let blocks = parse_blocks(&text);
//! assert_eq!(blocks[0].path, "a.py");
//! assert_eq!(blocks[0].code, "print(1)\n");
//! ```

use crate::models::{ParsedBlock, SourceFile};

/// Prefix of every block header line.
pub const HEADER_PREFIX: &str = "Path - ";

/// Separator between blocks as seen by the parser.
pub const DELIMITER: &str = "\n---\n";

/// Serialize one file into `out`.
pub fn write_block(out: &mut String, relative_path: &str, content: &str) {
    out.push_str(HEADER_PREFIX);
    out.push_str(relative_path);
    out.push_str("\n\n");
    out.push_str(content);
    if !content.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("---\n");
}

/// Serialize files in the order given.
pub fn serialize_blocks(files: &[SourceFile]) -> String {
    let capacity = files
        .iter()
        .map(|f| f.relative_path.len() + f.content.len() + HEADER_PREFIX.len() + 8)
        .sum();
    let mut out = String::with_capacity(capacity);
    for file in files {
        write_block(&mut out, &file.relative_path, &file.content);
    }
    out
}

/// Parse artifact text back into ordered blocks.
///
/// - Whitespace-only segments are discarded.
/// - A segment without a newline (header only) is dropped.
/// - Duplicate paths are kept, in order.
pub fn parse_blocks(text: &str) -> Vec<ParsedBlock> {
    let segments: Vec<&str> = text.split(DELIMITER).collect();
    let last = segments.len().saturating_sub(1);

    let mut blocks = Vec::new();
    for (i, segment) in segments.into_iter().enumerate() {
        if segment.trim().is_empty() {
            continue;
        }
        // Every segment but the last lost its trailing newline to the delimiter.
        let terminated = i < last;
        if let Some(block) = parse_segment(segment, terminated) {
            blocks.push(block);
        }
    }
    blocks
}

fn parse_segment(segment: &str, terminated: bool) -> Option<ParsedBlock> {
    let segment = segment.trim_start_matches('\n');
    // A final segment only counts as a block if something follows its header.
    if !terminated && !segment.trim_end_matches('\n').contains('\n') {
        return None;
    }
    let first_nl = segment.find('\n')?;

    let header = segment[..first_nl].trim();
    let mut body = &segment[first_nl + 1..];

    let path = match header.strip_prefix(HEADER_PREFIX.trim_end()) {
        Some(rest) => {
            // Separator line written after every header.
            body = body.strip_prefix('\n').unwrap_or(body);
            rest.trim()
        }
        None => header,
    };

    let code = if terminated {
        format!("{}\n", body)
    } else {
        body.strip_suffix("\n---")
            .map(|b| format!("{}\n", b))
            .unwrap_or_else(|| body.to_string())
    };

    Some(ParsedBlock::new(path, code))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, content: &str) -> SourceFile {
        SourceFile {
            relative_path: path.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_two_file_artifact_exact_bytes() {
        let text = serialize_blocks(&[file("a.py", "print(1)"), file("b.py", "print(2)")]);
        assert_eq!(
            text,
            "Path - a.py\n\nprint(1)\n---\nPath - b.py\n\nprint(2)\n---\n"
        );
    }

    #[test]
    fn test_parse_two_file_artifact() {
        let blocks = parse_blocks("Path - a.py\n\nprint(1)\n---\nPath - b.py\n\nprint(2)\n---\n");
        assert_eq!(
            blocks,
            vec![
                ParsedBlock::new("a.py", "print(1)\n"),
                ParsedBlock::new("b.py", "print(2)\n"),
            ]
        );
    }

    #[test]
    fn test_content_with_newline_not_doubled() {
        let text = serialize_blocks(&[file("a.txt", "line\n")]);
        assert_eq!(text, "Path - a.txt\n\nline\n---\n");
    }

    #[test]
    fn test_round_trip_preserves_inner_blank_lines() {
        let files = vec![
            file("docs/readme.md", "# Title\n\nbody\n\n\nend"),
            file("src/lib.rs", "\n\nfn main() {}\n\n"),
            file("empty.py", ""),
        ];
        let blocks = parse_blocks(&serialize_blocks(&files));
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].code, "# Title\n\nbody\n\n\nend\n");
        assert_eq!(blocks[1].path, "src/lib.rs");
        assert_eq!(blocks[1].code, "\n\nfn main() {}\n\n");
        assert_eq!(blocks[2].path, "empty.py");
        assert_eq!(blocks[2].code, "\n");
    }

    #[test]
    fn test_header_only_segment_dropped() {
        let blocks = parse_blocks("Path - lonely.py\n---\nPath - a.py\n\nx\n---\n");
        assert_eq!(blocks, vec![ParsedBlock::new("a.py", "x\n")]);
    }

    #[test]
    fn test_header_only_final_segment_dropped() {
        let blocks = parse_blocks("Path - a.py\n\nx\n---\nPath - lonely.py\n");
        assert_eq!(blocks, vec![ParsedBlock::new("a.py", "x\n")]);

        let blocks = parse_blocks("Path - a.py\n\nx\n---\nPath - lonely.py\n\n\n");
        assert_eq!(blocks, vec![ParsedBlock::new("a.py", "x\n")]);
    }

    #[test]
    fn test_dash_only_content_adds_no_block() {
        let text = serialize_blocks(&[file("x.md", "---")]);
        assert_eq!(parse_blocks(&text), vec![ParsedBlock::new("x.md", "\n")]);
    }

    #[test]
    fn test_blank_segments_discarded() {
        let blocks = parse_blocks("\n---\n   \n---\nPath - a.py\n\nx\n---\n\n\n");
        assert_eq!(blocks, vec![ParsedBlock::new("a.py", "x\n")]);
    }

    #[test]
    fn test_duplicate_paths_preserved_in_order() {
        let blocks = parse_blocks("Path - a.py\n\n1\n---\nPath - a.py\n\n2\n---\n");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].code, "1\n");
        assert_eq!(blocks[1].code, "2\n");
    }

    #[test]
    fn test_unterminated_final_block() {
        let blocks = parse_blocks("Path - a.py\n\nx\n---\nPath - b.py\n\ny\n---");
        assert_eq!(blocks[1], ParsedBlock::new("b.py", "y\n"));

        let blocks = parse_blocks("Path - a.py\n\nx\n");
        assert_eq!(blocks, vec![ParsedBlock::new("a.py", "x\n")]);
    }

    #[test]
    fn test_header_without_prefix_used_verbatim() {
        let blocks = parse_blocks("  src/legacy.py  \nprint(1)\n---\n");
        assert_eq!(blocks, vec![ParsedBlock::new("src/legacy.py", "print(1)\n")]);
    }

    #[test]
    fn test_delimiter_in_content_splits_block() {
        // Known limitation of the framing: the tail after an inner `---`
        // line becomes a header-only segment and is dropped.
        let blocks = parse_blocks(&serialize_blocks(&[file("notes.md", "a\n---\nb")]));
        assert_eq!(blocks, vec![ParsedBlock::new("notes.md", "a\n")]);
    }
}
