//! Reading the aggregate artifact back into blocks.

use std::path::Path;

use repodoc_core::block::parse_blocks;
use repodoc_core::error::{Error, Result};
use repodoc_core::models::ParsedBlock;

/// Read and parse the artifact at `path`.
///
/// The returned blocks are an owned, re-iterable sequence. A missing file
/// is `ArtifactNotFound`; invalid UTF-8 is replaced rather than rejected.
pub fn parse_artifact(path: &Path) -> Result<Vec<ParsedBlock>> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::ArtifactNotFound(path.display().to_string()));
        }
        Err(e) => return Err(e.into()),
    };
    Ok(parse_blocks(&String::from_utf8_lossy(&bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_artifact() {
        let tmp = TempDir::new().unwrap();
        let err = parse_artifact(&tmp.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, Error::ArtifactNotFound(_)));
    }

    #[test]
    fn test_reads_blocks_in_order() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("aggregated_code.txt");
        std::fs::write(
            &path,
            "Path - a.py\n\nprint(1)\n---\nPath - b.py\n\nprint(2)\n---\n",
        )
        .unwrap();

        let blocks = parse_artifact(&path).unwrap();
        assert_eq!(
            blocks,
            vec![
                ParsedBlock::new("a.py", "print(1)\n"),
                ParsedBlock::new("b.py", "print(2)\n"),
            ]
        );
        // Re-readable: parsing again yields the same sequence.
        assert_eq!(parse_artifact(&path).unwrap(), blocks);
    }
}
