//! Path validation.
//!
//! Collection paths have an odd number of segments (`groups`,
//! `groups/g1/members`), document paths an even number (`groups/g1`).

use crate::error::{Error, Result};

fn segments(path: &str) -> Result<usize> {
    if path.is_empty() {
        return Err(Error::InvalidPath("empty path".into()));
    }
    let mut count = 0;
    for segment in path.split('/') {
        if segment.is_empty() {
            return Err(Error::InvalidPath(format!("empty segment in {:?}", path)));
        }
        count += 1;
    }
    Ok(count)
}

/// Check that `path` names a document.
pub fn validate_document_path(path: &str) -> Result<()> {
    if segments(path)? % 2 != 0 {
        return Err(Error::InvalidPath(format!("{:?} is not a document path", path)));
    }
    Ok(())
}

/// Check that `path` names a collection.
pub fn validate_collection_path(path: &str) -> Result<()> {
    if segments(path)? % 2 != 1 {
        return Err(Error::InvalidPath(format!("{:?} is not a collection path", path)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_and_collection_paths() {
        assert!(validate_document_path("groups/g1").is_ok());
        assert!(validate_document_path("groups/g1/members/u1").is_ok());
        assert!(validate_document_path("groups").is_err());
        assert!(validate_collection_path("groups").is_ok());
        assert!(validate_collection_path("groups/g1/announcements").is_ok());
        assert!(validate_collection_path("groups/g1").is_err());
    }

    #[test]
    fn rejects_empty_segments() {
        assert!(validate_document_path("").is_err());
        assert!(validate_document_path("groups//g1").is_err());
        assert!(validate_collection_path("/groups").is_err());
    }
}
