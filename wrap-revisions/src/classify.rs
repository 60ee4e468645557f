//! Revision classification.
//!
//! A declared revision is either a commit hash, which is trusted as an
//! immutable reference and never checked against the remote, or a symbolic
//! name that must be one of the remote's tags.

/// Shortest abbreviated hash accepted as a commit reference.
pub const MIN_HASH_LEN: usize = 7;

/// Length of a full SHA-1 commit hash.
pub const MAX_HASH_LEN: usize = 40;

/// What shape a declared revision has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevisionKind {
    /// 7 to 40 hex digits, either case.
    ContentHash,
    /// Anything else: must resolve to a tag on the remote.
    SymbolicName,
}

impl RevisionKind {
    /// Whether a revision of this kind has to be looked up on the remote.
    #[must_use]
    pub const fn needs_remote_check(self) -> bool {
        matches!(self, Self::SymbolicName)
    }
}

/// Classify a revision string by shape alone.
#[inline]
#[must_use]
pub fn classify(revision: &str) -> RevisionKind {
    if (MIN_HASH_LEN..=MAX_HASH_LEN).contains(&revision.len())
        && revision.bytes().all(|b| b.is_ascii_hexdigit())
    {
        RevisionKind::ContentHash
    } else {
        RevisionKind::SymbolicName
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashes() {
        assert_eq!(classify("deadbee"), RevisionKind::ContentHash);
        assert_eq!(classify("DEADBEEF"), RevisionKind::ContentHash);
        assert_eq!(
            classify("0123456789abcdef0123456789ABCDEF01234567"),
            RevisionKind::ContentHash
        );
    }

    #[test]
    fn test_length_bounds() {
        assert_eq!(classify("abcdef"), RevisionKind::SymbolicName);
        assert_eq!(classify(&"a".repeat(41)), RevisionKind::SymbolicName);
        assert_eq!(classify(&"a".repeat(40)), RevisionKind::ContentHash);
    }

    #[test]
    fn test_symbolic_names() {
        for rev in ["v1.0", "main", "release-2.3", "deadbeeg", "abc def0", "1.2.3.4.5"] {
            assert_eq!(classify(rev), RevisionKind::SymbolicName, "{rev}");
        }
    }

    #[test]
    fn test_hex_looking_tag_is_treated_as_hash() {
        // A tag spelled entirely in hex digits is indistinguishable from a hash.
        assert_eq!(classify("1234567"), RevisionKind::ContentHash);
        assert!(!classify("1234567").needs_remote_check());
        assert!(classify("v1234567").needs_remote_check());
    }
}
