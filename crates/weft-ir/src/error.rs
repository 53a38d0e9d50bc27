//! Error types for tree mutation and markup parsing.

use thiserror::Error;

/// Errors reported by the strict tree mutation helpers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// No node in the tree carries the requested id.
    #[error("node not found: {0}")]
    NodeNotFound(String),
}

/// Errors reported before markup reaches the HTML parser.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarkupError {
    /// Markup exceeded the configured size limit.
    #[error("markup is {len} bytes, limit is {limit}")]
    TooLarge { len: usize, limit: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_target() {
        let err = TreeError::NodeNotFound("abc".into());
        assert_eq!(err.to_string(), "node not found: abc");

        let err = MarkupError::TooLarge { len: 10, limit: 4 };
        assert_eq!(err.to_string(), "markup is 10 bytes, limit is 4");
    }
}
