use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DrawError {
    #[error(
        "{total} participants cannot be split evenly into groups of {group_size}{}",
        format_suggestions(.suggestions)
    )]
    SizeMismatch {
        total: usize,
        group_size: usize,
        /// Alternative group sizes, from one group fewer/more than requested.
        suggestions: Vec<usize>,
    },

    #[error("group size must be at least 1")]
    ZeroGroupSize,
}

fn format_suggestions(suggestions: &[usize]) -> String {
    if suggestions.is_empty() {
        return String::new();
    }
    let sizes: Vec<String> = suggestions.iter().map(|s| s.to_string()).collect();
    format!(" (try {})", sizes.join(" or "))
}

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("failed to read roster {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed roster: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unrecognized line: {0}")]
    UnrecognizedLine(String),

    #[error("pair must be two ids separated by a comma: {0}")]
    InvalidPair(String),

    #[error("invalid group size: {0}")]
    InvalidGroupSize(String),

    #[error("no group size given (use --group-size or set group_size in the roster)")]
    MissingGroupSize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_mismatch_message_lists_suggestions() {
        let err = DrawError::SizeMismatch {
            total: 8,
            group_size: 3,
            suggestions: vec![4, 2],
        };
        assert_eq!(
            err.to_string(),
            "8 participants cannot be split evenly into groups of 3 (try 4 or 2)"
        );
    }

    #[test]
    fn test_size_mismatch_message_with_few_suggestions() {
        let err = DrawError::SizeMismatch {
            total: 3,
            group_size: 5,
            suggestions: vec![3],
        };
        assert!(err.to_string().ends_with("(try 3)"));

        let err = DrawError::SizeMismatch {
            total: 0,
            group_size: 5,
            suggestions: vec![],
        };
        assert!(err.to_string().ends_with("groups of 5"));
    }
}
