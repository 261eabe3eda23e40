#[derive(Debug, Eq, PartialEq)]
pub enum ParseError {
    /// The reconstructed path disagrees with the depth the line was indented to.
    DepthMismatch {
        line: usize,
        path: String,
        depth: usize,
    },
}

impl std::error::Error for ParseError {}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ParseError::DepthMismatch { line, path, depth } => {
                write!(
                    f,
                    "Line {}: path '{}' does not match depth {}",
                    line, path, depth
                )
            }
        }
    }
}
