/// Position tracking for model declarations
///
/// Stores the source location of declarations so validation and conflict
/// errors can point back at the offending text.
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use text_size::{TextRange, TextSize};

/// A position in source code (0-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// File plus position of a declaration.
///
/// `range` is the byte range of the declaration in its file; splicing
/// relies on it, diagnostics only print file and line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub file: Arc<Path>,
    pub position: Position,
    pub range: TextRange,
}

impl SourceLocation {
    pub fn new(file: impl Into<PathBuf>, position: Position, range: TextRange) -> Self {
        Self {
            file: Arc::from(file.into()),
            position,
            range,
        }
    }

    /// Location with no byte range, for declarations built programmatically.
    pub fn at_line(file: impl Into<PathBuf>, line: usize) -> Self {
        Self::new(file, Position::new(line, 0), TextRange::empty(TextSize::new(0)))
    }

    /// Compute a location from a byte offset into `text`.
    pub fn from_offset(file: impl Into<PathBuf>, text: &str, range: TextRange) -> Self {
        let start: usize = range.start().into();
        let prefix = &text[..start.min(text.len())];
        let line = prefix.matches('\n').count();
        let column = prefix.len() - prefix.rfind('\n').map(|i| i + 1).unwrap_or(0);
        Self::new(file, Position::new(line, column), range)
    }

    /// 1-based line number as shown to users.
    pub fn line(&self) -> usize {
        self.position.line + 1
    }
}

impl Default for SourceLocation {
    fn default() -> Self {
        Self::new(PathBuf::new(), Position::default(), TextRange::default())
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.file.display(),
            self.line(),
            self.position.column + 1
        )
    }
}
