use std::fmt;

/// Describes where in the input a token was read.
///
/// A position is folded forward one consumed token at a time via
/// [`advance`](TokenPosition::advance). Implementations are small value
/// types so every stream state can carry one by copy, and they are ordered
/// so that "further along" can be compared.
pub trait TokenPosition<Tok>:
    Clone + PartialEq + PartialOrd + fmt::Debug + fmt::Display + 'static
{
    /// The position before any token has been consumed.
    fn initial() -> Self;

    /// Returns the position after consuming `token`.
    fn advance(&self, token: &Tok) -> Self;
}

/// A linear position: the number of tokens consumed so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Offset(pub usize);

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "offset {}", self.0)
    }
}

impl<Tok> TokenPosition<Tok> for Offset {
    fn initial() -> Self {
        Offset(0)
    }

    fn advance(&self, _token: &Tok) -> Self {
        Offset(self.0 + 1)
    }
}

/// A line/column position for text input (1-indexed, the way compilers
/// report locations). The column resets and the line advances on the
/// newline token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineColumn {
    pub line: usize,
    pub column: usize,
}

impl LineColumn {
    /// Creates a position at the given line and column.
    pub fn at(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    fn bump(&self, is_newline: bool) -> Self {
        if is_newline {
            Self {
                line: self.line + 1,
                column: 1,
            }
        } else {
            Self {
                line: self.line,
                column: self.column + 1,
            }
        }
    }
}

impl fmt::Display for LineColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

impl TokenPosition<char> for LineColumn {
    fn initial() -> Self {
        Self::at(1, 1)
    }

    fn advance(&self, token: &char) -> Self {
        self.bump(*token == '\n')
    }
}

impl TokenPosition<u8> for LineColumn {
    fn initial() -> Self {
        Self::at(1, 1)
    }

    fn advance(&self, token: &u8) -> Self {
        self.bump(*token == b'\n')
    }
}

/// A position carrying no location information, for sources that do not
/// track where their tokens came from. All values compare equal, so
/// orderings against it degrade to equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NullPosition;

impl fmt::Display for NullPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown position")
    }
}

impl<Tok> TokenPosition<Tok> for NullPosition {
    fn initial() -> Self {
        NullPosition
    }

    fn advance(&self, _token: &Tok) -> Self {
        NullPosition
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_advances_by_one() {
        let pos: Offset = TokenPosition::<char>::initial();
        assert_eq!(pos, Offset(0));
        let pos = pos.advance(&'x');
        assert_eq!(pos, Offset(1));
    }

    #[test]
    fn test_line_column_initial() {
        let pos: LineColumn = TokenPosition::<char>::initial();
        assert_eq!(pos, LineColumn::at(1, 1));
    }

    #[test]
    fn test_line_column_tracks_newlines() {
        let pos: LineColumn = TokenPosition::<char>::initial();
        let pos = pos.advance(&'a');
        assert_eq!(pos, LineColumn::at(1, 2));
        let pos = pos.advance(&'\n');
        assert_eq!(pos, LineColumn::at(2, 1));
        let pos = pos.advance(&'b');
        assert_eq!(pos, LineColumn::at(2, 2));
    }

    #[test]
    fn test_line_column_ordering() {
        assert!(LineColumn::at(1, 9) < LineColumn::at(2, 1));
        assert!(LineColumn::at(2, 1) < LineColumn::at(2, 5));
    }

    #[test]
    fn test_null_position_compares_equal() {
        let a: NullPosition = TokenPosition::<u8>::initial();
        let b = a.advance(&b'x');
        assert_eq!(a, b);
    }

    #[test]
    fn test_rendering() {
        assert_eq!(Offset(3).to_string(), "offset 3");
        assert_eq!(LineColumn::at(2, 7).to_string(), "line 2, column 7");
    }
}
