//! Stream Framework
//!
//! Positions, stream states and input resources shared by the combinator
//! engine and the tokenizing pipeline. A stream state is a persistent value:
//! advancing produces a new state and leaves the old one usable, which is
//! what makes backtracking cheap for everything built on top.

pub mod chunked;
pub mod cursor;
pub mod iter;
pub mod position;
pub mod state;

pub use chunked::{
    ByteCursor, ByteSource, CharCursor, CharSource, ChunkSource, ChunkedCursor,
    DEFAULT_CHUNK_CAPACITY,
};
pub use cursor::{TextCursor, TokenCursor};
pub use iter::IterCursor;
pub use position::{LineColumn, NullPosition, Offset, TokenPosition};
pub use state::{ParseState, StreamError};
