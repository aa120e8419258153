use std::cell::RefCell;
use std::fmt;
use std::io::{self, Read};
use std::rc::Rc;

use once_cell::unsync::OnceCell;
use tracing::{debug, warn};

use crate::position::{LineColumn, Offset, TokenPosition};
use crate::state::{ParseState, StreamError};

/// Number of tokens pulled from the underlying source per chunk unless a
/// capacity is given explicitly. A tuning constant, not a contract.
pub const DEFAULT_CHUNK_CAPACITY: usize = 2048;

/// Produces batches of tokens from an owned resource (a reader, usually).
///
/// `read_chunk` pulls up to roughly `capacity` tokens; an empty batch means
/// end of input. An error ends the stream as well — the cursor records it so
/// the parse entry points can surface it.
pub trait ChunkSource: 'static {
    type Token: Clone + fmt::Debug + 'static;

    fn read_chunk(&mut self, capacity: usize) -> io::Result<Vec<Self::Token>>;
}

/// One immutable slab of buffered tokens.
///
/// Chunks link forward lazily: the next chunk is produced on demand, and the
/// link keeps every already-issued chunk reachable from earlier states, so a
/// state captured before a refill stays valid after it. Chunks are never
/// mutated in place.
struct Chunk<T> {
    /// Global offset of `items[0]`.
    base: usize,
    items: Vec<T>,
    next: OnceCell<Rc<Chunk<T>>>,
}

struct Feed<Src: ChunkSource> {
    source: Option<Src>,
    error: Option<StreamError>,
    capacity: usize,
}

fn pull<Src: ChunkSource>(feed: &Rc<RefCell<Feed<Src>>>, base: usize) -> Rc<Chunk<Src::Token>> {
    let mut feed = feed.borrow_mut();
    let capacity = feed.capacity;
    let items = match feed.source.as_mut() {
        Some(source) => match source.read_chunk(capacity) {
            Ok(items) => {
                if items.is_empty() {
                    // Exhausted: the resource has nothing more to give.
                    feed.source = None;
                    debug!(base, "source exhausted, released");
                }
                items
            }
            Err(error) => {
                warn!(base, %error, "read failed, ending stream");
                feed.error = Some(StreamError::from(error));
                feed.source = None;
                Vec::new()
            }
        },
        None => Vec::new(),
    };
    debug!(base, len = items.len(), "buffered chunk");
    Rc::new(Chunk {
        base,
        items,
        next: OnceCell::new(),
    })
}

/// A buffered state over a [`ChunkSource`], reading ahead in fixed-capacity
/// chunks on demand.
///
/// All states derived from one root share the source and the chunk chain.
/// The resource is released exactly once: on [`dispose`](ParseState::dispose)
/// of any state, when the input is exhausted, or when the last state drops —
/// whichever comes first.
pub struct ChunkedCursor<Src: ChunkSource, P> {
    feed: Rc<RefCell<Feed<Src>>>,
    chunk: Rc<Chunk<Src::Token>>,
    index: usize,
    position: P,
}

impl<Src, P> ChunkedCursor<Src, P>
where
    Src: ChunkSource,
    P: TokenPosition<Src::Token>,
{
    /// Creates a cursor over `source` using [`DEFAULT_CHUNK_CAPACITY`].
    pub fn new(source: Src) -> Self {
        Self::with_capacity(source, DEFAULT_CHUNK_CAPACITY)
    }

    /// Creates a cursor over `source` reading `capacity` tokens per chunk.
    pub fn with_capacity(source: Src, capacity: usize) -> Self {
        let feed = Rc::new(RefCell::new(Feed {
            source: Some(source),
            error: None,
            capacity: capacity.max(1),
        }));
        let chunk = pull(&feed, 0);
        Self {
            feed,
            chunk,
            index: 0,
            position: P::initial(),
        }
    }

    fn successor_chunk(&self) -> Rc<Chunk<Src::Token>> {
        let base = self.chunk.base + self.chunk.items.len();
        Rc::clone(self.chunk.next.get_or_init(|| pull(&self.feed, base)))
    }
}

impl<Src: ChunkSource, P: Clone> Clone for ChunkedCursor<Src, P> {
    fn clone(&self) -> Self {
        Self {
            feed: Rc::clone(&self.feed),
            chunk: Rc::clone(&self.chunk),
            index: self.index,
            position: self.position.clone(),
        }
    }
}

impl<Src: ChunkSource, P: fmt::Debug> fmt::Debug for ChunkedCursor<Src, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkedCursor")
            .field("offset", &(self.chunk.base + self.index))
            .field("position", &self.position)
            .finish()
    }
}

impl<Src, P> ParseState for ChunkedCursor<Src, P>
where
    Src: ChunkSource,
    P: TokenPosition<Src::Token>,
{
    type Token = Src::Token;
    type Position = P;

    fn current(&self) -> Option<Src::Token> {
        self.chunk.items.get(self.index).cloned()
    }

    fn advance(&self) -> Self {
        let token = match self.chunk.items.get(self.index) {
            Some(token) => token,
            None => return self.clone(),
        };
        let position = self.position.advance(token);
        if self.index + 1 < self.chunk.items.len() {
            Self {
                feed: Rc::clone(&self.feed),
                chunk: Rc::clone(&self.chunk),
                index: self.index + 1,
                position,
            }
        } else {
            Self {
                feed: Rc::clone(&self.feed),
                chunk: self.successor_chunk(),
                index: 0,
                position,
            }
        }
    }

    fn position(&self) -> P {
        self.position.clone()
    }

    fn offset(&self) -> usize {
        self.chunk.base + self.index
    }

    fn dispose(&self) {
        let mut feed = self.feed.borrow_mut();
        if feed.source.take().is_some() {
            debug!("stream source disposed");
        }
    }

    fn pending_error(&self) -> Option<StreamError> {
        self.feed.borrow().error.clone()
    }
}

/// Reads raw bytes from any [`io::Read`].
pub struct ByteSource<R> {
    reader: R,
}

impl<R: Read + 'static> ByteSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: Read + 'static> ChunkSource for ByteSource<R> {
    type Token = u8;

    fn read_chunk(&mut self, capacity: usize) -> io::Result<Vec<u8>> {
        let mut buf = vec![0u8; capacity];
        let mut filled = 0;
        while filled < capacity {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => return Err(error),
            }
        }
        buf.truncate(filled);
        Ok(buf)
    }
}

/// Decodes UTF-8 characters incrementally from any [`io::Read`].
///
/// A multi-byte sequence split across reads is carried over to the next
/// chunk; input ending inside a sequence is an error.
pub struct CharSource<R> {
    reader: R,
    carry: Vec<u8>,
}

impl<R: Read + 'static> CharSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            carry: Vec::new(),
        }
    }
}

impl<R: Read + 'static> ChunkSource for CharSource<R> {
    type Token = char;

    fn read_chunk(&mut self, capacity: usize) -> io::Result<Vec<char>> {
        let mut chars = Vec::with_capacity(capacity);
        let mut pending = std::mem::take(&mut self.carry);
        let mut block = [0u8; 1024];
        while chars.len() < capacity {
            let n = match self.reader.read(&mut block) {
                Ok(n) => n,
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => {
                    self.carry = pending;
                    return Err(error);
                }
            };
            if n == 0 {
                if !pending.is_empty() {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        "input ends inside a UTF-8 sequence",
                    ));
                }
                break;
            }
            pending.extend_from_slice(&block[..n]);
            let valid_len = match std::str::from_utf8(&pending) {
                Ok(_) => pending.len(),
                // Incomplete trailing sequence: decode up to it, carry the rest.
                Err(error) if error.error_len().is_none() => error.valid_up_to(),
                Err(_) => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        "invalid UTF-8 in input",
                    ))
                }
            };
            if let Ok(decoded) = std::str::from_utf8(&pending[..valid_len]) {
                chars.extend(decoded.chars());
            }
            pending.drain(..valid_len);
        }
        self.carry = pending;
        Ok(chars)
    }
}

/// A buffered byte stream state over any reader.
pub type ByteCursor<R> = ChunkedCursor<ByteSource<R>, Offset>;

/// A buffered text stream state over any reader.
pub type CharCursor<R> = ChunkedCursor<CharSource<R>, LineColumn>;

impl<R: Read + 'static> ByteCursor<R> {
    /// Creates a byte stream state over `reader`.
    pub fn from_reader(reader: R) -> Self {
        ChunkedCursor::new(ByteSource::new(reader))
    }

    /// Creates a byte stream state reading `capacity` bytes per chunk.
    pub fn from_reader_with_capacity(reader: R, capacity: usize) -> Self {
        ChunkedCursor::with_capacity(ByteSource::new(reader), capacity)
    }
}

impl<R: Read + 'static> CharCursor<R> {
    /// Creates a text stream state over `reader`.
    pub fn from_reader(reader: R) -> Self {
        ChunkedCursor::new(CharSource::new(reader))
    }

    /// Creates a text stream state reading `capacity` characters per chunk.
    pub fn from_reader_with_capacity(reader: R, capacity: usize) -> Self {
        ChunkedCursor::with_capacity(CharSource::new(reader), capacity)
    }
}
