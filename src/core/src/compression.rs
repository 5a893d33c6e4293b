//! Input compression detection.
//!
//! Archives may arrive gzip or bzip2 compressed. The format is detected
//! from magic bytes, which are replayed in front of the rest of the stream
//! so non-seekable inputs such as stdin work.

use std::fmt;
use std::io::{self, Cursor, Read};

use bzip2::read::MultiBzDecoder;
use flate2::read::MultiGzDecoder;

use crate::error::Result;

const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];
const BZIP2_MAGIC: &[u8] = b"BZh";

/// Compression wrapped around an input archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Bzip2,
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Gzip => write!(f, "gzip"),
            Self::Bzip2 => write!(f, "bzip2"),
        }
    }
}

/// Identify the compression from the leading bytes of a stream.
pub fn detect_compression(head: &[u8]) -> Compression {
    if head.starts_with(GZIP_MAGIC) {
        Compression::Gzip
    } else if head.starts_with(BZIP2_MAGIC) {
        Compression::Bzip2
    } else {
        Compression::None
    }
}

/// The input with its sniffed magic bytes put back in front.
type Rewound<R> = io::Chain<Cursor<Vec<u8>>, R>;

/// A decompressed view of the input archive.
pub enum InputStream<R: Read> {
    Plain(Rewound<R>),
    Gzip(MultiGzDecoder<Rewound<R>>),
    Bzip2(MultiBzDecoder<Rewound<R>>),
}

impl<R: Read> InputStream<R> {
    pub fn compression(&self) -> Compression {
        match self {
            Self::Plain(_) => Compression::None,
            Self::Gzip(_) => Compression::Gzip,
            Self::Bzip2(_) => Compression::Bzip2,
        }
    }
}

impl<R: Read> Read for InputStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Plain(r) => r.read(buf),
            Self::Gzip(r) => r.read(buf),
            Self::Bzip2(r) => r.read(buf),
        }
    }
}

/// Wrap `reader` in the decoder its magic bytes call for.
pub fn open_input<R: Read>(mut reader: R) -> Result<InputStream<R>> {
    let mut head = Vec::with_capacity(BZIP2_MAGIC.len());
    (&mut reader)
        .take(BZIP2_MAGIC.len() as u64)
        .read_to_end(&mut head)?;
    let compression = detect_compression(&head);

    tracing::debug!(%compression, "Detected input compression");

    let rewound = Cursor::new(head).chain(reader);
    Ok(match compression {
        Compression::None => InputStream::Plain(rewound),
        Compression::Gzip => InputStream::Gzip(MultiGzDecoder::new(rewound)),
        Compression::Bzip2 => InputStream::Bzip2(MultiBzDecoder::new(rewound)),
    })
}
