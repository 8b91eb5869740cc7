//! Async SML stream reader

use sml_codec::SmlFile;
use sml_core::SmlResult;
use sml_session::SmlParser;
use tokio::io::{AsyncRead, AsyncReadExt};

const CHUNK_SIZE: usize = 512;

/// Reads SML files from any async byte source
///
/// Frames that fail the CRC check or do not decode are logged and skipped;
/// only I/O errors end the stream with an error.
pub struct SmlReader<R> {
    reader: R,
    parser: SmlParser,
    chunk: Box<[u8]>,
    position: usize,
    filled: usize,
}

impl<R: AsyncRead + Unpin> SmlReader<R> {
    /// Create a reader with a default parser
    pub fn new(reader: R) -> Self {
        Self::with_parser(reader, SmlParser::new())
    }

    /// Create a reader around a configured parser
    pub fn with_parser(reader: R, parser: SmlParser) -> Self {
        Self {
            reader,
            parser,
            chunk: vec![0u8; CHUNK_SIZE].into_boxed_slice(),
            position: 0,
            filled: 0,
        }
    }

    /// Read until the next complete SML file
    ///
    /// # Returns
    /// `None` once the byte source is exhausted. A frame cut off by the end of
    /// the stream is dropped silently.
    pub async fn next_file(&mut self) -> SmlResult<Option<SmlFile>> {
        loop {
            while self.position < self.filled {
                let byte = self.chunk[self.position];
                self.position += 1;
                match self.parser.feed(byte) {
                    Ok(true) => {
                        if let Some(file) = self.parser.take_sml_file() {
                            return Ok(Some(file));
                        }
                    }
                    Ok(false) => {}
                    Err(e) if e.is_frame_local() => log::warn!("Skipping SML frame: {}", e),
                    Err(e) => return Err(e),
                }
            }

            let n = self.reader.read(&mut self.chunk).await?;
            if n == 0 {
                log::debug!("SML stream ended, {} bytes pending", self.parser.buffered_len());
                return Ok(None);
            }
            self.position = 0;
            self.filled = n;
        }
    }

    pub fn parser(&self) -> &SmlParser {
        &self.parser
    }

    pub fn parser_mut(&mut self) -> &mut SmlParser {
        &mut self.parser
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}
