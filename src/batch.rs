//! Batching of newline-delimited input.
//!
//! The [`Batcher`] reads one line at a time, applies the [`Sampler`], and
//! groups kept lines into batches of a fixed size. A full batch is moved out
//! whole and a fresh buffer takes its place, so no batch in flight ever shares
//! storage with the accumulator. At end of input the remaining lines are
//! flushed as a final batch, which may be empty.

use crate::error::Result;
use crate::sample::Sampler;
use std::io::BufRead;

/// One raw input line with its one-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Position in the input, counting every line read.
    pub number: u64,
    /// Raw bytes, without the trailing newline.
    pub bytes: Vec<u8>,
}

/// An owned group of lines handed to one worker.
pub type Batch = Vec<Line>;

/// Iterator over batches read from a buffered reader.
#[derive(Debug)]
pub struct Batcher<R> {
    reader: R,
    sampler: Sampler,
    batch_size: usize,
    line_number: u64,
    finished: bool,
}

impl<R: BufRead> Batcher<R> {
    /// Create a batcher. `batch_size` must be positive.
    pub fn new(reader: R, sampler: Sampler, batch_size: usize) -> Self {
        Batcher {
            reader,
            sampler,
            batch_size: batch_size.max(1),
            line_number: 0,
            finished: false,
        }
    }

    /// Number of lines read so far, sampled out or not.
    #[must_use]
    pub fn lines_read(&self) -> u64 {
        self.line_number
    }

    /// Read the next batch. After end of input one final batch is returned,
    /// then `None`.
    ///
    /// # Errors
    ///
    /// Returns any IO error from the reader.
    pub fn next_batch(&mut self) -> Result<Option<Batch>> {
        if self.finished {
            return Ok(None);
        }
        let mut batch = Vec::with_capacity(self.batch_size);
        let mut buf = Vec::new();
        while batch.len() < self.batch_size {
            buf.clear();
            if self.reader.read_until(b'\n', &mut buf)? == 0 {
                self.finished = true;
                break;
            }
            self.line_number += 1;
            if buf.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            if !self.sampler.keep() {
                continue;
            }
            let end = if buf.ends_with(b"\r\n") {
                buf.len() - 2
            } else if buf.ends_with(b"\n") {
                buf.len() - 1
            } else {
                buf.len()
            };
            batch.push(Line {
                number: self.line_number,
                bytes: buf[..end].to_vec(),
            });
        }
        Ok(Some(batch))
    }
}

impl<R: BufRead> Iterator for Batcher<R> {
    type Item = Result<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_batch().transpose()
    }
}
