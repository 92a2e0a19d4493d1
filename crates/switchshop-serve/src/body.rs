//! Streaming file bodies.

use std::io;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Bytes;
use futures_util::Stream;
use futures_util::stream::StreamExt;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, Take};
use tokio_util::io::ReaderStream;
use tracing::{debug, error};

/// A download body that reads the file lazily, one chunk per poll.
///
/// The stream owns the only handle to the file. Dropping it, whether after
/// the last chunk, after an error, or because the client went away, closes
/// the file. It yields at most `expected` bytes and turns a short file into
/// an `UnexpectedEof` error so a truncated transfer is never reported as
/// complete.
#[derive(Debug)]
pub struct FileBody {
    inner: ReaderStream<Take<File>>,
    path: PathBuf,
    expected: u64,
    sent: u64,
    finished: bool,
}

impl FileBody {
    /// Wrap an open file whose advertised length is `expected`.
    pub fn new(file: File, path: impl Into<PathBuf>, expected: u64, chunk_size: usize) -> Self {
        Self {
            inner: ReaderStream::with_capacity(file.take(expected), chunk_size),
            path: path.into(),
            expected,
            sent: 0,
            finished: false,
        }
    }

    /// Bytes handed to the consumer so far.
    pub fn bytes_sent(&self) -> u64 {
        self.sent
    }
}

impl Stream for FileBody {
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished {
            return Poll::Ready(None);
        }

        match self.inner.poll_next_unpin(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Some(Ok(chunk))) => {
                self.sent += chunk.len() as u64;
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(err))) => {
                self.finished = true;
                error!(path = %self.path.display(), sent = self.sent, "read failed mid-stream: {err}");
                Poll::Ready(Some(Err(err)))
            }
            Poll::Ready(None) => {
                self.finished = true;
                if self.sent < self.expected {
                    error!(
                        path = %self.path.display(),
                        sent = self.sent,
                        expected = self.expected,
                        "file shrank during download"
                    );
                    return Poll::Ready(Some(Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!(
                            "{} ended after {} of {} bytes",
                            self.path.display(),
                            self.sent,
                            self.expected
                        ),
                    ))));
                }
                debug!(path = %self.path.display(), bytes = self.sent, "download complete");
                Poll::Ready(None)
            }
        }
    }
}

impl Drop for FileBody {
    fn drop(&mut self) {
        if !self.finished {
            debug!(
                path = %self.path.display(),
                sent = self.sent,
                expected = self.expected,
                "download cancelled"
            );
        }
    }
}
