//! Byte sources feeding the monitor.
//!
//! A [`ByteSource`] only ever hands out bytes that have already arrived, so
//! a monitor cycle never waits on the device.

use std::collections::VecDeque;
use std::io;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::{self, JoinHandle};

use log::{debug, warn};

use crate::error::SourceError;

/// Non-blocking access to an ordered raw byte stream.
pub trait ByteSource {
    /// Bytes readable right now without blocking.
    fn available(&mut self) -> Result<usize, SourceError>;

    /// Read up to `buf.len()` already available bytes. Returns 0 if none.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SourceError>;
}

/// In-memory stream, used for replays and tests. Never disconnects.
impl ByteSource for VecDeque<u8> {
    fn available(&mut self) -> Result<usize, SourceError> {
        Ok(self.len())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SourceError> {
        let n = buf.len().min(self.len());
        for (dst, src) in buf.iter_mut().zip(self.drain(..n)) {
            *dst = src;
        }
        Ok(n)
    }
}

/// Bytes produced on another thread and handed over through a channel.
///
/// Reports [`SourceError::Disconnected`] once the producer has hung up and
/// every received byte has been read.
pub struct ChannelSource {
    rx: Receiver<Vec<u8>>,
    pending: VecDeque<u8>,
    hung_up: bool,
}

impl ChannelSource {
    pub fn new(rx: Receiver<Vec<u8>>) -> Self {
        Self {
            rx,
            pending: VecDeque::new(),
            hung_up: false,
        }
    }

    /// Move every chunk already queued on the channel into `pending`.
    fn collect(&mut self) {
        while !self.hung_up {
            match self.rx.try_recv() {
                Ok(chunk) => self.pending.extend(chunk),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => self.hung_up = true,
            }
        }
    }
}

impl ByteSource for ChannelSource {
    fn available(&mut self) -> Result<usize, SourceError> {
        self.collect();
        if self.pending.is_empty() && self.hung_up {
            return Err(SourceError::Disconnected);
        }
        Ok(self.pending.len())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SourceError> {
        self.collect();
        ByteSource::read(&mut self.pending, buf)
    }
}

/// Spawn a thread that reads `reader` in chunks of up to `chunk` bytes and
/// forwards them to the returned source. The thread exits on EOF or on the
/// first read error.
pub fn spawn_reader<R>(mut reader: R, chunk: usize) -> io::Result<(ChannelSource, JoinHandle<()>)>
where
    R: io::Read + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let chunk = chunk.max(1);
    let handle = thread::Builder::new()
        .name("mmtrail-reader".into())
        .spawn(move || {
            let mut buf = vec![0u8; chunk];
            loop {
                match io::Read::read(&mut reader, &mut buf) {
                    Ok(0) => {
                        debug!("byte source reached EOF");
                        break;
                    }
                    Ok(n) => {
                        if tx.send(buf[..n].to_vec()).is_err() {
                            break;
                        }
                    }
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        warn!("byte source read failed: {e}");
                        break;
                    }
                }
            }
        })?;
    Ok((ChannelSource::new(rx), handle))
}
