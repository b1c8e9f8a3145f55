//! Reassembly of TCP reads into discrete commands.
//!
//! TCP does not preserve write boundaries: one read may carry several
//! commands, or half of one. Frames are 2 bytes, plus a directly following
//! `\n` when the sender uses line framing.
//!
//! A frame that fails to decode drops everything buffered from the current
//! read, so a corrupt read cannot desynchronize the reads that follow it.
//! Only a lone `'0'` or `'1'` is carried over into the next read; any other
//! trailing byte is reported as invalid and discarded.

use crate::error::InvalidCommand;
use crate::protocol::codec::{decode, LogicalState, COMMAND_LEN, TERMINATOR};

/// Outcome of one reassembled frame.
pub type Frame = Result<LogicalState, InvalidCommand>;

#[derive(Debug, Default)]
pub struct CommandFramer {
    // At most one byte survives between reads.
    pending: Vec<u8>,
}

impl CommandFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one read into the framer and returns the frames it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Frame> {
        self.pending.extend_from_slice(chunk);

        let mut frames = Vec::new();
        let mut pos = 0;

        loop {
            while self.pending.get(pos) == Some(&TERMINATOR) {
                pos += 1;
            }

            let remaining = self.pending.len() - pos;
            if remaining < COMMAND_LEN {
                break;
            }

            let mut end = pos + COMMAND_LEN;
            if self.pending.get(end) == Some(&TERMINATOR) {
                end += 1;
            }

            let frame = decode(&self.pending[pos..end]);
            let failed = frame.is_err();
            frames.push(frame);

            if failed {
                pos = self.pending.len();
                break;
            }
            pos = end;
        }

        if let Some(&byte) = self.pending.get(pos) {
            if byte != b'0' && byte != b'1' {
                frames.push(Err(InvalidCommand::Digit { offset: 0, byte }));
                pos = self.pending.len();
            }
        }

        self.pending.drain(..pos);
        frames
    }

    /// Number of bytes held back waiting for the rest of a frame.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}
