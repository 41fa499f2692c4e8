//! JSON-lines frame stream
//!
//! One `Snapshot` per line, for piping into an external viewer.

use std::io::Write;

use super::{Renderer, Snapshot};

pub struct JsonLinesRenderer<W: Write> {
    out: W,
    /// Emit every n-th frame only
    every: u64,
    failed: bool,
}

impl<W: Write> JsonLinesRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            every: 1,
            failed: false,
        }
    }

    pub fn with_stride(mut self, every: u64) -> Self {
        self.every = every.max(1);
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for JsonLinesRenderer<W> {
    fn draw(&mut self, snapshot: &Snapshot) {
        // A broken pipe is reported once; the simulation keeps going
        if self.failed || snapshot.frame % self.every != 0 {
            return;
        }
        let result = serde_json::to_writer(&mut self.out, snapshot)
            .map_err(std::io::Error::from)
            .and_then(|()| self.out.write_all(b"\n"));
        if let Err(e) = result {
            log::warn!("Frame output failed, disabling renderer: {}", e);
            self.failed = true;
        }
    }
}
