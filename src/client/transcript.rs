//! Human-readable exchange transcripts.
//!
//! Opt-in diagnostic dump of a full message exchange, role-tagged, to a
//! caller-supplied sink. Purely observational: write failures are
//! swallowed and return values are never affected.

use std::io::Write;
use std::sync::Mutex;

use chrono::Local;

use super::types::Message;

/// A transcript sink wrapping any `Write` target.
pub struct TranscriptSink {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl TranscriptSink {
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    /// Transcripts to standard output.
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }

    /// Dump one full exchange: every outbound message in order, then each
    /// returned sample.
    pub(crate) fn record(&self, sent: &[Message], texts: &[String]) {
        let Ok(mut w) = self.writer.lock() else {
            return;
        };
        let _ = writeln!(
            w,
            "==== exchange {} ====",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        );
        for (i, msg) in sent.iter().enumerate() {
            let _ = writeln!(w, "{i:>3} {}: {}", msg.role, msg.content);
        }
        for (i, text) in texts.iter().enumerate() {
            let _ = writeln!(w, "    sample {}/{} assistant: {}", i + 1, texts.len(), text);
        }
        let _ = writeln!(w, "==== end exchange ====");
    }
}

impl std::fmt::Debug for TranscriptSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranscriptSink").finish_non_exhaustive()
    }
}
