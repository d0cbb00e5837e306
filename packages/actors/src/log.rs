//! Serialized, numbered event log.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use post_core::{ActorId, LineParseError, LogLine, OfficeEvent};

use crate::messages::OfficeError;

struct LogInner {
    /// Number the next line will carry.
    next_seq: u64,
    sink: Box<dyn Write + Send>,
}

impl LogInner {
    fn next_event_counter(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

/// Append-only event log shared by every actor.
///
/// Drawing the line number and writing the line happen under one lock, so
/// the order of lines in the sink is the order of their numbers.
pub struct EventLog {
    inner: Mutex<LogInner>,
}

impl std::fmt::Debug for EventLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLog")
            .field("events", &self.events_emitted())
            .finish_non_exhaustive()
    }
}

impl EventLog {
    /// Log into any writer. Every line is flushed as soon as it is written.
    pub fn new(sink: impl Write + Send + 'static) -> Self {
        Self {
            inner: Mutex::new(LogInner {
                next_seq: 1,
                sink: Box::new(sink),
            }),
        }
    }

    /// Create (or truncate) a log file.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }

    /// Log into memory; the returned handle reads back what was written.
    pub fn in_memory() -> (Self, MemoryLog) {
        let memory = MemoryLog::default();
        (Self::new(memory.clone()), memory)
    }

    fn lock(&self) -> MutexGuard<'_, LogInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write one line for `actor`, returning its number.
    pub fn emit(&self, actor: ActorId, event: OfficeEvent) -> Result<u64, OfficeError> {
        self.write_line(Some(actor), event)
    }

    /// Write the coordinator's `closing` line.
    pub fn emit_closing(&self) -> Result<u64, OfficeError> {
        self.write_line(None, OfficeEvent::Closing)
    }

    fn write_line(&self, actor: Option<ActorId>, event: OfficeEvent) -> Result<u64, OfficeError> {
        let mut inner = self.lock();
        let line = LogLine {
            seq: inner.next_seq,
            actor,
            event,
        };
        writeln!(inner.sink, "{}", line)?;
        inner.sink.flush()?;
        Ok(inner.next_event_counter())
    }

    /// Number of lines written so far.
    pub fn events_emitted(&self) -> u64 {
        self.lock().next_seq - 1
    }
}

/// Shared in-memory buffer behind [`EventLog::in_memory`].
#[derive(Debug, Clone, Default)]
pub struct MemoryLog {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl MemoryLog {
    /// Everything written so far.
    pub fn contents(&self) -> String {
        let buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buffer).into_owned()
    }

    /// Parse every line written so far.
    pub fn lines(&self) -> Result<Vec<LogLine>, LineParseError> {
        self.contents().lines().map(str::parse).collect()
    }
}

impl Write for MemoryLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use post_core::ServiceKind;

    use super::*;

    #[test]
    fn numbers_lines_from_one() {
        let (log, memory) = EventLog::in_memory();
        assert_eq!(log.emit(ActorId::worker(1), OfficeEvent::Started).unwrap(), 1);
        assert_eq!(
            log.emit(
                ActorId::client(2),
                OfficeEvent::Entering {
                    service: ServiceKind::Letters
                }
            )
            .unwrap(),
            2
        );
        assert_eq!(log.emit_closing().unwrap(), 3);
        assert_eq!(log.events_emitted(), 3);

        assert_eq!(
            memory.contents(),
            "1: U 1: started\n2: Z 2: entering office for a service 1\n3: closing\n"
        );
    }

    #[test]
    fn concurrent_writers_produce_gapless_ordered_lines() {
        let (log, memory) = EventLog::in_memory();
        let log = Arc::new(log);

        let handles: Vec<_> = (1..=8)
            .map(|n| {
                let log = log.clone();
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        log.emit(ActorId::client(n), OfficeEvent::Started).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let lines = memory.lines().unwrap();
        assert_eq!(lines.len(), 400);
        for (i, line) in lines.iter().enumerate() {
            assert_eq!(line.seq, i as u64 + 1);
        }
    }

    #[test]
    fn file_log_is_flushed_per_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("office.out");
        let log = EventLog::create(&path).unwrap();
        log.emit(ActorId::worker(3), OfficeEvent::TakingBreak).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "1: U 3: taking break\n");
    }
}
