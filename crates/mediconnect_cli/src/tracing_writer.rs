use rustyline_async::SharedWriter;
use std::io::{self, Write};
use std::sync::Mutex;
use tracing_subscriber::fmt::MakeWriter;

/// Log sink that writes to stderr until the shell starts, then through the
/// readline `SharedWriter` so log lines don't break the prompt
#[derive(Clone, Default)]
pub struct TracingWriter {
    writer: Option<SharedWriter>,
}

impl Write for TracingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.writer {
            Some(ref mut writer) => writer.write(buf),
            None => io::stderr().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.writer {
            Some(ref mut writer) => writer.flush(),
            None => io::stderr().flush(),
        }
    }
}

/// Global tracing writer instance
static TRACING_WRITER: Mutex<Option<TracingWriter>> = Mutex::new(None);

/// Initialize the global tracing writer
pub fn init_tracing_writer() -> TracingWriter {
    let writer = TracingWriter::default();
    if let Ok(mut guard) = TRACING_WRITER.lock() {
        *guard = Some(writer.clone());
    }
    writer
}

/// Route subsequent log lines through the shell's `SharedWriter`
pub fn set_shared_writer(shared_writer: SharedWriter) {
    if let Ok(mut guard) = TRACING_WRITER.lock() {
        if let Some(ref mut writer) = *guard {
            writer.writer = Some(shared_writer);
        }
    }
}

fn current_writer() -> Option<TracingWriter> {
    TRACING_WRITER.lock().ok()?.clone()
}

impl<'a> MakeWriter<'a> for TracingWriter {
    type Writer = TracingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        current_writer().unwrap_or_else(|| self.clone())
    }
}
