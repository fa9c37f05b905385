use std::io::{self, Write};

use serde::Serialize;
use tracing::debug;

use crate::app::{GenerateResult, ProgressEvent, ProgressSink};

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Text,
    Json,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_generate(result: &GenerateResult) -> io::Result<()> {
        Self::print_json(result)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}
}

/// Progress on stderr, the manifest path on stdout.
pub struct TextOutput;

impl TextOutput {
    pub fn print_generate(result: &GenerateResult) -> io::Result<()> {
        let mut stderr = io::stderr();
        writeln!(
            stderr,
            "collection {}: {} members, {} titled maps",
            result.collection_id, result.members, result.lines
        )?;
        let mut stdout = io::stdout();
        writeln!(stdout, "{}", result.path)
    }
}

impl ProgressSink for TextOutput {
    fn event(&self, event: ProgressEvent) {
        report_event(&mut io::stderr(), &event);
    }
}

/// Progress is best effort; a closed stderr must not abort a run.
fn report_event(writer: &mut impl Write, event: &ProgressEvent) {
    let written = match event.elapsed {
        Some(elapsed) => writeln!(
            writer,
            "{} ({:.1}s)",
            event.message,
            elapsed.as_secs_f64()
        ),
        None => writeln!(writer, "{}", event.message),
    };
    if let Err(err) = written {
        debug!(error = %err, "dropped progress event");
    }
}
