use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use checkin_core::{Event, UiSink};

/// Prints events to stdout, as JSON lines or as plain text.
///
/// In plain live mode eligibility lines overwrite each other so the
/// countdown updates in place.
pub struct TerminalSink {
    json: bool,
    live: bool,
    in_place: AtomicBool,
}

impl TerminalSink {
    pub fn new(json: bool, live: bool) -> Self {
        Self {
            json,
            live,
            in_place: AtomicBool::new(false),
        }
    }

    /// End an in-place line so later output starts fresh.
    pub fn finish(&self) {
        if self.in_place.swap(false, Ordering::SeqCst) {
            println!();
        }
    }
}

impl UiSink for TerminalSink {
    fn publish(&self, event: &Event) {
        if self.json {
            match serde_json::to_string(event) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::warn!(error = %e, "failed to serialize event"),
            }
            return;
        }

        let message = event.message();
        if self.live && event.is_eligibility() {
            let mut stdout = std::io::stdout().lock();
            let _ = write!(stdout, "\r\x1b[2K{message}");
            let _ = stdout.flush();
            self.in_place.store(true, Ordering::SeqCst);
        } else {
            self.finish();
            println!("{message}");
        }
    }
}
