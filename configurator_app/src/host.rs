//! Line-oriented host bridge: JSON messages in on stdin, out on stdout

use std::io::{self, BufRead, Write};
use std::thread::{self, JoinHandle};

use futures::channel::mpsc::UnboundedSender;
use gem_engine::prelude::*;

/// Sender id given to every stdin line
pub const STDIN_SENDER: SenderId = SenderId(0);

/// Forward stdin lines to the runtime until EOF or the runtime hangs up
pub fn spawn_stdin_reader(tx: UnboundedSender<InboundEnvelope>) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        log::error!("Failed to read stdin: {}", e);
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                if tx.unbounded_send(InboundEnvelope::new(STDIN_SENDER, line)).is_err() {
                    break;
                }
            }
            log::debug!("stdin closed");
        })
}

/// Writes each outbound message as one JSON line on stdout
#[derive(Debug, Default)]
pub struct StdoutSink;

impl HostSink for StdoutSink {
    fn post(&mut self, recipient: Recipient, message: &OutboundMessage) {
        let json = match message.to_json() {
            Ok(json) => json,
            Err(e) => {
                log::error!("Failed to encode {:?}: {}", message, e);
                return;
            }
        };
        log::debug!("-> {:?}: {}", recipient, json);

        let mut stdout = io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{json}").and_then(|()| stdout.flush()) {
            log::error!("Failed to write to stdout: {}", e);
        }
    }
}

/// Logs a one-line summary of every composed frame
#[derive(Debug, Default)]
pub struct SummaryRenderer {
    frames: u64,
}

impl SummaryRenderer {
    /// Frames seen so far
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Renderer for SummaryRenderer {
    fn render(&mut self, list: &RenderList, camera: &Camera) {
        self.frames += 1;
        log::info!(
            "frame {}: {} items, {} engraved, engraving gen {}, camera z {:.2}",
            self.frames,
            list.len(),
            list.engraved().count(),
            list.engraving.generation(),
            camera.position.z
        );
        for item in &list.items {
            log::trace!("  {} -> {:?} rev {}", item.name, item.material, item.params.revision);
        }
    }
}
