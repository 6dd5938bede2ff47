use std::io::{BufRead, Write};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

use crate::command::{Command, OutboundCommand};

/// Inbox for decoded commands, drained once per tick on the tick thread.
pub struct CommandChannel {
    tx: Sender<Command>,
    rx: Receiver<Command>,
}

impl Default for CommandChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandChannel {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    pub fn sender(&self) -> Sender<Command> {
        self.tx.clone()
    }

    /// Take every command queued since the last call.
    pub fn drain(&self) -> Vec<Command> {
        self.rx.try_iter().collect()
    }
}

/// Read `name payload` lines from `reader` on a background thread.
///
/// Malformed lines are logged and dropped; the thread ends at EOF or when the
/// channel is gone.
pub fn spawn_line_reader<R>(
    name: &str,
    reader: R,
    tx: Sender<Command>,
) -> std::io::Result<JoinHandle<()>>
where
    R: BufRead + Send + 'static,
{
    std::thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            for line in reader.lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        tracing::warn!("command input closed: {e}");
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                match Command::parse_line(&line) {
                    Ok(cmd) => {
                        if tx.send(cmd).is_err() {
                            break;
                        }
                    }
                    Err(e) => tracing::debug!("ignoring command line: {e}"),
                }
            }
            tracing::debug!("command reader finished");
        })
}

/// Destination for messages addressed to the companion process.
pub trait OutboundSink: Send + Sync {
    fn send(&self, command: OutboundCommand);
}

/// Write half of the pipe to the companion process.
///
/// Created before the companion starts; messages sent while nothing is
/// attached are dropped.
#[derive(Default)]
pub struct CompanionLink {
    writer: Mutex<Option<Box<dyn Write + Send>>>,
}

impl CompanionLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route outbound messages into `writer` from now on.
    pub fn attach(&self, writer: impl Write + Send + 'static) {
        *self.lock() = Some(Box::new(writer));
    }

    pub fn is_attached(&self) -> bool {
        self.lock().is_some()
    }

    fn lock(&self) -> MutexGuard<'_, Option<Box<dyn Write + Send>>> {
        // A panic mid-write leaves nothing worth protecting.
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl OutboundSink for CompanionLink {
    fn send(&self, command: OutboundCommand) {
        let mut writer = self.lock();
        let Some(out) = writer.as_mut() else {
            tracing::debug!("no companion attached, dropping {}", command.name());
            return;
        };
        if let Err(e) = writeln!(out, "{}", command.name()).and_then(|()| out.flush()) {
            tracing::warn!("failed to send {}: {e}", command.name());
            // The companion closed its end; stop writing into a dead pipe.
            *writer = None;
        }
    }
}
