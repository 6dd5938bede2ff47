use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::sync::mpsc::Sender;

use crate::channel::{self, CompanionLink};
use crate::command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanionStatus {
    /// Still counting down to the launch tick.
    Pending,
    Launched { pid: u32 },
    /// No executable at the expected path; we run standalone.
    Missing,
    Failed,
}

/// Pipe ends handed to the companion at launch.
struct Connection {
    commands: Sender<command::Command>,
    link: Arc<CompanionLink>,
}

/// Starts the companion configuration process a few ticks after startup,
/// once the rest of the host has run its first frames.
///
/// When connected, the companion's stdout feeds the command channel and its
/// stdin receives outbound messages through the [`CompanionLink`].
pub struct CompanionLauncher {
    path: PathBuf,
    ticks_left: u32,
    status: CompanionStatus,
    connection: Option<Connection>,
    child: Option<Child>,
}

impl CompanionLauncher {
    pub fn new(path: impl Into<PathBuf>, delay_ticks: u32) -> Self {
        Self {
            path: path.into(),
            ticks_left: delay_ticks,
            status: CompanionStatus::Pending,
            connection: None,
            child: None,
        }
    }

    /// Wire the companion's stdio to `commands` (inbound) and `link` (outbound).
    pub fn connect(
        mut self,
        commands: Sender<command::Command>,
        link: Arc<CompanionLink>,
    ) -> Self {
        self.connection = Some(Connection { commands, link });
        self
    }

    /// Resolve `relative` against the directory of the running executable.
    pub fn beside_current_exe(relative: &Path, delay_ticks: u32) -> Self {
        let base = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_default();
        Self::new(base.join(relative), delay_ticks)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn status(&self) -> CompanionStatus {
        self.status
    }

    /// Advance the countdown; launches on the tick it reaches zero.
    pub fn tick(&mut self) {
        if self.status != CompanionStatus::Pending {
            return;
        }
        if self.ticks_left > 0 {
            self.ticks_left -= 1;
            return;
        }
        self.launch();
    }

    fn launch(&mut self) {
        if !self.path.is_file() {
            tracing::info!(
                "companion not found at {}, running standalone",
                self.path.display()
            );
            self.status = CompanionStatus::Missing;
            return;
        }

        let mut process = Command::new(&self.path);
        if self.connection.is_some() {
            process.stdin(Stdio::piped()).stdout(Stdio::piped());
        }

        match process.spawn() {
            Ok(mut child) => {
                let pid = child.id();
                tracing::info!("started companion {} (pid {pid})", self.path.display());
                if let Some(connection) = &self.connection {
                    Self::wire(connection, &mut child);
                }
                self.status = CompanionStatus::Launched { pid };
                self.child = Some(child);
            }
            Err(e) => {
                tracing::warn!("failed to start companion {}: {e}", self.path.display());
                self.status = CompanionStatus::Failed;
            }
        }
    }
}

impl CompanionLauncher {
    fn wire(connection: &Connection, child: &mut Child) {
        if let Some(stdout) = child.stdout.take() {
            let reader = BufReader::new(stdout);
            if let Err(e) =
                channel::spawn_line_reader("companion-reader", reader, connection.commands.clone())
            {
                tracing::warn!("cannot read companion commands: {e}");
            }
        }
        if let Some(stdin) = child.stdin.take() {
            connection.link.attach(stdin);
        }
    }
}

impl Drop for CompanionLauncher {
    fn drop(&mut self) {
        // Reap the handle if the companion already exited; a running one is
        // left alone since it closes itself on `close-config-window`.
        if let Some(child) = self.child.as_mut() {
            let _ = child.try_wait();
        }
    }
}
