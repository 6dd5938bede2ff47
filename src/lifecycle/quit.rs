use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures::future::{BoxFuture, join_all};
use tokio::runtime::Handle;

use crate::channel::OutboundSink;
use crate::command::OutboundCommand;
use crate::error::ReleaseError;

/// Something that must tear itself down before the process may exit.
pub trait ReleaseBeforeQuit: Send + Sync {
    /// Name used in log messages.
    fn name(&self) -> &str;

    /// Start releasing. Called at most once per process.
    fn release_resources(&self) -> BoxFuture<'static, Result<(), ReleaseError>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitPhase {
    Idle,
    Releasing,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitDecision {
    Allow,
    Deny,
}

/// Two-phase quit handshake.
///
/// The first close request starts releasing every registered resource and is
/// denied. Once all of them have finished, the completion latch flips and
/// stays set; from then on every request is allowed and
/// [`QuitCoordinator::should_exit`] reports true so the tick loop can exit.
pub struct QuitCoordinator {
    runtime: Handle,
    resources: Vec<Arc<dyn ReleaseBeforeQuit>>,
    outbound: Option<Arc<dyn OutboundSink>>,
    release_timeout: Option<Duration>,
    release_started: bool,
    completed: Arc<AtomicBool>,
}

impl QuitCoordinator {
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            resources: Vec::new(),
            outbound: None,
            release_timeout: None,
            release_started: false,
            completed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Where the "close companion window" message goes.
    pub fn with_outbound(mut self, outbound: Arc<dyn OutboundSink>) -> Self {
        self.outbound = Some(outbound);
        self
    }

    /// Give up on a single release after `timeout` and count it as done.
    pub fn with_release_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.release_timeout = timeout;
        self
    }

    pub fn register(&mut self, resource: Arc<dyn ReleaseBeforeQuit>) {
        if self.release_started {
            tracing::warn!(
                "{} registered after quit started, it will not be released",
                resource.name()
            );
        }
        self.resources.push(resource);
    }

    pub fn phase(&self) -> QuitPhase {
        if self.completed.load(Ordering::Acquire) {
            QuitPhase::Completed
        } else if self.release_started {
            QuitPhase::Releasing
        } else {
            QuitPhase::Idle
        }
    }

    /// Polled every tick: true once a quit was requested and every release
    /// finished.
    pub fn should_exit(&self) -> bool {
        self.release_started && self.completed.load(Ordering::Acquire)
    }

    /// Answer an OS close request.
    pub fn request_quit(&mut self) -> QuitDecision {
        match self.phase() {
            QuitPhase::Completed => return QuitDecision::Allow,
            QuitPhase::Releasing => {
                tracing::debug!("quit already in progress, ignoring close request");
                return QuitDecision::Deny;
            }
            QuitPhase::Idle => {}
        }

        self.release_started = true;
        tracing::info!(
            "quit requested, releasing {} resource(s)",
            self.resources.len()
        );
        if let Some(outbound) = &self.outbound {
            outbound.send(OutboundCommand::CloseConfigWindow);
        }

        if self.resources.is_empty() {
            self.completed.store(true, Ordering::Release);
            return QuitDecision::Deny;
        }

        self.spawn_releases();
        QuitDecision::Deny
    }

    fn spawn_releases(&self) {
        let timeout = self.release_timeout;
        let tasks: Vec<_> = self
            .resources
            .iter()
            .map(|resource| {
                let resource = Arc::clone(resource);
                self.runtime.spawn(async move {
                    let name = resource.name().to_string();
                    let release = resource.release_resources();
                    let result = match timeout {
                        Some(limit) => tokio::time::timeout(limit, release)
                            .await
                            .unwrap_or_else(|_| Err(ReleaseError::TimedOut(name.clone()))),
                        None => release.await,
                    };
                    match result {
                        Ok(()) => tracing::debug!("{name} released"),
                        Err(e) => tracing::error!("release failed, continuing quit: {e}"),
                    }
                })
            })
            .collect();

        let completed = Arc::clone(&self.completed);
        self.runtime.spawn(async move {
            for joined in join_all(tasks).await {
                if let Err(e) = joined {
                    tracing::error!("release task aborted, continuing quit: {e}");
                }
            }
            completed.store(true, Ordering::Release);
            tracing::info!("all resources released, quit may proceed");
        });
    }
}
