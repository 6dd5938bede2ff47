//! Off-screen copy of the rendered frame for external texture sharing.
//!
//! Transmission itself belongs to the [`TextureTarget`] collaborator; this
//! module decides the texture size and keeps it in step with the window
//! while sharing at screen resolution.

use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::command::Command;
use crate::error::ReleaseError;
use crate::lifecycle::ReleaseBeforeQuit;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(i32)]
pub enum ShareResolution {
    #[default]
    SameAsScreen = 0,
    Fixed1280 = 1,
    Fixed1920 = 2,
    Fixed2560 = 3,
    Fixed3840 = 4,
}

impl TryFrom<i32> for ShareResolution {
    type Error = i32;

    fn try_from(ordinal: i32) -> Result<Self, Self::Error> {
        match ordinal {
            0 => Ok(Self::SameAsScreen),
            1 => Ok(Self::Fixed1280),
            2 => Ok(Self::Fixed1920),
            3 => Ok(Self::Fixed2560),
            4 => Ok(Self::Fixed3840),
            other => Err(other),
        }
    }
}

impl ShareResolution {
    /// Fixed 16:9 size, or `None` when following the window.
    pub fn fixed_size(self) -> Option<(u32, u32)> {
        match self {
            Self::SameAsScreen => None,
            Self::Fixed1280 => Some((1280, 720)),
            Self::Fixed1920 => Some((1920, 1080)),
            Self::Fixed2560 => Some((2560, 1440)),
            Self::Fixed3840 => Some((3840, 2160)),
        }
    }
}

/// Render target the shared frame is drawn into.
pub trait TextureTarget {
    fn allocate(&mut self, width: u32, height: u32);
    fn release(&mut self);
}

/// Target that only logs; used until a sharing backend is attached.
#[derive(Debug, Default)]
pub struct NullTextureTarget;

impl TextureTarget for NullTextureTarget {
    fn allocate(&mut self, width: u32, height: u32) {
        tracing::debug!("no texture sharing backend, skipping {width}x{height} target");
    }

    fn release(&mut self) {}
}

/// Background task comparing the window size against the texture size on a
/// fixed interval. Resize requests go back over a channel; the task never
/// touches controller state.
pub struct TextureSizePoller {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl TextureSizePoller {
    pub fn spawn(
        runtime: &Handle,
        token: CancellationToken,
        interval: Duration,
        mut screen: watch::Receiver<(u32, u32)>,
        texture_size: (u32, u32),
        resize_tx: mpsc::Sender<(u32, u32)>,
    ) -> Self {
        let task_token = token.clone();
        let handle = runtime.spawn(async move {
            let mut known = texture_size;
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick fires immediately; wait a full interval instead.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = task_token.cancelled() => break,
                    _ = ticker.tick() => {
                        let size = *screen.borrow_and_update();
                        if size == known {
                            continue;
                        }
                        known = size;
                        if resize_tx.send(size).is_err() {
                            break;
                        }
                    }
                }
            }
            tracing::debug!("texture size poller stopped");
        });
        Self { token, handle }
    }

    /// Cancel the task; the returned handle resolves once it has exited.
    pub fn stop(self) -> JoinHandle<()> {
        self.token.cancel();
        self.handle
    }
}

/// Cancels every poller at quit.
struct PollerShutdown {
    token: CancellationToken,
}

impl ReleaseBeforeQuit for PollerShutdown {
    fn name(&self) -> &str {
        "texture-size-poller"
    }

    fn release_resources(&self) -> BoxFuture<'static, Result<(), ReleaseError>> {
        self.token.cancel();
        Box::pin(async { Ok(()) })
    }
}

pub struct TextureShareController<T> {
    target: T,
    runtime: Handle,
    poll_interval: Duration,
    screen: watch::Receiver<(u32, u32)>,
    shutdown: CancellationToken,
    active: bool,
    resolution: ShareResolution,
    allocated: Option<(u32, u32)>,
    poller: Option<TextureSizePoller>,
    resize_tx: mpsc::Sender<(u32, u32)>,
    resize_rx: mpsc::Receiver<(u32, u32)>,
}

impl<T: TextureTarget> TextureShareController<T> {
    /// `screen` carries the live window client size, updated by the host.
    pub fn new(
        target: T,
        runtime: Handle,
        poll_interval: Duration,
        screen: watch::Receiver<(u32, u32)>,
    ) -> Self {
        let (resize_tx, resize_rx) = mpsc::channel();
        Self {
            target,
            runtime,
            poll_interval,
            screen,
            shutdown: CancellationToken::new(),
            active: false,
            resolution: ShareResolution::SameAsScreen,
            allocated: None,
            poller: None,
            resize_tx,
            resize_rx,
        }
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn resolution(&self) -> ShareResolution {
        self.resolution
    }

    /// Size of the current shared texture, if one exists.
    pub fn texture_size(&self) -> Option<(u32, u32)> {
        self.allocated
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_some()
    }

    /// True while sharing at a fixed size that differs from the window's
    /// aspect; the camera field of view needs compensating then.
    pub fn needs_fov_fix(&self) -> bool {
        self.active && self.resolution != ShareResolution::SameAsScreen
    }

    /// Resource that stops all polling when the process quits.
    pub fn quit_handle(&self) -> Arc<dyn ReleaseBeforeQuit> {
        Arc::new(PollerShutdown {
            token: self.shutdown.clone(),
        })
    }

    pub fn apply(&mut self, command: &Command) {
        match *command {
            Command::EnableTextureShare(active) => self.set_active(active),
            Command::SetTextureShareResolution(ordinal) => self.set_resolution(ordinal),
            _ => {}
        }
    }

    pub fn set_active(&mut self, active: bool) {
        tracing::info!("texture sharing {}", if active { "enabled" } else { "disabled" });
        self.active = active;
        self.refresh_texture();
        self.update_poller();
    }

    /// Unknown ordinals (e.g. from a newer companion) are ignored.
    pub fn set_resolution(&mut self, ordinal: i32) {
        let Ok(resolution) = ShareResolution::try_from(ordinal) else {
            tracing::debug!("ignoring unknown share resolution {ordinal}");
            return;
        };
        if resolution == self.resolution {
            return;
        }
        self.resolution = resolution;
        self.refresh_texture();
        self.update_poller();
    }

    /// Apply resize requests queued by the poller. Call once per tick.
    pub fn tick(&mut self) {
        let mut latest = None;
        while let Ok(size) = self.resize_rx.try_recv() {
            latest = Some(size);
        }
        let Some(size) = latest else {
            return;
        };
        if !self.active || self.resolution != ShareResolution::SameAsScreen {
            return;
        }
        if self.allocated != Some(size) {
            self.reallocate(size);
        }
    }

    pub fn shutdown(&mut self) {
        self.shutdown.cancel();
        self.stop_poller();
        self.release_texture();
    }

    fn refresh_texture(&mut self) {
        self.release_texture();
        if !self.active {
            return;
        }
        let size = self
            .resolution
            .fixed_size()
            .unwrap_or_else(|| *self.screen.borrow());
        self.reallocate(size);
    }

    fn reallocate(&mut self, (width, height): (u32, u32)) {
        self.release_texture();
        tracing::debug!("allocating shared texture {width}x{height}");
        self.target.allocate(width, height);
        self.allocated = Some((width, height));
    }

    fn release_texture(&mut self) {
        if self.allocated.take().is_some() {
            self.target.release();
        }
    }

    fn update_poller(&mut self) {
        let follow_screen = self.active && self.resolution == ShareResolution::SameAsScreen;
        if !follow_screen {
            self.stop_poller();
            return;
        }
        if self.poller.is_some() {
            return;
        }
        self.poller = Some(TextureSizePoller::spawn(
            &self.runtime,
            self.shutdown.child_token(),
            self.poll_interval,
            self.screen.clone(),
            self.allocated.unwrap_or_default(),
            self.resize_tx.clone(),
        ));
    }

    fn stop_poller(&mut self) {
        if let Some(poller) = self.poller.take() {
            // Cancellation is observed at the task's next await point.
            drop(poller.stop());
        }
    }
}

impl<T> Drop for TextureShareController<T> {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
