use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::runtime::Handle;
use tokio::sync::watch;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow};
use winit::window::{Window, WindowId};

use avatar_hud::channel::{CommandChannel, CompanionLink};
use avatar_hud::config::{self, AppConfig};
use avatar_hud::hit_test::{CpuFrame, PixelHitTester};
use avatar_hud::lifecycle::{CompanionLauncher, QuitCoordinator, QuitDecision};
use avatar_hud::native::{self, NullWindow, WindowAdapter};
use avatar_hud::placement::PlacementStore;
use avatar_hud::store::JsonFileStore;
use avatar_hud::style::{StyleSettings, TickInput, WindowStyleController};
use avatar_hud::texture_share::{NullTextureTarget, TextureShareController};

const FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

type Controller = WindowStyleController<Box<dyn WindowAdapter>>;

/// winit host: owns the character window and runs one tick per frame.
pub struct HostApp {
    config: AppConfig,
    window: Option<Window>,
    controller: Option<Controller>,
    placement: PlacementStore<JsonFileStore>,
    hit_tester: PixelHitTester,
    /// Last finished frame. Stays transparent until a renderer draws into it.
    frame: CpuFrame,
    commands: CommandChannel,
    companion: CompanionLauncher,
    quit: QuitCoordinator,
    texture_share: TextureShareController<NullTextureTarget>,
    screen_tx: watch::Sender<(u32, u32)>,
    /// Pointer from window events, for adapters that cannot query the cursor.
    pointer: Option<(f32, f32)>,
    primary_down: bool,
    last_tick: Instant,
    next_tick: Instant,
}

impl HostApp {
    pub fn new(config: AppConfig, runtime: Handle) -> Self {
        let (width, height) = config.default_window_size;
        let initial = (width.max(1) as u32, height.max(1) as u32);
        let (screen_tx, screen_rx) = watch::channel(initial);

        let commands = CommandChannel::new();
        let link = Arc::new(CompanionLink::new());

        let texture_share = TextureShareController::new(
            NullTextureTarget,
            runtime.clone(),
            config.texture_poll_interval(),
            screen_rx,
        );

        let mut quit = QuitCoordinator::new(runtime)
            .with_outbound(link.clone())
            .with_release_timeout(config.release_timeout());
        quit.register(texture_share.quit_handle());

        let placement = PlacementStore::new(
            JsonFileStore::open_or_reset(config::placement_path()),
            config.placement_check_interval(),
        );
        let companion = CompanionLauncher::beside_current_exe(
            &config.companion_relative_path,
            config.companion_launch_delay_ticks,
        )
        .connect(commands.sender(), link);

        let now = Instant::now();
        Self {
            hit_tester: PixelHitTester::new(config.opaque_threshold),
            frame: CpuFrame::transparent(initial.0, initial.1),
            config,
            window: None,
            controller: None,
            placement,
            commands,
            companion,
            quit,
            texture_share,
            screen_tx,
            pointer: None,
            primary_down: false,
            last_tick: now,
            next_tick: now,
        }
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let (width, height) = self.config.default_window_size;
        let attributes = Window::default_attributes()
            .with_title("avatar-hud")
            .with_transparent(true)
            .with_inner_size(PhysicalSize::new(width.max(1) as u32, height.max(1) as u32));
        let window = event_loop.create_window(attributes)?;

        let adapter = native_adapter(&window);
        let mut controller = WindowStyleController::new(adapter, StyleSettings::from(&self.config));
        controller.initialize();
        if self.config.start_transparent {
            controller.enter_overlay_mode();
        }
        self.placement.load(controller.window_mut());

        self.resize_frame(window.inner_size());
        self.controller = Some(controller);
        self.window = Some(window);
        tracing::info!("character window ready");
        Ok(())
    }

    fn resize_frame(&mut self, size: PhysicalSize<u32>) {
        let size = (size.width.max(1), size.height.max(1));
        if self.frame.size() != size {
            self.frame = CpuFrame::transparent(size.0, size.1);
            self.hit_tester.reset();
        }
        self.screen_tx.send_replace(size);
    }

    fn tick(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_tick);
        self.last_tick = now;

        for command in self.commands.drain() {
            if command.is_texture_share() {
                self.texture_share.apply(&command);
            } else if let Some(controller) = self.controller.as_mut() {
                controller.apply(&command);
            }
        }

        // Polled from the OS so the pointer stays tracked while click-through
        // suppresses window pointer events.
        let pointer = self
            .controller
            .as_ref()
            .and_then(|controller| native::pointer_in_client(controller.window()))
            .or(self.pointer);
        let on_opaque_pixel = match pointer {
            Some(pointer) => self.hit_tester.sample(pointer, &self.frame),
            None => false,
        };

        if let Some(controller) = self.controller.as_mut() {
            controller.tick(TickInput {
                on_opaque_pixel,
                primary_button_down: self.primary_down,
            });
            self.placement.poll(elapsed, controller.window());
        }

        self.companion.tick();
        self.texture_share.tick();

        if self.quit.should_exit() {
            tracing::info!("release finished, exiting");
            event_loop.exit();
        }
    }
}

#[cfg(windows)]
fn native_adapter(window: &Window) -> Box<dyn WindowAdapter> {
    match avatar_hud::native::Win32Window::attach(window) {
        Ok(adapter) => Box::new(adapter),
        Err(e) => {
            tracing::warn!("native window control unavailable: {e}");
            Box::new(NullWindow)
        }
    }
}

#[cfg(not(windows))]
fn native_adapter(_window: &Window) -> Box<dyn WindowAdapter> {
    tracing::info!("native window styling is only supported on Windows");
    Box::new(NullWindow)
}

impl ApplicationHandler for HostApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.create_window(event_loop) {
            tracing::error!("failed to create character window: {e:#}");
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => match self.quit.request_quit() {
                QuitDecision::Allow => event_loop.exit(),
                QuitDecision::Deny => tracing::debug!("close deferred until release completes"),
            },
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer = Some((position.x as f32, position.y as f32));
            }
            WindowEvent::CursorLeft { .. } => {
                self.pointer = None;
                self.hit_tester.reset();
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.primary_down = state == ElementState::Pressed;
                if self.primary_down
                    && let Some(controller) = self.controller.as_mut()
                {
                    controller.on_primary_button_pressed();
                }
            }
            WindowEvent::Resized(size) => self.resize_frame(size),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        if now >= self.next_tick {
            self.tick(event_loop);
            self.next_tick = now + FRAME_INTERVAL;
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_tick));
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(controller) = self.controller.as_ref() {
            self.placement.save(controller.window());
        }
        self.texture_share.shutdown();
        tracing::info!("shutdown complete");
    }
}
