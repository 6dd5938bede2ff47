use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use avatar_hud::command::Command;
use avatar_hud::error::ReleaseError;
use avatar_hud::lifecycle::{QuitCoordinator, QuitDecision, QuitPhase, ReleaseBeforeQuit};
use avatar_hud::texture_share::{NullTextureTarget, TextureShareController};
use futures::future::BoxFuture;
use tokio::runtime::Handle;
use tokio::sync::watch;

struct SlowRelease {
    calls: AtomicUsize,
    delay: Duration,
}

impl ReleaseBeforeQuit for SlowRelease {
    fn name(&self) -> &str {
        "slow"
    }

    fn release_resources(&self) -> BoxFuture<'static, Result<(), ReleaseError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.delay;
        Box::pin(async move {
            tokio::time::sleep(delay).await;
            Ok(())
        })
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn close_is_denied_until_every_resource_released() {
    let (_screen_tx, screen_rx) = watch::channel((800, 600));
    let mut share = TextureShareController::new(
        NullTextureTarget,
        Handle::current(),
        Duration::from_millis(10),
        screen_rx,
    );
    share.apply(&Command::EnableTextureShare(true));
    assert!(share.is_polling());

    let slow = Arc::new(SlowRelease {
        calls: AtomicUsize::new(0),
        delay: Duration::from_millis(50),
    });
    let mut quit = QuitCoordinator::new(Handle::current());
    quit.register(share.quit_handle());
    quit.register(slow.clone());

    assert_eq!(quit.phase(), QuitPhase::Idle);
    assert_eq!(quit.request_quit(), QuitDecision::Deny);

    // The OS keeps asking while the release is in flight.
    let mut polls = 0;
    while !quit.should_exit() {
        assert_eq!(quit.request_quit(), QuitDecision::Deny);
        tokio::time::sleep(Duration::from_millis(5)).await;
        polls += 1;
        assert!(polls < 1000, "release never completed");
    }

    assert_eq!(slow.calls.load(Ordering::SeqCst), 1);
    assert_eq!(quit.phase(), QuitPhase::Completed);
    assert_eq!(quit.request_quit(), QuitDecision::Allow);
    assert_eq!(quit.request_quit(), QuitDecision::Allow);
}
