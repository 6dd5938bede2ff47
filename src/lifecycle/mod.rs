mod companion;
mod quit;

pub use companion::{CompanionLauncher, CompanionStatus};
pub use quit::{QuitCoordinator, QuitDecision, QuitPhase, ReleaseBeforeQuit};
