//! Window surface controller for a transparent, click-through, draggable
//! character overlay driven by a companion configuration process.

pub mod channel;
pub mod command;
pub mod config;
pub mod error;
pub mod hit_test;
pub mod lifecycle;
pub mod logging;
pub mod monitor;
pub mod native;
pub mod placement;
pub mod store;
pub mod style;
pub mod texture_share;
