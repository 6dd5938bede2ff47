use std::path::PathBuf;

/// Failures reported by a native window call.
#[derive(Debug, thiserror::Error)]
pub enum NativeError {
    #[error("native window handle is not available")]
    NoHandle,
    #[error("monitor enumeration returned no displays")]
    NoMonitors,
    #[error("{call} failed: {message}")]
    CallFailed { call: &'static str, message: String },
}

impl NativeError {
    pub fn call(call: &'static str, err: impl std::fmt::Display) -> Self {
        Self::CallFailed {
            call,
            message: err.to_string(),
        }
    }
}

/// Failures of the persisted key-value settings store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Reasons an inbound command is rejected before it reaches the controller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command `{0}`")]
    Unknown(String),
    #[error("malformed payload for `{command}`: {payload:?}")]
    Malformed { command: String, payload: String },
}

/// Failure while a resource releases itself before quit.
#[derive(Debug, thiserror::Error)]
pub enum ReleaseError {
    #[error("{resource}: {message}")]
    Failed { resource: String, message: String },
    #[error("{0}: release timed out")]
    TimedOut(String),
}

/// Failure while sampling the rendered frame.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HitTestError {
    #[error("pixel ({x}, {y}) is outside the {width}x{height} frame")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },
}
