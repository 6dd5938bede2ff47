//! Named commands arriving from the companion configuration process.
//!
//! Wire form is one command per line: the command name, optionally followed
//! by a single space and the payload (`move-window 120,80`).

use crate::error::CommandError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Background key colour; transparency is on iff alpha is zero.
    ChromaKey { a: f32, r: f32, g: f32, b: f32 },
    FrameVisibility(bool),
    IgnoreMouse(bool),
    TopMost(bool),
    WindowDraggable(bool),
    MoveWindow { x: i32, y: i32 },
    ResetWindowSize,
    /// Raw ordinal; validated by the controller.
    SetTransparencyLevel(i32),
    SetAlphaOnTransparent(i32),
    EnableTextureShare(bool),
    /// Raw ordinal; validated by the texture share controller.
    SetTextureShareResolution(i32),
}

impl Command {
    /// Decode a command from its name and payload text.
    pub fn parse(name: &str, payload: &str) -> Result<Self, CommandError> {
        let payload = payload.trim();
        let malformed = || CommandError::Malformed {
            command: name.to_string(),
            payload: payload.to_string(),
        };

        let cmd = match name {
            "chroma-key" => {
                let argb = parse_list::<f32>(payload).ok_or_else(malformed)?;
                let [a, r, g, b] = argb[..] else {
                    return Err(malformed());
                };
                Command::ChromaKey { a, r, g, b }
            }
            "frame-visibility" => Command::FrameVisibility(parse_bool(payload).ok_or_else(malformed)?),
            "ignore-mouse" => Command::IgnoreMouse(parse_bool(payload).ok_or_else(malformed)?),
            "topmost" => Command::TopMost(parse_bool(payload).ok_or_else(malformed)?),
            "window-draggable" => Command::WindowDraggable(parse_bool(payload).ok_or_else(malformed)?),
            "move-window" => {
                let xy = parse_list::<i32>(payload).ok_or_else(malformed)?;
                let [x, y] = xy[..] else {
                    return Err(malformed());
                };
                Command::MoveWindow { x, y }
            }
            "reset-window-size" => Command::ResetWindowSize,
            "set-transparency-level" => {
                Command::SetTransparencyLevel(payload.parse().map_err(|_| malformed())?)
            }
            "set-alpha-on-transparent" => {
                Command::SetAlphaOnTransparent(payload.parse().map_err(|_| malformed())?)
            }
            "enable-texture-share" => {
                Command::EnableTextureShare(parse_bool(payload).ok_or_else(malformed)?)
            }
            "set-texture-share-resolution" => {
                Command::SetTextureShareResolution(payload.parse().map_err(|_| malformed())?)
            }
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(cmd)
    }

    /// Decode a `name payload` line.
    pub fn parse_line(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        let (name, payload) = line.split_once(' ').unwrap_or((line, ""));
        Self::parse(name, payload)
    }

    /// Whether this command belongs to the texture sharing feature.
    pub fn is_texture_share(&self) -> bool {
        matches!(
            self,
            Command::EnableTextureShare(_) | Command::SetTextureShareResolution(_)
        )
    }
}

/// Messages sent back to the companion process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboundCommand {
    CloseConfigWindow,
}

impl OutboundCommand {
    pub fn name(&self) -> &'static str {
        match self {
            OutboundCommand::CloseConfigWindow => "close-config-window",
        }
    }
}

fn parse_bool(payload: &str) -> Option<bool> {
    match payload.to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

fn parse_list<T: std::str::FromStr>(payload: &str) -> Option<Vec<T>> {
    payload
        .split(',')
        .map(|part| part.trim().parse().ok())
        .collect()
}
