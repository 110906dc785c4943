//! Synthetic click and keystroke dispatch via System Events.

use crate::error::Result;
use crate::exec::run_osascript;
use crate::geometry::ScreenPoint;
use async_trait::async_trait;
use std::time::Duration;

/// Simulator hardware buttons reachable through keyboard shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareButton {
    Home,
    Lock,
    VolumeUp,
    VolumeDown,
}

impl HardwareButton {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "home" => Some(Self::Home),
            "lock" => Some(Self::Lock),
            "volume_up" => Some(Self::VolumeUp),
            "volume_down" => Some(Self::VolumeDown),
            _ => None,
        }
    }

    /// The Simulator.app keyboard shortcut for this button.
    pub fn key_combo(self) -> KeyCombo {
        match self {
            // Device > Home is cmd-shift-H.
            Self::Home => KeyCombo::keystroke('h').command().shift(),
            // Device > Lock is cmd-L.
            Self::Lock => KeyCombo::keystroke('l').command(),
            // Volume shortcuts use the arrow keys (key codes 126/125).
            Self::VolumeUp => KeyCombo::key_code(126).command(),
            Self::VolumeDown => KeyCombo::key_code(125).command(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Key {
    Char(char),
    Code(u16),
}

/// A keystroke with modifiers, expressed the way System Events wants it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyCombo {
    key: Key,
    command: bool,
    shift: bool,
    control: bool,
    option: bool,
}

impl KeyCombo {
    pub fn keystroke(c: char) -> Self {
        Self {
            key: Key::Char(c),
            command: false,
            shift: false,
            control: false,
            option: false,
        }
    }

    pub fn key_code(code: u16) -> Self {
        Self {
            key: Key::Code(code),
            command: false,
            shift: false,
            control: false,
            option: false,
        }
    }

    pub fn command(mut self) -> Self {
        self.command = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn control(mut self) -> Self {
        self.control = true;
        self
    }

    pub fn option(mut self) -> Self {
        self.option = true;
        self
    }

    fn to_applescript(self) -> String {
        let action = match self.key {
            Key::Char(c) => format!("keystroke \"{c}\""),
            Key::Code(code) => format!("key code {code}"),
        };
        let mut mods = Vec::new();
        if self.command {
            mods.push("command down");
        }
        if self.shift {
            mods.push("shift down");
        }
        if self.control {
            mods.push("control down");
        }
        if self.option {
            mods.push("option down");
        }
        if mods.is_empty() {
            action
        } else {
            format!("{action} using {{{}}}", mods.join(", "))
        }
    }
}

/// Dispatch seam for synthetic input. Fire-and-forget: success means the
/// automation call itself did not error; callers wanting confirmation must
/// re-observe the screen.
#[async_trait]
pub trait ClickDispatcher: Send + Sync {
    async fn click(&self, point: ScreenPoint) -> Result<()>;
    async fn send_key(&self, combo: KeyCombo) -> Result<()>;
}

/// Dispatcher backed by `osascript` / System Events.
pub struct SystemEventsDispatcher {
    app_name: String,
    timeout: Duration,
}

impl SystemEventsDispatcher {
    pub fn new(app_name: impl Into<String>, timeout: Duration) -> Self {
        Self {
            app_name: app_name.into(),
            timeout,
        }
    }
}

#[async_trait]
impl ClickDispatcher for SystemEventsDispatcher {
    async fn click(&self, point: ScreenPoint) -> Result<()> {
        let script = format!(
            "tell application \"System Events\" to click at {{{:.0}, {:.0}}}",
            point.x, point.y
        );
        run_osascript(&script, self.timeout).await?;
        tracing::info!("clicked at {}", point);
        Ok(())
    }

    async fn send_key(&self, combo: KeyCombo) -> Result<()> {
        // Keyboard shortcuts land on the frontmost app, so bring the
        // simulator forward first.
        let script = format!(
            "tell application \"{app}\" to activate\n\
             delay 0.3\n\
             tell application \"System Events\" to {key}",
            app = self.app_name,
            key = combo.to_applescript()
        );
        run_osascript(&script, self.timeout).await?;
        Ok(())
    }
}
