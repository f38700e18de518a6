//! Key combination parsing and per-platform rendering.

use std::fmt;
use std::str::FromStr;

use super::DesktopError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Command,
    Control,
    Alt,
    Shift,
}

impl Modifier {
    fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "cmd" | "command" => Some(Modifier::Command),
            "ctrl" | "control" => Some(Modifier::Control),
            "alt" | "option" => Some(Modifier::Alt),
            "shift" => Some(Modifier::Shift),
            _ => None,
        }
    }

    fn applescript_name(self) -> &'static str {
        match self {
            Modifier::Command => "command",
            Modifier::Control => "control",
            Modifier::Alt => "option",
            Modifier::Shift => "shift",
        }
    }

    /// SendKeys prefix. Command has no Windows equivalent and maps to Ctrl.
    fn sendkeys_prefix(self) -> &'static str {
        match self {
            Modifier::Command | Modifier::Control => "^",
            Modifier::Alt => "%",
            Modifier::Shift => "+",
        }
    }
}

/// A key press with optional modifiers, e.g. `cmd+shift+n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    pub modifiers: Vec<Modifier>,
    pub key: String,
}

impl KeyCombo {
    /// AppleScript statement for System Events.
    pub fn to_applescript(&self) -> String {
        let key = self.key.replace('"', "\\\"");
        if self.modifiers.is_empty() {
            format!("tell application \"System Events\" to keystroke \"{}\"", key)
        } else {
            let mods = self
                .modifiers
                .iter()
                .map(|m| format!("{} down", m.applescript_name()))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "tell application \"System Events\" to keystroke \"{}\" using {{{}}}",
                key, mods
            )
        }
    }

    /// Windows Forms SendKeys notation.
    pub fn to_sendkeys(&self) -> String {
        let key = match self.key.to_ascii_lowercase().as_str() {
            "enter" | "return" => "{ENTER}".to_string(),
            "tab" => "{TAB}".to_string(),
            "escape" | "esc" => "{ESC}".to_string(),
            _ => self.key.clone(),
        };
        let prefix: String = self.modifiers.iter().map(|m| m.sendkeys_prefix()).collect();
        format!("{}{}", prefix, key)
    }
}

impl FromStr for KeyCombo {
    type Err = DesktopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('+').map(str::trim).collect();
        let (key, mods) = match parts.split_last() {
            Some((key, mods)) if !key.is_empty() => (key, mods),
            _ => return Err(DesktopError::InvalidKeyCombo(s.to_string())),
        };

        let modifiers = mods
            .iter()
            .map(|m| Modifier::parse(m).ok_or_else(|| DesktopError::InvalidKeyCombo(s.to_string())))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(KeyCombo {
            modifiers,
            key: key.to_string(),
        })
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for m in &self.modifiers {
            write!(f, "{}+", m.applescript_name())?;
        }
        write!(f, "{}", self.key)
    }
}
