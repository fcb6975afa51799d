use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Trailing day-window of price history requested from the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Window {
    #[default]
    Week,
    Month,
    Quarter,
}

impl Window {
    pub const ALL: [Window; 3] = [Window::Week, Window::Month, Window::Quarter];

    pub fn days(&self) -> u32 {
        match self {
            Window::Week => 7,
            Window::Month => 30,
            Window::Quarter => 90,
        }
    }

    /// Short selector label, e.g. "30D".
    pub fn label(&self) -> String {
        format!("{}D", self.days())
    }
}

impl TryFrom<u32> for Window {
    type Error = CoreError;

    fn try_from(days: u32) -> Result<Self, Self::Error> {
        match days {
            7 => Ok(Window::Week),
            30 => Ok(Window::Month),
            90 => Ok(Window::Quarter),
            other => Err(CoreError::InvalidWindow(other)),
        }
    }
}

impl From<Window> for u32 {
    fn from(w: Window) -> Self {
        w.days()
    }
}

impl std::fmt::Display for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} days", self.days())
    }
}
