use std::fmt;

/// Coarse part of the day used for the header label and page styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeOfDay {
    Morning,
    Noon,
    Evening,
    Night,
}

impl TimeOfDay {
    /// Boundaries are inclusive-low, exclusive-high: [6,9) [9,16) [16,19).
    /// Everything else, including out-of-range hours, is night.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            6..=8 => TimeOfDay::Morning,
            9..=15 => TimeOfDay::Noon,
            16..=18 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeOfDay::Morning => "Morning",
            TimeOfDay::Noon => "Noon",
            TimeOfDay::Evening => "Evening",
            TimeOfDay::Night => "Night",
        }
    }

    pub fn style_class(self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Noon => "noon",
            TimeOfDay::Evening => "evening",
            TimeOfDay::Night => "night",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            TimeOfDay::Morning => "\u{1F305}",
            TimeOfDay::Noon => "\u{2600}\u{FE0F}",
            TimeOfDay::Evening => "\u{1F307}",
            TimeOfDay::Night => "\u{1F319}",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.label(), self.emoji())
    }
}
