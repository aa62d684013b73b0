//! WMO weather code classification.
//!
//! The code groups are disjoint, so the order of the match arms never
//! changes the outcome. Every integer maps to something; codes outside the
//! known groups are [`Condition::Unknown`].

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    Clear,
    Clouds,
    Fog,
    Rain,
    Snow,
    Thunderstorm,
    Unknown,
}

impl Condition {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Condition::Clear,
            1..=3 => Condition::Clouds,
            45 | 48 => Condition::Fog,
            51 | 53 | 55 | 61 | 63 | 65 => Condition::Rain,
            71 | 73 | 75 | 77 | 85 | 86 => Condition::Snow,
            95 | 96 | 99 => Condition::Thunderstorm,
            _ => Condition::Unknown,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Condition::Clear => "Clear",
            Condition::Clouds => "Clouds",
            Condition::Fog => "Fog",
            Condition::Rain => "Rain",
            Condition::Snow => "Snow",
            Condition::Thunderstorm => "Thunderstorm",
            Condition::Unknown => "Unknown",
        }
    }

    pub fn icon(self) -> Icon {
        match self {
            Condition::Clear => Icon::Sun,
            Condition::Clouds => Icon::PartialCloud,
            Condition::Fog => Icon::Fog,
            Condition::Rain => Icon::Rain,
            Condition::Snow => Icon::Snow,
            Condition::Thunderstorm => Icon::Storm,
            Condition::Unknown => Icon::QuestionMark,
        }
    }

    /// Only precipitation and storms tint the background.
    pub fn ambient_color(self) -> AmbientColor {
        match self {
            Condition::Rain => AmbientColor::Teal,
            Condition::Snow => AmbientColor::PaleCyan,
            Condition::Thunderstorm => AmbientColor::DarkSlate,
            _ => AmbientColor::LightBlue,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Icon {
    Sun,
    PartialCloud,
    Fog,
    Rain,
    Snow,
    Storm,
    QuestionMark,
}

impl Icon {
    pub fn token(self) -> &'static str {
        match self {
            Icon::Sun => "sun",
            Icon::PartialCloud => "partial-cloud",
            Icon::Fog => "fog",
            Icon::Rain => "rain",
            Icon::Snow => "snow",
            Icon::Storm => "storm",
            Icon::QuestionMark => "question-mark",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Icon::Sun => "\u{2600}\u{FE0F}",
            Icon::PartialCloud => "\u{26C5}",
            Icon::Fog => "\u{1F32B}\u{FE0F}",
            Icon::Rain => "\u{1F327}\u{FE0F}",
            Icon::Snow => "\u{2744}\u{FE0F}",
            Icon::Storm => "\u{26C8}\u{FE0F}",
            Icon::QuestionMark => "\u{2753}",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AmbientColor {
    LightBlue,
    Teal,
    PaleCyan,
    DarkSlate,
}

impl AmbientColor {
    pub fn hex(self) -> &'static str {
        match self {
            AmbientColor::LightBlue => "#87CEEB",
            AmbientColor::Teal => "#5F9EA0",
            AmbientColor::PaleCyan => "#E0F7FA",
            AmbientColor::DarkSlate => "#2F4F4F",
        }
    }

    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            AmbientColor::LightBlue => (0x87, 0xCE, 0xEB),
            AmbientColor::Teal => (0x5F, 0x9E, 0xA0),
            AmbientColor::PaleCyan => (0xE0, 0xF7, 0xFA),
            AmbientColor::DarkSlate => (0x2F, 0x4F, 0x4F),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionClassification {
    pub condition: Condition,
    pub description: &'static str,
    pub icon: Icon,
    pub ambient_color: AmbientColor,
}

pub fn classify(weather_code: i32) -> ConditionClassification {
    let condition = Condition::from_code(weather_code);
    ConditionClassification {
        condition,
        description: condition.description(),
        icon: condition.icon(),
        ambient_color: condition.ambient_color(),
    }
}
