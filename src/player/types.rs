/// Common types shared by the playback controller, classifier and session
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use crate::utils::{PlayerError, PlayerResult};

/// Coarse shape bucket derived from a resource's natural size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AspectShape {
    Square,
    Portrait,
    Landscape,
    /// No strong classification; render with native proportions
    #[default]
    Auto,
}

/// The presentation shape the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Auto,
    Landscape,
    Portrait,
    Square,
}

impl DisplayMode {
    pub const ALL: [DisplayMode; 4] = [
        DisplayMode::Auto,
        DisplayMode::Landscape,
        DisplayMode::Portrait,
        DisplayMode::Square,
    ];

    /// The shape this preference pins, or `None` for `Auto`.
    pub fn pinned_shape(self) -> Option<AspectShape> {
        match self {
            DisplayMode::Auto => None,
            DisplayMode::Landscape => Some(AspectShape::Landscape),
            DisplayMode::Portrait => Some(AspectShape::Portrait),
            DisplayMode::Square => Some(AspectShape::Square),
        }
    }
}

impl fmt::Display for AspectShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AspectShape::Square => "Square",
            AspectShape::Portrait => "Portrait",
            AspectShape::Landscape => "Landscape",
            AspectShape::Auto => "Auto",
        })
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DisplayMode::Auto => "Auto",
            DisplayMode::Landscape => "Landscape",
            DisplayMode::Portrait => "Portrait",
            DisplayMode::Square => "Square",
        })
    }
}

/// The fixed set of playback speeds offered by the rate menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum PlaybackRate {
    Quarter,
    Half,
    ThreeQuarters,
    #[default]
    Normal,
    OneAndQuarter,
    OneAndHalf,
    Double,
}

impl PlaybackRate {
    /// Ascending order
    pub const ALL: [PlaybackRate; 7] = [
        PlaybackRate::Quarter,
        PlaybackRate::Half,
        PlaybackRate::ThreeQuarters,
        PlaybackRate::Normal,
        PlaybackRate::OneAndQuarter,
        PlaybackRate::OneAndHalf,
        PlaybackRate::Double,
    ];

    pub fn as_f64(self) -> f64 {
        match self {
            PlaybackRate::Quarter => 0.25,
            PlaybackRate::Half => 0.5,
            PlaybackRate::ThreeQuarters => 0.75,
            PlaybackRate::Normal => 1.0,
            PlaybackRate::OneAndQuarter => 1.25,
            PlaybackRate::OneAndHalf => 1.5,
            PlaybackRate::Double => 2.0,
        }
    }

    /// Closest member of the set. Used when the host reports a speed it set
    /// on its own; non-finite input maps to `Normal`.
    pub fn nearest(rate: f64) -> Self {
        if !rate.is_finite() {
            return PlaybackRate::Normal;
        }
        Self::ALL
            .into_iter()
            .min_by(|a, b| {
                let da = (a.as_f64() - rate).abs();
                let db = (b.as_f64() - rate).abs();
                da.total_cmp(&db)
            })
            .unwrap_or_default()
    }

    /// Next faster member, or `None` at the top of the set.
    pub fn faster(self) -> Option<Self> {
        let index = Self::ALL.iter().position(|r| *r == self)?;
        Self::ALL.get(index + 1).copied()
    }

    /// Next slower member, or `None` at the bottom of the set.
    pub fn slower(self) -> Option<Self> {
        let index = Self::ALL.iter().position(|r| *r == self)?;
        index.checked_sub(1).map(|i| Self::ALL[i])
    }
}

impl TryFrom<f64> for PlaybackRate {
    type Error = PlayerError;

    fn try_from(rate: f64) -> PlayerResult<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_f64() == rate)
            .ok_or_else(|| {
                PlayerError::InvalidArgument(format!("playback rate {} is not offered", rate))
            })
    }
}

impl fmt::Display for PlaybackRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.as_f64())
    }
}

impl Serialize for PlaybackRate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

/// Pointer input from whatever renders the video surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerActivity {
    Moved { x: f64, y: f64 },
    Entered,
    Left,
}
