//! Per-variant datasheet constants.
//!
//! Each supported sensor maps to one immutable [`SensorProfile`] in
//! [`PROFILES`]; adding a variant means adding a table row.

/// Supported Sharp GP2Y optical dust sensors.
///
/// The discriminant is the row index into [`PROFILES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum SensorModel {
    Gp2y1010au0f = 0,
    Gp2y1014au0f = 1,
}

/// A datasheet min / typical / max triple.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f32,
    pub typ: f32,
    pub max: f32,
}

impl Range {
    #[inline]
    pub fn contains(&self, v: f32) -> bool {
        v >= self.min && v <= self.max
    }
}

/// Output voltage with no dust present, plus the sensitivity spread
/// (volts per 100 µg/m³).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorProfile {
    pub model: SensorModel,
    pub zero_dust_v: Range,
    pub sensitivity: Range,
}

impl SensorProfile {
    #[inline]
    pub fn min_zero_voltage(&self) -> f32 {
        self.zero_dust_v.min
    }
    #[inline]
    pub fn typ_zero_voltage(&self) -> f32 {
        self.zero_dust_v.typ
    }
    #[inline]
    pub fn max_zero_voltage(&self) -> f32 {
        self.zero_dust_v.max
    }
}

pub static PROFILES: [SensorProfile; 2] = [
    SensorProfile {
        model: SensorModel::Gp2y1010au0f,
        zero_dust_v: Range {
            min: 0.0,
            typ: 0.9,
            max: 1.5,
        },
        sensitivity: Range {
            min: 0.425,
            typ: 0.5,
            max: 0.75,
        },
    },
    SensorProfile {
        model: SensorModel::Gp2y1014au0f,
        zero_dust_v: Range {
            min: 0.1,
            typ: 0.6,
            max: 1.1,
        },
        sensitivity: Range {
            min: 0.35,
            typ: 0.5,
            max: 0.65,
        },
    },
];

impl SensorModel {
    pub const ALL: [SensorModel; 2] = [SensorModel::Gp2y1010au0f, SensorModel::Gp2y1014au0f];

    /// Datasheet constants for this variant.
    pub fn profile(self) -> &'static SensorProfile {
        &PROFILES[self as usize]
    }

    pub fn name(self) -> &'static str {
        match self {
            SensorModel::Gp2y1010au0f => "GP2Y1010AU0F",
            SensorModel::Gp2y1014au0f => "GP2Y1014AU0F",
        }
    }
}

impl core::fmt::Display for SensorModel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
