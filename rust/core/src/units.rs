// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Length units and conversion to canonical meters.
//!
//! All geometry inside the engine is expressed in meters; blueprint
//! coordinates arrive in an arbitrary declared unit and are rescaled once
//! by the unit normalizer.

use serde::{Deserialize, Serialize};

/// Length unit declared by blueprint metadata.
///
/// Closed enum with an explicit `Unknown` case so exhaustive handling is
/// checkable; unknown units are treated as already-metric (factor 1.0) and
/// reported as incomplete metadata by the normalizer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum LengthUnit {
    Millimeters,
    Centimeters,
    #[default]
    Meters,
    Inches,
    Feet,
    Unknown,
}

impl LengthUnit {
    /// Multiplier converting one unit to meters.
    #[inline]
    pub fn meters_per_unit(&self) -> f64 {
        match self {
            LengthUnit::Millimeters => 1e-3,
            LengthUnit::Centimeters => 1e-2,
            LengthUnit::Meters => 1.0,
            LengthUnit::Inches => 0.0254,
            LengthUnit::Feet => 0.3048,
            LengthUnit::Unknown => 1.0, // Unknown = assume base meters
        }
    }

    /// Returns the unit name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            LengthUnit::Millimeters => "mm",
            LengthUnit::Centimeters => "cm",
            LengthUnit::Meters => "m",
            LengthUnit::Inches => "in",
            LengthUnit::Feet => "ft",
            LengthUnit::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_unit_multipliers() {
        assert_relative_eq!(LengthUnit::Millimeters.meters_per_unit(), 0.001);
        assert_relative_eq!(LengthUnit::Centimeters.meters_per_unit(), 0.01);
        assert_relative_eq!(LengthUnit::Meters.meters_per_unit(), 1.0);
        assert_relative_eq!(LengthUnit::Unknown.meters_per_unit(), 1.0);
        assert_relative_eq!(LengthUnit::Feet.meters_per_unit(), 0.3048);
        assert_relative_eq!(LengthUnit::Inches.meters_per_unit(), 0.0254);
    }

    #[test]
    fn test_default_is_meters() {
        assert_eq!(LengthUnit::default(), LengthUnit::Meters);
    }
}
