//! Built-in initial body sets

use std::fmt;
use std::str::FromStr;

use gravity_physics::*;

use crate::error::SimulationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scenario {
    /// Sun, Earth and Moon on the x axis
    #[default]
    SolarSystem,
    /// Three equal-mass stars
    ThreeStars,
}

impl Scenario {
    pub const ALL: [Scenario; 2] = [Scenario::SolarSystem, Scenario::ThreeStars];

    pub fn name(self) -> &'static str {
        match self {
            Scenario::SolarSystem => "solar-system",
            Scenario::ThreeStars => "three-stars",
        }
    }

    pub fn bodies(self) -> Result<Vec<Body>, BodyError> {
        match self {
            Scenario::SolarSystem => Ok(vec![
                Body::planar("Sun", BodyKind::Star, [0.0, 0.0], [0.0, 0.0], SUN_MASS, SUN_RADIUS)?,
                Body::planar(
                    "Earth",
                    BodyKind::Planet,
                    [EARTH_ORBIT_RADIUS, 0.0],
                    [0.0, EARTH_ORBIT_SPEED],
                    EARTH_MASS,
                    EARTH_RADIUS,
                )?,
                Body::planar(
                    "Moon",
                    BodyKind::Moon,
                    [EARTH_ORBIT_RADIUS + MOON_ORBIT_RADIUS, 0.0],
                    [0.0, MOON_ORBIT_SPEED],
                    MOON_MASS,
                    MOON_RADIUS,
                )?,
            ]),
            Scenario::ThreeStars => Ok(vec![
                Body::planar("StarA", BodyKind::Star, [-5.0e10, 0.0], [0.0, 15_000.0], STAR_MASS, 7.0e8)?,
                Body::planar("StarB", BodyKind::Star, [5.0e10, 0.0], [0.0, -15_000.0], STAR_MASS, 7.0e8)?,
                Body::planar("StarC", BodyKind::Star, [0.0, 5.0e10], [-7_500.0, 0.0], STAR_MASS, 7.0e7)?,
            ]),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scenario::ALL
            .into_iter()
            .find(|scenario| scenario.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| SimulationError::UnknownName {
                kind: "scenario",
                value: s.to_string(),
            })
    }
}
