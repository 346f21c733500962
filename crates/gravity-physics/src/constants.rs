//! Physical constants and reference bodies
//!
//! All quantities are SI: metres, kilograms, seconds.

/// Newtonian gravitational constant (m³ kg⁻¹ s⁻²)
pub const G: f64 = 6.67430e-11;

/// Pairs closer than this (metres) exert no force on each other
pub const SINGULARITY_EPSILON: f64 = 1.0e-5;

pub const SUN_MASS: f64 = 1.99e30;
pub const SUN_RADIUS: f64 = 6.96e8;

pub const EARTH_MASS: f64 = 5.97e24;
pub const EARTH_RADIUS: f64 = 6.37e6;
/// Mean Sun-Earth distance
pub const EARTH_ORBIT_RADIUS: f64 = 1.5e11;
/// Mean orbital speed of the Earth around the Sun
pub const EARTH_ORBIT_SPEED: f64 = 29_780.0;

pub const MOON_MASS: f64 = 7.35e22;
pub const MOON_RADIUS: f64 = 1.74e6;
/// Mean Earth-Moon distance
pub const MOON_ORBIT_RADIUS: f64 = 3.844e8;
/// Heliocentric speed of the Moon (Earth orbit speed plus lunar orbit speed)
pub const MOON_ORBIT_SPEED: f64 = 30_802.0;

/// Mass of each star in the three-star scenario (roughly one solar mass)
pub const STAR_MASS: f64 = 2.0e30;
