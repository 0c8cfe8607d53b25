use std::f32::consts::{PI, TAU};

/// Polar angles closer than this to the poles are nudged away so the
/// view basis never degenerates.
const POLE_EPSILON: f32 = 1e-6;

/// Angular bounds an orbit control clamps its pose to, in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitLimits {
    pub min_azimuth: f32,
    pub max_azimuth: f32,
    pub min_polar: f32,
    pub max_polar: f32,
}

impl OrbitLimits {
    /// Fully open range: any azimuth, pole to pole.
    pub const UNRESTRICTED: Self = Self {
        min_azimuth: f32::NEG_INFINITY,
        max_azimuth: f32::INFINITY,
        min_polar: 0.0,
        max_polar: PI,
    };

    pub fn is_unrestricted(&self) -> bool {
        *self == Self::UNRESTRICTED
    }

    /// Collapses the polar range onto a single angle.
    pub fn pin_polar(&mut self, angle: f32) {
        self.min_polar = angle;
        self.max_polar = angle;
    }

    /// Azimuth is only bounded when both limits are finite. Limits outside
    /// [-π, π] are wrapped, and an inverted range (min > max) keeps the
    /// angle on whichever side of the gap it is closest to.
    pub fn clamp_azimuth(&self, azimuth: f32) -> f32 {
        let (mut min, mut max) = (self.min_azimuth, self.max_azimuth);
        if !(min.is_finite() && max.is_finite()) {
            return azimuth;
        }

        if min < -PI {
            min += TAU;
        } else if min > PI {
            min -= TAU;
        }
        if max < -PI {
            max += TAU;
        } else if max > PI {
            max -= TAU;
        }

        if min <= max {
            azimuth.clamp(min, max)
        } else if azimuth > (min + max) / 2.0 {
            azimuth.max(min)
        } else {
            azimuth.min(max)
        }
    }

    pub fn clamp_polar(&self, polar: f32) -> f32 {
        let clamped = polar.max(self.min_polar).min(self.max_polar);
        clamped.clamp(POLE_EPSILON, PI - POLE_EPSILON)
    }
}

impl Default for OrbitLimits {
    fn default() -> Self {
        Self::UNRESTRICTED
    }
}

/// The slice of an orbit control the idle reset needs: the current polar
/// angle and write access to the four bound fields.
pub trait OrbitConstraints {
    fn polar_angle(&self) -> f32;
    fn limits_mut(&mut self) -> &mut OrbitLimits;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn unrestricted_leaves_azimuth_alone() {
        let limits = OrbitLimits::UNRESTRICTED;
        assert_eq!(limits.clamp_azimuth(42.0), 42.0);
        assert_eq!(limits.clamp_azimuth(-1000.0), -1000.0);
    }

    #[test]
    fn finite_azimuth_range_clamps() {
        let limits = OrbitLimits {
            min_azimuth: -0.5,
            max_azimuth: 0.5,
            ..OrbitLimits::UNRESTRICTED
        };
        assert_eq!(limits.clamp_azimuth(1.0), 0.5);
        assert_eq!(limits.clamp_azimuth(-1.0), -0.5);
        assert_eq!(limits.clamp_azimuth(0.2), 0.2);
    }

    #[test]
    fn wrapped_azimuth_range_picks_nearest_edge() {
        // 3π/4 ..= -3π/4 through the back of the sphere.
        let limits = OrbitLimits {
            min_azimuth: 3.0 * PI / 4.0,
            max_azimuth: -3.0 * PI / 4.0,
            ..OrbitLimits::UNRESTRICTED
        };
        assert_relative_eq!(limits.clamp_azimuth(0.1), 3.0 * PI / 4.0);
        assert_relative_eq!(limits.clamp_azimuth(-0.1), -3.0 * PI / 4.0);
    }

    #[test]
    fn pinned_polar_forces_single_angle() {
        let mut limits = OrbitLimits::UNRESTRICTED;
        limits.pin_polar(1.2);
        assert_eq!(limits.clamp_polar(0.1), 1.2);
        assert_eq!(limits.clamp_polar(3.0), 1.2);
        assert!(!limits.is_unrestricted());
    }

    #[test]
    fn poles_are_avoided() {
        let limits = OrbitLimits::UNRESTRICTED;
        assert!(limits.clamp_polar(0.0) > 0.0);
        assert!(limits.clamp_polar(PI) < PI);
        assert_eq!(limits.clamp_polar(FRAC_PI_2), FRAC_PI_2);
    }
}
