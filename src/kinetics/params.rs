//! Validated configuration for kinetic events.
//!
//! Every constructor checks its domain and returns a typed error instead
//! of silently ignoring an out-of-range value; the control-file loader
//! surfaces these to the user. Fields are private so a validated value
//! can never be mutated out of its domain afterwards.

use std::f32::consts::FRAC_PI_2;

use thiserror::Error;

use crate::config::control::{ControlError, TokenCursor};

/// Domain violation in a configuration value
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("search duration must be at least one step")]
    ZeroDuration,
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f32 },
    #[error("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: f32 },
    #[error("{name} must be finite, got {value}")]
    NotFinite { name: &'static str, value: f32 },
    #[error("cone half-angle must lie in [0, pi/2] radians, got {0}")]
    HalfAngleOutOfRange(f32),
    #[error("grid needs at least one cell per axis")]
    EmptyGrid,
    #[error("periodic axis {axis} needs at least 3 cells for exact-once pair wrapping")]
    PeriodicAxisTooSmall { axis: usize },
    #[error("repulsion cutoff {cutoff} exceeds the cell width {cell_width}")]
    CutoffExceedsCellWidth { cutoff: f32, cell_width: f32 },
}

fn positive(name: &'static str, value: f32) -> Result<f32, ParamError> {
    if !value.is_finite() {
        Err(ParamError::NotFinite { name, value })
    } else if value <= 0.0 {
        Err(ParamError::NonPositive { name, value })
    } else {
        Ok(value)
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<f32, ParamError> {
    if !value.is_finite() {
        Err(ParamError::NotFinite { name, value })
    } else if value < 0.0 {
        Err(ParamError::Negative { name, value })
    } else {
        Ok(value)
    }
}

/// Configuration shared by every binding/nucleation event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BindingParams {
    /// Capture attempt duration (simulation steps)
    duration: u32,
    /// Candidate search radius (length units)
    capture_range: f32,
    /// Final transient-spring constant (energy/length²)
    spring_constant: f32,
    /// Final spring rest length; also the commit separation threshold
    rest_length: f32,
}

impl BindingParams {
    pub fn new(
        duration: u32,
        capture_range: f32,
        spring_constant: f32,
        rest_length: f32,
    ) -> Result<Self, ParamError> {
        if duration == 0 {
            return Err(ParamError::ZeroDuration);
        }
        Ok(Self {
            duration,
            capture_range: positive("capture range", capture_range)?,
            spring_constant: positive("spring constant", spring_constant)?,
            rest_length: non_negative("rest length", rest_length)?,
        })
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn capture_range(&self) -> f32 {
        self.capture_range
    }

    pub fn spring_constant(&self) -> f32 {
        self.spring_constant
    }

    pub fn rest_length(&self) -> f32 {
        self.rest_length
    }

    /// Parse from the token-ordered control-file form:
    /// `<duration> <range> <spring-constant> <rest-length>`
    pub fn from_tokens(cursor: &mut TokenCursor) -> Result<Self, ControlError> {
        let duration = cursor.next_u32("duration")?;
        let capture_range = cursor.next_f32("capture range")?;
        let spring_constant = cursor.next_f32("spring constant")?;
        let rest_length = cursor.next_f32("rest length")?;
        Ok(Self::new(duration, capture_range, spring_constant, rest_length)?)
    }

    /// Serialize back to the whitespace-separated token form
    pub fn to_tokens(&self) -> String {
        format!(
            "{} {} {} {}",
            self.duration, self.capture_range, self.spring_constant, self.rest_length
        )
    }
}

/// Configuration for cone-restricted growth events
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConeParams {
    binding: BindingParams,
    /// Acceptance cone half-angle (radians, in [0, pi/2])
    half_angle: f32,
}

impl ConeParams {
    pub fn new(binding: BindingParams, half_angle: f32) -> Result<Self, ParamError> {
        if !half_angle.is_finite() || !(0.0..=FRAC_PI_2).contains(&half_angle) {
            return Err(ParamError::HalfAngleOutOfRange(half_angle));
        }
        Ok(Self {
            binding,
            half_angle,
        })
    }

    pub fn binding(&self) -> &BindingParams {
        &self.binding
    }

    pub fn half_angle(&self) -> f32 {
        self.half_angle
    }

    pub fn cos_half_angle(&self) -> f32 {
        self.half_angle.cos()
    }

    /// Token form: `<duration> <range> <spring-constant> <rest-length> <half-angle>`
    pub fn from_tokens(cursor: &mut TokenCursor) -> Result<Self, ControlError> {
        let binding = BindingParams::from_tokens(cursor)?;
        let half_angle = cursor.next_f32("cone half-angle")?;
        Ok(Self::new(binding, half_angle)?)
    }

    pub fn to_tokens(&self) -> String {
        format!("{} {}", self.binding.to_tokens(), self.half_angle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_binding_params() {
        let p = BindingParams::new(100, 1.5, 10.0, 1.0).unwrap();
        assert_eq!(p.duration(), 100);
        assert_eq!(p.capture_range(), 1.5);
    }

    #[test]
    fn test_rejects_out_of_domain_values() {
        assert_eq!(
            BindingParams::new(0, 1.5, 10.0, 1.0),
            Err(ParamError::ZeroDuration)
        );
        assert!(matches!(
            BindingParams::new(10, -1.0, 10.0, 1.0),
            Err(ParamError::NonPositive { name: "capture range", .. })
        ));
        assert!(matches!(
            BindingParams::new(10, 1.5, 0.0, 1.0),
            Err(ParamError::NonPositive { name: "spring constant", .. })
        ));
        assert!(matches!(
            BindingParams::new(10, 1.5, 10.0, -0.1),
            Err(ParamError::Negative { name: "rest length", .. })
        ));
        assert!(matches!(
            BindingParams::new(10, f32::NAN, 10.0, 1.0),
            Err(ParamError::NotFinite { .. })
        ));
    }

    #[test]
    fn test_zero_rest_length_is_allowed() {
        assert!(BindingParams::new(10, 1.5, 10.0, 0.0).is_ok());
    }

    #[test]
    fn test_cone_half_angle_domain() {
        let binding = BindingParams::new(10, 1.5, 10.0, 1.0).unwrap();

        assert!(ConeParams::new(binding, 0.0).is_ok());
        assert!(ConeParams::new(binding, FRAC_PI_2).is_ok());
        assert_eq!(
            ConeParams::new(binding, FRAC_PI_2 + 0.01),
            Err(ParamError::HalfAngleOutOfRange(FRAC_PI_2 + 0.01))
        );
        assert!(ConeParams::new(binding, -0.1).is_err());
    }

    #[test]
    fn test_token_round_trip() {
        let p = BindingParams::new(100, 1.5, 10.0, 1.0).unwrap();
        let text = p.to_tokens();
        let mut cursor = TokenCursor::new(&text);
        let parsed = BindingParams::from_tokens(&mut cursor).unwrap();
        assert_eq!(parsed, p);
        assert!(cursor.finish().is_ok());
    }
}
