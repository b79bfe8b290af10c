/*
    satnav, capture planning for imaging satellites
    Copyright (C) 2018-onwards Christopher Rabotin <christopher.rabotin@gmail.com>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use crate::cosmic::{
    AttitudeQuaternion, Pointing, TimeTagged, LEO_PERIOD_MIN, MOON_ANGULAR_DIAMETER_DEG,
    MOON_DIAMETER_KM,
};
use crate::io::{ConfigError, InvalidConfigSnafu};
use crate::time::{Duration, Epoch, Unit};
use serde::{Deserialize, Serialize};
use snafu::ensure;
use std::fmt;
use typed_builder::TypedBuilder;

/// Lowest frame rate of the camera, in frames per second.
pub const MIN_FPS: f64 = 1.0;

/// Camera and orbit parameters used to turn an off-nadir angle into an exposure plan.
///
/// The defaults describe a capture of the Moon from a low Earth orbit.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize, TypedBuilder)]
#[serde(default)]
#[builder(doc)]
pub struct CaptureConfig {
    /// Orbital period of the satellite, in minutes
    #[builder(default = LEO_PERIOD_MIN)]
    pub orbital_period_min: f64,
    /// Orbital speed of the satellite, in km/s
    #[builder(default = 7.6)]
    pub satellite_speed_km_s: f64,
    #[builder(default = MOON_DIAMETER_KM)]
    pub target_diameter_km: f64,
    /// Angular field of view the target sweeps through, in degrees
    #[builder(default = MOON_ANGULAR_DIAMETER_DEG)]
    pub target_angular_fov_deg: f64,
    /// Number of frames wanted over one crossing of the target
    #[builder(default = 106)]
    pub target_frame_count: u32,
    #[builder(default = 20.0)]
    pub max_fps: f64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl CaptureConfig {
    pub fn orbital_period_s(&self) -> f64 {
        self.orbital_period_min * 60.0
    }

    /// Checks that every parameter is finite and strictly positive, and that the maximum frame rate is at least one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("orbital_period_min", self.orbital_period_min),
            ("satellite_speed_km_s", self.satellite_speed_km_s),
            ("target_diameter_km", self.target_diameter_km),
            ("target_angular_fov_deg", self.target_angular_fov_deg),
        ] {
            ensure!(
                value.is_finite() && value > 0.0,
                InvalidConfigSnafu {
                    msg: format!("{name} must be finite and positive, got {value}")
                }
            );
        }
        ensure!(
            self.target_frame_count > 0,
            InvalidConfigSnafu {
                msg: "target_frame_count must be at least one".to_string()
            }
        );
        ensure!(
            self.max_fps.is_finite() && self.max_fps >= MIN_FPS,
            InvalidConfigSnafu {
                msg: format!("max_fps must be at least {MIN_FPS}, got {}", self.max_fps)
            }
        );
        Ok(())
    }

    /// Apparent rotation rate of the target in the camera field, caused by the spacecraft following its orbit
    /// while holding the target, in deg/s. It is largest (in magnitude) when the target is at nadir or zenith.
    pub fn extra_rotation_rate_deg_s(&self, off_nadir_angle_deg: f64) -> f64 {
        (360.0 / self.orbital_period_s()) * -off_nadir_angle_deg.to_radians().cos()
    }

    /// Computes the exposure timing for a capture at the provided off-nadir angle.
    pub fn timing(&self, off_nadir_angle_deg: f64) -> CaptureTiming {
        CaptureTiming::from_off_nadir(off_nadir_angle_deg, self)
    }
}

/// Exposure plan for a single crossing of the target through the field of view.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CaptureTiming {
    pub total_capture_time: Duration,
    pub frames_per_second: f64,
    pub frame_count: u32,
}

impl CaptureTiming {
    pub fn from_off_nadir(off_nadir_angle_deg: f64, config: &CaptureConfig) -> Self {
        let linear_rate = config.satellite_speed_km_s / config.target_diameter_km;
        let angular_rate =
            config.extra_rotation_rate_deg_s(off_nadir_angle_deg) / config.target_angular_fov_deg;
        let total_s = 1.0 / linear_rate.hypot(angular_rate);

        // Never panics, even for a maximum below MIN_FPS.
        let frames_per_second = (f64::from(config.target_frame_count) / total_s)
            .min(config.max_fps)
            .max(MIN_FPS);
        let frame_count = ((total_s * frames_per_second).round() as u32).max(1);

        Self {
            total_capture_time: total_s * Unit::Second,
            frames_per_second,
            frame_count,
        }
    }
}

impl fmt::Display for CaptureTiming {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} frames at {:.3} fps over {}",
            self.frame_count, self.frames_per_second, self.total_capture_time
        )
    }
}

/// One planned capture of the target.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CaptureEvent {
    /// Index of the sub-window this capture was planned in, starting at zero
    pub window: usize,
    /// Instant of the extremal geometry, i.e. the middle of the capture
    pub epoch: Epoch,
    /// Orbit-from-body attitude quaternion, scalar first
    pub quaternion: AttitudeQuaternion,
    pub off_nadir_angle_deg: f64,
    pub frame_count: u32,
    pub frames_per_second: f64,
    pub total_capture_time: Duration,
    /// Satellite to target distance at the capture epoch, in kilometers
    pub distance_km: f64,
    /// Set when the slew axis was undefined and the attitude uses the fallback axis
    pub degenerate_attitude: bool,
    /// Light source, target, observer angle, if a light source was configured
    pub phase_angle_deg: Option<f64>,
}

impl CaptureEvent {
    /// Builds a capture event from the pointing at the extremal instant.
    pub fn new(
        window: usize,
        pointing: &Pointing,
        distance_km: f64,
        config: &CaptureConfig,
    ) -> Self {
        let timing = config.timing(pointing.off_nadir_angle_deg);
        Self {
            window,
            epoch: pointing.epoch,
            quaternion: pointing.quaternion,
            off_nadir_angle_deg: pointing.off_nadir_angle_deg,
            frame_count: timing.frame_count,
            frames_per_second: timing.frames_per_second,
            total_capture_time: timing.total_capture_time,
            distance_km,
            degenerate_attitude: pointing.degenerate,
            phase_angle_deg: None,
        }
    }

    /// Epoch at which the camera should start shooting so that the capture is centered on the extremum.
    pub fn capture_start(&self) -> Epoch {
        self.epoch - (self.total_capture_time.to_seconds() / 2.0) * Unit::Second
    }

    pub fn timing(&self) -> CaptureTiming {
        CaptureTiming {
            total_capture_time: self.total_capture_time,
            frames_per_second: self.frames_per_second,
            frame_count: self.frame_count,
        }
    }
}

impl TimeTagged for CaptureEvent {
    fn epoch(&self) -> Epoch {
        self.epoch
    }
}

impl fmt::Display for CaptureEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "capture #{} at {}: off-nadir angle = {:.6} deg\t{}\t{}",
            self.window,
            self.epoch,
            self.off_nadir_angle_deg,
            self.quaternion,
            self.timing()
        )?;
        if let Some(phase) = self.phase_angle_deg {
            write!(f, "\tphase angle = {phase:.3} deg")?;
        }
        Ok(())
    }
}
