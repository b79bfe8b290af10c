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

use crate::errors::EphemerisError;
use crate::linalg::Vector3;
use crate::time::Epoch;
use std::fmt;

/// A trait allowing for something to have an epoch
pub trait TimeTagged {
    /// Retrieve the Epoch
    fn epoch(&self) -> Epoch;
}

/// Position and velocity of a moving body at an epoch, in an inertial frame.
/// These are produced by an [`EphemerisProvider`] and are never mutated by the planning core.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StateVector {
    pub epoch: Epoch,
    pub position_km: Vector3<f64>,
    pub velocity_km_s: Vector3<f64>,
}

impl StateVector {
    pub fn new(epoch: Epoch, position_km: Vector3<f64>, velocity_km_s: Vector3<f64>) -> Self {
        Self {
            epoch,
            position_km,
            velocity_km_s,
        }
    }

    /// Distance to the provided position, in kilometers
    pub fn distance_to_km(&self, position_km: &Vector3<f64>) -> f64 {
        (position_km - self.position_km).norm()
    }
}

impl TimeTagged for StateVector {
    fn epoch(&self) -> Epoch {
        self.epoch
    }
}

impl fmt::Display for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[{}] position = [{:.6}, {:.6}, {:.6}] km\tvelocity = [{:.6}, {:.6}, {:.6}] km/s",
            self.epoch,
            self.position_km[0],
            self.position_km[1],
            self.position_km[2],
            self.velocity_km_s[0],
            self.velocity_km_s[1],
            self.velocity_km_s[2]
        )
    }
}

/// The collaboration contract with whatever produces the ephemerides (SPICE kernels, TLE propagators, analytical models).
///
/// Implementations must be deterministic for a given (body, epoch) pair.
pub trait EphemerisProvider: Send + Sync {
    /// Identifier of a body known to this provider
    type Body: Copy + fmt::Display + Send + Sync;

    /// State of the body at the requested epoch, in the inertial frame of this provider.
    fn state_at(&self, body: Self::Body, epoch: Epoch) -> Result<StateVector, EphemerisError>;

    /// Position of the body as seen from the observer at the requested epoch.
    fn position_at(
        &self,
        body: Self::Body,
        epoch: Epoch,
        observer: Self::Body,
    ) -> Result<Vector3<f64>, EphemerisError>;
}

/// Providers are often shared behind a reference or an `Arc`.
impl<P: EphemerisProvider + ?Sized> EphemerisProvider for &P {
    type Body = P::Body;

    fn state_at(&self, body: Self::Body, epoch: Epoch) -> Result<StateVector, EphemerisError> {
        (**self).state_at(body, epoch)
    }

    fn position_at(
        &self,
        body: Self::Body,
        epoch: Epoch,
        observer: Self::Body,
    ) -> Result<Vector3<f64>, EphemerisError> {
        (**self).position_at(body, epoch, observer)
    }
}

mod almanac;
pub use self::almanac::AlmanacProvider;

mod rotations;
pub use self::rotations::*;

mod orbit_frame;
pub use self::orbit_frame::OrbitFrame;

mod pointing;
pub(crate) use self::pointing::observe;
pub use self::pointing::{nadir, Pointing};

/// Sun, observer and target geometry used to qualify a capture.
pub mod illumination;

/// Mean orbital period of the low Earth orbits this planner was tuned for, in minutes.
pub const LEO_PERIOD_MIN: f64 = 95.0;

/// Mean diameter of the Moon, in kilometers.
pub const MOON_DIAMETER_KM: f64 = 3474.0;

/// Apparent angular diameter of the Moon seen from low Earth orbit, in degrees.
pub const MOON_ANGULAR_DIAMETER_DEG: f64 = 0.52;
