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

/*! # satnav

Capture planning for an imaging satellite: finds when a celestial target (e.g. the Moon) should be shot
within a search horizon, computes the attitude quaternion which points the nadir looking camera at it,
and derives the exposure timing (frame count and frame rate) from that geometry.

Ephemerides are consumed through the [`cosmic::EphemerisProvider`] trait, and an implementation backed by
an ANISE almanac is provided.
*/

/// Provides the reference frames, pointing geometry and ephemeris contract.
pub mod cosmic;

/// Utility functions shared by different modules.
pub mod utils;

mod errors;
/// Functions which may fail return one of these errors, NaN is never used as a sentinel.
pub use self::errors::{EphemerisError, GeometryError, PlannerError, SearchError};

/// Configuration files and plan exports.
pub mod io;

/// Searching for capture opportunities and planning the captures.
pub mod md;

#[macro_use]
extern crate log;
extern crate hifitime;
extern crate nalgebra as na;

/// Re-export of hifitime
pub mod time {
    pub use hifitime::*;
}

/// Re-export nalgebra
pub mod linalg {
    pub use na::base::*;
    pub use na::geometry::{Quaternion, Rotation3, UnitQuaternion};
}

/// Re-export some useful things
pub use self::cosmic::{
    AttitudeQuaternion, EphemerisProvider, OrbitFrame, Pointing, StateVector, TimeTagged,
};
pub use self::md::{CaptureEvent, CapturePlan, CapturePlanner};
