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

use super::EphemerisProvider;
use crate::errors::{GeometryError, SearchEphemerisSnafu, SearchError, SearchGeometrySnafu};
use crate::linalg::Vector3;
use crate::time::Epoch;
use crate::utils::angle_between_deg;
use snafu::ResultExt;
use std::fmt;

/// Lighting geometry of a target seen by an observer.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Illumination {
    pub epoch: Epoch,
    /// Angle at the observer between the light source and the target, in degrees.
    /// For the Sun, Earth and Moon this is 180 degrees at full moon and 0 at new moon.
    pub elongation_deg: f64,
    /// Light source to target distance, in kilometers
    pub source_distance_km: f64,
    /// Observer to target distance, in kilometers
    pub observer_distance_km: f64,
}

impl Illumination {
    /// Computes the lighting geometry from positions expressed in the same frame.
    pub fn from_positions(
        epoch: Epoch,
        light_source_km: &Vector3<f64>,
        observer_km: &Vector3<f64>,
        target_km: &Vector3<f64>,
    ) -> Result<Self, GeometryError> {
        let to_source = light_source_km - observer_km;
        let to_target = target_km - observer_km;
        Ok(Self {
            epoch,
            elongation_deg: angle_between_deg(&to_source, &to_target)?,
            source_distance_km: (target_km - light_source_km).norm(),
            observer_distance_km: to_target.norm(),
        })
    }

    /// Queries the provider for the light source and target positions relative to the observer.
    pub fn at<P: EphemerisProvider>(
        provider: &P,
        light_source: P::Body,
        target: P::Body,
        observer: P::Body,
        epoch: Epoch,
    ) -> Result<Self, SearchError> {
        let source_km = provider
            .position_at(light_source, epoch, observer)
            .context(SearchEphemerisSnafu { epoch })?;
        let target_km = provider
            .position_at(target, epoch, observer)
            .context(SearchEphemerisSnafu { epoch })?;

        Self::from_positions(epoch, &source_km, &Vector3::zeros(), &target_km)
            .context(SearchGeometrySnafu { epoch })
    }

    /// Phase angle, i.e. the light source, target, observer angle, approximated as the supplement
    /// of the elongation. It is 0 degrees when the target is fully lit.
    pub fn phase_angle_deg(&self) -> f64 {
        180.0 - self.elongation_deg
    }

    /// Fraction of the visible disk which is lit, between 0 and 1.
    pub fn illuminated_fraction(&self) -> f64 {
        (1.0 + self.phase_angle_deg().to_radians().cos()) / 2.0
    }
}

impl fmt::Display for Illumination {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[{}] phase angle = {:.3} deg ({:.1} % lit)\tsource distance = {:.0} km\tobserver distance = {:.0} km",
            self.epoch,
            self.phase_angle_deg(),
            self.illuminated_fraction() * 100.0,
            self.source_distance_km,
            self.observer_distance_km
        )
    }
}
