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

use super::{EphemerisProvider, StateVector};
use crate::errors::{AlmanacQuerySnafu, EphemerisError};
use crate::linalg::Vector3;
use crate::time::Epoch;
use anise::almanac::Almanac;
use anise::astro::Aberration;
use anise::prelude::Frame;
use snafu::ResultExt;
use std::fmt;
use std::sync::Arc;

/// Ephemeris provider backed by an ANISE [`Almanac`].
///
/// The almanac is loaded once by the caller (planetary SPK, satellite SPK exported by an
/// orbit determination or TLE tool, etc.) and shared by reference counting across every
/// computation. Bodies are identified by their ANISE frames.
#[derive(Clone)]
pub struct AlmanacProvider {
    pub almanac: Arc<Almanac>,
    /// Frame in which `state_at` expresses states, e.g. EME2000 for an Earth orbiter.
    pub center: Frame,
    /// Aberration correction applied to observer relative positions, `None` for geometric positions.
    pub ab_corr: Option<Aberration>,
}

impl AlmanacProvider {
    /// Builds a provider returning geometric states and positions.
    pub fn new(almanac: Arc<Almanac>, center: Frame) -> Self {
        Self {
            almanac,
            center,
            ab_corr: None,
        }
    }

    /// Apply the provided aberration correction to observed positions, e.g. light time as for an astrometric observation.
    pub fn with_aberration(mut self, ab_corr: Option<Aberration>) -> Self {
        self.ab_corr = ab_corr;
        self
    }
}

impl fmt::Display for AlmanacProvider {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "almanac provider centered on {}", self.center)?;
        if let Some(ab_corr) = &self.ab_corr {
            write!(f, " with {ab_corr:?}")?;
        }
        Ok(())
    }
}

impl EphemerisProvider for AlmanacProvider {
    type Body = Frame;

    fn state_at(&self, body: Frame, epoch: Epoch) -> Result<StateVector, EphemerisError> {
        let state = self
            .almanac
            .transform(body, self.center, epoch, None)
            .context(AlmanacQuerySnafu {
                action: "computing the state of a body",
            })?;

        Ok(StateVector::new(
            epoch,
            state.radius_km,
            state.velocity_km_s,
        ))
    }

    fn position_at(
        &self,
        body: Frame,
        epoch: Epoch,
        observer: Frame,
    ) -> Result<Vector3<f64>, EphemerisError> {
        let state = self
            .almanac
            .transform(body, observer, epoch, self.ab_corr)
            .context(AlmanacQuerySnafu {
                action: "observing a body",
            })?;

        Ok(state.radius_km)
    }
}
