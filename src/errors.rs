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

use crate::io::ConfigError;
use crate::time::{Duration, Epoch};
use anise::errors::AlmanacError;
use snafu::prelude::*;

/// Invalid geometric input. These are never retried and are surfaced immediately.
#[derive(Clone, Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum GeometryError {
    #[snafu(display("cannot normalize a vector of norm {norm:e} when {action}"))]
    ZeroNorm { action: &'static str, norm: f64 },
    #[snafu(display("arccosine argument {value} is outside of [-1, 1] when {action}"))]
    AcosDomain { action: &'static str, value: f64 },
    #[snafu(display(
        "degenerate orbit state: position and velocity are collinear (|r x v| = {cross_norm:e})"
    ))]
    DegenerateOrbit { cross_norm: f64 },
    #[snafu(display("non finite value encountered when {action}"))]
    NonFinite { action: &'static str },
}

/// Errors raised by an ephemeris provider, propagated unchanged by the planning core.
#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum EphemerisError {
    #[snafu(display("almanac query failed when {action}: {source}"))]
    AlmanacQuery {
        action: &'static str,
        #[snafu(source(from(AlmanacError, Box::new)))]
        source: Box<AlmanacError>,
    },
    #[snafu(display("{body} is not available at {epoch}"))]
    BodyUnavailable { body: String, epoch: Epoch },
}

#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SearchError {
    #[snafu(display("search interval is empty: {start} is not before {end}"))]
    EmptyInterval { start: Epoch, end: Epoch },
    #[snafu(display("search step must be strictly positive, got {step}"))]
    InvalidStep { step: Duration },
    #[snafu(display("search cancelled at {epoch} after {samples} samples"))]
    Cancelled { epoch: Epoch, samples: u64 },
    #[snafu(display("ephemeris error during search at {epoch}: {source}"))]
    SearchEphemeris {
        epoch: Epoch,
        source: EphemerisError,
    },
    #[snafu(display("geometry error during search at {epoch}: {source}"))]
    SearchGeometry {
        epoch: Epoch,
        source: GeometryError,
    },
}

#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum PlannerError {
    #[snafu(display("invalid planner configuration: {source}"))]
    PlannerConfig { source: ConfigError },
    #[snafu(display("at least one capture interval is required, got {intervals}"))]
    IntervalCount { intervals: usize },
    #[snafu(display("planning horizon is empty: {start} is not before {end}"))]
    EmptyHorizon { start: Epoch, end: Epoch },
    #[snafu(display("capture window #{window} ({start} to {end}) failed: {source}"))]
    WindowSearch {
        window: usize,
        start: Epoch,
        end: Epoch,
        source: SearchError,
    },
}
