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

/// Sweeps an interval for the instant of extremal geometry
pub mod search;
pub use search::{CancelToken, ExtremalSearchStrategy, Extremum, SearchSettings, TemporalSearch};

pub mod capture;
pub use capture::{CaptureConfig, CaptureEvent, CaptureTiming};

/// Splits a horizon in windows and plans one capture per window
pub mod planner;
pub use planner::{CapturePlan, CapturePlanner, PlannedWindow};
