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

use super::capture::CaptureEvent;
use super::search::{CancelToken, ExtremalSearchStrategy, SearchSettings, TemporalSearch};
use crate::cosmic::illumination::Illumination;
use crate::cosmic::{observe, EphemerisProvider, Pointing};
use crate::errors::{
    EmptyHorizonSnafu, IntervalCountSnafu, PlannerConfigSnafu, PlannerError, SearchEphemerisSnafu,
    SearchError, WindowSearchSnafu,
};
use crate::io::PlannerConfig;
use crate::time::{Epoch, Unit};
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressIterator, ProgressStyle};
use rayon::prelude::*;
use snafu::{ensure, ResultExt};
use std::fmt;

/// Outcome of the planning of one sub-window of the horizon.
#[derive(Debug, PartialEq)]
pub struct PlannedWindow {
    pub index: usize,
    pub start: Epoch,
    pub end: Epoch,
    pub outcome: Result<CaptureEvent, PlannerError>,
}

impl PlannedWindow {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

impl fmt::Display for PlannedWindow {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.outcome {
            Ok(event) => write!(f, "{event}"),
            Err(e) => write!(f, "window #{} ({} to {}) failed: {e}", self.index, self.start, self.end),
        }
    }
}

/// All of the windows of a plan, in chronological order.
///
/// A window which fails does not prevent the others from being planned: the error is kept in its outcome.
/// Use [`CapturePlan::into_events`] to get all-or-nothing semantics.
#[derive(Debug, PartialEq)]
pub struct CapturePlan {
    pub windows: Vec<PlannedWindow>,
}

impl CapturePlan {
    /// Successfully planned captures, in chronological order
    pub fn events(&self) -> impl Iterator<Item = &CaptureEvent> {
        self.windows.iter().filter_map(|w| w.outcome.as_ref().ok())
    }

    /// Windows which could not be planned
    pub fn failures(&self) -> impl Iterator<Item = &PlannedWindow> {
        self.windows.iter().filter(|w| !w.is_ok())
    }

    pub fn is_complete(&self) -> bool {
        self.windows.iter().all(|w| w.is_ok())
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Returns every capture, or the error of the first window which failed.
    pub fn into_events(self) -> Result<Vec<CaptureEvent>, PlannerError> {
        self.windows.into_iter().map(|w| w.outcome).collect()
    }
}

/// Plans the captures of a target from a satellite over a horizon split in equal sub-windows.
pub struct CapturePlanner<'a, P: EphemerisProvider> {
    provider: &'a P,
    satellite: P::Body,
    target: P::Body,
    observer: P::Body,
    light_source: Option<P::Body>,
    pub config: PlannerConfig,
    cancel: Option<CancelToken>,
}

impl<'a, P: EphemerisProvider> CapturePlanner<'a, P> {
    pub fn new(
        provider: &'a P,
        satellite: P::Body,
        target: P::Body,
        observer: P::Body,
        config: PlannerConfig,
    ) -> Self {
        Self {
            provider,
            satellite,
            target,
            observer,
            light_source: None,
            config,
            cancel: None,
        }
    }

    /// Also compute the phase angle of the target lit by this body (e.g. the Sun) for each capture.
    pub fn with_light_source(mut self, light_source: P::Body) -> Self {
        self.light_source = Some(light_source);
        self
    }

    /// Every search of this planner will check this token before each sample.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Splits `[start, end]` into the configured number of contiguous windows of equal length.
    pub fn windows(&self, start: Epoch, end: Epoch) -> Result<Vec<(usize, Epoch, Epoch)>, PlannerError> {
        let intervals = self.config.intervals;
        ensure!(intervals >= 1, IntervalCountSnafu { intervals });
        ensure!(start < end, EmptyHorizonSnafu { start, end });

        let window_s = (end - start).to_seconds() / intervals as f64;
        Ok((0..intervals)
            .map(|index| {
                let window_start = start + (index as f64 * window_s) * Unit::Second;
                let window_end = if index + 1 == intervals {
                    end
                } else {
                    start + ((index + 1) as f64 * window_s) * Unit::Second
                };
                (index, window_start, window_end)
            })
            .collect())
    }

    /// Plans one capture per window of the horizon. Errors on the configuration or the horizon itself are
    /// returned immediately, errors in a window are recorded in that window of the plan.
    pub fn plan(&self, start: Epoch, end: Epoch) -> Result<CapturePlan, PlannerError> {
        self.config.validate().context(PlannerConfigSnafu)?;
        let windows = self.windows(start, end)?;
        info!(
            "planning {} capture(s) of {} from {} between {start} and {end} using the {}",
            windows.len(),
            self.target,
            self.satellite,
            self.config.strategy
        );

        let pb = self.progress_bar(windows.len());

        let mut planned: Vec<PlannedWindow> = if self.config.parallel {
            windows
                .par_iter()
                .progress_with(pb)
                .map(|&(index, start, end)| self.plan_window(index, start, end))
                .collect()
        } else {
            windows
                .iter()
                .progress_with(pb)
                .map(|&(index, start, end)| self.plan_window(index, start, end))
                .collect()
        };
        planned.par_sort_by_key(|w| w.index);

        let plan = CapturePlan { windows: planned };
        for window in &plan.windows {
            match &window.outcome {
                Ok(event) => info!("{event}"),
                Err(e) => warn!("{e}"),
            }
        }
        if !plan.is_complete() {
            warn!(
                "{} of {} window(s) could not be planned",
                plan.failures().count(),
                plan.len()
            );
        }

        Ok(plan)
    }

    /// Plans a single capture over the whole horizon, regardless of the configured number of intervals.
    pub fn plan_single(&self, start: Epoch, end: Epoch) -> Result<CaptureEvent, PlannerError> {
        self.config.validate().context(PlannerConfigSnafu)?;
        ensure!(start < end, EmptyHorizonSnafu { start, end });
        let event = self.plan_window(0, start, end).outcome?;
        info!("{event}");
        Ok(event)
    }

    fn plan_window(&self, index: usize, start: Epoch, end: Epoch) -> PlannedWindow {
        PlannedWindow {
            index,
            start,
            end,
            outcome: self
                .capture_in(index, start, end)
                .context(WindowSearchSnafu {
                    window: index,
                    start,
                    end,
                }),
        }
    }

    fn capture_in(&self, index: usize, start: Epoch, end: Epoch) -> Result<CaptureEvent, SearchError> {
        let settings = match &self.cancel {
            Some(cancel) => SearchSettings::builder()
                .step(self.config.search_step())
                .cancel(cancel.clone())
                .build(),
            None => SearchSettings::builder()
                .step(self.config.search_step())
                .build(),
        };

        let search = TemporalSearch::new(
            self.provider,
            self.satellite,
            self.target,
            self.observer,
            settings,
        );
        let extremum = search.find(self.config.strategy, start, end)?;

        // The quaternion is always computed at the selected instant.
        let pointing = Pointing::at(
            self.provider,
            self.satellite,
            self.target,
            self.observer,
            extremum.epoch,
        )?;
        if pointing.degenerate {
            debug!(
                "{} is aligned with the nadir axis at {}: attitude uses the fallback slew axis",
                self.target, extremum.epoch
            );
        }

        let distance_km = match self.config.strategy {
            ExtremalSearchStrategy::MinimizeDistance => extremum.value,
            ExtremalSearchStrategy::MaximizeOffNadirAngle => {
                let epoch = extremum.epoch;
                let (sat_state, target_position) = observe(
                    self.provider,
                    self.satellite,
                    self.target,
                    self.observer,
                    epoch,
                )
                .context(SearchEphemerisSnafu { epoch })?;
                sat_state.distance_to_km(&target_position)
            }
        };

        let mut event = CaptureEvent::new(index, &pointing, distance_km, &self.config.capture);
        if let Some(light_source) = self.light_source {
            let illumination = Illumination::at(
                self.provider,
                light_source,
                self.target,
                self.observer,
                extremum.epoch,
            )?;
            debug!("{illumination}");
            event.phase_angle_deg = Some(illumination.phase_angle_deg());
        }

        Ok(event)
    }

    fn progress_bar(&self, num_windows: usize) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(num_windows as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "[{elapsed_precise}] {bar:40.cyan/blue} {pos:>4}/{len:4} windows {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
        );
        pb
    }
}
