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

use crate::cosmic::{observe, EphemerisProvider, Pointing};
use crate::errors::{
    CancelledSnafu, EmptyIntervalSnafu, GeometryError, InvalidStepSnafu, SearchEphemerisSnafu,
    SearchError,
};
use crate::time::{Duration, Epoch, TimeSeries, Unit};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use snafu::{ensure, ResultExt};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration as StdDuration, Instant as StdInstant};
use typed_builder::TypedBuilder;

/// Which extremum of the geometry the search looks for.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExtremalSearchStrategy {
    /// Instant of minimum distance between the satellite and the target
    MinimizeDistance,
    /// Instant of maximum off-nadir angle of the target, i.e. the largest swing of the boresight
    #[default]
    MaximizeOffNadirAngle,
}

impl ExtremalSearchStrategy {
    /// Returns whether the candidate value strictly improves on the current best, such that the first sample wins ties.
    pub fn improves(&self, candidate: f64, best: f64) -> bool {
        match self {
            Self::MinimizeDistance => candidate < best,
            Self::MaximizeOffNadirAngle => candidate > best,
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Self::MinimizeDistance => "km",
            Self::MaximizeOffNadirAngle => "deg",
        }
    }
}

impl fmt::Display for ExtremalSearchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::MinimizeDistance => write!(f, "minimum distance"),
            Self::MaximizeOffNadirAngle => write!(f, "maximum off-nadir angle"),
        }
    }
}

/// Cooperative cancellation hook, checked before every sample of a search.
///
/// Clones share the same flag, so a token handed to a planner may be cancelled from another thread.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<StdInstant>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// A token which also cancels once the timeout has elapsed, starting now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            deadline: Some(StdInstant::now() + StdDuration::from_secs_f64(timeout.to_seconds().max(0.0))),
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
            || self
                .deadline
                .map(|deadline| StdInstant::now() >= deadline)
                .unwrap_or(false)
    }
}

/// Settings of a temporal search.
#[derive(Clone, Debug, TypedBuilder)]
#[builder(doc)]
pub struct SearchSettings {
    /// Time between two samples. This is the resolution of the search: a coarse step may skip the true extremum.
    #[builder(default = Unit::Minute * 1)]
    pub step: Duration,
    /// Show a progress bar of the sweep (for interactive use)
    #[builder(default)]
    pub show_progress: bool,
    #[builder(default, setter(strip_option))]
    pub cancel: Option<CancelToken>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Extremal value found by a search and when it happens.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Extremum {
    pub value: f64,
    pub epoch: Epoch,
    /// Number of samples evaluated
    pub samples: u64,
}

/// Exhaustive linear sweep of an interval to find the instant where a geometric quantity is extremal.
///
/// # Limitations
/// This is not a derivative based optimizer: the extremum is only known to the step of the sweep.
/// Occultation of the target by an intervening body (e.g. the Earth) is not checked.
pub struct TemporalSearch<'a, P: EphemerisProvider> {
    provider: &'a P,
    satellite: P::Body,
    target: P::Body,
    observer: P::Body,
    settings: SearchSettings,
}

impl<'a, P: EphemerisProvider> TemporalSearch<'a, P> {
    /// Initializes a new search of the target (as seen by the observer) from the satellite.
    pub fn new(
        provider: &'a P,
        satellite: P::Body,
        target: P::Body,
        observer: P::Body,
        settings: SearchSettings,
    ) -> Self {
        Self {
            provider,
            satellite,
            target,
            observer,
            settings,
        }
    }

    /// Finds the instant of minimum distance between the satellite and the target in `[start, end)`.
    pub fn find_minimum_distance(&self, start: Epoch, end: Epoch) -> Result<Extremum, SearchError> {
        self.find(ExtremalSearchStrategy::MinimizeDistance, start, end)
    }

    /// Finds the instant of maximum off-nadir angle of the target in `[start, end)`.
    pub fn find_maximum_off_nadir_angle(
        &self,
        start: Epoch,
        end: Epoch,
    ) -> Result<Extremum, SearchError> {
        self.find(ExtremalSearchStrategy::MaximizeOffNadirAngle, start, end)
    }

    /// Evaluates the quantity tracked by the strategy at the provided epoch.
    /// A non finite value is an error: it would never compare as an extremum.
    pub fn evaluate(
        &self,
        strategy: ExtremalSearchStrategy,
        epoch: Epoch,
    ) -> Result<f64, SearchError> {
        let value = match strategy {
            ExtremalSearchStrategy::MinimizeDistance => {
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
            ExtremalSearchStrategy::MaximizeOffNadirAngle => {
                Pointing::at(
                    self.provider,
                    self.satellite,
                    self.target,
                    self.observer,
                    epoch,
                )?
                .off_nadir_angle_deg
            }
        };

        if value.is_finite() {
            Ok(value)
        } else {
            Err(SearchError::SearchGeometry {
                epoch,
                source: GeometryError::NonFinite {
                    action: "evaluating the search quantity",
                },
            })
        }
    }

    /// Samples `start + k * step` for every `k` such that the sample is before `end`, and returns the extremum
    /// for the provided strategy. The first sample wins ties.
    pub fn find(
        &self,
        strategy: ExtremalSearchStrategy,
        start: Epoch,
        end: Epoch,
    ) -> Result<Extremum, SearchError> {
        ensure!(start < end, EmptyIntervalSnafu { start, end });
        let step = self.settings.step;
        ensure!(step > Duration::ZERO, InvalidStepSnafu { step });

        debug!(
            "searching for the {strategy} of {} from {} seen by {} between {start} and {end} every {step}",
            self.target, self.satellite, self.observer
        );

        let pb = self.progress_bar(start, end, strategy);

        let mut best: Option<Extremum> = None;
        let mut samples = 0;
        for epoch in TimeSeries::exclusive(start, end, step) {
            if let Some(cancel) = &self.settings.cancel {
                ensure!(!cancel.is_cancelled(), CancelledSnafu { epoch, samples });
            }

            let value = self.evaluate(strategy, epoch)?;
            samples += 1;
            pb.inc(1);

            best = match best {
                Some(current) if !strategy.improves(value, current.value) => Some(current),
                _ => Some(Extremum {
                    value,
                    epoch,
                    samples,
                }),
            };
        }
        pb.finish_and_clear();

        // A non empty interval always yields the sample at its start.
        let mut extremum = match best {
            Some(extremum) => extremum,
            None => return EmptyIntervalSnafu { start, end }.fail(),
        };
        extremum.samples = samples;

        debug!(
            "{strategy} of {:.6} {} found at {} after {samples} samples",
            extremum.value,
            strategy.unit(),
            extremum.epoch
        );

        Ok(extremum)
    }

    fn progress_bar(&self, start: Epoch, end: Epoch, strategy: ExtremalSearchStrategy) -> ProgressBar {
        if !self.settings.show_progress {
            return ProgressBar::hidden();
        }
        let num_samples = ((end - start).to_seconds() / self.settings.step.to_seconds()).ceil();
        let pb = ProgressBar::new(num_samples as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "[{elapsed_precise}] {bar:60.cyan/blue} {percent:>3}% {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
        );
        pb.set_message(format!("{strategy} of {}", self.target));
        pb
    }
}
