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

use crate::md::{CaptureEvent, CapturePlan};
use crate::time::TimeScale;
use snafu::prelude::*;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Column headers of a plan table, the quaternion is listed scalar last.
pub const PLAN_HEADERS: [&str; 9] = [
    "Capture nr.",
    "Time",
    "Qx",
    "Qy",
    "Qz",
    "Qs",
    "Off-nadir angle",
    "Frames",
    "FPS",
];

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum PlanExportError {
    #[snafu(display("could not create plan file {}: {source}", path.display()))]
    CreateFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("could not write plan table: {source}"))]
    WriteTable { source: csv::Error },
    #[snafu(display("could not flush plan table: {source}"))]
    FlushTable { source: std::io::Error },
}

/// Pipe delimited table of the successful captures of a plan, numbered from one.
pub struct PlanTable<'a> {
    events: Vec<&'a CaptureEvent>,
}

impl<'a> PlanTable<'a> {
    pub fn new(plan: &'a CapturePlan) -> Self {
        Self {
            events: plan.events().collect(),
        }
    }

    pub fn from_events(events: &'a [CaptureEvent]) -> Self {
        Self {
            events: events.iter().collect(),
        }
    }

    /// Formats one capture with ten decimals on every floating point column.
    pub fn row(number: usize, event: &CaptureEvent) -> [String; 9] {
        let [qs, qx, qy, qz] = event.quaternion.as_scalar_first();
        [
            format!("{number}"),
            format!("{}", event.epoch.to_time_scale(TimeScale::UTC)),
            format!("{qx:.10}"),
            format!("{qy:.10}"),
            format!("{qz:.10}"),
            format!("{qs:.10}"),
            format!("{:.10}", event.off_nadir_angle_deg),
            format!("{}", event.frame_count),
            format!("{:.10}", event.frames_per_second),
        ]
    }

    pub fn write<W: Write>(&self, writer: W) -> Result<(), PlanExportError> {
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(b'|')
            .from_writer(writer);
        wtr.write_record(PLAN_HEADERS).context(WriteTableSnafu)?;
        for (i, event) in self.events.iter().enumerate() {
            wtr.write_record(Self::row(i + 1, event))
                .context(WriteTableSnafu)?;
        }
        wtr.flush().context(FlushTableSnafu)
    }

    /// Writes the table to the provided path and returns that path.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<PathBuf, PlanExportError> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).context(CreateFileSnafu { path: path.clone() })?;
        self.write(file)?;
        info!("plan of {} capture(s) written to {}", self.events.len(), path.display());
        Ok(path)
    }
}
