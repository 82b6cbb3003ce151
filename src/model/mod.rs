use std::fmt;

use serde::{Deserialize, Serialize};

/// Header of the shared time index column.
pub const TIME_COLUMN: &str = "Time(ms)";
/// Linear acceleration columns, in curve order.
pub const LINEAR_COLUMNS: [&str; 3] = ["lac_x(mm/ms^2)", "lac_y(mm/ms^2)", "lac_z(mm/ms^2)"];
/// Rotational acceleration columns, in curve order.
pub const ROTATIONAL_COLUMNS: [&str; 3] = ["aac_x(rad/ms^2)", "aac_y(rad/ms^2)", "aac_z(rad/ms^2)"];

/// The two physical quantities recorded by the drop tower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelGroup {
    Linear,
    Rotational,
}

impl ChannelGroup {
    /// Both groups in the order their curves are written.
    pub const ALL: [ChannelGroup; 2] = [ChannelGroup::Linear, ChannelGroup::Rotational];

    /// Column headers read for this group.
    pub fn columns(self) -> [&'static str; 3] {
        match self {
            ChannelGroup::Linear => LINEAR_COLUMNS,
            ChannelGroup::Rotational => ROTATIONAL_COLUMNS,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ChannelGroup::Linear => "linear",
            ChannelGroup::Rotational => "rotational",
        }
    }
}

impl fmt::Display for ChannelGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Prescribed motion type, written into the `vad` field of
/// `*BOUNDARY_PRESCRIBED_MOTION_RIGID`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MotionType {
    Velocity,
    Acceleration,
    Displacement,
}

impl MotionType {
    /// Numeric code understood by the solver.
    pub fn code(self) -> u8 {
        match self {
            MotionType::Velocity => 0,
            MotionType::Acceleration => 1,
            MotionType::Displacement => 2,
        }
    }
}

/// A single named value column sharing the table's time index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub name: String,
    pub values: Vec<f64>,
}

/// Three acceleration channels sampled on a shared time index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesTable {
    pub group: ChannelGroup,
    pub time: Vec<f64>,
    pub channels: Vec<Channel>,
}

impl TimeSeriesTable {
    /// Creates an empty table with one channel per column of `group`.
    pub fn new(group: ChannelGroup) -> Self {
        Self {
            group,
            time: Vec::new(),
            channels: group
                .columns()
                .iter()
                .map(|name| Channel {
                    name: (*name).to_string(),
                    values: Vec::new(),
                })
                .collect(),
        }
    }

    /// Appends one sample. `values` must hold one entry per channel.
    pub fn push_row(&mut self, time: f64, values: [f64; 3]) {
        self.time.push(time);
        for (channel, value) in self.channels.iter_mut().zip(values) {
            channel.values.push(value);
        }
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Last entry of the time index, if any.
    pub fn last_time(&self) -> Option<f64> {
        self.time.last().copied()
    }

    /// Multiplies every channel value by `factor`. The time index is kept.
    pub fn scaled(mut self, factor: f64) -> Self {
        if factor != 1.0 {
            for channel in &mut self.channels {
                channel.values.iter_mut().for_each(|value| *value *= factor);
            }
        }
        self
    }

    /// `(time, value)` pairs of one channel.
    pub fn points(&self, channel: usize) -> impl Iterator<Item = (f64, f64)> + '_ {
        let values = self
            .channels
            .get(channel)
            .map(|c| c.values.as_slice())
            .unwrap_or_default();
        self.time.iter().copied().zip(values.iter().copied())
    }

    /// Minimum and maximum over all channel values, ignoring NaN.
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        self.channels
            .iter()
            .flat_map(|c| c.values.iter().copied())
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Renders the first `rows` samples as a small aligned text table.
    pub fn head(&self, rows: usize) -> String {
        let mut out = format!("{:>12}", TIME_COLUMN);
        for channel in &self.channels {
            out.push_str(&format!(" {:>16}", channel.name));
        }
        for (idx, time) in self.time.iter().take(rows).enumerate() {
            out.push('\n');
            out.push_str(&format!("{time:>12}"));
            for channel in &self.channels {
                out.push_str(&format!(" {:>16}", channel.values[idx]));
            }
        }
        out
    }
}

/// Identifiers binding one channel to its curve in the keyword file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurveAssignment {
    pub group: ChannelGroup,
    /// Index of the channel inside its table.
    pub channel: usize,
    pub lcid: u32,
    pub dof: u32,
}

/// Assigns curve and degree-of-freedom identifiers to the six channels.
///
/// Curve ids run 1..=6 in column order. Degree-of-freedom ids follow the
/// same order but skip one value between the translational and rotational
/// groups, so the rotations land on 5, 6 and 7.
pub fn assign_curves() -> Vec<CurveAssignment> {
    let mut assignments = Vec::with_capacity(6);
    let mut lcid = 1;
    let mut dof = 1;

    for (group_idx, group) in ChannelGroup::ALL.into_iter().enumerate() {
        if group_idx > 0 {
            dof += 1;
        }
        for channel in 0..group.columns().len() {
            assignments.push(CurveAssignment {
                group,
                channel,
                lcid,
                dof,
            });
            lcid += 1;
            dof += 1;
        }
    }

    assignments
}
