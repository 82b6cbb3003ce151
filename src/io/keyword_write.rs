use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::error::{Result, ToolError};
use crate::model::{ChannelGroup, MotionType, TimeSeriesTable, assign_curves};

/// Decimal digits kept for curve abscissa and ordinate values.
pub const CURVE_DECIMALS: usize = 10;
/// Decimal digits kept for the termination time.
pub const END_TIME_DECIMALS: usize = 9;

const CARD_WIDTH: usize = 10;
const CURVE_FIELD_WIDTH: usize = 20;

const TERMINATION_HEADER: &str = "$#  endtim    endcyc     dtmin    endeng    endmas     nosol  ";
const TERMINATION_TAIL: &str = "         0       0.0       0.01.000000E8         0";
const MOTION_HEADER: &str =
    "$#     pid       dof       vad      lcid        sf       vid     death     birth";
const MOTION_TAIL: &str = "       1.0         01.00000E28       0.0";
const CURVE_TITLE: &str = "Acceleration component";
const CURVE_HEADER: &str =
    "$#    lcid      sidr       sfa       sfo      offa      offo    dattyp     lcint";
const CURVE_TAIL: &str = "         0       1.0       1.0       0.0       0.0         0         0";
const POINTS_HEADER: &str = "$#                a1                  o1  ";

/// Settings for the prescribed motion cards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeywordOptions {
    /// Rigid body receiving the prescribed motion.
    pub rigid_body_id: u32,
    pub linear_motion: MotionType,
    pub rotational_motion: MotionType,
}

impl KeywordOptions {
    pub fn new(rigid_body_id: u32) -> Self {
        Self {
            rigid_body_id,
            linear_motion: MotionType::Acceleration,
            rotational_motion: MotionType::Acceleration,
        }
    }

    fn motion_for(&self, group: ChannelGroup) -> MotionType {
        match group {
            ChannelGroup::Linear => self.linear_motion,
            ChannelGroup::Rotational => self.rotational_motion,
        }
    }
}

/// Creates (or truncates) `path` and writes the keyword file into it.
#[instrument(level = "info", skip_all, fields(output = %path.display()))]
pub fn create_acceleration_file(
    path: &Path,
    linear: &TimeSeriesTable,
    rotational: &TimeSeriesTable,
    options: &KeywordOptions,
) -> Result<()> {
    // Resolve the end time before touching the filesystem.
    end_time(linear, rotational)?;

    let mut writer = BufWriter::new(File::create(path)?);
    write_keyword_file(&mut writer, linear, rotational, options)?;
    writer.flush()?;
    info!("acceleration keyword file written");
    Ok(())
}

/// Writes the termination card, six prescribed motion curves and `*END`.
pub fn write_keyword_file<W: Write>(
    out: &mut W,
    linear: &TimeSeriesTable,
    rotational: &TimeSeriesTable,
    options: &KeywordOptions,
) -> Result<()> {
    let end = end_time(linear, rotational)?;
    debug!(end_time = end, "termination time resolved");

    writeln!(out, "*CONTROL_TERMINATION")?;
    writeln!(out, "{TERMINATION_HEADER}")?;
    writeln!(
        out,
        "{:>CARD_WIDTH$}{TERMINATION_TAIL}",
        format_float(round_decimals(end, END_TIME_DECIMALS))
    )?;

    for assignment in assign_curves() {
        let table = match assignment.group {
            ChannelGroup::Linear => linear,
            ChannelGroup::Rotational => rotational,
        };
        let motion = options.motion_for(assignment.group);

        writeln!(out, "*BOUNDARY_PRESCRIBED_MOTION_RIGID")?;
        writeln!(out, "{MOTION_HEADER}")?;
        writeln!(
            out,
            "{:>CARD_WIDTH$}{:>CARD_WIDTH$}{:>CARD_WIDTH$}{:>CARD_WIDTH$}{MOTION_TAIL}",
            options.rigid_body_id,
            assignment.dof,
            motion.code(),
            assignment.lcid,
        )?;
        writeln!(out, "*DEFINE_CURVE_TITLE")?;
        writeln!(out, "{CURVE_TITLE}")?;
        writeln!(out, "{CURVE_HEADER}")?;
        writeln!(out, "{:>CARD_WIDTH$}{CURVE_TAIL}", assignment.lcid)?;
        writeln!(out, "{POINTS_HEADER}")?;

        for (time, value) in table.points(assignment.channel) {
            writeln!(out, "{}", format_point(time, value))?;
        }

        debug!(
            lcid = assignment.lcid,
            dof = assignment.dof,
            channel = %table.channels[assignment.channel].name,
            points = table.len(),
            "curve written"
        );
    }

    writeln!(out, "*END")?;
    Ok(())
}

/// Smaller of the two tables' last time values.
pub fn end_time(linear: &TimeSeriesTable, rotational: &TimeSeriesTable) -> Result<f64> {
    let linear_end = linear
        .last_time()
        .ok_or(ToolError::EmptyTable(ChannelGroup::Linear.name()))?;
    let rotational_end = rotational
        .last_time()
        .ok_or(ToolError::EmptyTable(ChannelGroup::Rotational.name()))?;
    Ok(linear_end.min(rotational_end))
}

/// One curve data row: two right-justified 20 character fields.
pub fn format_point(time: f64, value: f64) -> String {
    format!(
        "{:>CURVE_FIELD_WIDTH$}{:>CURVE_FIELD_WIDTH$}",
        format_float(round_decimals(time, CURVE_DECIMALS)),
        format_float(round_decimals(value, CURVE_DECIMALS))
    )
}

/// Rounds to `digits` decimal places using the exact binary value.
pub fn round_decimals(value: f64, digits: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{value:.digits$}").parse().unwrap_or(value)
}

/// Shortest round-trip text for `value`.
///
/// Integral values keep a trailing `.0`. Decimal exponents in `-4..16` use
/// fixed notation, anything else is scientific with a signed exponent of at
/// least two digits (`1e-05`, `2.5e+16`).
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let scientific = format!("{value:e}");
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let digits: String = mantissa.chars().filter(|ch| *ch != '.').collect();

    let body = if (-4..16).contains(&exponent) {
        let point = exponent + 1;
        if point <= 0 {
            format!("0.{}{digits}", "0".repeat(point.unsigned_abs() as usize))
        } else {
            let point = point as usize;
            if point >= digits.len() {
                format!("{digits}{}.0", "0".repeat(point - digits.len()))
            } else {
                format!("{}.{}", &digits[..point], &digits[point..])
            }
        }
    } else {
        let (lead, rest) = digits.split_at(1);
        let exp_sign = if exponent < 0 { '-' } else { '+' };
        if rest.is_empty() {
            format!("{lead}e{exp_sign}{:02}", exponent.unsigned_abs())
        } else {
            format!("{lead}.{rest}e{exp_sign}{:02}", exponent.unsigned_abs())
        }
    };

    format!("{sign}{body}")
}
