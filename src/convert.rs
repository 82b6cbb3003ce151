use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::config::ConversionConfig;
use crate::error::Result;
use crate::io::{excel_read, keyword_write};
use crate::plot;

/// Files produced by a conversion run.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionReport {
    pub keyword_file: PathBuf,
    pub figures: Vec<PathBuf>,
    pub samples: usize,
    pub end_time: f64,
}

/// Converts a drop tower workbook into an acceleration keyword file,
/// rendering the diagnostic figures on the way when enabled.
#[instrument(
    level = "info",
    skip_all,
    fields(
        input = %input.display(),
        output = %config.output.display(),
        rigid_body_id = rigid_body_id
    )
)]
pub fn workbook_to_keyword(
    input: &Path,
    rigid_body_id: u32,
    config: &ConversionConfig,
) -> Result<ConversionReport> {
    let (linear, rotational) = excel_read::read_tables(input)?;
    info!(
        linear_rows = linear.len(),
        rotational_rows = rotational.len(),
        "read acceleration tables from workbook"
    );

    let linear = linear.scaled(config.linear_scale);
    let rotational = rotational.scaled(config.rotational_scale);
    debug!(
        linear_scale = config.linear_scale,
        rotational_scale = config.rotational_scale,
        "tables scaled"
    );

    let end_time = keyword_write::end_time(&linear, &rotational)?;

    let figures = if config.plot.enabled {
        plot::render_plots(&linear, &rotational, &config.plot)?
    } else {
        debug!("plotting disabled");
        Vec::new()
    };

    info!("writing acceleration data");
    keyword_write::create_acceleration_file(
        &config.output,
        &linear,
        &rotational,
        &config.keyword_options(rigid_body_id),
    )?;

    Ok(ConversionReport {
        keyword_file: config.output.clone(),
        figures,
        samples: linear.len().min(rotational.len()),
        end_time,
    })
}
