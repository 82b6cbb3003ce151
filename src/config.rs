use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::io::keyword_write::KeywordOptions;
use crate::model::MotionType;
use crate::plot::PlotOptions;

/// Default name of the generated keyword file.
pub const DEFAULT_OUTPUT: &str = "acceleration.k";

/// Settings for one conversion run. Every key is optional in the JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Path of the keyword file to write.
    pub output: PathBuf,
    /// Factor applied to every linear acceleration value.
    pub linear_scale: f64,
    /// Factor applied to every rotational acceleration value.
    pub rotational_scale: f64,
    pub linear_motion: MotionType,
    pub rotational_motion: MotionType,
    pub plot: PlotOptions,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_OUTPUT),
            linear_scale: 1.0,
            rotational_scale: 1.0,
            linear_motion: MotionType::Acceleration,
            rotational_motion: MotionType::Acceleration,
            plot: PlotOptions::default(),
        }
    }
}

impl ConversionConfig {
    /// Loads a configuration from a JSON document.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Loads `path` when given, otherwise the defaults, then applies `overrides`.
    pub fn resolve(path: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_json_file(path)?,
            None => Self::default(),
        };
        Ok(config.with_overrides(overrides))
    }

    /// Replaces every value that `overrides` sets.
    pub fn with_overrides(mut self, overrides: &Overrides) -> Self {
        if let Some(output) = &overrides.output {
            self.output = output.clone();
        }
        if let Some(scale) = overrides.linear_scale {
            self.linear_scale = scale;
        }
        if let Some(scale) = overrides.rotational_scale {
            self.rotational_scale = scale;
        }
        if let Some(motion) = overrides.rotational_motion {
            self.rotational_motion = motion;
        }
        if overrides.no_plot {
            self.plot.enabled = false;
        }
        if let Some(dir) = &overrides.plot_dir {
            self.plot.directory = dir.clone();
        }
        self
    }

    /// Prescribed motion settings for the given rigid body.
    pub fn keyword_options(&self, rigid_body_id: u32) -> KeywordOptions {
        KeywordOptions {
            rigid_body_id,
            linear_motion: self.linear_motion,
            rotational_motion: self.rotational_motion,
        }
    }
}

/// Command line values that take precedence over the configuration file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub output: Option<PathBuf>,
    pub linear_scale: Option<f64>,
    pub rotational_scale: Option<f64>,
    pub rotational_motion: Option<MotionType>,
    pub no_plot: bool,
    pub plot_dir: Option<PathBuf>,
}
