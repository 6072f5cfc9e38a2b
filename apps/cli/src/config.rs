// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command line configuration.
//!
//! Slicing knobs start from `SliceConfig::from_env()` and are overridden by
//! any flag given explicitly.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use contour_lite_core::{PathOptions, PlanePoint, RangeEnd, SliceConfig};

/// Slice an STL terrain mesh into closed iso-elevation contours.
#[derive(Debug, Parser)]
#[command(name = "contour-lite", version, about)]
pub struct CliConfig {
    /// Binary or ASCII STL file.
    pub input: PathBuf,

    /// Lowest threshold of the range (defaults to the mesh's min z).
    #[arg(long)]
    pub min: Option<f64>,

    /// Highest threshold of the range (defaults to the mesh's max z).
    #[arg(long)]
    pub max: Option<f64>,

    /// Spacing between thresholds in a range.
    #[arg(long)]
    pub step: Option<f64>,

    /// Include `--max` itself when it falls on the step grid.
    #[arg(long)]
    pub inclusive: bool,

    /// Explicit thresholds, comma separated. Overrides the range.
    #[arg(long, value_delimiter = ',', conflicts_with = "step")]
    pub at: Vec<f64>,

    /// Number of evenly spaced levels between the mesh's min and max z.
    /// Used when neither `--at` nor `--step` is given.
    #[arg(long, default_value_t = 10)]
    pub levels: usize,

    /// JSON patch list applied after slicing.
    #[arg(long)]
    pub patches: Option<PathBuf>,

    /// Skip failing patches instead of aborting.
    #[arg(long)]
    pub lenient: bool,

    /// Report the contour vertex nearest to `x,y` (may repeat).
    #[arg(long, value_parser = parse_plane_point)]
    pub nearest: Vec<PlanePoint>,

    /// Output shape.
    #[arg(long, value_enum, default_value_t = OutputFormat::Levels)]
    pub format: OutputFormat,

    /// Write JSON here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Added to every exported x coordinate.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub x_offset: f64,

    /// Export every n-th contour point.
    #[arg(long, default_value_t = 1)]
    pub stride: usize,

    /// Bounding-box area below which contours are discarded.
    #[arg(long)]
    pub min_area: Option<f64>,

    /// Decimal digits used to match fragment endpoints.
    #[arg(long)]
    pub precision: Option<u32>,

    /// Squared z distance at which a vertex counts as lying on the plane.
    #[arg(long)]
    pub at_plane_tolerance: Option<f64>,

    /// Slice thresholds one after another.
    #[arg(long)]
    pub sequential: bool,
}

/// What to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One path per threshold
    Levels,
    /// One path per contour
    Contours,
    /// Point strings per threshold
    Strings,
}

/// How the thresholds to slice are chosen.
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    At(Vec<f64>),
    Range {
        min: Option<f64>,
        max: Option<f64>,
        step: f64,
        end: RangeEnd,
    },
    Default(usize),
}

impl CliConfig {
    /// Environment defaults with explicit flags on top.
    pub fn slice_config(&self) -> SliceConfig {
        let mut config = SliceConfig::from_env();
        if let Some(min_area) = self.min_area {
            config.min_area = min_area;
        }
        if let Some(precision) = self.precision {
            config.key_precision = precision;
        }
        if let Some(tolerance) = self.at_plane_tolerance {
            config.at_plane_tolerance = tolerance;
        }
        if self.sequential {
            config.parallel = false;
        }
        config
    }

    pub fn path_options(&self) -> PathOptions {
        PathOptions {
            x_offset: self.x_offset,
            stride: self.stride,
        }
    }

    pub fn plan(&self) -> Plan {
        if !self.at.is_empty() {
            return Plan::At(self.at.clone());
        }
        match self.step {
            Some(step) => Plan::Range {
                min: self.min,
                max: self.max,
                step,
                end: if self.inclusive {
                    RangeEnd::Inclusive
                } else {
                    RangeEnd::Exclusive
                },
            },
            None => Plan::Default(self.levels),
        }
    }
}

fn parse_plane_point(s: &str) -> Result<PlanePoint, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got {s:?}"))?;
    let x = x.trim().parse().map_err(|e| format!("bad x in {s:?}: {e}"))?;
    let y = y.trim().parse().map_err(|e| format!("bad y in {s:?}: {e}"))?;
    Ok(PlanePoint::new(x, y))
}
