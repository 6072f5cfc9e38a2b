// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Contour-Lite CLI - slice terrain meshes into iso-elevation contours.
//!
//! Loads an STL mesh, slices it at explicit thresholds, an arithmetic range
//! or evenly spaced default levels, optionally replays a JSON patch list,
//! and writes the contours as JSON.
//!
//! # Examples
//!
//! - `contour-lite terrain.stl --min 4 --max 6 --step 0.1`
//! - `contour-lite terrain.stl --at 14.8,14.86 --patches fixes.json -o out.json`
//! - `contour-lite terrain.stl --format strings --nearest 116.2,113.2`
//!
//! Slicing defaults come from `CONTOUR_*` environment variables; log level
//! from `RUST_LOG`.

use std::fs;
use std::io::Write;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use contour_lite_core::{default_levels, parse_patches, LevelMap};
use contour_lite_mesh::{parse_stl, Bounds, ZIntervalTree};
use tracing_subscriber::EnvFilter;

mod config;
mod output;

use config::{CliConfig, Plan};
use output::{NearestReport, Report};

fn main() -> Result<()> {
    // Initialize logging (stderr, so JSON on stdout stays clean)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,contour_lite_core=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = CliConfig::parse();
    run(&cli)
}

fn run(cli: &CliConfig) -> Result<()> {
    let start = Instant::now();

    let bytes = fs::read(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;
    let mesh = parse_stl(&bytes).with_context(|| format!("failed to parse {}", cli.input.display()))?;
    let Some(bounds) = mesh.bounds() else {
        bail!("{} contains no triangles", cli.input.display());
    };
    tracing::info!(
        triangles = mesh.triangle_count(),
        min_z = bounds.min.z,
        max_z = bounds.max.z,
        "Loaded mesh"
    );

    let index = ZIntervalTree::new(mesh);
    let config = cli.slice_config();
    tracing::debug!(?config, "Slice configuration");
    let mut map = LevelMap::new(config);

    match cli.plan() {
        Plan::At(thresholds) => {
            map.slice_at(&index, &thresholds);
        }
        Plan::Range {
            min,
            max,
            step,
            end,
        } => {
            let min = min.unwrap_or(bounds.min.z);
            let max = max.unwrap_or(bounds.max.z);
            map.slice_range(&index, min, max, step, end)?;
        }
        Plan::Default(count) => {
            map.slice_at(&index, &default_levels(&bounds, count));
        }
    }

    let patches = match &cli.patches {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let ops = parse_patches(&text).with_context(|| format!("failed to parse {}", path.display()))?;
            let report = if cli.lenient {
                map.apply_patches_lenient(&ops)
            } else {
                map.apply_patches(&ops)
                    .with_context(|| format!("patch list {} aborted", path.display()))?
            };
            Some(report)
        }
        None => None,
    };

    let nearest = if cli.nearest.is_empty() {
        Vec::new()
    } else {
        map.build_spatial_index();
        cli.nearest
            .iter()
            .map(|q| NearestReport {
                query: *q,
                found: map.query_nearest(q),
            })
            .collect()
    };

    let report = build_report(cli, &map, &bounds, patches, nearest);
    write_report(cli, &report)?;

    tracing::info!(
        thresholds = report.thresholds.len(),
        contours = report.contour_count,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Done"
    );
    Ok(())
}

fn build_report(
    cli: &CliConfig,
    map: &LevelMap,
    bounds: &Bounds,
    patches: Option<contour_lite_core::PatchReport>,
    nearest: Vec<NearestReport>,
) -> Report {
    Report {
        bounds: bounds.into(),
        thresholds: map.thresholds().collect(),
        contour_count: map.contour_count(),
        patches,
        nearest,
        body: output::body(map, cli.format, &cli.path_options()),
    }
}

fn write_report(cli: &CliConfig, report: &Report) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    match &cli.output {
        Some(path) => fs::write(path, json).with_context(|| format!("failed to write {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}")?;
            Ok(())
        }
    }
}
