//! Merging rasters onto a new grid.

use rayon::prelude::*;

use super::{GeoTransform, Raster, RasterError, RasterInfo};
use crate::mosaic::MosaicMethod;

/// Largest output grid the engine will allocate.
pub const MAX_OUTPUT_CELLS: u64 = 1 << 30;

/// Relative tolerance when comparing cell sizes and grid spans.
const EPSILON: f64 = 1e-9;

/// Result of a mosaic.
#[derive(Debug, Clone)]
pub struct Mosaic {
    pub raster: Raster,
    /// True when some input's cell size differs from the first input's.
    pub mismatched_cell_sizes: bool,
}

/// Merge rasters onto a grid covering the union of their extents.
///
/// The output grid takes the first input's cell size. Each output cell
/// samples every input at its centre (nearest neighbour); inputs without
/// data there are skipped, and `method` combines the rest in input order.
/// Cells no input covers are NaN.
///
/// # Errors
///
/// Returns [`RasterError::NoInputs`] for an empty slice and
/// [`RasterError::TooLarge`] when the union grid exceeds
/// [`MAX_OUTPUT_CELLS`]. An input whose origin or cell size is not a finite
/// positive placement gives [`RasterError::InvalidGeoreference`].
pub fn mosaic_rasters(inputs: &[Raster], method: MosaicMethod) -> Result<Mosaic, RasterError> {
    let first = inputs.first().ok_or(RasterError::NoInputs)?;
    for (index, raster) in inputs.iter().enumerate() {
        check_placement(index, raster.transform())?;
    }
    let cell_width = first.transform().cell_width;
    let cell_height = first.transform().cell_height;

    let extent = inputs
        .iter()
        .skip(1)
        .fold(first.info().extent(), |acc, r| acc.union(&r.info().extent()));

    let mismatched_cell_sizes = inputs.iter().any(|r| {
        !approx_eq(r.transform().cell_width, cell_width)
            || !approx_eq(r.transform().cell_height, cell_height)
    });

    let width = cells_spanned(extent.width(), cell_width)?;
    let height = cells_spanned(extent.height(), cell_height)?;
    if width.saturating_mul(height) > MAX_OUTPUT_CELLS
        || width > u32::MAX as u64
        || height > u32::MAX as u64
    {
        return Err(RasterError::TooLarge { width, height });
    }
    let (width, height) = (width as u32, height as u32);

    let transform = GeoTransform::new(extent.min_x, extent.max_y, cell_width, cell_height);
    let mut data = vec![f64::NAN; width as usize * height as usize];

    data.par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(row, line)| {
            let mut samples = Vec::with_capacity(inputs.len());
            for (col, cell) in line.iter_mut().enumerate() {
                let (x, y) = transform.cell_center(col, row);
                samples.clear();
                samples.extend(inputs.iter().filter_map(|r| r.sample(x, y)));
                if let Some(value) = combine(method, &samples) {
                    *cell = value;
                }
            }
        });

    let info = RasterInfo {
        width,
        height,
        transform,
        nodata: None,
    };
    Ok(Mosaic {
        raster: Raster::from_parts(info, data),
        mismatched_cell_sizes,
    })
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON * a.abs().max(b.abs())
}

fn check_placement(index: usize, transform: &GeoTransform) -> Result<(), RasterError> {
    let finite = [
        transform.origin_x,
        transform.origin_y,
        transform.cell_width,
        transform.cell_height,
    ]
    .iter()
    .all(|v| v.is_finite());
    if finite && transform.cell_width > 0.0 && transform.cell_height > 0.0 {
        return Ok(());
    }
    Err(RasterError::InvalidGeoreference(format!(
        "input {} is placed at ({}, {}) with cell size {} x {}",
        index + 1,
        transform.origin_x,
        transform.origin_y,
        transform.cell_width,
        transform.cell_height
    )))
}

fn cells_spanned(span: f64, cell: f64) -> Result<u64, RasterError> {
    let cells = (span / cell - EPSILON).ceil();
    if !cells.is_finite() {
        return Err(RasterError::InvalidGeoreference(format!(
            "extent of {} does not divide into cells of {}",
            span, cell
        )));
    }
    Ok(if cells < 1.0 { 1 } else { cells as u64 })
}

/// Combine the samples that cover one cell, in input order.
///
/// Each sample is `(value, distance_to_edge)`.
fn combine(method: MosaicMethod, samples: &[(f64, u32)]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let values = samples.iter().map(|&(v, _)| v);
    let value = match method {
        MosaicMethod::First => samples[0].0,
        MosaicMethod::Last => samples[samples.len() - 1].0,
        MosaicMethod::Minimum => values.fold(f64::INFINITY, f64::min),
        MosaicMethod::Maximum => values.fold(f64::NEG_INFINITY, f64::max),
        MosaicMethod::Mean => values.sum::<f64>() / samples.len() as f64,
        MosaicMethod::Blend => {
            // Weight grows with distance from the input's edge.
            let (sum, weights) = samples.iter().fold((0.0, 0.0), |(sum, weights), &(v, edge)| {
                let w = edge as f64 + 1.0;
                (sum + v * w, weights + w)
            });
            sum / weights
        }
    };
    Some(value)
}
