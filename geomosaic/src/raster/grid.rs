//! Raster grids and georeferencing.

/// Affine placement of a north-up grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    /// Map X of the grid's left edge.
    pub origin_x: f64,
    /// Map Y of the grid's top edge.
    pub origin_y: f64,
    /// Cell width in map units (positive).
    pub cell_width: f64,
    /// Cell height in map units (positive; rows grow southward).
    pub cell_height: f64,
}

impl GeoTransform {
    pub fn new(origin_x: f64, origin_y: f64, cell_width: f64, cell_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            cell_width,
            cell_height,
        }
    }

    /// Unit cells with the top-left corner at the origin.
    pub fn identity() -> Self {
        Self::new(0.0, 0.0, 1.0, 1.0)
    }

    /// Extent covered by a `width` x `height` grid.
    pub fn extent(&self, width: u32, height: u32) -> Extent {
        Extent {
            min_x: self.origin_x,
            max_x: self.origin_x + width as f64 * self.cell_width,
            min_y: self.origin_y - height as f64 * self.cell_height,
            max_y: self.origin_y,
        }
    }

    /// Grid cell containing the map point, which may lie outside the grid.
    pub fn cell_at(&self, x: f64, y: f64) -> (i64, i64) {
        let col = ((x - self.origin_x) / self.cell_width).floor() as i64;
        let row = ((self.origin_y - y) / self.cell_height).floor() as i64;
        (col, row)
    }

    /// Map coordinate of a cell centre.
    pub fn cell_center(&self, col: usize, row: usize) -> (f64, f64) {
        (
            self.origin_x + (col as f64 + 0.5) * self.cell_width,
            self.origin_y - (row as f64 + 0.5) * self.cell_height,
        )
    }
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Axis-aligned map extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Extent {
    /// Smallest extent covering both.
    pub fn union(&self, other: &Extent) -> Extent {
        Extent {
            min_x: self.min_x.min(other.min_x),
            max_x: self.max_x.max(other.max_x),
            min_y: self.min_y.min(other.min_y),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Raster header: size, placement and nodata value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterInfo {
    pub width: u32,
    pub height: u32,
    pub transform: GeoTransform,
    /// Cell value meaning "no data", if the source declares one.
    pub nodata: Option<f64>,
}

impl RasterInfo {
    pub fn extent(&self) -> Extent {
        self.transform.extent(self.width, self.height)
    }

    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// A single-band raster held in memory, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    info: RasterInfo,
    data: Vec<f64>,
}

impl Raster {
    /// Create a raster without a nodata value.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != width * height`.
    pub fn new(width: u32, height: u32, transform: GeoTransform, data: Vec<f64>) -> Self {
        Self::from_parts(
            RasterInfo {
                width,
                height,
                transform,
                nodata: None,
            },
            data,
        )
    }

    /// Create a raster from a header and its cells.
    ///
    /// # Panics
    ///
    /// Panics if the cell count does not match the header.
    pub fn from_parts(info: RasterInfo, data: Vec<f64>) -> Self {
        assert_eq!(
            data.len(),
            info.cell_count(),
            "raster data length must equal width * height"
        );
        Self { info, data }
    }

    pub fn with_nodata(mut self, nodata: f64) -> Self {
        self.info.nodata = Some(nodata);
        self
    }

    pub fn info(&self) -> &RasterInfo {
        &self.info
    }

    pub fn width(&self) -> u32 {
        self.info.width
    }

    pub fn height(&self) -> u32 {
        self.info.height
    }

    pub fn transform(&self) -> &GeoTransform {
        &self.info.transform
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Cell value, or `None` for nodata/NaN cells.
    pub fn value(&self, col: usize, row: usize) -> Option<f64> {
        if col >= self.info.width as usize || row >= self.info.height as usize {
            return None;
        }
        let value = self.data[row * self.info.width as usize + col];
        if value.is_nan() || self.info.nodata == Some(value) {
            None
        } else {
            Some(value)
        }
    }

    /// Sample the cell containing a map point.
    ///
    /// Returns the value and the cell's distance (in cells) to the nearest
    /// raster edge, or `None` outside the grid or on nodata.
    pub fn sample(&self, x: f64, y: f64) -> Option<(f64, u32)> {
        let (col, row) = self.info.transform.cell_at(x, y);
        if col < 0 || row < 0 {
            return None;
        }
        let (col, row) = (col as usize, row as usize);
        let value = self.value(col, row)?;

        let width = self.info.width as usize;
        let height = self.info.height as usize;
        let edge = col
            .min(row)
            .min(width - 1 - col)
            .min(height - 1 - row);
        Some((value, edge as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extent() {
        let transform = GeoTransform::new(100.0, 50.0, 2.0, 0.5);
        let extent = transform.extent(10, 4);
        assert_eq!(extent.min_x, 100.0);
        assert_eq!(extent.max_x, 120.0);
        assert_eq!(extent.min_y, 48.0);
        assert_eq!(extent.max_y, 50.0);
    }

    #[test]
    fn test_extent_union() {
        let a = GeoTransform::new(0.0, 10.0, 1.0, 1.0).extent(5, 5);
        let b = GeoTransform::new(3.0, 12.0, 1.0, 1.0).extent(5, 5);
        let u = a.union(&b);
        assert_eq!((u.min_x, u.max_x, u.min_y, u.max_y), (0.0, 8.0, 5.0, 12.0));
        assert_eq!(u.width(), 8.0);
        assert_eq!(u.height(), 7.0);
    }

    #[test]
    fn test_cell_at_and_center() {
        let transform = GeoTransform::new(0.0, 10.0, 1.0, 1.0);
        assert_eq!(transform.cell_at(0.5, 9.5), (0, 0));
        assert_eq!(transform.cell_at(3.2, 7.9), (3, 2));
        assert_eq!(transform.cell_at(-0.1, 9.5), (-1, 0));
        assert_eq!(transform.cell_center(1, 1), (1.5, 8.5));
    }

    #[test]
    fn test_value_skips_nodata_and_nan() {
        let raster = Raster::new(3, 1, GeoTransform::identity(), vec![1.0, -9999.0, f64::NAN])
            .with_nodata(-9999.0);
        assert_eq!(raster.value(0, 0), Some(1.0));
        assert_eq!(raster.value(1, 0), None);
        assert_eq!(raster.value(2, 0), None);
        assert_eq!(raster.value(3, 0), None);
    }

    #[test]
    fn test_sample_edge_distance() {
        let raster = Raster::new(5, 5, GeoTransform::new(0.0, 5.0, 1.0, 1.0), vec![7.0; 25]);
        assert_eq!(raster.sample(0.5, 4.5), Some((7.0, 0)));
        assert_eq!(raster.sample(2.5, 2.5), Some((7.0, 2)));
        assert_eq!(raster.sample(1.5, 2.5), Some((7.0, 1)));
        assert_eq!(raster.sample(5.5, 2.5), None);
        assert_eq!(raster.sample(-0.5, 2.5), None);
    }

    #[test]
    #[should_panic(expected = "raster data length")]
    fn test_mismatched_data_panics() {
        let _ = Raster::new(2, 2, GeoTransform::identity(), vec![0.0; 3]);
    }
}
