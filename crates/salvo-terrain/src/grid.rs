//! HeightField: tile-vertex heightmap with bilinear height queries.

use salvo_core::constants::TILE_UNITS;

/// Height field header metadata.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldHeader {
    /// Number of tiles west to east.
    pub width: u32,
    /// Number of tiles south to north.
    pub height: u32,
    /// World units per tile.
    pub tile_size: f64,
}

impl FieldHeader {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tile_size: TILE_UNITS as f64,
        }
    }

    /// World extent along x.
    pub fn world_width(&self) -> f64 {
        self.width as f64 * self.tile_size
    }

    /// World extent along y.
    pub fn world_height(&self) -> f64 {
        self.height as f64 * self.tile_size
    }

    fn vertex_columns(&self) -> usize {
        self.width as usize + 1
    }

    fn vertex_rows(&self) -> usize {
        self.height as usize + 1
    }
}

/// Loaded heightmap. Heights are sampled at tile corners, row-major from y = 0.
#[derive(Debug, Clone)]
pub struct HeightField {
    pub header: FieldHeader,
    /// Vertex heights in world units, `(width + 1) * (height + 1)` entries.
    pub heights: Vec<i16>,
}

impl HeightField {
    /// Create a HeightField from pre-loaded vertex heights.
    /// Missing trailing samples read as 0.
    pub fn new(header: FieldHeader, heights: Vec<i16>) -> Self {
        Self { header, heights }
    }

    /// A field of constant height.
    pub fn flat(width: u32, height: u32, level: i16) -> Self {
        let header = FieldHeader::new(width, height);
        let count = header.vertex_columns() * header.vertex_rows();
        Self::new(header, vec![level; count])
    }

    /// A field whose vertex heights come from `f(column, row)`.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> i16) -> Self {
        let header = FieldHeader::new(width, height);
        let mut heights = Vec::with_capacity(header.vertex_columns() * header.vertex_rows());
        for row in 0..=height {
            for col in 0..=width {
                heights.push(f(col, row));
            }
        }
        Self::new(header, heights)
    }

    /// Whether a world-space (x, y) lies on the map.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= 0.0 && y >= 0.0 && x < self.header.world_width() && y < self.header.world_height()
    }

    /// Get raw height at integer vertex coordinates.
    fn raw_height(&self, row: usize, col: usize) -> i16 {
        if row >= self.header.vertex_rows() || col >= self.header.vertex_columns() {
            return 0;
        }
        self.heights
            .get(row * self.header.vertex_columns() + col)
            .copied()
            .unwrap_or(0)
    }

    /// Height at a world position with bilinear interpolation.
    /// Returns None if the position is outside the field.
    pub fn height_at(&self, x: f64, y: f64) -> Option<f64> {
        if !self.contains(x, y) {
            return None;
        }
        Some(self.bilinear(y / self.header.tile_size, x / self.header.tile_size))
    }

    /// Height at a world position, clamping the query onto the field.
    pub fn clamped_height_at(&self, x: f64, y: f64) -> f64 {
        let x = x.clamp(0.0, self.header.world_width());
        let y = y.clamp(0.0, self.header.world_height());
        self.bilinear(y / self.header.tile_size, x / self.header.tile_size)
    }

    /// Bilinear interpolation at fractional row/col.
    fn bilinear(&self, row: f64, col: f64) -> f64 {
        let r0 = row.floor() as usize;
        let c0 = col.floor() as usize;
        let r1 = (r0 + 1).min(self.header.vertex_rows() - 1);
        let c1 = (c0 + 1).min(self.header.vertex_columns() - 1);

        let fr = row - r0 as f64;
        let fc = col - c0 as f64;

        let e00 = self.raw_height(r0, c0) as f64;
        let e01 = self.raw_height(r0, c1) as f64;
        let e10 = self.raw_height(r1, c0) as f64;
        let e11 = self.raw_height(r1, c1) as f64;

        let near = e00 * (1.0 - fc) + e01 * fc;
        let far = e10 * (1.0 - fc) + e11 * fc;
        near * (1.0 - fr) + far * fr
    }
}
