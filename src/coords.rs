//! Pointer position → design space → grid cell.

/// A cell of the canvas grid. Only ever constructed for in-bounds positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCell {
    pub col: u32,
    pub row: u32,
}

impl GridCell {
    pub fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }
}

/// A point in the canvas's logical coordinate system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DesignPoint {
    pub x: f32,
    pub y: f32,
}

/// How the presentation layer currently places the canvas on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Screen position of the canvas's top-left corner.
    pub origin: (f32, f32),
    /// Screen pixels per design unit.
    pub scale: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            origin: (0.0, 0.0),
            scale: 1.0,
        }
    }
}

/// Stateless mapping from raw pointer coordinates to grid cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    pub design_width: f32,
    pub design_height: f32,
    pub grid_width: u32,
    pub grid_height: u32,
}

impl CoordinateMapper {
    pub fn new(design_width: f32, design_height: f32, grid_width: u32, grid_height: u32) -> Self {
        Self {
            design_width,
            design_height,
            grid_width,
            grid_height,
        }
    }

    pub fn to_design(&self, client_x: f32, client_y: f32, viewport: Viewport) -> DesignPoint {
        let scale = if viewport.scale > 0.0 { viewport.scale } else { 1.0 };
        DesignPoint {
            x: (client_x - viewport.origin.0) / scale,
            y: (client_y - viewport.origin.1) / scale,
        }
    }

    /// Position relative to the canvas size, `(0, 0)` top-left to `(1, 1)` bottom-right.
    pub fn normalize(&self, point: DesignPoint) -> (f32, f32) {
        (point.x / self.design_width, point.y / self.design_height)
    }

    pub fn cell_width(&self) -> f32 {
        self.design_width / self.grid_width as f32
    }

    pub fn cell_height(&self) -> f32 {
        self.design_height / self.grid_height as f32
    }

    /// Returns `None` when the point lies outside the grid.
    pub fn cell_at(&self, point: DesignPoint) -> Option<GridCell> {
        let col = (point.x / self.cell_width()).floor();
        let row = (point.y / self.cell_height()).floor();
        if !(col.is_finite() && row.is_finite()) || col < 0.0 || row < 0.0 {
            return None;
        }
        let (col, row) = (col as u32, row as u32);
        (col < self.grid_width && row < self.grid_height).then(|| GridCell::new(col, row))
    }

    /// Design-space rectangle covered by `cell`, as `(x, y, width, height)`.
    pub fn cell_rect(&self, cell: GridCell) -> (f32, f32, f32, f32) {
        let (w, h) = (self.cell_width(), self.cell_height());
        (cell.col as f32 * w, cell.row as f32 * h, w, h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> CoordinateMapper {
        CoordinateMapper::new(1000.0, 500.0, 20, 10)
    }

    #[test]
    fn maps_through_viewport() {
        let viewport = Viewport {
            origin: (100.0, 50.0),
            scale: 0.5,
        };
        let point = mapper().to_design(150.0, 75.0, viewport);
        assert_eq!(point, DesignPoint { x: 100.0, y: 50.0 });
        assert_eq!(mapper().cell_at(point), Some(GridCell::new(2, 1)));
    }

    #[test]
    fn edges_are_half_open() {
        let m = mapper();
        assert_eq!(m.cell_at(DesignPoint { x: 0.0, y: 0.0 }), Some(GridCell::new(0, 0)));
        assert_eq!(m.cell_at(DesignPoint { x: 999.9, y: 499.9 }), Some(GridCell::new(19, 9)));
        assert_eq!(m.cell_at(DesignPoint { x: 1000.0, y: 10.0 }), None);
        assert_eq!(m.cell_at(DesignPoint { x: 10.0, y: 500.0 }), None);
        assert_eq!(m.cell_at(DesignPoint { x: -0.1, y: 10.0 }), None);
    }

    #[test]
    fn normalizes_against_design_size() {
        assert_eq!(mapper().normalize(DesignPoint { x: 250.0, y: 500.0 }), (0.25, 1.0));
    }
}
