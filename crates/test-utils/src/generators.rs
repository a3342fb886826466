//! Grid generators with predictable values.
//!
//! All grids are row-major (row 0 first).

/// Every cell holds `value`.
pub fn constant_grid(width: usize, height: usize, value: f32) -> Vec<f32> {
    vec![value; width * height]
}

/// Cell value is its linear index: `row * width + col`.
///
/// # Example
///
/// ```
/// use test_utils::index_grid;
///
/// let grid = index_grid(4, 3);
/// assert_eq!(grid[0], 0.0);
/// assert_eq!(grid[5], 5.0); // row 1, col 1
/// ```
pub fn index_grid(width: usize, height: usize) -> Vec<f32> {
    (0..width * height).map(|i| i as f32).collect()
}

/// SOC-like values: a gradient from `low` (top-left) to `high` (bottom-right).
pub fn soc_gradient_grid(width: usize, height: usize, low: f32, high: f32) -> Vec<f32> {
    let span = (width + height).saturating_sub(2).max(1) as f32;
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let t = (row + col) as f32 / span;
            data.push(low + (high - low) * t);
        }
    }
    data
}

/// Replace the listed `(row, col)` cells with `nodata`.
pub fn with_holes(mut grid: Vec<f32>, width: usize, holes: &[(usize, usize)], nodata: f32) -> Vec<f32> {
    for &(row, col) in holes {
        if let Some(cell) = grid.get_mut(row * width + col) {
            *cell = nodata;
        }
    }
    grid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_endpoints() {
        let grid = soc_gradient_grid(5, 5, 10.0, 50.0);
        assert_eq!(grid[0], 10.0);
        assert_eq!(grid[24], 50.0);
    }

    #[test]
    fn test_with_holes() {
        let grid = with_holes(constant_grid(3, 3, 1.0), 3, &[(1, 1), (9, 9)], -1.0);
        assert_eq!(grid[4], -1.0);
        assert_eq!(grid.iter().filter(|v| **v == -1.0).count(), 1);
    }
}
