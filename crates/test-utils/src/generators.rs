//! Generators for synthetic class-id rasters.

/// Creates a class grid with predictable values.
///
/// Each cell holds `(row + col) % num_classes`, so every class appears
/// along each anti-diagonal.
///
/// # Example
///
/// ```
/// use test_utils::create_class_grid;
///
/// let grid = create_class_grid(4, 2, 3);
/// assert_eq!(grid, vec![0, 1, 2, 0, 1, 2, 0, 1]);
/// ```
pub fn create_class_grid(width: usize, height: usize, num_classes: u8) -> Vec<u8> {
    let n = num_classes.max(1) as usize;
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push(((row + col) % n) as u8);
        }
    }
    data
}

/// Creates a class grid whose outer ring of cells is `nodata`, like a
/// basin raster clipped to its boundary.
///
/// # Example
///
/// ```
/// use test_utils::create_clipped_class_grid;
///
/// let grid = create_clipped_class_grid(3, 3, 6, 255);
/// assert_eq!(grid[0], 255);
/// assert_eq!(grid[4], 2); // center cell: (1 + 1) % 6
/// ```
pub fn create_clipped_class_grid(width: usize, height: usize, num_classes: u8, nodata: u8) -> Vec<u8> {
    let mut data = create_class_grid(width, height, num_classes);
    for row in 0..height {
        for col in 0..width {
            if row == 0 || col == 0 || row + 1 == height || col + 1 == width {
                data[row * width + col] = nodata;
            }
        }
    }
    data
}

/// Count the cells equal to `value`.
pub fn count_value(data: &[u8], value: u8) -> usize {
    data.iter().filter(|v| **v == value).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clipped_grid_ring() {
        let grid = create_clipped_class_grid(5, 4, 6, 255);
        // 5x4 has 14 border cells
        assert_eq!(count_value(&grid, 255), 14);
        assert_eq!(grid.len(), 20);
    }
}
