use std::io::Cursor;

use anyhow::{Context, Result};
use image::{ImageFormat, Rgb, RgbImage};

const GRID_SIZE: u32 = 5;
const TILE_SIZE: u32 = 64;
const INSET: u32 = 5;

const BACKGROUND: Rgb<u8> = Rgb([30, 30, 40]);
const SAFE_FILL: Rgb<u8> = Rgb([0, 255, 100]);
const UNSAFE_FILL: Rgb<u8> = Rgb([50, 50, 50]);

/// Canvas edge in pixels (320)
pub const CANVAS_SIZE: u32 = GRID_SIZE * TILE_SIZE;

/// Draw the 5x5 grid with the given safe tiles highlighted.
///
/// Tile indices are row-major (index = row*5 + col). Pure function of the
/// tile set: the same set always yields a pixel-identical image.
pub fn render_grid(safe_tiles: &[usize]) -> RgbImage {
    let mut image = RgbImage::from_pixel(CANVAS_SIZE, CANVAS_SIZE, BACKGROUND);

    for index in 0..(GRID_SIZE * GRID_SIZE) as usize {
        let row = index as u32 / GRID_SIZE;
        let col = index as u32 % GRID_SIZE;
        let fill = if safe_tiles.contains(&index) {
            SAFE_FILL
        } else {
            UNSAFE_FILL
        };

        fill_cell(&mut image, col * TILE_SIZE, row * TILE_SIZE, fill);
    }

    image
}

fn fill_cell(image: &mut RgbImage, x0: u32, y0: u32, fill: Rgb<u8>) {
    for y in y0 + INSET..y0 + TILE_SIZE - INSET {
        for x in x0 + INSET..x0 + TILE_SIZE - INSET {
            image.put_pixel(x, y, fill);
        }
    }
}

/// Serialize the grid image to PNG bytes for transport.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .context("Failed to encode grid image as PNG")?;
    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell_center(row: u32, col: u32) -> (u32, u32) {
        (
            col * TILE_SIZE + TILE_SIZE / 2,
            row * TILE_SIZE + TILE_SIZE / 2,
        )
    }

    #[test]
    fn test_canvas_dimensions() {
        let image = render_grid(&[0, 1, 2, 3, 4]);
        assert_eq!(image.width(), 320);
        assert_eq!(image.height(), 320);
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let tiles = vec![3, 7, 12, 18, 24];
        let first = render_grid(&tiles);
        let second = render_grid(&tiles);
        assert_eq!(first.as_raw(), second.as_raw());
    }

    #[test]
    fn test_safe_and_unsafe_fills() {
        // Top row safe, everything else unsafe
        let image = render_grid(&[0, 1, 2, 3, 4]);

        let (x, y) = cell_center(0, 0);
        assert_eq!(*image.get_pixel(x, y), SAFE_FILL);

        let (x, y) = cell_center(0, 4);
        assert_eq!(*image.get_pixel(x, y), SAFE_FILL);

        // Tile 24 = row 4, col 4
        let (x, y) = cell_center(4, 4);
        assert_eq!(*image.get_pixel(x, y), UNSAFE_FILL);

        let (x, y) = cell_center(2, 1);
        assert_eq!(*image.get_pixel(x, y), UNSAFE_FILL);
    }

    #[test]
    fn test_inset_leaves_background_between_cells() {
        let image = render_grid(&[0, 1, 2, 3, 4]);
        assert_eq!(*image.get_pixel(0, 0), BACKGROUND);
        assert_eq!(*image.get_pixel(TILE_SIZE, TILE_SIZE), BACKGROUND);
    }

    #[test]
    fn test_png_encoding() {
        let image = render_grid(&[5, 6, 7, 8, 9]);
        let png = encode_png(&image).unwrap();
        assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));

        // Deterministic rendering carries through encoding
        assert_eq!(png, encode_png(&render_grid(&[5, 6, 7, 8, 9])).unwrap());
    }
}
