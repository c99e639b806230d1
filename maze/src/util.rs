use anyhow::{anyhow, bail};
use image::{DynamicImage, GenericImageView, RgbaImage};

use crate::config::{Palette, Rgba};
use crate::{CellState, Grid, Path, Point, WalledMaze};

/// Reads a maze out of an image. Every pixel has to match one of the palette's colours exactly:
/// walls become blocked cells, everything else is open. The first start and finish coloured
/// pixels (row by row) mark the start and the finish.
pub fn parse_img(img: &DynamicImage, palette: &Palette) -> Result<WalledMaze, anyhow::Error> {
    palette.validate()?;

    let width = img.width() as usize;
    let height = img.height() as usize;

    let mut states = Vec::with_capacity(width * height);
    let mut start: Option<Point> = None;
    let mut finish: Option<Point> = None;

    for row in 0..height {
        for col in 0..width {
            let p = Rgba(img.get_pixel(col as u32, row as u32).0);
            let point = Point { row, col };

            states.push(if p == palette.wall {
                CellState::Blocked
            } else if p == palette.open {
                CellState::Open
            } else if p == palette.start {
                start.get_or_insert(point);
                CellState::Open
            } else if p == palette.finish {
                finish.get_or_insert(point);
                CellState::Open
            } else {
                bail!(
                    "Found the colour {} at {} which this maze was not configured to handle",
                    p,
                    point
                );
            });
        }
    }

    let grid = Grid::from_states(height, width, states)?;

    let start = start.ok_or_else(|| anyhow!("No start pixel ({}) in the image", palette.start))?;
    let finish =
        finish.ok_or_else(|| anyhow!("No finish pixel ({}) in the image", palette.finish))?;

    Ok(WalledMaze::new(grid, start, finish)?)
}

/// Returns a copy of the image with every cell of the path painted in the given colour
pub fn paint_path(img: &DynamicImage, path: &Path, colour: Rgba) -> RgbaImage {
    let mut painted = img.to_rgba8();

    for point in path.points() {
        let (x, y) = (point.col as u32, point.row as u32);
        if x < painted.width() && y < painted.height() {
            painted.put_pixel(x, y, image::Rgba(colour.0));
        }
    }

    painted
}
