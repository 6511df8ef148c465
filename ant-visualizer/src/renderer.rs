use ant_common::{Coord, GridBounds, Heading, LangtonsAnt};
use anyhow::{bail, Result};
use image::{ImageBuffer, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use crate::color::Colors;

/// Margin around the visited area, in pixels.
pub const PADDING: u32 = 50;
pub const MIN_CANVAS_WIDTH: u32 = 800;
pub const MIN_CANVAS_HEIGHT: u32 = 600;
/// Smallest drawn area, in cells, regardless of how little the ant has explored.
const MIN_VISIBLE_CELLS: u64 = 10;
const HEADING_LINE_WIDTH: f32 = 4.0;
const HEADING_LENGTH_FACTOR: f32 = 0.7;

/// Canvas dimensions needed to show `bounds` at `cell_size` pixels per cell.
pub fn canvas_size(bounds: &GridBounds, cell_size: u32) -> Result<(u32, u32)> {
    let cs = u64::from(cell_size);
    let fit = |cells: u64, min: u32| -> Option<u32> {
        let content = cells.checked_mul(cs)?.max(cs * MIN_VISIBLE_CELLS);
        let total = content.checked_add(2 * u64::from(PADDING))?.max(u64::from(min));
        u32::try_from(total).ok()
    };
    match (fit(bounds.width(), MIN_CANVAS_WIDTH), fit(bounds.height(), MIN_CANVAS_HEIGHT)) {
        (Some(w), Some(h)) => Ok((w, h)),
        _ => bail!(
            "Drawing surface unavailable: {}x{} cells at {} px per cell does not fit in an image",
            bounds.width(),
            bounds.height(),
            cell_size
        ),
    }
}

/// Rounds both dimensions up to even numbers, as YUV 4:2:0 requires.
pub fn even_size((w, h): (u32, u32)) -> (u32, u32) {
    (w + w % 2, h + h % 2)
}

/// Paints the ant world into image frames.
///
/// Mirrors an animation loop: frames are only produced by `tick` while the
/// renderer is running, each advancing the simulation by `steps_per_frame`.
pub struct Renderer {
    ant: LangtonsAnt,
    start: Coord,
    cell_size: u32,
    steps_per_frame: u32,
    is_running: bool,
    colors: Colors,
}

impl Renderer {
    pub fn new(cell_size: u32, steps_per_frame: u32, start: Coord, colors: Colors) -> Result<Self> {
        if cell_size == 0 {
            bail!("Drawing surface unavailable: cell size must be at least 1 pixel");
        }
        let renderer = Self {
            ant: LangtonsAnt::at(start),
            start,
            cell_size,
            steps_per_frame,
            is_running: false,
            colors,
        };
        // Fails early if even the initial canvas cannot be allocated.
        canvas_size(&renderer.ant.grid_bounds(), cell_size)?;
        Ok(renderer)
    }

    pub fn start(&mut self) {
        self.is_running = true;
    }

    pub fn stop(&mut self) {
        self.is_running = false;
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    /// Runs one frame's worth of steps without painting. Returns false while stopped.
    pub fn advance(&mut self) -> bool {
        if !self.is_running {
            return false;
        }
        self.ant.run(u64::from(self.steps_per_frame));
        true
    }

    /// One animation frame: `steps_per_frame` steps, then paint. `None` while stopped.
    pub fn tick(&mut self) -> Result<Option<RgbaImage>> {
        if !self.advance() {
            return Ok(None);
        }
        self.draw().map(Some)
    }

    /// Runs `steps` steps headlessly, regardless of the running flag.
    pub fn fast_forward(&mut self, steps: u64) {
        self.ant.run(steps);
    }

    /// Single manual step followed by a paint.
    pub fn step(&mut self) -> Result<RgbaImage> {
        self.ant.step();
        self.draw()
    }

    /// Paints the current state on a canvas sized from the current bounds.
    pub fn draw(&self) -> Result<RgbaImage> {
        let bounds = self.ant.grid_bounds();
        let (width, height) = canvas_size(&bounds, self.cell_size)?;
        Ok(self.paint(width, height, &bounds))
    }

    /// Stops and replaces the simulation with a fresh one at the original start.
    pub fn reset(&mut self) {
        self.stop();
        self.ant = LangtonsAnt::at(self.start);
    }

    pub fn set_steps_per_frame(&mut self, steps: u32) {
        self.steps_per_frame = steps;
    }

    pub fn ant(&self) -> &LangtonsAnt {
        &self.ant
    }

    /// Paints onto a fixed `width` x `height` canvas, placing `frame_bounds.min` at the padding corner.
    pub fn paint(&self, width: u32, height: u32, frame_bounds: &GridBounds) -> RgbaImage {
        let cs = i64::from(self.cell_size);
        let offset_x = i64::from(PADDING).saturating_sub(frame_bounds.min_x.saturating_mul(cs));
        let offset_y = i64::from(PADDING).saturating_sub(frame_bounds.min_y.saturating_mul(cs));
        let to_screen = |c: Coord| -> Option<(i32, i32)> {
            let x = i32::try_from(c.x.checked_mul(cs)?.checked_add(offset_x)?).ok()?;
            let y = i32::try_from(c.y.checked_mul(cs)?.checked_add(offset_y)?).ok()?;
            Some((x, y))
        };

        let mut image = ImageBuffer::from_pixel(width, height, self.colors.background);

        for cell in self.ant.marked_cells() {
            if let Some((x, y)) = to_screen(cell) {
                draw_filled_rect_mut(&mut image, Rect::at(x, y).of_size(self.cell_size, self.cell_size), self.colors.cell);
            }
        }

        let Some((ax, ay)) = to_screen(self.ant.ant_position()) else {
            return image;
        };

        // Ant body, one pixel larger than a cell on every side, with a 2 px outline.
        let body = self.cell_size + 2;
        draw_filled_rect_mut(&mut image, Rect::at(ax - 1, ay - 1).of_size(body, body), self.colors.ant);
        draw_hollow_rect_mut(&mut image, Rect::at(ax - 1, ay - 1).of_size(body, body), self.colors.outline);
        draw_hollow_rect_mut(&mut image, Rect::at(ax - 2, ay - 2).of_size(body + 2, body + 2), self.colors.outline);

        let half = self.cell_size as f32 / 2.0;
        let indicator = heading_indicator(
            ax as f32 + half,
            ay as f32 + half,
            self.ant.ant_direction(),
            self.cell_size as f32 * HEADING_LENGTH_FACTOR,
        );
        draw_filled_rect_mut(&mut image, indicator, self.colors.heading);

        image
    }
}

/// Thick axis-aligned line from the ant's centre towards its heading.
fn heading_indicator(cx: f32, cy: f32, heading: Heading, length: f32) -> Rect {
    let half_width = HEADING_LINE_WIDTH / 2.0;
    let (dx, dy) = heading.delta();
    let (ex, ey) = (cx + dx as f32 * length, cy + dy as f32 * length);

    let pad_x = if dx == 0 { half_width } else { 0.0 };
    let pad_y = if dy == 0 { half_width } else { 0.0 };
    let (x0, x1) = (cx.min(ex) - pad_x, cx.max(ex) + pad_x);
    let (y0, y1) = (cy.min(ey) - pad_y, cy.max(ey) + pad_y);

    Rect::at(x0.round() as i32, y0.round() as i32)
        .of_size(((x1 - x0).round() as u32).max(1), ((y1 - y0).round() as u32).max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn renderer() -> Renderer {
        Renderer::new(5, 1, Coord::origin(), Colors::default()).unwrap()
    }

    #[test]
    fn zero_cell_size_is_refused() {
        let err = Renderer::new(0, 1, Coord::origin(), Colors::default()).err().unwrap();
        assert!(err.to_string().contains("surface unavailable"));
    }

    #[test]
    fn small_worlds_use_minimum_canvas() {
        let bounds = GridBounds::around(Coord::origin());
        assert_eq!(canvas_size(&bounds, 5).unwrap(), (800, 600));
    }

    #[test]
    fn large_worlds_grow_the_canvas() {
        let bounds = GridBounds { min_x: -100, max_x: 99, min_y: 0, max_y: 149 };
        // 200 * 5 + 100, 150 * 5 + 100
        assert_eq!(canvas_size(&bounds, 5).unwrap(), (1100, 850));
    }

    #[test]
    fn oversized_canvas_is_an_error() {
        let bounds = GridBounds { min_x: i64::MIN / 2, max_x: i64::MAX / 2, min_y: 0, max_y: 0 };
        assert!(canvas_size(&bounds, 5).is_err());
    }

    #[test]
    fn even_size_rounds_up() {
        assert_eq!(even_size((801, 600)), (802, 600));
        assert_eq!(even_size((800, 455)), (800, 456));
    }

    #[test]
    fn initial_frame_shows_ant_on_background() {
        let r = renderer();
        let frame = r.draw().unwrap();
        let colors = Colors::default();
        assert_eq!(frame.dimensions(), (800, 600));
        assert_eq!(*frame.get_pixel(0, 0), colors.background);
        assert_eq!(*frame.get_pixel(50, 54), colors.ant);
        assert_eq!(*frame.get_pixel(49, 52), colors.outline);
        // Heading indicator points north from the cell centre.
        assert_eq!(*frame.get_pixel(52, 50), colors.heading);
    }

    #[test]
    fn marked_cells_are_painted() {
        let mut r = renderer();
        let frame = r.step().unwrap();
        let colors = Colors::default();
        // (0, 0) is now marked and the ant sits on (1, 0).
        assert_eq!(*frame.get_pixel(51, 53), colors.cell);
        assert_eq!(*frame.get_pixel(60, 52), colors.heading);
    }

    #[test]
    fn tick_only_advances_while_running() {
        let mut r = renderer();
        r.set_steps_per_frame(10);
        assert!(r.tick().unwrap().is_none());
        assert_eq!(r.ant().steps_taken(), 0);

        r.start();
        assert!(r.is_running());
        assert!(r.tick().unwrap().is_some());
        assert!(r.tick().unwrap().is_some());
        assert_eq!(r.ant().steps_taken(), 20);

        r.stop();
        assert!(r.tick().unwrap().is_none());
        assert!(!r.advance());
        assert_eq!(r.ant().steps_taken(), 20);

        r.fast_forward(5);
        assert_eq!(r.ant().steps_taken(), 25);
    }

    #[test]
    fn reset_returns_to_start_and_stops() {
        let mut r = Renderer::new(3, 5, Coord::new(4, 4), Colors::default()).unwrap();
        r.start();
        r.tick().unwrap();
        r.reset();
        assert!(!r.is_running());
        assert_eq!(r.ant().steps_taken(), 0);
        assert_eq!(r.ant().ant_position(), Coord::new(4, 4));
        assert_eq!(r.ant().marked_cell_count(), 0);
    }

    #[test]
    fn fixed_canvas_keeps_requested_size() {
        let mut r = renderer();
        r.start();
        r.tick().unwrap();
        let bounds = GridBounds { min_x: -10, max_x: 10, min_y: -10, max_y: 10 };
        let frame = r.paint(1002, 900, &bounds);
        assert_eq!(frame.dimensions(), (1002, 900));
        // Cell (0, 0) lands 10 cells right of the padding corner.
        assert_eq!(*frame.get_pixel(50 + 50 + 1, 50 + 50 + 3), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn indicator_geometry_follows_heading() {
        let east = heading_indicator(10.0, 10.0, Heading::East, 7.0);
        assert_eq!((east.left(), east.top(), east.width(), east.height()), (10, 8, 7, 4));
        let north = heading_indicator(10.0, 10.0, Heading::North, 7.0);
        assert_eq!((north.left(), north.top(), north.width(), north.height()), (8, 3, 4, 7));
    }
}
