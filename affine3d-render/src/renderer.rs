/// Orthographic rasterizer with terminal and image output
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use image::{ImageError, Rgb, RgbImage};
use log::debug;
use nalgebra::{Point3, Vector3};
use std::io::Write;
use std::path::Path;

use affine3d_core::KernelResult;

use crate::scenes::Scene;

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &['.', ':', '-', '=', '+', '*', '#', '%', '@'];

const EDGE_CHAR: char = 'o';
const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const EDGE_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

/// Terminal cells are roughly twice as tall as they are wide
pub const TERMINAL_CELL_ASPECT: f64 = 2.0;

/// Light reaching faces seen edge-on
const AMBIENT: f64 = 0.35;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Fragment {
    color: Rgb<u8>,
    shade: f64,
    edge: bool,
}

/// A face in screen space: corners are (column, row, depth)
struct ScreenPolygon {
    corners: Vec<(f64, f64, f64)>,
    color: Rgb<u8>,
    shade: f64,
}

/// Depth-buffered rasterizer for flat-shaded polygons
pub struct Rasterizer {
    width: usize,
    height: usize,
    cell_aspect: f64,
    depth_buffer: Vec<f64>,
    fragments: Vec<Option<Fragment>>,
}

impl Rasterizer {
    /// Rasterizer with square pixels
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_cell_aspect(width, height, 1.0)
    }

    pub fn for_terminal(width: usize, height: usize) -> Self {
        Self::with_cell_aspect(width, height, TERMINAL_CELL_ASPECT)
    }

    pub fn with_cell_aspect(width: usize, height: usize, cell_aspect: f64) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            cell_aspect,
            depth_buffer: vec![f64::NEG_INFINITY; size],
            fragments: vec![None; size],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f64::NEG_INFINITY);
        self.fragments.fill(None);
    }

    /// Number of cells covered by any face
    pub fn covered(&self) -> usize {
        self.fragments.iter().filter(|f| f.is_some()).count()
    }

    /// Draw every layer of `scene` seen from its view angles
    pub fn render_scene(&mut self, scene: &Scene) -> KernelResult<()> {
        let view = scene.view.matrix();
        let extent = scene.limit * 3.0_f64.sqrt();

        let mut polygons = Vec::new();
        for layer in &scene.layers {
            for polygon in layer.shape.transformed(&view).polygons()? {
                polygons.push(self.project(&polygon, layer.color, extent));
            }
        }

        for polygon in &polygons {
            self.fill_polygon(polygon);
        }
        // Edges go on top of every fill so hidden ones fail the depth test
        let bias = extent * 1e-3;
        for polygon in &polygons {
            self.stroke_polygon(polygon, bias);
        }

        debug!(
            "rasterized {} polygons, {} of {} cells covered",
            polygons.len(),
            self.covered(),
            self.width * self.height
        );
        Ok(())
    }

    fn project(&self, polygon: &[Point3<f64>], color: Rgb<u8>, extent: f64) -> ScreenPolygon {
        let scale = (self.width as f64 / self.cell_aspect).min(self.height as f64) / (2.0 * extent);
        let (cx, cy) = (self.width as f64 / 2.0, self.height as f64 / 2.0);

        let corners = polygon
            .iter()
            .map(|p| (cx + p.x * scale * self.cell_aspect, cy - p.y * scale, p.z))
            .collect();

        let normal = face_normal(polygon);
        let shade = match normal.try_normalize(f64::EPSILON) {
            Some(n) => AMBIENT + (1.0 - AMBIENT) * n.z.abs(),
            None => AMBIENT,
        };

        ScreenPolygon {
            corners,
            color,
            shade,
        }
    }

    fn fill_polygon(&mut self, polygon: &ScreenPolygon) {
        let fragment = Fragment {
            color: polygon.color,
            shade: polygon.shade,
            edge: false,
        };
        // Faces are convex, so a fan covers them
        for i in 1..polygon.corners.len().saturating_sub(1) {
            let triangle = [polygon.corners[0], polygon.corners[i], polygon.corners[i + 1]];
            self.rasterize_triangle(&triangle, fragment);
        }
    }

    fn rasterize_triangle(&mut self, coords: &[(f64, f64, f64); 3], fragment: Fragment) {
        let [v0, v1, v2] = *coords;

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor() as i64;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i64;
        let min_y = v0.1.min(v1.1).min(v2.1).floor() as i64;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i64;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i64 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i64 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f64 + 0.5;
                let py = y as f64 + 0.5;

                if let Some((w0, w1, w2)) =
                    barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), (px, py))
                {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                        self.plot(x, y, depth, fragment);
                    }
                }
            }
        }
    }

    fn stroke_polygon(&mut self, polygon: &ScreenPolygon, bias: f64) {
        let edge = Fragment {
            color: polygon.color,
            shade: polygon.shade,
            edge: true,
        };
        let n = polygon.corners.len();
        for i in 0..n {
            let a = polygon.corners[i];
            let b = polygon.corners[(i + 1) % n];
            let steps = (b.0 - a.0).abs().max((b.1 - a.1).abs()).ceil().max(1.0) as usize;

            for step in 0..=steps {
                let t = step as f64 / steps as f64;
                let x = (a.0 + (b.0 - a.0) * t).floor() as i64;
                let y = (a.1 + (b.1 - a.1) * t).floor() as i64;
                let depth = a.2 + (b.2 - a.2) * t;
                self.plot(x, y, depth + bias, edge);
            }
        }
    }

    /// Write `fragment` at (x, y) if it is at least as close as what is there
    fn plot(&mut self, x: i64, y: i64, depth: f64, fragment: Fragment) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        if depth >= self.depth_buffer[idx] {
            self.depth_buffer[idx] = depth;
            self.fragments[idx] = Some(fragment);
        }
    }

    /// Write the frame as colored ASCII
    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                match self.fragments[y * self.width + x] {
                    None => {
                        writer.queue(Print(' '))?;
                    }
                    Some(fragment) if fragment.edge => {
                        writer.queue(SetForegroundColor(Color::DarkGrey))?;
                        writer.queue(Print(EDGE_CHAR))?;
                    }
                    Some(fragment) => {
                        let Rgb([r, g, b]) = fragment.color;
                        writer.queue(SetForegroundColor(Color::Rgb { r, g, b }))?;
                        writer.queue(Print(ramp_char(fragment.shade)))?;
                    }
                }
            }
            writer.queue(Print('\n'))?;
        }
        writer.queue(ResetColor)?;
        Ok(())
    }

    /// Frame as an RGB image on a white background with black edges
    pub fn to_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            match self.fragments[y as usize * self.width + x as usize] {
                None => BACKGROUND,
                Some(fragment) if fragment.edge => EDGE_COLOR,
                Some(fragment) => shaded(fragment.color, fragment.shade),
            }
        })
    }

    /// Save the frame; the format follows the file extension
    pub fn save_image(&self, path: &Path) -> Result<(), ImageError> {
        self.to_image().save(path)
    }
}

fn ramp_char(shade: f64) -> char {
    let index = (shade.clamp(0.0, 1.0) * (LUMINOSITY_RAMP.len() - 1) as f64).round() as usize;
    LUMINOSITY_RAMP[index.min(LUMINOSITY_RAMP.len() - 1)]
}

fn shaded(color: Rgb<u8>, shade: f64) -> Rgb<u8> {
    Rgb(color.0.map(|c| (c as f64 * shade).round().clamp(0.0, 255.0) as u8))
}

/// Newell's method; the length is twice the polygon area
fn face_normal(polygon: &[Point3<f64>]) -> Vector3<f64> {
    let mut normal = Vector3::zeros();
    for (i, a) in polygon.iter().enumerate() {
        let b = polygon[(i + 1) % polygon.len()];
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }
    normal
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f64, f64),
    v1: (f64, f64),
    v2: (f64, f64),
    p: (f64, f64),
) -> Option<(f64, f64, f64)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-12 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
