/// Renderer and scene pipelines for the transform kernel
///
/// Each scene builds shapes, transforms them with `affine3d-core`, then draws
/// the result as an ASCII frame and optionally saves it as an image.
use crossterm::terminal;
use log::info;
use std::io::{self, stdout, Write};
use std::path::PathBuf;
use thiserror::Error;

use affine3d_core::KernelError;

pub mod renderer;
pub mod scenes;
pub mod view;

pub use renderer::Rasterizer;
pub use scenes::{Layer, Scene, SceneKind};
pub use view::ViewAngles;

pub const USAGE: &str = "Usage: affine3d-render [scaling|rotation|boxes|camera] [--output PATH] [--no-image] [--size WxH] [--no-terminal]\n\nThe image is saved to <scene>.jpg unless --output or --no-image is given.";

/// Largest accepted image side in pixels
pub const MAX_IMAGE_SIDE: usize = 8192;

/// Fallback when stdout is not a terminal
const DEFAULT_TERMINAL_SIZE: (u16, u16) = (80, 24);

#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Kernel(#[from] KernelError),

    #[error("Failed to write image: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("{0}")]
    Usage(String),
}

/// Command line configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub scene: SceneKind,
    pub output: Option<PathBuf>,
    pub image_size: (usize, usize),
    pub terminal: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            scene: SceneKind::Camera,
            output: Some(default_output(SceneKind::Camera)),
            image_size: (800, 800),
            terminal: true,
        }
    }
}

impl RenderOptions {
    /// Parse arguments, without the program name
    pub fn from_args<I, S>(args: I) -> Result<Self, RenderError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut options = Self::default();
        let mut output = None;
        let mut save_image = true;
        let mut args = args.into_iter().map(Into::into);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--output" | "-o" => {
                    let path = args.next().ok_or_else(|| missing_value(&arg))?;
                    output = Some(PathBuf::from(path));
                }
                "--size" => {
                    let size = args.next().ok_or_else(|| missing_value(&arg))?;
                    options.image_size = parse_size(&size)?;
                }
                "--no-image" => save_image = false,
                "--no-terminal" => options.terminal = false,
                flag if flag.starts_with('-') => {
                    return Err(RenderError::Usage(format!("unknown option '{}'", flag)));
                }
                scene => options.scene = scene.parse()?,
            }
        }

        options.output = if save_image {
            Some(output.unwrap_or_else(|| default_output(options.scene)))
        } else {
            None
        };
        Ok(options)
    }
}

/// Each scene is saved next to the working directory as `<scene>.jpg`
fn default_output(scene: SceneKind) -> PathBuf {
    PathBuf::from(format!("{}.jpg", scene))
}

fn missing_value(flag: &str) -> RenderError {
    RenderError::Usage(format!("option '{}' needs a value", flag))
}

fn parse_size(size: &str) -> Result<(usize, usize), RenderError> {
    let invalid = || RenderError::Usage(format!("invalid size '{}', expected WxH", size));
    let (width, height) = size.split_once('x').ok_or_else(invalid)?;
    let width: usize = width.parse().map_err(|_| invalid())?;
    let height: usize = height.parse().map_err(|_| invalid())?;
    if width == 0 || height == 0 {
        return Err(invalid());
    }
    if width > MAX_IMAGE_SIDE || height > MAX_IMAGE_SIDE {
        return Err(RenderError::Usage(format!(
            "size '{}' exceeds the {}x{} limit",
            size, MAX_IMAGE_SIDE, MAX_IMAGE_SIDE
        )));
    }
    Ok((width, height))
}

/// Build the configured scene and send it to the requested outputs
pub fn run(options: &RenderOptions) -> Result<(), RenderError> {
    let scene = options.scene.build()?;
    info!("rendering scene '{}' with {} shapes", options.scene, scene.layers.len());

    if options.terminal {
        let (width, height) = terminal::size().unwrap_or(DEFAULT_TERMINAL_SIZE);
        // Leave the last row for the prompt
        let mut rasterizer = Rasterizer::for_terminal(width as usize, height.saturating_sub(1) as usize);
        rasterizer.render_scene(&scene)?;

        let mut stdout = stdout();
        rasterizer.draw(&mut stdout)?;
        stdout.flush()?;
    }

    if let Some(path) = &options.output {
        let (width, height) = options.image_size;
        let mut rasterizer = Rasterizer::new(width, height);
        rasterizer.render_scene(&scene)?;
        rasterizer.save_image(path)?;
        info!("saved {}x{} image to {}", width, height, path.display());
    }

    Ok(())
}
