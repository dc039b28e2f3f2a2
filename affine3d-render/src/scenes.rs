/// Scenes reproduced from the transformation exercises
use std::f64::consts::{FRAC_PI_3, FRAC_PI_4, FRAC_PI_6};
use std::fmt;
use std::str::FromStr;

use affine3d_core::{CameraPose, KernelResult, Shape, Transform};
use image::Rgb;
use log::info;
use nalgebra::{Point3, Vector3};

use crate::view::ViewAngles;
use crate::RenderError;

pub const RED: Rgb<u8> = Rgb([214, 39, 40]);
pub const BLUE: Rgb<u8> = Rgb([31, 119, 180]);
pub const CYAN: Rgb<u8> = Rgb([23, 190, 207]);
pub const GREEN: Rgb<u8> = Rgb([44, 160, 44]);

/// A shape drawn in a single flat color
#[derive(Debug, Clone)]
pub struct Layer {
    pub shape: Shape,
    pub color: Rgb<u8>,
}

impl Layer {
    pub fn new(shape: Shape, color: Rgb<u8>) -> Self {
        Self { shape, color }
    }
}

/// Transformed shapes ready for the renderer, with the half-width of the
/// plotted box and the viewing direction.
#[derive(Debug, Clone)]
pub struct Scene {
    pub layers: Vec<Layer>,
    pub limit: f64,
    pub view: ViewAngles,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneKind {
    Scaling,
    Rotation,
    Boxes,
    Camera,
}

impl SceneKind {
    pub const ALL: [SceneKind; 4] = [
        SceneKind::Scaling,
        SceneKind::Rotation,
        SceneKind::Boxes,
        SceneKind::Camera,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SceneKind::Scaling => "scaling",
            SceneKind::Rotation => "rotation",
            SceneKind::Boxes => "boxes",
            SceneKind::Camera => "camera",
        }
    }

    pub fn build(self) -> KernelResult<Scene> {
        match self {
            SceneKind::Scaling => Ok(scaling()),
            SceneKind::Rotation => rotation(),
            SceneKind::Boxes => boxes(),
            SceneKind::Camera => camera(),
        }
    }
}

impl fmt::Display for SceneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SceneKind {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SceneKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| RenderError::Usage(format!("unknown scene '{}'", s)))
    }
}

/// The 4x4x4 box spanning x in [-2, 2], y in [-5, -1], z in [-2, 2]
pub fn tall_box() -> KernelResult<Shape> {
    const XS: [f64; 8] = [2.0, 2.0, 2.0, 2.0, -2.0, -2.0, -2.0, -2.0];
    const YS: [f64; 8] = [-1.0, -1.0, -5.0, -5.0, -1.0, -1.0, -5.0, -5.0];
    const ZS: [f64; 8] = [2.0, -2.0, 2.0, -2.0, 2.0, -2.0, 2.0, -2.0];

    let points: Vec<_> = (0..8).map(|i| Point3::new(XS[i], YS[i], ZS[i])).collect();
    Shape::from_parts(
        &points,
        &[
            &[0, 1, 3, 2],
            &[5, 4, 6, 7],
            &[6, 2, 0, 4],
            &[4, 0, 1, 5],
            &[5, 7, 3, 1],
            &[6, 2, 3, 7],
        ],
    )
}

/// Cube squashed to half width along X and half depth along Z
pub fn scaling() -> Scene {
    let s1 = Transform::scale(0.5, 1.0, 1.0);
    let s2 = Transform::scale(1.0, 1.0, 0.5);
    let total = Transform::compose(&[s1, s2]);
    info!("composite scale S1 @ S2:{}", total);

    Scene {
        layers: vec![Layer::new(Shape::cube().transformed(&total), RED)],
        limit: 1.0,
        view: ViewAngles::new(30.0, -37.5),
    }
}

/// Cube turned by pi/4 about Z, then by pi/3 about Y
pub fn rotation() -> KernelResult<Scene> {
    let total = Transform::compose(&[
        Transform::rotation(&Vector3::y(), FRAC_PI_3)?,
        Transform::rotation(&Vector3::z(), FRAC_PI_4)?,
    ]);
    info!("composite rotation:{}", total);

    Ok(Scene {
        layers: vec![Layer::new(Shape::cube().transformed(&total), RED)],
        limit: 1.0,
        view: ViewAngles::new(30.0, -37.5),
    })
}

/// The cube next to the larger box, untransformed
pub fn boxes() -> KernelResult<Scene> {
    Ok(Scene {
        layers: vec![
            Layer::new(Shape::cube(), RED),
            Layer::new(tall_box()?, BLUE),
        ],
        limit: 5.0,
        view: ViewAngles::new(30.0, 30.0),
    })
}

pub fn camera_pose() -> CameraPose {
    CameraPose::new(Vector3::new(5.0, 5.0, 5.0), FRAC_PI_4, -FRAC_PI_6, 0.0)
}

/// Three shapes mapped into the camera's coordinate system through `C⁻¹`
pub fn camera() -> KernelResult<Scene> {
    let lifted = Transform::compose(&[
        Transform::translation(0.0, 3.0, 0.0),
        Transform::rotation(&Vector3::z(), FRAC_PI_4)?,
    ]);

    let pose = camera_pose();
    let c = pose.matrix();
    info!("camera matrix C:{}", c);
    let c_inv = pose.view_matrix()?;
    info!("inverse camera matrix C^-1:{}", c_inv);
    info!(
        "camera at {:?}, yaw/pitch/roll {:.1}°/{:.1}°/{:.1}°",
        pose.position.as_slice(),
        pose.yaw.to_degrees(),
        pose.pitch.to_degrees(),
        pose.roll.to_degrees()
    );

    let layers = vec![
        Layer::new(tall_box()?, CYAN),
        Layer::new(Shape::cube(), BLUE),
        Layer::new(Shape::cube().transformed(&lifted), GREEN),
    ]
    .into_iter()
    .map(|layer| Layer::new(layer.shape.transformed(&c_inv), layer.color))
    .collect();

    Ok(Scene {
        layers,
        limit: 10.0,
        view: ViewAngles::new(0.0, 0.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn extent(shape: &Shape, axis: usize) -> (f64, f64) {
        let points = shape.vertices.points().unwrap();
        let values = points.iter().map(|p| p[axis]);
        (
            values.clone().fold(f64::INFINITY, f64::min),
            values.fold(f64::NEG_INFINITY, f64::max),
        )
    }

    #[test]
    fn test_scene_names_round_trip() {
        for kind in SceneKind::ALL {
            assert_eq!(kind.name().parse::<SceneKind>().unwrap(), kind);
        }
        assert!("teapot".parse::<SceneKind>().is_err());
    }

    #[test]
    fn test_every_scene_builds() {
        for kind in SceneKind::ALL {
            let scene = kind.build().unwrap();
            assert!(!scene.layers.is_empty());
            for layer in &scene.layers {
                assert!(layer.shape.polygons().is_ok());
            }
        }
    }

    #[test]
    fn test_scaling_halves_x_and_z() {
        let scene = scaling();
        let cube = &scene.layers[0].shape;
        assert_eq!(extent(cube, 0), (-0.5, 0.5));
        assert_eq!(extent(cube, 1), (-1.0, 1.0));
        assert_eq!(extent(cube, 2), (-0.5, 0.5));
    }

    #[test]
    fn test_rotation_preserves_corner_distance() {
        let scene = rotation().unwrap();
        for p in scene.layers[0].shape.vertices.points().unwrap() {
            assert_relative_eq!(p.coords.norm(), 3.0_f64.sqrt(), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_tall_box_bounds() {
        let shape = tall_box().unwrap();
        assert_eq!(extent(&shape, 0), (-2.0, 2.0));
        assert_eq!(extent(&shape, 1), (-5.0, -1.0));
        assert_eq!(extent(&shape, 2), (-2.0, 2.0));
    }

    #[test]
    fn test_camera_scene_uses_inverse_camera() {
        let scene = camera().unwrap();
        let c_inv = camera_pose().view_matrix().unwrap();

        let cube = &scene.layers[1].shape;
        assert_relative_eq!(
            cube.vertices.matrix(),
            Shape::cube().transformed(&c_inv).vertices.matrix(),
            epsilon = 1e-12
        );

        // Green cube is centred on (0, 3, 0) before the camera transform
        let points = scene.layers[2].shape.vertices.points().unwrap();
        let centroid = points.iter().fold(Vector3::zeros(), |acc, p| acc + p.coords) / points.len() as f64;
        let expected = c_inv.transform_point(&Point3::new(0.0, 3.0, 0.0));
        assert_relative_eq!(centroid, expected.coords, epsilon = 1e-9);
    }
}
