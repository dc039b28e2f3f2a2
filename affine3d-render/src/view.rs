/// Viewing direction for the orthographic renderer
use affine3d_core::Transform;
use nalgebra::Matrix4;
use std::f64::consts::FRAC_PI_2;

/// Elevation above the XY plane and azimuth around Z, both in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewAngles {
    pub elevation: f64,
    pub azimuth: f64,
}

impl ViewAngles {
    pub fn new(elevation: f64, azimuth: f64) -> Self {
        Self {
            elevation,
            azimuth,
        }
    }

    /// World to view coordinates: x to the right, y up, z toward the viewer
    pub fn matrix(&self) -> Matrix4<f64> {
        let elevation = self.elevation.to_radians();
        let azimuth = self.azimuth.to_radians();
        Transform::compose(&[
            Transform::rotation_x(elevation - FRAC_PI_2),
            Transform::rotation_z(-(azimuth + FRAC_PI_2)),
        ])
    }
}

impl Default for ViewAngles {
    fn default() -> Self {
        Self::new(30.0, -60.0)
    }
}
