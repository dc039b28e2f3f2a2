/// Affine3D Core Library - homogeneous transform kernel
///
/// Builds and composes 4x4 homogeneous matrices (scale, axis-angle rotation,
/// translation, camera view) and applies them to batches of vertices.
/// Everything here is a pure function over value types.

pub mod error;
pub mod geometry;
pub mod transform;

// Re-export commonly used types
pub use error::{KernelError, KernelResult};
pub use geometry::{Face, Shape, VertexBatch};
pub use transform::{CameraPose, RotationMethod, Transform};
