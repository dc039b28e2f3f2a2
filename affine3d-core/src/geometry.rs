/// Vertex batches, faces and shapes in homogeneous coordinates
use nalgebra::{DMatrix, Matrix3xX, Matrix4, Matrix4xX, Point3, Vector3};

use crate::error::{KernelError, KernelResult};
use crate::transform::Transform;

/// N vertices stored as the columns of a 4xN homogeneous matrix
#[derive(Debug, Clone, PartialEq)]
pub struct VertexBatch {
    columns: Matrix4xX<f64>,
}

impl VertexBatch {
    pub fn from_matrix(columns: Matrix4xX<f64>) -> Self {
        Self { columns }
    }

    /// Lift Cartesian points to homogeneous form with `w = 1`
    pub fn from_points(points: &[Point3<f64>]) -> Self {
        let mut columns = Matrix4xX::zeros(points.len());
        for (i, point) in points.iter().enumerate() {
            columns.set_column(i, &point.to_homogeneous());
        }
        Self { columns }
    }

    /// Accept a loosely-typed 4xN matrix
    pub fn from_homogeneous(matrix: &DMatrix<f64>) -> KernelResult<Self> {
        if matrix.nrows() != 4 {
            return Err(KernelError::shape("4xN", matrix.nrows(), matrix.ncols()));
        }
        Ok(Self {
            columns: Matrix4xX::from_iterator(matrix.ncols(), matrix.iter().copied()),
        })
    }

    /// Accept a loosely-typed 3xN matrix and lift it with `w = 1`
    pub fn from_cartesian(matrix: &DMatrix<f64>) -> KernelResult<Self> {
        if matrix.nrows() != 3 {
            return Err(KernelError::shape("3xN", matrix.nrows(), matrix.ncols()));
        }
        let mut columns = Matrix4xX::from_element(matrix.ncols(), 1.0);
        columns.fixed_rows_mut::<3>(0).copy_from(matrix);
        Ok(Self { columns })
    }

    pub fn len(&self) -> usize {
        self.columns.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn matrix(&self) -> &Matrix4xX<f64> {
        &self.columns
    }

    pub fn transformed(&self, transform: &Matrix4<f64>) -> Self {
        Transform::apply(transform, self)
    }

    /// Divide each column by its own `w`. A point at infinity (`w == 0`)
    /// has no Cartesian form and is reported as a domain error.
    pub fn to_cartesian(&self) -> KernelResult<Matrix3xX<f64>> {
        let mut cartesian = Matrix3xX::zeros(self.len());
        for (i, column) in self.columns.column_iter().enumerate() {
            let w = column[3];
            if w == 0.0 {
                return Err(KernelError::Domain(format!(
                    "vertex {} has w = 0 and lies at infinity",
                    i
                )));
            }
            cartesian.set_column(i, &Vector3::new(column[0] / w, column[1] / w, column[2] / w));
        }
        Ok(cartesian)
    }

    pub fn points(&self) -> KernelResult<Vec<Point3<f64>>> {
        Ok(self
            .to_cartesian()?
            .column_iter()
            .map(|c| Point3::new(c[0], c[1], c[2]))
            .collect())
    }
}

/// A planar polygon given by indices into a specific [`VertexBatch`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Face {
    indices: Vec<usize>,
}

impl Face {
    pub fn new(indices: Vec<usize>) -> KernelResult<Self> {
        if indices.len() < 3 {
            return Err(KernelError::Domain(format!(
                "a face needs at least 3 vertices, got {}",
                indices.len()
            )));
        }
        Ok(Self { indices })
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }
}

/// Vertices paired with the faces that index them
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub vertices: VertexBatch,
    pub faces: Vec<Face>,
}

impl Shape {
    pub fn new(vertices: VertexBatch, faces: Vec<Face>) -> Self {
        Self { vertices, faces }
    }

    /// Build a shape from Cartesian corners and raw face index lists
    pub fn from_parts(points: &[Point3<f64>], faces: &[&[usize]]) -> KernelResult<Self> {
        let faces = faces
            .iter()
            .map(|indices| Face::new(indices.to_vec()))
            .collect::<KernelResult<Vec<_>>>()?;
        Ok(Self::new(VertexBatch::from_points(points), faces))
    }

    /// The cube with corners at ±1 on every axis
    pub fn cube() -> Self {
        const XS: [f64; 8] = [-1.0, -1.0, 1.0, 1.0, -1.0, -1.0, 1.0, 1.0];
        const YS: [f64; 8] = [-1.0, 1.0, 1.0, -1.0, -1.0, 1.0, 1.0, -1.0];
        const ZS: [f64; 8] = [-1.0, -1.0, -1.0, -1.0, 1.0, 1.0, 1.0, 1.0];
        const FACES: [[usize; 4]; 6] = [
            [0, 1, 2, 3],
            [4, 5, 6, 7],
            [0, 1, 5, 4],
            [2, 3, 7, 6],
            [0, 3, 7, 4],
            [1, 2, 6, 5],
        ];

        let points: Vec<_> = (0..8).map(|i| Point3::new(XS[i], YS[i], ZS[i])).collect();
        let faces = FACES
            .iter()
            .map(|f| Face {
                indices: f.to_vec(),
            })
            .collect();
        Self::new(VertexBatch::from_points(&points), faces)
    }

    pub fn transformed(&self, transform: &Matrix4<f64>) -> Self {
        Self {
            vertices: self.vertices.transformed(transform),
            faces: self.faces.clone(),
        }
    }

    /// Resolve every face into its Cartesian corner points
    pub fn polygons(&self) -> KernelResult<Vec<Vec<Point3<f64>>>> {
        let points = self.vertices.points()?;
        self.faces
            .iter()
            .map(|face| {
                face.indices()
                    .iter()
                    .map(|&i| {
                        points.get(i).copied().ok_or_else(|| KernelError::ShapeMismatch {
                            expected: format!("vertex index below {}", points.len()),
                            found: i.to_string(),
                        })
                    })
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use nalgebra::{Matrix3xX, Vector4};
    use std::f64::consts::FRAC_PI_3;

    fn sample_points() -> Vec<Point3<f64>> {
        vec![
            Point3::new(1.0, 2.0, 3.0),
            Point3::new(-0.5, 0.0, 4.0),
            Point3::new(0.0, -7.0, 0.25),
        ]
    }

    #[test]
    fn test_lift_sets_unit_w() {
        let batch = VertexBatch::from_points(&sample_points());
        assert_eq!(batch.len(), 3);
        assert!(batch.matrix().row(3).iter().all(|&w| w == 1.0));
        assert_eq!(batch.points().unwrap(), sample_points());
    }

    #[test]
    fn test_empty_batch() {
        let batch = VertexBatch::from_points(&[]);
        assert!(batch.is_empty());
        assert_eq!(batch.to_cartesian().unwrap().ncols(), 0);
    }

    #[test]
    fn test_to_cartesian_divides_by_w() {
        let batch = VertexBatch::from_matrix(Matrix4xX::from_columns(&[
            Vector4::new(2.0, 4.0, 6.0, 2.0),
            Vector4::new(-1.0, 1.0, 3.0, -0.5),
        ]));
        let cartesian = batch.to_cartesian().unwrap();
        let expected = Matrix3xX::from_columns(&[Vector3::new(1.0, 2.0, 3.0), Vector3::new(2.0, -2.0, -6.0)]);
        assert_eq!(cartesian, expected);
    }

    #[test]
    fn test_point_at_infinity_is_rejected() {
        let batch = VertexBatch::from_matrix(Matrix4xX::from_columns(&[
            Vector4::new(1.0, 1.0, 1.0, 1.0),
            Vector4::new(1.0, 0.0, 0.0, 0.0),
        ]));
        let err = batch.to_cartesian().unwrap_err();
        assert!(matches!(err, KernelError::Domain(ref msg) if msg.contains("vertex 1")));
    }

    #[test]
    fn test_checked_constructors() {
        let cartesian = DMatrix::from_row_slice(3, 2, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let batch = VertexBatch::from_cartesian(&cartesian).unwrap();
        assert_eq!(batch.points().unwrap(), vec![Point3::new(1.0, 3.0, 5.0), Point3::new(2.0, 4.0, 6.0)]);

        // A 3xN batch cannot be fed where a homogeneous one is expected
        let err = VertexBatch::from_homogeneous(&cartesian).unwrap_err();
        assert!(matches!(err, KernelError::ShapeMismatch { .. }));

        let homogeneous = DMatrix::from_column_slice(4, 1, &[2.0, 2.0, 2.0, 2.0]);
        let batch = VertexBatch::from_homogeneous(&homogeneous).unwrap();
        assert_eq!(batch.points().unwrap(), vec![Point3::new(1.0, 1.0, 1.0)]);

        assert!(VertexBatch::from_cartesian(&homogeneous).is_err());
    }

    #[test]
    fn test_apply_does_not_mutate_input() {
        let batch = VertexBatch::from_points(&sample_points());
        let before = batch.clone();
        let moved = Transform::apply(&Transform::translation(1.0, 1.0, 1.0), &batch);
        assert_eq!(batch, before);
        assert_ne!(moved, batch);
    }

    #[test]
    fn test_translation_round_trip() {
        let (tx, ty, tz) = (0.5, -3.0, 12.25);
        let batch = VertexBatch::from_points(&sample_points());
        let moved = Transform::apply(&Transform::translation(tx, ty, tz), &batch);
        for (p, q) in sample_points().iter().zip(moved.points().unwrap()) {
            assert_relative_eq!(q, *p + Vector3::new(tx, ty, tz), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_apply_composite_equals_sequential() {
        let a = Transform::rotation(&Vector3::new(1.0, -1.0, 0.5), 0.9).unwrap();
        let b = Transform::compose(&[Transform::translation(2.0, 0.0, -1.0), Transform::scale(1.5, 0.5, 2.0)]);
        let batch = VertexBatch::from_points(&sample_points());

        let at_once = Transform::apply(&Transform::compose(&[a, b]), &batch);
        let in_turn = Transform::apply(&a, &Transform::apply(&b, &batch));
        assert_relative_eq!(at_once.matrix(), in_turn.matrix(), epsilon = 1e-12);
    }

    #[test]
    fn test_face_needs_three_indices() {
        assert!(Face::new(vec![0, 1]).is_err());
        assert_eq!(Face::new(vec![0, 1, 2]).unwrap().indices(), &[0, 1, 2]);
    }

    #[test]
    fn test_cube_layout() {
        let cube = Shape::cube();
        assert_eq!(cube.vertices.len(), 8);
        assert_eq!(cube.faces.len(), 6);

        // Every face is an axis-aligned square on one side of the cube
        for polygon in cube.polygons().unwrap() {
            assert_eq!(polygon.len(), 4);
            let fixed = (0..3).filter(|&axis| polygon.iter().all(|p| p[axis] == polygon[0][axis]));
            assert_eq!(fixed.count(), 1);
        }
    }

    #[test]
    fn test_rotated_cube_corner() {
        let r = Transform::rotation(&Vector3::y(), FRAC_PI_3).unwrap();
        let points = Shape::cube().transformed(&r).vertices.points().unwrap();
        let (s, c) = FRAC_PI_3.sin_cos();

        // Vertex 6 is (1, 1, 1)
        assert_relative_eq!(points[6], Point3::new(c + s, 1.0, c - s), epsilon = 1e-9);
        // Rotation about Y keeps every y coordinate
        for (before, after) in Shape::cube().vertices.points().unwrap().iter().zip(&points) {
            assert_abs_diff_eq!(before.y, after.y, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_polygons_reject_bad_index() {
        let shape = Shape::from_parts(
            &[Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)],
            &[&[0, 1, 3]],
        )
        .unwrap();
        let err = shape.polygons().unwrap_err();
        assert!(matches!(err, KernelError::ShapeMismatch { .. }));
    }
}
