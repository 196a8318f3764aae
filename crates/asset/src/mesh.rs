//! CPU-side mesh representation used by loaders.
//!
//! Vertices are stored interleaved (position, normal, uv) so the vertex
//! array can be handed to the GPU as-is; see [`crate::layout`].

use bytemuck::{Pod, Zeroable};
use corelib::{Mat4, Vec3, bounds::Aabb, transform::normal_matrix};

use crate::error::{MeshError, MeshResult};

/// Number of `f32` components in one interleaved vertex.
pub const FLOATS_PER_VERTEX: usize = 8;

/// Normal given to corners that have none until normals are recomputed.
pub const DEFAULT_NORMAL: [f32; 3] = [1.0, 0.0, 0.0];

/// Vertex with position/normal/uv. Values are in object space.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// Indexed triangle mesh with tightly-packed vertices.
///
/// Every index is smaller than the vertex count and the index count is a
/// multiple of 3; all constructors check this.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    vertices: Vec<MeshVertex>,
    indices: Vec<u32>,
}

impl Mesh {
    pub fn new(vertices: Vec<MeshVertex>, indices: Vec<u32>) -> MeshResult<Self> {
        let mesh = Self { vertices, indices };
        mesh.validate()?;
        Ok(mesh)
    }

    /// Build a mesh from a flat float array with 8 floats per vertex.
    pub fn from_interleaved(floats: &[f32], indices: Vec<u32>) -> MeshResult<Self> {
        if floats.len() % FLOATS_PER_VERTEX != 0 {
            return Err(MeshError::MisalignedVertices(floats.len()));
        }
        let vertices: &[MeshVertex] = bytemuck::cast_slice(floats);
        Self::new(vertices.to_vec(), indices)
    }

    /// Build an `n` x `n` grid on the y = 0 plane spanning [-1, 1] on x and z.
    ///
    /// Normals face down (0, -1, 0) and uvs span [0, 1]. Cells are two
    /// triangles each; the last column of every row starts no cell.
    pub fn create_grid(n: usize) -> MeshResult<Self> {
        if n < 2 {
            return Err(MeshError::GridTooSmall(n));
        }
        let side = u32::try_from(n).map_err(|_| MeshError::TooManyVertices)?;
        let vertex_count = side.checked_mul(side).ok_or(MeshError::TooManyVertices)?;

        let delta = 1.0 / (n as f32 - 1.0);
        let mut vertices = Vec::with_capacity(vertex_count as usize);
        for i in 0..n {
            for j in 0..n {
                let u = j as f32 * delta;
                let v = i as f32 * delta;
                vertices.push(MeshVertex::new(
                    [-1.0 + 2.0 * u, 0.0, -1.0 + 2.0 * v],
                    [0.0, -1.0, 0.0],
                    [u, v],
                ));
            }
        }

        let mut indices = Vec::with_capacity(6 * (n - 1) * (n - 1));
        for k in 0..side * (side - 1) {
            if (k + 1) % side == 0 {
                continue;
            }
            indices.extend_from_slice(&[k, k + 1, k + side]);
            indices.extend_from_slice(&[k + 1, k + side, k + side + 1]);
        }

        Self::new(vertices, indices)
    }

    /// Check the index buffer against the vertex array.
    pub fn validate(&self) -> MeshResult<()> {
        if self.indices.len() % 3 != 0 {
            return Err(MeshError::IncompleteTriangle(self.indices.len()));
        }
        let vertex_count = self.vertices.len();
        if let Some(&index) = self
            .indices
            .iter()
            .find(|&&index| index as usize >= vertex_count)
        {
            return Err(MeshError::VertexIndexOutOfRange {
                index,
                vertex_count,
            });
        }
        Ok(())
    }

    pub fn vertices(&self) -> &[MeshVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Interleaved vertex data as a flat float slice (8 floats per vertex).
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Vertex buffer contents ready for upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index buffer contents ready for upload (u32 elements).
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of indices to draw.
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }

    /// Bounds of all vertex positions, `None` when there are no vertices.
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.vertices.iter().map(|v| Vec3::from(v.position)))
    }

    /// Recompute normals from triangle geometry.
    ///
    /// Each triangle writes its face normal into its three corners, so a
    /// shared vertex keeps the normal of the last triangle that touched it.
    /// Degenerate triangles write nothing. Afterwards every normal is
    /// re-normalized; zero normals fall back to [`DEFAULT_NORMAL`].
    pub fn compute_normals(&mut self) {
        let mut degenerate = 0usize;
        for tri in self.indices.chunks_exact(3) {
            let corners = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let [p0, p1, p2] = corners.map(|i| Vec3::from(self.vertices[i].position));

            let Some(n) = (p1 - p0).cross(p2 - p0).try_normalize() else {
                degenerate += 1;
                continue;
            };
            for i in corners {
                self.vertices[i].normal = n.to_array();
            }
        }

        for v in &mut self.vertices {
            v.normal = Vec3::from(v.normal)
                .try_normalize()
                .unwrap_or(Vec3::from(DEFAULT_NORMAL))
                .to_array();
        }

        if degenerate > 0 {
            log::debug!("Skipped {} degenerate triangles while computing normals", degenerate);
        }
    }

    /// Transform positions by `m` and normals by its inverse transpose.
    ///
    /// Normals are not re-normalized. A singular `m` leaves normals untouched.
    pub fn apply_matrix(&mut self, m: Mat4) {
        let normal_m = normal_matrix(m);
        if normal_m.is_none() {
            log::warn!("Singular transform, normals left unchanged");
        }

        for v in &mut self.vertices {
            v.position = m.transform_point3(Vec3::from(v.position)).to_array();
            if let Some(nm) = normal_m {
                v.normal = nm.transform_vector3(Vec3::from(v.normal)).to_array();
            }
        }
    }

    /// Center the mesh on the origin and scale it so its largest side is 1.
    pub fn normalize(&mut self) {
        let Some(bounds) = self.bounds() else {
            return;
        };
        log::debug!(
            "Normalizing mesh: center {:?}, max extent {}",
            bounds.center(),
            bounds.max_extent()
        );
        self.apply_matrix(bounds.unit_fit_matrix());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corelib::vec3;
    use rstest::rstest;

    fn tetra() -> Mesh {
        let vertices = vec![
            MeshVertex::new([0.0, 0.0, 0.0], DEFAULT_NORMAL, [0.0, 0.0]),
            MeshVertex::new([1.0, 0.0, 0.0], DEFAULT_NORMAL, [1.0, 0.0]),
            MeshVertex::new([0.0, 1.0, 0.0], DEFAULT_NORMAL, [0.0, 1.0]),
            MeshVertex::new([0.0, 0.0, 1.0], DEFAULT_NORMAL, [1.0, 1.0]),
        ];
        Mesh::new(vertices, vec![0, 1, 2, 0, 3, 1]).expect("valid mesh")
    }

    fn assert_vec_eq(a: [f32; 3], b: [f32; 3]) {
        let d = Vec3::from(a) - Vec3::from(b);
        assert!(d.length() < 1e-5, "{a:?} != {b:?}");
    }

    #[test]
    fn mesh_validity() {
        let mesh = tetra();
        assert!(!mesh.is_empty());
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.index_count(), 6);
        assert_eq!(mesh.triangle_count(), 2);
        assert!(Mesh::default().is_empty());
    }

    #[test]
    fn interleaved_constructor_round_trips_floats() {
        let floats = [
            0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0,
        ];
        let mesh = Mesh::from_interleaved(&floats, vec![0, 1, 2]).expect("valid");
        assert_eq!(mesh.as_floats(), &floats);
        assert_eq!(mesh.vertices()[1].uv, [1.0, 0.0]);
        assert_eq!(mesh.vertex_bytes().len(), 3 * 32);
        assert_eq!(mesh.index_bytes().len(), 3 * 4);
    }

    #[test]
    fn interleaved_constructor_rejects_partial_vertex() {
        let err = Mesh::from_interleaved(&[0.0; 12], vec![]).unwrap_err();
        assert!(matches!(err, MeshError::MisalignedVertices(12)));
    }

    #[test]
    fn constructor_rejects_bad_indices() {
        let vertices = vec![MeshVertex::default(); 3];
        let err = Mesh::new(vertices.clone(), vec![0, 1]).unwrap_err();
        assert!(matches!(err, MeshError::IncompleteTriangle(2)));

        let err = Mesh::new(vertices, vec![0, 1, 3]).unwrap_err();
        assert!(matches!(
            err,
            MeshError::VertexIndexOutOfRange {
                index: 3,
                vertex_count: 3
            }
        ));
    }

    #[test]
    fn computed_normals_are_unit_length() {
        let mut mesh = tetra();
        mesh.compute_normals();
        for v in mesh.vertices() {
            assert!((Vec3::from(v.normal).length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn shared_vertices_keep_last_triangle_normal() {
        let mut mesh = tetra();
        mesh.compute_normals();
        let v = mesh.vertices();
        // Second triangle (0, 3, 1) lies in the y = 0 plane and wins for 0 and 1.
        assert_vec_eq(v[0].normal, [0.0, 1.0, 0.0]);
        assert_vec_eq(v[1].normal, [0.0, 1.0, 0.0]);
        assert_vec_eq(v[2].normal, [0.0, 0.0, 1.0]);
        assert_vec_eq(v[3].normal, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn unreferenced_and_zero_normals_become_unit() {
        let vertices = vec![
            MeshVertex::new([0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0]),
            MeshVertex::new([0.0, 0.0, 0.0], [0.0, 3.0, 0.0], [0.0, 0.0]),
            MeshVertex::new([0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0]),
            MeshVertex::new([5.0, 5.0, 5.0], [0.0, 0.0, -2.0], [0.0, 0.0]),
        ];
        // Single degenerate triangle; vertex 3 is never referenced.
        let mut mesh = Mesh::new(vertices, vec![0, 1, 2]).expect("valid");
        mesh.compute_normals();
        let v = mesh.vertices();
        assert_vec_eq(v[0].normal, DEFAULT_NORMAL);
        assert_vec_eq(v[1].normal, [0.0, 1.0, 0.0]);
        assert_vec_eq(v[3].normal, [0.0, 0.0, -1.0]);
    }

    #[test]
    fn apply_matrix_uses_inverse_transpose_for_normals() {
        let vertices = vec![MeshVertex::new([1.0, 1.0, 1.0], [1.0, 1.0, 0.0], [0.0, 0.0])];
        let mut mesh = Mesh::new(vertices, vec![]).expect("valid");
        mesh.apply_matrix(Mat4::from_scale(vec3(2.0, 1.0, 1.0)));
        let v = mesh.vertices()[0];
        assert_vec_eq(v.position, [2.0, 1.0, 1.0]);
        assert_vec_eq(v.normal, [0.5, 1.0, 0.0]);
    }

    #[test]
    fn apply_matrix_translation_leaves_normals() {
        let mut mesh = tetra();
        mesh.compute_normals();
        let before = mesh.clone();
        mesh.apply_matrix(Mat4::from_translation(vec3(1.0, 2.0, 3.0)));
        for (a, b) in before.vertices().iter().zip(mesh.vertices()) {
            assert_vec_eq(a.normal, b.normal);
            assert_vec_eq(
                (Vec3::from(a.position) + vec3(1.0, 2.0, 3.0)).to_array(),
                b.position,
            );
        }
    }

    #[test]
    fn normalize_centers_and_fits_to_unit() {
        let mut mesh = tetra();
        mesh.apply_matrix(
            Mat4::from_translation(vec3(10.0, -3.0, 2.0)) * Mat4::from_scale(vec3(4.0, 2.0, 1.0)),
        );
        mesh.normalize();

        let bounds = mesh.bounds().expect("non-empty");
        assert!(bounds.center().length() < 1e-5);
        assert!((bounds.max_extent() - 1.0).abs() < 1e-5);
        assert!((bounds.min.x + 0.5).abs() < 1e-5 && (bounds.max.x - 0.5).abs() < 1e-5);
    }

    #[test]
    fn normalize_is_idempotent() {
        let mut mesh = tetra();
        mesh.apply_matrix(Mat4::from_scale(vec3(7.0, 3.0, 0.5)));
        mesh.normalize();
        let once = mesh.clone();
        mesh.normalize();
        for (a, b) in once.vertices().iter().zip(mesh.vertices()) {
            assert_vec_eq(a.position, b.position);
        }
    }

    #[test]
    fn normalize_empty_mesh_is_noop() {
        let mut mesh = Mesh::default();
        mesh.normalize();
        assert!(mesh.is_empty());
    }

    #[rstest]
    #[case::two(2, 6)]
    #[case::three(3, 24)]
    #[case::five(5, 96)]
    fn grid_counts(#[case] n: usize, #[case] index_count: usize) {
        let grid = Mesh::create_grid(n).expect("grid");
        assert_eq!(grid.vertex_count(), n * n);
        assert_eq!(grid.index_count(), index_count);
        assert_eq!(grid.as_floats().len() % FLOATS_PER_VERTEX, 0);
        assert!(grid.validate().is_ok());
    }

    #[test]
    fn grid_spans_plane_with_downward_normals() {
        let grid = Mesh::create_grid(3).expect("grid");
        let v = grid.vertices();
        assert_eq!(v[0].position, [-1.0, 0.0, -1.0]);
        assert_eq!(v[8].position, [1.0, 0.0, 1.0]);
        assert_eq!(v[5].uv, [1.0, 0.5]);
        assert!(v.iter().all(|v| v.normal == [0.0, -1.0, 0.0]));
        // First cell, then the seam skip jumps from k = 1 to k = 3.
        assert_eq!(&grid.indices()[..6], &[0, 1, 3, 1, 3, 4]);
        assert_eq!(&grid.indices()[12..18], &[3, 4, 6, 4, 6, 7]);
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    fn grid_too_small(#[case] n: usize) {
        assert!(matches!(
            Mesh::create_grid(n),
            Err(MeshError::GridTooSmall(got)) if got == n
        ));
    }
}
