use nalgebra::Vector3;
use thiserror::Error;

/// Floats per vertex: position then colour.
pub const VERTEX_STRIDE: usize = 6;

#[derive(Debug, Error)]
pub enum MeshError {
    #[error("failed to read glTF: {0}")]
    Gltf(#[from] gltf::Error),
    #[error("primitive has no positions")]
    MissingPositions,
    #[error("model has more than {} vertices", u16::MAX)]
    TooManyVertices,
}

#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<f32>,
    pub indices: Vec<u16>,
}

impl Mesh {
    /// Unit cube centred on the origin with per-face shading baked into the
    /// vertex colours.
    pub fn cube(r: f32, g: f32, b: f32) -> Self {
        let s = 0.5;
        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        let mut add_face = |corners: [[f32; 3]; 4], brightness: f32| {
            let base = (vertices.len() / VERTEX_STRIDE) as u16;
            for [x, y, z] in corners {
                vertices.extend_from_slice(&[x, y, z, r * brightness, g * brightness, b * brightness]);
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        };

        add_face([[-s, -s, s], [s, -s, s], [s, s, s], [-s, s, s]], 0.9);
        add_face([[s, -s, -s], [-s, -s, -s], [-s, s, -s], [s, s, -s]], 0.7);
        add_face([[-s, s, s], [s, s, s], [s, s, -s], [-s, s, -s]], 1.1);
        add_face([[-s, -s, -s], [s, -s, -s], [s, -s, s], [-s, -s, s]], 0.4);
        add_face([[s, -s, s], [s, -s, -s], [s, s, -s], [s, s, s]], 0.8);
        add_face([[-s, -s, -s], [-s, -s, s], [-s, s, s], [-s, s, -s]], 0.6);

        Mesh { vertices, indices }
    }

    pub fn from_gltf(bytes: &[u8]) -> Result<Self, MeshError> {
        let (document, buffers, _) = gltf::import_slice(bytes)?;

        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        for mesh in document.meshes() {
            for primitive in mesh.primitives() {
                let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

                let positions: Vec<[f32; 3]> = reader.read_positions().ok_or(MeshError::MissingPositions)?.collect();
                let colors: Vec<[f32; 3]> = match reader.read_colors(0) {
                    Some(iter) => iter.into_rgb_f32().collect(),
                    None => vec![[1.0, 1.0, 1.0]; positions.len()],
                };

                let base_index = vertices.len() / VERTEX_STRIDE;
                if base_index + positions.len() > u16::MAX as usize {
                    return Err(MeshError::TooManyVertices);
                }

                for (pos, color) in positions.iter().zip(colors.iter()) {
                    vertices.extend_from_slice(&[pos[0], pos[1], pos[2], color[0], color[1], color[2]]);
                }

                if let Some(iter) = reader.read_indices() {
                    indices.extend(iter.into_u32().map(|index| (base_index + index as usize) as u16));
                }
            }
        }

        Ok(Mesh { vertices, indices })
    }

    /// Axis-aligned extent of the vertex positions.
    pub fn bounds(&self) -> Option<(Vector3<f32>, Vector3<f32>)> {
        let mut points = self
            .vertices
            .chunks_exact(VERTEX_STRIDE)
            .map(|v| Vector3::new(v[0], v[1], v[2]));
        let first = points.next()?;
        Some(points.fold((first, first), |(min, max), p| (min.inf(&p), max.sup(&p))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_layout() {
        let cube = Mesh::cube(1.0, 0.5, 0.0);
        assert_eq!(cube.vertices.len(), 24 * VERTEX_STRIDE);
        assert_eq!(cube.indices.len(), 36);
        assert!(cube.indices.iter().all(|&i| (i as usize) < 24));

        let (min, max) = cube.bounds().unwrap();
        assert_eq!(min, Vector3::new(-0.5, -0.5, -0.5));
        assert_eq!(max, Vector3::new(0.5, 0.5, 0.5));
    }

    #[test]
    fn test_empty_mesh_has_no_bounds() {
        assert!(Mesh::default().bounds().is_none());
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(Mesh::from_gltf(b"not a model").is_err());
    }
}
