//! Hard-coded primitives: a unit cube centered at the origin and a tiled
//! floor in the local XY plane (facing +Z).

use crate::math::Rgba;
use crate::vertex::Vertex;

/// Plain floor covers tiles -50..49 on both axes
pub const PLAIN_FLOOR_EXTENT: i32 = 50;
/// Textured floor covers tiles -10..9, each tile showing the whole image
pub const TEXTURED_FLOOR_EXTENT: i32 = 10;
pub const FLOOR_ALPHA: f64 = 0.8;

/// Four vertices, counter-clockwise when seen from the front, with one color
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quad {
    pub vertices: [Vertex; 4],
    pub color: Rgba,
}

/// Per-face UVs, the full image on every face
const FACE_UVS: [[f64; 2]; 4] = [[1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]];

/// (normal, corners) per cube face
const CUBE_FACES: [([f64; 3], [[f64; 3]; 4]); 6] = [
    // Front
    (
        [0.0, 0.0, 1.0],
        [[1.0, -1.0, 1.0], [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0], [-1.0, -1.0, 1.0]],
    ),
    // Back
    (
        [0.0, 0.0, -1.0],
        [[-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0], [1.0, 1.0, -1.0], [1.0, -1.0, -1.0]],
    ),
    // Left
    (
        [-1.0, 0.0, 0.0],
        [[-1.0, -1.0, 1.0], [-1.0, 1.0, 1.0], [-1.0, 1.0, -1.0], [-1.0, -1.0, -1.0]],
    ),
    // Right
    (
        [1.0, 0.0, 0.0],
        [[1.0, -1.0, -1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0], [1.0, -1.0, 1.0]],
    ),
    // Top
    (
        [0.0, 1.0, 0.0],
        [[1.0, 1.0, 1.0], [1.0, 1.0, -1.0], [-1.0, 1.0, -1.0], [-1.0, 1.0, 1.0]],
    ),
    // Bottom
    (
        [0.0, -1.0, 0.0],
        [[-1.0, -1.0, 1.0], [-1.0, -1.0, -1.0], [1.0, -1.0, -1.0], [1.0, -1.0, 1.0]],
    ),
];

/// The six cube faces with outward normals and full-image UVs
pub fn cube_faces(color: Rgba) -> Vec<Quad> {
    CUBE_FACES
        .iter()
        .map(|(normal, corners)| Quad {
            vertices: [0, 1, 2, 3].map(|i| Vertex::new(corners[i], *normal, FACE_UVS[i])),
            color,
        })
        .collect()
}

fn floor_tile(i: i32, j: i32, color: Rgba) -> Quad {
    let (x, y) = (i as f64, j as f64);
    let normal = [0.0, 0.0, 1.0];
    let corners = [[x + 1.0, y, 0.0], [x + 1.0, y + 1.0, 0.0], [x, y + 1.0, 0.0], [x, y, 0.0]];
    Quad {
        vertices: [0, 1, 2, 3].map(|k| Vertex::new(corners[k], normal, FACE_UVS[k])),
        color,
    }
}

/// Checkerboard color for tile (i, j): white on odd parity, black on even
pub fn checker_color(i: i32, j: i32) -> Rgba {
    if (i + j).rem_euclid(2) == 1 {
        [1.0, 1.0, 1.0, FLOOR_ALPHA]
    } else {
        [0.0, 0.0, 0.0, FLOOR_ALPHA]
    }
}

/// Unit checkerboard tiles
pub fn floor_tiles() -> Vec<Quad> {
    let range = -PLAIN_FLOOR_EXTENT..PLAIN_FLOOR_EXTENT;
    range
        .clone()
        .flat_map(|i| range.clone().map(move |j| floor_tile(i, j, checker_color(i, j))))
        .collect()
}

/// Coarser tiles meant to be stretched under a texture
pub fn textured_floor_tiles() -> Vec<Quad> {
    let range = -TEXTURED_FLOOR_EXTENT..TEXTURED_FLOOR_EXTENT;
    range
        .clone()
        .flat_map(|i| range.clone().map(move |j| floor_tile(i, j, [1.0, 1.0, 1.0, FLOOR_ALPHA])))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{calculate_normal, dot};

    #[test]
    fn cube_has_six_faces_with_outward_normals() {
        let faces = cube_faces([1.0; 4]);
        assert_eq!(faces.len(), 6);
        for face in &faces {
            let normal = face.vertices[0].normal;
            for v in &face.vertices {
                // every corner lies on the face plane at distance 1
                assert_eq!(dot(&v.position, &normal), 1.0);
            }
        }
    }

    #[test]
    fn cube_winding_matches_normals() {
        for face in cube_faces([1.0; 4]) {
            let [a, b, c, _] = face.vertices;
            let winding = calculate_normal(&a.position, &b.position, &c.position);
            assert!(dot(&winding, &a.normal) > 0.99);
        }
    }

    #[test]
    fn cube_faces_span_full_texture() {
        for face in cube_faces([1.0; 4]) {
            let uvs: Vec<_> = face.vertices.iter().map(|v| v.uv).collect();
            assert_eq!(uvs, FACE_UVS.to_vec());
        }
    }

    #[test]
    fn plain_floor_is_100_by_100_checkerboard() {
        let tiles = floor_tiles();
        assert_eq!(tiles.len(), 100 * 100);
        assert_eq!(tiles[0].vertices[3].position, [-50.0, -50.0, 0.0]);
        assert_eq!(tiles[tiles.len() - 1].vertices[1].position, [50.0, 50.0, 0.0]);
        assert_eq!(tiles[0].color, [0.0, 0.0, 0.0, 0.8]);
        assert_eq!(tiles[1].color, [1.0, 1.0, 1.0, 0.8]);
    }

    #[test]
    fn checker_parity_holds_for_negative_tiles() {
        assert_eq!(checker_color(-1, 0)[0], 1.0);
        assert_eq!(checker_color(-1, -1)[0], 0.0);
        assert_eq!(checker_color(-3, 2)[0], 1.0);
    }

    #[test]
    fn textured_floor_is_coarser() {
        let tiles = textured_floor_tiles();
        assert_eq!(tiles.len(), 20 * 20);
        assert_eq!(tiles[0].vertices[3].position, [-10.0, -10.0, 0.0]);
        assert!(tiles.iter().all(|t| t.color == [1.0, 1.0, 1.0, 0.8]));
    }
}
