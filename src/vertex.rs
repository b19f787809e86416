/// Object-space vertex with normal and texture coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    pub position: [f64; 3],
    pub normal: [f64; 3],
    pub uv: [f64; 2],
}

impl Vertex {
    pub const fn new(position: [f64; 3], normal: [f64; 3], uv: [f64; 2]) -> Self {
        Vertex { position, normal, uv }
    }
}

/// Vertex after lighting and projection, ready for rasterization
#[derive(Clone, Copy, Debug)]
pub struct ProjectedVertex {
    pub screen_position: [f64; 2],
    /// Window-space depth in [0, 1]
    pub depth: f64,
    /// Reciprocal of clip-space w, for perspective-correct interpolation
    pub inv_w: f64,
    /// Distance from the eye, used by fog
    pub eye_distance: f64,
    pub color: [f64; 4],
    pub uv: [f64; 2],
}
