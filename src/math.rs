/// Row-major 4x4 matrix, applied to column vectors
pub type Mat4 = [[f64; 4]; 4];

/// RGBA color with channels in [0, 1]
pub type Rgba = [f64; 4];

/// Light model ambient term applied to every lit surface
pub const GLOBAL_AMBIENT: f64 = 0.2;

pub const IDENTITY: Mat4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Edge function used in rasterization
pub fn edge_function(a: &[f64; 2], b: &[f64; 2], c: &[f64; 2]) -> f64 {
    (c[0] - a[0]) * (b[1] - a[1]) - (c[1] - a[1]) * (b[0] - a[0])
}

/// Multiplies a 4x4 matrix by a 4-dimensional vector
pub fn multiply_matrix_vector(matrix: &Mat4, vector: &[f64; 4]) -> [f64; 4] {
    let mut result = [0.0; 4];
    for i in 0..4 {
        for j in 0..4 {
            result[i] += matrix[i][j] * vector[j];
        }
    }
    result
}

/// Multiplies two 4x4 matrices
pub fn multiply_matrices(a: &Mat4, b: &Mat4) -> Mat4 {
    let mut result = [[0.0; 4]; 4];
    for i in 0..4 {
        for j in 0..4 {
            for k in 0..4 {
                result[i][j] += a[i][k] * b[k][j];
            }
        }
    }
    result
}

/// Transforms a point (w = 1) and drops the homogeneous coordinate
pub fn transform_point(matrix: &Mat4, point: &[f64; 3]) -> [f64; 3] {
    let [x, y, z, _] = multiply_matrix_vector(matrix, &[point[0], point[1], point[2], 1.0]);
    [x, y, z]
}

/// Transforms a normal by the upper 3x3 block and renormalizes it.
///
/// Only valid while every scale in the chain has the same magnitude on all
/// three axes; the scene never builds anything else.
pub fn transform_normal(matrix: &Mat4, normal: &[f64; 3]) -> [f64; 3] {
    let mut result = [0.0; 3];
    for i in 0..3 {
        for j in 0..3 {
            result[i] += matrix[i][j] * normal[j];
        }
    }
    normalize(&result)
}

pub fn translation(x: f64, y: f64, z: f64) -> Mat4 {
    let mut m = IDENTITY;
    m[0][3] = x;
    m[1][3] = y;
    m[2][3] = z;
    m
}

pub fn scaling(x: f64, y: f64, z: f64) -> Mat4 {
    let mut m = IDENTITY;
    m[0][0] = x;
    m[1][1] = y;
    m[2][2] = z;
    m
}

/// Rotation about the X axis, in degrees
pub fn rotation_x(degrees: f64) -> Mat4 {
    let (s, c) = degrees.to_radians().sin_cos();
    [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, c, -s, 0.0],
        [0.0, s, c, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

/// Rotation about the Y axis, in degrees
pub fn rotation_y(degrees: f64) -> Mat4 {
    let (s, c) = degrees.to_radians().sin_cos();
    [
        [c, 0.0, s, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [-s, 0.0, c, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

/// Rotation about the Z axis, in degrees
pub fn rotation_z(degrees: f64) -> Mat4 {
    let (s, c) = degrees.to_radians().sin_cos();
    [
        [c, -s, 0.0, 0.0],
        [s, c, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

/// Perspective projection with a vertical field of view in degrees,
/// matching the classic `gluPerspective` layout.
pub fn perspective(fov_y: f64, aspect: f64, near: f64, far: f64) -> Mat4 {
    let f = 1.0 / (fov_y.to_radians() / 2.0).tan();
    [
        [f / aspect, 0.0, 0.0, 0.0],
        [0.0, f, 0.0, 0.0],
        [0.0, 0.0, (far + near) / (near - far), 2.0 * far * near / (near - far)],
        [0.0, 0.0, -1.0, 0.0],
    ]
}

pub fn dot(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub fn normalize(v: &[f64; 3]) -> [f64; 3] {
    let length = dot(v, v).sqrt();
    if length == 0.0 {
        return *v;
    }
    [v[0] / length, v[1] / length, v[2] / length]
}

/// Calculates the normal vector of a triangle
pub fn calculate_normal(a: &[f64; 3], b: &[f64; 3], c: &[f64; 3]) -> [f64; 3] {
    let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
    normalize(&[
        u[1] * v[2] - u[2] * v[1],
        u[2] * v[0] - u[0] * v[2],
        u[0] * v[1] - u[1] * v[0],
    ])
}

/// Calculates the diffuse intensity for an eye-space normal, position and
/// homogeneous light position
pub fn calculate_light_intensity(normal: &[f64; 3], position: &[f64; 3], light_pos: &[f64; 4]) -> f64 {
    let light_dir = if light_pos[3] == 0.0 {
        normalize(&[light_pos[0], light_pos[1], light_pos[2]])
    } else {
        normalize(&[
            light_pos[0] / light_pos[3] - position[0],
            light_pos[1] / light_pos[3] - position[1],
            light_pos[2] / light_pos[3] - position[2],
        ])
    };
    dot(normal, &light_dir).max(0.0)
}

/// Applies ambient and diffuse lighting to a material color. Alpha is kept.
pub fn apply_lighting(color: &Rgba, ambient: &Rgba, diffuse: &Rgba, intensity: f64) -> Rgba {
    let mut lit = [0.0, 0.0, 0.0, color[3]];
    for i in 0..3 {
        let term = GLOBAL_AMBIENT * color[i]
            + ambient[i] * color[i]
            + diffuse[i] * color[i] * intensity;
        lit[i] = term.clamp(0.0, 1.0);
    }
    lit
}

/// Linear fog factor: 1 keeps the surface color, 0 is fully fogged
pub fn fog_factor(distance: f64, start: f64, end: f64) -> f64 {
    if end == start {
        return if distance <= start { 1.0 } else { 0.0 };
    }
    ((end - distance) / (end - start)).clamp(0.0, 1.0)
}

/// Mixes `color` toward `fog` by `factor` (1 = untouched). Alpha is kept.
pub fn apply_fog(color: &Rgba, fog: &Rgba, factor: f64) -> Rgba {
    [
        color[0] * factor + fog[0] * (1.0 - factor),
        color[1] * factor + fog[1] * (1.0 - factor),
        color[2] * factor + fog[2] * (1.0 - factor),
        color[3],
    ]
}

/// Converts an 8-bit channel to [0, 1] the way the light sliders do
pub fn channel_to_unit(value: u8) -> f64 {
    value as f64 / 256.0
}
