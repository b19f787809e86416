use crate::geometry::Quad;
use crate::math::{
    apply_fog, apply_lighting, calculate_light_intensity, edge_function, fog_factor,
    multiply_matrix_vector, transform_normal, transform_point, Mat4, Rgba, IDENTITY,
};
use crate::renderer::{
    DrawCommand, Fill, Fog, Frame, Light, Viewport, Winding, FAR_PLANE, NEAR_PLANE,
};
use crate::texture::Texture;
use crate::vertex::ProjectedVertex;
use log::trace;

/// Pulls wireframe lines in front of the fill they outline
const LINE_DEPTH_BIAS: f64 = 1e-5;

/// RGBA8 color buffer with a matching depth buffer
#[derive(Clone, Debug)]
pub struct Framebuffer {
    width: usize,
    height: usize,
    pixel_data: Vec<u8>,
    z_buffer: Vec<f64>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Framebuffer {
            width,
            height,
            pixel_data: vec![0; width * height * 4],
            z_buffer: vec![1.0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Rows top to bottom, four bytes per pixel
    pub fn as_rgba(&self) -> &[u8] {
        &self.pixel_data
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let offset = (y * self.width + x) * 4;
        let p = &self.pixel_data[offset..offset + 4];
        [p[0], p[1], p[2], p[3]]
    }

    fn clear(&mut self, color: &Rgba) {
        let rgba = to_rgba8(color);
        for pixel in self.pixel_data.chunks_exact_mut(4) {
            pixel.copy_from_slice(&rgba);
        }
        self.z_buffer.fill(1.0);
    }

    /// Depth-tested write; blends against the stored color when `blend` is set
    fn plot(&mut self, x: usize, y: usize, depth: f64, color: &Rgba, blend: bool) {
        let offset = y * self.width + x;
        if depth >= self.z_buffer[offset] {
            return;
        }
        self.z_buffer[offset] = depth;

        let pixel_offset = offset * 4;
        let out = if blend {
            let dst = &self.pixel_data[pixel_offset..pixel_offset + 3];
            let a = color[3];
            [
                color[0] * a + dst[0] as f64 / 255.0 * (1.0 - a),
                color[1] * a + dst[1] as f64 / 255.0 * (1.0 - a),
                color[2] * a + dst[2] as f64 / 255.0 * (1.0 - a),
                1.0,
            ]
        } else {
            *color
        };
        let [r, g, b, _] = to_rgba8(&out);
        self.pixel_data[pixel_offset] = r;
        self.pixel_data[pixel_offset + 1] = g;
        self.pixel_data[pixel_offset + 2] = b;
        self.pixel_data[pixel_offset + 3] = 255;
    }
}

fn to_rgba8(color: &Rgba) -> [u8; 4] {
    color.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
}

/// Eye-space vertex carrying lit color and texture coordinates
#[derive(Clone, Copy, Debug)]
struct EyeVertex {
    position: [f64; 3],
    color: Rgba,
    uv: [f64; 2],
}

impl EyeVertex {
    fn lerp(&self, other: &EyeVertex, t: f64) -> EyeVertex {
        let mix = |a: f64, b: f64| a + (b - a) * t;
        EyeVertex {
            position: [0, 1, 2].map(|i| mix(self.position[i], other.position[i])),
            color: [0, 1, 2, 3].map(|i| mix(self.color[i], other.color[i])),
            uv: [0, 1].map(|i| mix(self.uv[i], other.uv[i])),
        }
    }
}

/// Clips a polygon against the plane `sign * z <= sign * limit` in eye space
fn clip_polygon(polygon: &[EyeVertex], limit: f64, sign: f64) -> Vec<EyeVertex> {
    let inside = |v: &EyeVertex| sign * v.position[2] <= sign * limit;
    let mut out = Vec::with_capacity(polygon.len() + 2);
    for (i, current) in polygon.iter().enumerate() {
        let next = &polygon[(i + 1) % polygon.len()];
        if inside(current) {
            out.push(*current);
        }
        if inside(current) != inside(next) {
            let t = (limit - current.position[2]) / (next.position[2] - current.position[2]);
            out.push(current.lerp(next, t));
        }
    }
    out
}

/// Keeps the part of a polygon between the near and far planes
fn clip_to_depth_range(polygon: &[EyeVertex]) -> Vec<EyeVertex> {
    let near_clipped = clip_polygon(polygon, -NEAR_PLANE, 1.0);
    if near_clipped.is_empty() {
        return near_clipped;
    }
    clip_polygon(&near_clipped, -FAR_PLANE, -1.0)
}

/// Signed area in window coordinates (y down): negative is counter-clockwise on screen
fn signed_area(vertices: &[ProjectedVertex]) -> f64 {
    let mut area = 0.0;
    for (i, a) in vertices.iter().enumerate() {
        let b = &vertices[(i + 1) % vertices.len()];
        area += a.screen_position[0] * b.screen_position[1] - b.screen_position[0] * a.screen_position[1];
    }
    area / 2.0
}

/// Executes frames into a framebuffer with fixed-function semantics:
/// per-vertex lighting, back-face culling, depth test, linear fog and
/// alpha blending.
pub struct Rasterizer {
    framebuffer: Framebuffer,
    projection: Mat4,
    fog: Option<Fog>,
    light: Option<Light>,
    light_position: [f64; 4],
    front_face: Winding,
    blend: bool,
}

impl Rasterizer {
    pub fn new(viewport: Viewport) -> Self {
        Rasterizer {
            framebuffer: Framebuffer::new(viewport.width as usize, viewport.height as usize),
            projection: IDENTITY,
            fog: None,
            light: None,
            light_position: [0.0, 0.0, 1.0, 0.0],
            front_face: Winding::CounterClockwise,
            blend: false,
        }
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.framebuffer = Framebuffer::new(viewport.width as usize, viewport.height as usize);
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    /// Runs every command of `frame` in order
    pub fn execute(&mut self, frame: &Frame) -> &Framebuffer {
        self.fog = None;
        self.light = None;
        self.front_face = Winding::CounterClockwise;
        self.blend = false;

        for command in &frame.commands {
            match command {
                DrawCommand::Clear(color) => self.framebuffer.clear(color),
                DrawCommand::SetProjection(projection) => self.projection = *projection,
                DrawCommand::SetFog(fog) => self.fog = *fog,
                DrawCommand::EnableLighting(light) => self.light = Some(*light),
                DrawCommand::DisableLighting => self.light = None,
                DrawCommand::SetLightPosition(position) => self.light_position = *position,
                DrawCommand::SetFrontFace(winding) => self.front_face = *winding,
                DrawCommand::DrawMesh {
                    kind,
                    modelview,
                    quads,
                    fill,
                } => {
                    trace!("drawing {:?} ({} quads)", kind, quads.len());
                    let texture = match fill {
                        Fill::Solid => None,
                        Fill::Textured(texture) => Some(&**texture),
                    };
                    for quad in quads.iter() {
                        self.draw_quad(modelview, quad, texture);
                    }
                }
                DrawCommand::DrawWireframe {
                    modelview,
                    quads,
                    color,
                } => {
                    for quad in quads.iter() {
                        self.draw_outline(modelview, quad, color);
                    }
                }
                DrawCommand::EnableBlend => self.blend = true,
                DrawCommand::DisableBlend => self.blend = false,
            }
        }
        &self.framebuffer
    }

    fn to_eye_space(&self, modelview: &Mat4, quad: &Quad, lit: bool) -> [EyeVertex; 4] {
        quad.vertices.map(|v| {
            let position = transform_point(modelview, &v.position);
            let color = match (&self.light, lit) {
                (Some(light), true) => {
                    let normal = transform_normal(modelview, &v.normal);
                    let intensity = calculate_light_intensity(&normal, &position, &self.light_position);
                    apply_lighting(&quad.color, &light.ambient, &light.diffuse, intensity)
                }
                _ => quad.color,
            };
            EyeVertex {
                position,
                color,
                uv: v.uv,
            }
        })
    }

    fn project(&self, v: &EyeVertex) -> ProjectedVertex {
        let [x, y, z, w] = multiply_matrix_vector(
            &self.projection,
            &[v.position[0], v.position[1], v.position[2], 1.0],
        );
        let width = self.framebuffer.width as f64;
        let height = self.framebuffer.height as f64;
        ProjectedVertex {
            screen_position: [(x / w + 1.0) / 2.0 * width, (1.0 - y / w) / 2.0 * height],
            depth: (z / w + 1.0) / 2.0,
            inv_w: 1.0 / w,
            eye_distance: -v.position[2],
            color: v.color,
            uv: v.uv,
        }
    }

    /// Clips, projects and culls a quad; `None` when nothing front-facing remains
    fn prepare(&self, modelview: &Mat4, quad: &Quad, lit: bool) -> Option<Vec<ProjectedVertex>> {
        let clipped = clip_to_depth_range(&self.to_eye_space(modelview, quad, lit));
        if clipped.len() < 3 {
            return None;
        }
        let projected: Vec<ProjectedVertex> = clipped.iter().map(|v| self.project(v)).collect();
        let area = signed_area(&projected);
        let front = match self.front_face {
            Winding::CounterClockwise => area < 0.0,
            Winding::Clockwise => area > 0.0,
        };
        front.then_some(projected)
    }

    fn draw_quad(&mut self, modelview: &Mat4, quad: &Quad, texture: Option<&Texture>) {
        if self.framebuffer.width == 0 || self.framebuffer.height == 0 {
            return;
        }
        let Some(polygon) = self.prepare(modelview, quad, true) else {
            return;
        };
        for i in 1..polygon.len() - 1 {
            self.draw_triangle(&polygon[0], &polygon[i], &polygon[i + 1], texture);
        }
    }

    fn draw_outline(&mut self, modelview: &Mat4, quad: &Quad, color: &Rgba) {
        if self.framebuffer.width == 0 || self.framebuffer.height == 0 {
            return;
        }
        // edges keep their flat complement color even with lighting on
        let Some(polygon) = self.prepare(modelview, quad, false) else {
            return;
        };
        for (i, start) in polygon.iter().enumerate() {
            let end = &polygon[(i + 1) % polygon.len()];
            self.draw_line(start, end, color);
        }
    }

    fn shade(&self, color: Rgba, eye_distance: f64) -> Rgba {
        match &self.fog {
            Some(fog) => apply_fog(&color, &fog.color, fog_factor(eye_distance, fog.start, fog.end)),
            None => color,
        }
    }

    /// Draws a triangle with perspective-correct attributes
    fn draw_triangle(
        &mut self,
        v0: &ProjectedVertex,
        v1: &ProjectedVertex,
        v2: &ProjectedVertex,
        texture: Option<&Texture>,
    ) {
        let width = self.framebuffer.width;
        let height = self.framebuffer.height;

        // Compute bounding box of the triangle
        let min_x = v0.screen_position[0]
            .min(v1.screen_position[0])
            .min(v2.screen_position[0])
            .floor()
            .max(0.0) as usize;
        let max_x = v0.screen_position[0]
            .max(v1.screen_position[0])
            .max(v2.screen_position[0])
            .ceil()
            .min(width as f64 - 1.0) as usize;
        let min_y = v0.screen_position[1]
            .min(v1.screen_position[1])
            .min(v2.screen_position[1])
            .floor()
            .max(0.0) as usize;
        let max_y = v0.screen_position[1]
            .max(v1.screen_position[1])
            .max(v2.screen_position[1])
            .ceil()
            .min(height as f64 - 1.0) as usize;

        let area = edge_function(&v0.screen_position, &v1.screen_position, &v2.screen_position);
        if area == 0.0 {
            return;
        }

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = [x as f64 + 0.5, y as f64 + 0.5];

                // Normalized barycentrics are all non-negative inside,
                // whichever way the triangle winds
                let w0 = edge_function(&v1.screen_position, &v2.screen_position, &p) / area;
                let w1 = edge_function(&v2.screen_position, &v0.screen_position, &p) / area;
                let w2 = edge_function(&v0.screen_position, &v1.screen_position, &p) / area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = v0.depth * w0 + v1.depth * w1 + v2.depth * w2;

                let p0 = w0 * v0.inv_w;
                let p1 = w1 * v1.inv_w;
                let p2 = w2 * v2.inv_w;
                let sum = p0 + p1 + p2;
                let (p0, p1, p2) = (p0 / sum, p1 / sum, p2 / sum);

                let mut color = [0.0; 4];
                for i in 0..4 {
                    color[i] = v0.color[i] * p0 + v1.color[i] * p1 + v2.color[i] * p2;
                }
                if let Some(texture) = texture {
                    let u = v0.uv[0] * p0 + v1.uv[0] * p1 + v2.uv[0] * p2;
                    let v = v0.uv[1] * p0 + v1.uv[1] * p1 + v2.uv[1] * p2;
                    let texel = texture.sample(u, v);
                    for i in 0..4 {
                        color[i] *= texel[i];
                    }
                }
                let eye_distance = v0.eye_distance * p0 + v1.eye_distance * p1 + v2.eye_distance * p2;
                let color = self.shade(color, eye_distance);

                self.framebuffer.plot(x, y, depth, &color, self.blend);
            }
        }
    }

    /// Draws a line between two projected vertices using Bresenham's algorithm
    fn draw_line(&mut self, start: &ProjectedVertex, end: &ProjectedVertex, color: &Rgba) {
        let width = self.framebuffer.width as isize;
        let height = self.framebuffer.height as isize;
        let (mut x0, mut y0, x1, y1) = (
            start.screen_position[0].floor() as isize,
            start.screen_position[1].floor() as isize,
            end.screen_position[0].floor() as isize,
            end.screen_position[1].floor() as isize,
        );
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy; // error value e_xy
        let steps = dx.max(-dy).max(1) as f64;
        let mut step = 0.0;

        loop {
            if x0 >= 0 && x0 < width && y0 >= 0 && y0 < height {
                let t = step / steps;
                let depth = start.depth + (end.depth - start.depth) * t - LINE_DEPTH_BIAS;
                let eye_distance = start.eye_distance + (end.eye_distance - start.eye_distance) * t;
                let shaded = self.shade(*color, eye_distance);
                self.framebuffer.plot(x0 as usize, y0 as usize, depth, &shaded, self.blend);
            }

            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
            step += 1.0;
        }
    }
}
