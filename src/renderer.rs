use crate::geometry::{cube_faces, floor_tiles, textured_floor_tiles, Quad};
use crate::math::{
    multiply_matrices, multiply_matrix_vector, perspective, rotation_x, rotation_y, rotation_z,
    scaling, translation, Mat4, Rgba,
};
use crate::state::{Axis, SceneState, TextureSlot};
use crate::texture::Texture;
use std::rc::Rc;

pub const FIELD_OF_VIEW: f64 = 45.0;
pub const NEAR_PLANE: f64 = 1.0;
pub const FAR_PLANE: f64 = 200.0;
pub const CAMERA_TILT: f64 = 25.0;
pub const BLACK: Rgba = [0.0, 0.0, 0.0, 1.0];

/// Light position before the camera transform
pub const LIGHT_POSITION: [f64; 4] = [0.0, 0.0, 1.0, 1.0];
/// Light position used while drawing the mirrored cube
pub const MIRRORED_LIGHT_POSITION: [f64; 4] = [0.0, -15.0, 1.0, 1.0];

/// Size of the draw surface in pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Viewport { width, height }
    }

    /// Width over height; a zero height counts as one pixel
    pub fn aspect(&self) -> f64 {
        self.width as f64 / self.height.max(1) as f64
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    pub ambient: Rgba,
    pub diffuse: Rgba,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fog {
    pub color: Rgba,
    pub start: f64,
    pub end: f64,
}

/// Which screen-space winding counts as front-facing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Winding {
    Clockwise,
    CounterClockwise,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeshKind {
    Cube,
    MirroredCube,
    Floor,
}

#[derive(Clone, Debug)]
pub enum Fill {
    /// Quad colors only
    Solid,
    /// Quad colors modulated by the texture
    Textured(Rc<Texture>),
}

/// One step of a frame, executed in order by a rasterizer
#[derive(Clone, Debug)]
pub enum DrawCommand {
    Clear(Rgba),
    SetProjection(Mat4),
    SetFog(Option<Fog>),
    EnableLighting(Light),
    DisableLighting,
    /// Eye-space homogeneous light position
    SetLightPosition([f64; 4]),
    SetFrontFace(Winding),
    DrawMesh {
        kind: MeshKind,
        modelview: Mat4,
        quads: Rc<[Quad]>,
        fill: Fill,
    },
    DrawWireframe {
        modelview: Mat4,
        quads: Rc<[Quad]>,
        color: Rgba,
    },
    EnableBlend,
    DisableBlend,
}

/// An ordered display list describing one complete frame
#[derive(Clone, Debug, Default)]
pub struct Frame {
    pub commands: Vec<DrawCommand>,
}

impl Frame {
    pub fn clear_color(&self) -> Option<Rgba> {
        self.commands.iter().find_map(|cmd| match cmd {
            DrawCommand::Clear(color) => Some(*color),
            _ => None,
        })
    }

    /// Mesh draws in submission order
    pub fn meshes(&self) -> impl Iterator<Item = (MeshKind, &[Quad], &Fill)> {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::DrawMesh { kind, quads, fill, .. } => Some((*kind, &quads[..], fill)),
            _ => None,
        })
    }

    /// Number of cube draws, mirrored copies included
    pub fn cube_draws(&self) -> usize {
        self.meshes()
            .filter(|(kind, _, _)| matches!(kind, MeshKind::Cube | MeshKind::MirroredCube))
            .count()
    }

    pub fn lighting_enabled(&self) -> bool {
        self.commands
            .iter()
            .any(|cmd| matches!(cmd, DrawCommand::EnableLighting(_)))
    }
}

/// Fixed camera: scene pulled down and tilted
pub fn camera_transform() -> Mat4 {
    multiply_matrices(&translation(0.0, -25.0, 0.0), &rotation_x(CAMERA_TILT))
}

/// Turns a `SceneState` into a `Frame`.
///
/// The floor geometry never changes, so it is built once and shared by
/// every frame.
pub struct FrameRenderer {
    viewport: Viewport,
    plain_floor: Rc<[Quad]>,
    textured_floor: Rc<[Quad]>,
}

impl FrameRenderer {
    pub fn new(viewport: Viewport) -> Self {
        FrameRenderer {
            viewport,
            plain_floor: floor_tiles().into(),
            textured_floor: textured_floor_tiles().into(),
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn projection(&self) -> Mat4 {
        perspective(FIELD_OF_VIEW, self.viewport.aspect(), NEAR_PLANE, FAR_PLANE)
    }

    pub fn render(&self, state: &SceneState) -> Frame {
        let mut commands = Vec::new();
        let camera = camera_transform();

        let fog = state.fog_enabled().then(|| {
            let (start, end) = state.fog_planes();
            Fog {
                color: state.fog_color(),
                start,
                end,
            }
        });
        commands.push(DrawCommand::Clear(fog.map_or(BLACK, |fog| fog.color)));
        commands.push(DrawCommand::SetProjection(self.projection()));
        commands.push(DrawCommand::SetFog(fog));

        if state.lighting_enabled() {
            let [ar, ag, ab] = state.ambient_light();
            let [dr, dg, db] = state.diffuse_light();
            commands.push(DrawCommand::EnableLighting(Light {
                ambient: [ar, ag, ab, 1.0],
                diffuse: [dr, dg, db, 1.0],
            }));
        }

        if state.reflection_enabled() {
            commands.push(DrawCommand::SetFrontFace(Winding::Clockwise));
            commands.push(DrawCommand::SetLightPosition(multiply_matrix_vector(
                &camera,
                &MIRRORED_LIGHT_POSITION,
            )));
            let placement = multiply_matrices(&translation(0.0, -15.0, -60.0), &cube_rotation(state));
            let modelview = multiply_matrices(&camera, &multiply_matrices(&placement, &scaling(5.0, -5.0, 5.0)));
            push_cube(&mut commands, state, MeshKind::MirroredCube, modelview);
            commands.push(DrawCommand::SetFrontFace(Winding::CounterClockwise));
        }

        commands.push(DrawCommand::SetLightPosition(multiply_matrix_vector(&camera, &LIGHT_POSITION)));
        let placement = multiply_matrices(&translation(0.0, 4.0, -60.0), &cube_rotation(state));
        let modelview = multiply_matrices(&camera, &multiply_matrices(&placement, &scaling(5.0, 5.0, 5.0)));
        push_cube(&mut commands, state, MeshKind::Cube, modelview);

        if state.lighting_enabled() {
            commands.push(DrawCommand::DisableLighting);
        }

        commands.push(DrawCommand::EnableBlend);
        let floor = multiply_matrices(&translation(0.0, -6.0, -30.0), &rotation_x(-90.0));
        let (scale, quads, fill) = match state.texture(TextureSlot::Floor) {
            Some(texture) => (50.0, Rc::clone(&self.textured_floor), Fill::Textured(Rc::clone(texture))),
            None => (10.0, Rc::clone(&self.plain_floor), Fill::Solid),
        };
        commands.push(DrawCommand::DrawMesh {
            kind: MeshKind::Floor,
            modelview: multiply_matrices(&camera, &multiply_matrices(&floor, &scaling(scale, scale, scale))),
            quads,
            fill,
        });
        commands.push(DrawCommand::DisableBlend);

        Frame { commands }
    }
}

/// X, then Y, then Z rotation in whole degrees
fn cube_rotation(state: &SceneState) -> Mat4 {
    let x = rotation_x(state.rotation_degrees(Axis::X));
    let y = rotation_y(state.rotation_degrees(Axis::Y));
    let z = rotation_z(state.rotation_degrees(Axis::Z));
    multiply_matrices(&multiply_matrices(&x, &y), &z)
}

fn push_cube(commands: &mut Vec<DrawCommand>, state: &SceneState, kind: MeshKind, modelview: Mat4) {
    let [r, g, b] = state.cube_color();
    let color = [r as f64 / 255.0, g as f64 / 255.0, b as f64 / 255.0, 1.0];
    let outline = [
        (255 - r) as f64 / 255.0,
        (255 - g) as f64 / 255.0,
        (255 - b) as f64 / 255.0,
        1.0,
    ];

    // a bound texture modulates the cube color
    let fill = match state.texture(TextureSlot::Cube) {
        Some(texture) => Fill::Textured(Rc::clone(texture)),
        None => Fill::Solid,
    };
    commands.push(DrawCommand::DrawMesh {
        kind,
        modelview,
        quads: cube_faces(color).into(),
        fill,
    });
    commands.push(DrawCommand::DrawWireframe {
        modelview,
        quads: cube_faces(outline).into(),
        color: outline,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::transform_point;
    use crate::state::Channel;
    use crate::texture::tests::png_bytes;

    fn renderer() -> FrameRenderer {
        FrameRenderer::new(Viewport::new(400, 400))
    }

    /// World direction seen through the camera tilt, written out by hand
    fn camera_direction([x, y, z]: [f64; 3]) -> [f64; 3] {
        let (s, c) = CAMERA_TILT.to_radians().sin_cos();
        [x, y * c - z * s, y * s + z * c]
    }

    fn camera_point(p: [f64; 3]) -> [f64; 3] {
        let [x, y, z] = camera_direction(p);
        [x, y - 25.0, z]
    }

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "{:?} != {:?}", actual, expected);
        }
    }

    fn modelview(frame: &Frame, wanted: MeshKind) -> Mat4 {
        frame
            .commands
            .iter()
            .find_map(|cmd| match cmd {
                DrawCommand::DrawMesh { kind, modelview, .. } if *kind == wanted => Some(*modelview),
                _ => None,
            })
            .unwrap()
    }

    fn axis(modelview: &Mat4, direction: [f64; 3]) -> [f64; 3] {
        let [x, y, z, _] = multiply_matrix_vector(modelview, &[direction[0], direction[1], direction[2], 0.0]);
        [x, y, z]
    }

    fn cube_mesh(frame: &Frame) -> (&[Quad], &Fill) {
        frame
            .meshes()
            .find(|(kind, _, _)| *kind == MeshKind::Cube)
            .map(|(_, quads, fill)| (quads, fill))
            .unwrap()
    }

    #[test]
    fn clears_to_black_without_fog() {
        let mut state = SceneState::new();
        state.set_fog_color(Channel::Red, 200);
        let frame = renderer().render(&state);
        assert_eq!(frame.clear_color(), Some(BLACK));
        assert!(matches!(frame.commands[0], DrawCommand::Clear(_)));
    }

    #[test]
    fn clears_to_fog_color_with_fog() {
        let mut state = SceneState::new();
        state.set_fog_color(Channel::Red, 128);
        state.set_fog_color(Channel::Blue, 64);
        state.set_fog_enabled(true);
        let frame = renderer().render(&state);
        assert_eq!(frame.clear_color(), Some(state.fog_color()));
        assert_eq!(frame.clear_color(), Some([0.5, 0.0, 0.25, 1.0]));
    }

    #[test]
    fn reflection_adds_exactly_one_cube() {
        let mut state = SceneState::new();
        let plain = renderer().render(&state).cube_draws();
        state.set_reflection_enabled(true);
        let frame = renderer().render(&state);
        assert_eq!(frame.cube_draws(), plain + 1);
        let kinds: Vec<_> = frame.meshes().map(|(kind, _, _)| kind).collect();
        assert_eq!(kinds, vec![MeshKind::MirroredCube, MeshKind::Cube, MeshKind::Floor]);
    }

    #[test]
    fn mirrored_cube_is_bracketed_by_clockwise_winding() {
        let mut state = SceneState::new();
        state.set_reflection_enabled(true);
        let frame = renderer().render(&state);
        let windings: Vec<_> = frame
            .commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::SetFrontFace(w) => Some(*w),
                _ => None,
            })
            .collect();
        assert_eq!(windings, vec![Winding::Clockwise, Winding::CounterClockwise]);
    }

    #[test]
    fn lighting_is_bracketed_per_frame() {
        let mut state = SceneState::new();
        state.set_lighting_enabled(true);
        let frame = renderer().render(&state);
        let enable = frame
            .commands
            .iter()
            .position(|c| matches!(c, DrawCommand::EnableLighting(_)))
            .unwrap();
        let disable = frame
            .commands
            .iter()
            .position(|c| matches!(c, DrawCommand::DisableLighting))
            .unwrap();
        let floor = frame
            .commands
            .iter()
            .position(|c| matches!(c, DrawCommand::DrawMesh { kind: MeshKind::Floor, .. }))
            .unwrap();
        assert!(enable < disable && disable < floor);
    }

    #[test]
    fn disabled_lighting_shades_by_cube_color_alone() {
        let mut state = SceneState::new();
        state.set_cube_color(Channel::Red, 255);
        state.set_ambient_light(Channel::Green, 200);
        state.set_diffuse_light(Channel::Blue, 100);
        state.set_lighting_enabled(true);
        state.set_lighting_enabled(false);

        let frame = renderer().render(&state);
        assert!(!frame.lighting_enabled());
        let (quads, fill) = cube_mesh(&frame);
        assert!(matches!(fill, Fill::Solid));
        assert!(quads.iter().all(|q| q.color == [1.0, 0.0, 0.0, 1.0]));
    }

    #[test]
    fn wireframe_uses_complement_color() {
        let mut state = SceneState::new();
        state.set_cube_color(Channel::Red, 255);
        state.set_cube_color(Channel::Green, 0);
        state.set_cube_color(Channel::Blue, 51);
        let frame = renderer().render(&state);
        let outline = frame
            .commands
            .iter()
            .find_map(|c| match c {
                DrawCommand::DrawWireframe { color, .. } => Some(*color),
                _ => None,
            })
            .unwrap();
        assert_eq!(outline, [0.0, 1.0, 204.0 / 255.0, 1.0]);
    }

    #[test]
    fn bound_textures_switch_geometry() {
        let mut state = SceneState::new();
        state.set_texture(TextureSlot::Cube, &png_bytes(256, 256)).unwrap();
        state.set_texture(TextureSlot::Floor, &png_bytes(256, 256)).unwrap();
        let frame = renderer().render(&state);

        let (_, fill) = cube_mesh(&frame);
        assert!(matches!(fill, Fill::Textured(_)));
        let (_, floor, floor_fill) = frame.meshes().find(|(k, _, _)| *k == MeshKind::Floor).unwrap();
        assert_eq!(floor.len(), 400);
        assert!(matches!(floor_fill, Fill::Textured(_)));
    }

    #[test]
    fn plain_floor_without_texture() {
        let frame = renderer().render(&SceneState::new());
        let (_, floor, fill) = frame.meshes().find(|(k, _, _)| *k == MeshKind::Floor).unwrap();
        assert_eq!(floor.len(), 10_000);
        assert!(matches!(fill, Fill::Solid));
    }

    #[test]
    fn rejected_texture_keeps_rendering_previous_one() {
        let mut state = SceneState::new();
        state.set_texture(TextureSlot::Cube, &png_bytes(256, 256)).unwrap();
        let _ = state.set_texture(TextureSlot::Cube, &png_bytes(300, 300));
        let frame = renderer().render(&state);
        assert!(matches!(cube_mesh(&frame).1, Fill::Textured(_)));
    }

    #[test]
    fn textured_cube_keeps_cube_color() {
        let mut state = SceneState::new();
        state.set_cube_color(Channel::Green, 255);
        state.set_texture(TextureSlot::Cube, &png_bytes(256, 256)).unwrap();
        let frame = renderer().render(&state);
        let (quads, fill) = cube_mesh(&frame);
        assert!(matches!(fill, Fill::Textured(_)));
        assert!(quads.iter().all(|q| q.color == [0.0, 1.0, 0.0, 1.0]));
    }

    #[test]
    fn light_positions_precede_their_cubes() {
        let mut state = SceneState::new();
        state.set_reflection_enabled(true);
        let frame = renderer().render(&state);

        let lights: Vec<_> = frame
            .commands
            .iter()
            .enumerate()
            .filter_map(|(i, cmd)| match cmd {
                DrawCommand::SetLightPosition(p) => Some((i, *p)),
                _ => None,
            })
            .collect();
        assert_eq!(lights.len(), 2);
        let mesh_at = |wanted: MeshKind| {
            frame
                .commands
                .iter()
                .position(|c| matches!(c, DrawCommand::DrawMesh { kind, .. } if *kind == wanted))
                .unwrap()
        };
        let mirrored = mesh_at(MeshKind::MirroredCube);
        let cube = mesh_at(MeshKind::Cube);
        assert!(lights[0].0 < mirrored && mirrored < lights[1].0 && lights[1].0 < cube);

        let [x, y, z] = camera_point([0.0, -15.0, 1.0]);
        assert_close(&lights[0].1, &[x, y, z, 1.0]);
        let [x, y, z] = camera_point([0.0, 0.0, 1.0]);
        assert_close(&lights[1].1, &[x, y, z, 1.0]);
    }

    #[test]
    fn cube_sits_above_the_floor() {
        let frame = renderer().render(&SceneState::new());
        let mv = modelview(&frame, MeshKind::Cube);
        assert_close(&transform_point(&mv, &[0.0; 3]), &camera_point([0.0, 4.0, -60.0]));
        assert_close(&axis(&mv, [0.0, 1.0, 0.0]), &camera_direction([0.0, 5.0, 0.0]));
        assert_close(&axis(&mv, [1.0, 0.0, 0.0]), &[5.0, 0.0, 0.0]);
    }

    #[test]
    fn mirrored_cube_is_flipped_below_the_floor() {
        let mut state = SceneState::new();
        state.set_reflection_enabled(true);
        let frame = renderer().render(&state);
        let mv = modelview(&frame, MeshKind::MirroredCube);
        assert_close(&transform_point(&mv, &[0.0; 3]), &camera_point([0.0, -15.0, -60.0]));
        assert_close(&axis(&mv, [0.0, 1.0, 0.0]), &camera_direction([0.0, -5.0, 0.0]));
        assert_close(&axis(&mv, [0.0, 0.0, 1.0]), &camera_direction([0.0, 0.0, 5.0]));
    }

    #[test]
    fn rotation_applies_about_the_cube_center() {
        let mut state = SceneState::new();
        state.set_rotation(Axis::Y, 90 * 16);
        let frame = renderer().render(&state);
        let mv = modelview(&frame, MeshKind::Cube);
        assert_close(&transform_point(&mv, &[0.0; 3]), &camera_point([0.0, 4.0, -60.0]));
        assert_close(&axis(&mv, [1.0, 0.0, 0.0]), &camera_direction([0.0, 0.0, -5.0]));
    }

    #[test]
    fn floor_lies_flat_and_scales_with_texture() {
        let plain = renderer().render(&SceneState::new());
        let mv = modelview(&plain, MeshKind::Floor);
        assert_close(&transform_point(&mv, &[0.0; 3]), &camera_point([0.0, -6.0, -30.0]));
        assert_close(&axis(&mv, [1.0, 0.0, 0.0]), &[10.0, 0.0, 0.0]);
        // tile rows run away from the camera
        assert_close(&axis(&mv, [0.0, 1.0, 0.0]), &camera_direction([0.0, 0.0, -10.0]));

        let mut state = SceneState::new();
        state.set_texture(TextureSlot::Floor, &png_bytes(256, 256)).unwrap();
        let textured = renderer().render(&state);
        let mv = modelview(&textured, MeshKind::Floor);
        assert_close(&transform_point(&mv, &[0.0; 3]), &camera_point([0.0, -6.0, -30.0]));
        assert_close(&axis(&mv, [1.0, 0.0, 0.0]), &[50.0, 0.0, 0.0]);
    }

    #[test]
    fn projection_follows_viewport_aspect() {
        let mut renderer = renderer();
        renderer.resize(Viewport::new(800, 400));
        let p = renderer.projection();
        assert!((p[1][1] / p[0][0] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn zero_height_viewport_does_not_divide_by_zero() {
        assert_eq!(Viewport::new(10, 0).aspect(), 10.0);
    }
}
