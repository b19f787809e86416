use crate::renderer::Viewport;
use crate::state::{Axis, Channel, SceneState, TextureSlot};
use clap::Parser;
use std::path::PathBuf;

/// Smallest edge accepted for the snapshot surface
pub const MIN_EDGE: u32 = 50;

/// A lit, fogged, textured cube over a reflective tiled floor
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Config {
    /// Cube color; values outside 0..=255 become 0
    #[arg(long, value_name = "R,G,B", value_parser = parse_triple::<i32>, allow_hyphen_values = true)]
    pub cube_color: Option<[i32; 3]>,

    /// Ambient light color
    #[arg(long, value_name = "R,G,B", value_parser = parse_triple::<i32>, allow_hyphen_values = true)]
    pub ambient: Option<[i32; 3]>,

    /// Diffuse light color
    #[arg(long, value_name = "R,G,B", value_parser = parse_triple::<i32>, allow_hyphen_values = true)]
    pub diffuse: Option<[i32; 3]>,

    /// Fog color
    #[arg(long, value_name = "R,G,B", value_parser = parse_triple::<i32>, allow_hyphen_values = true)]
    pub fog_color: Option<[i32; 3]>,

    /// Distance where fog starts
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub fog_start: f64,

    /// Distance where fog is complete
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub fog_end: f64,

    /// Enable the light
    #[arg(long)]
    pub lighting: bool,

    /// Draw the mirrored cube under the floor
    #[arg(long)]
    pub reflection: bool,

    /// Enable fog
    #[arg(long)]
    pub fog: bool,

    /// Image for the cube faces (square, 256 or 512 pixels)
    #[arg(long, value_name = "PATH")]
    pub cube_texture: Option<PathBuf>,

    /// Image for the floor tiles (square, 256 or 512 pixels)
    #[arg(long, value_name = "PATH")]
    pub floor_texture: Option<PathBuf>,

    /// Initial rotation in 1/16 degree
    #[arg(long, value_name = "X,Y,Z", value_parser = parse_triple::<i64>, allow_hyphen_values = true)]
    pub rotation: Option<[i64; 3]>,

    /// Render one frame to this PNG instead of opening the terminal view
    #[arg(long, value_name = "PATH")]
    pub snapshot: Option<PathBuf>,

    /// Snapshot width in pixels
    #[arg(long, default_value_t = 400, value_parser = clap::value_parser!(u32).range(MIN_EDGE as i64..))]
    pub width: u32,

    /// Snapshot height in pixels
    #[arg(long, default_value_t = 400, value_parser = clap::value_parser!(u32).range(MIN_EDGE as i64..))]
    pub height: u32,

    /// Write logs here while the terminal view is open
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// Parses `a,b,c`
fn parse_triple<T: std::str::FromStr>(s: &str) -> Result<[T; 3], String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let &[a, b, c] = parts.as_slice() else {
        return Err(format!("expected three comma-separated values, got `{}`", s));
    };
    let parse = |v: &str| v.parse::<T>().map_err(|_| format!("`{}` is not a valid number", v));
    Ok([parse(a)?, parse(b)?, parse(c)?])
}

impl Config {
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }

    /// Pushes every configured value through the scene setters. Texture
    /// failures leave the slot unbound; the state logs and reports them.
    pub fn apply(&self, state: &mut SceneState) {
        let channels = |values: &Option<[i32; 3]>| {
            values
                .iter()
                .flat_map(|v| Channel::ALL.into_iter().zip(*v))
                .collect::<Vec<_>>()
        };
        for (channel, value) in channels(&self.cube_color) {
            state.set_cube_color(channel, value);
        }
        for (channel, value) in channels(&self.ambient) {
            state.set_ambient_light(channel, value);
        }
        for (channel, value) in channels(&self.diffuse) {
            state.set_diffuse_light(channel, value);
        }
        for (channel, value) in channels(&self.fog_color) {
            state.set_fog_color(channel, value);
        }
        if let Some(rotation) = self.rotation {
            for (axis, angle) in Axis::ALL.into_iter().zip(rotation) {
                state.set_rotation(axis, angle);
            }
        }

        state.set_fog_planes(self.fog_start, self.fog_end);
        state.set_lighting_enabled(self.lighting);
        state.set_reflection_enabled(self.reflection);
        state.set_fog_enabled(self.fog);

        if let Some(path) = &self.cube_texture {
            let _ = state.load_texture(TextureSlot::Cube, path);
        }
        if let Some(path) = &self.floor_texture {
            let _ = state.load_texture(TextureSlot::Floor, path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::FULL_TURN;
    use crate::texture::tests::png_bytes;

    fn parse(args: &[&str]) -> Result<Config, clap::Error> {
        Config::try_parse_from(std::iter::once("cubefx").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_match_initial_scene() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.viewport(), Viewport::new(400, 400));
        assert!(config.snapshot.is_none());

        let mut state = SceneState::new();
        config.apply(&mut state);
        assert_eq!(state.cube_color(), [0, 0, 0]);
        assert!(!state.lighting_enabled());
    }

    #[test]
    fn colors_go_through_normalization() {
        let config = parse(&["--cube-color", "10,300,-4", "--ambient", "128,0,256"]).unwrap();
        let mut state = SceneState::new();
        config.apply(&mut state);
        assert_eq!(state.cube_color(), [10, 0, 0]);
        assert_eq!(state.ambient_light(), [0.5, 0.0, 0.0]);
    }

    #[test]
    fn toggles_and_fog_planes() {
        let config = parse(&["--lighting", "--fog", "--fog-start", "40", "--fog-end", "-2.5"]).unwrap();
        let mut state = SceneState::new();
        config.apply(&mut state);
        assert!(state.lighting_enabled() && state.fog_enabled() && !state.reflection_enabled());
        assert_eq!(state.fog_planes(), (40.0, -2.5));
    }

    #[test]
    fn rotation_is_wrapped() {
        let config = parse(&["--rotation", "-16,5760,100"]).unwrap();
        let mut state = SceneState::new();
        config.apply(&mut state);
        assert_eq!(state.rotation(Axis::X), FULL_TURN - 16);
        assert_eq!(state.rotation(Axis::Y), 0);
        assert_eq!(state.rotation(Axis::Z), 100);
    }

    #[test]
    fn malformed_triple_is_a_usage_error() {
        assert!(parse(&["--cube-color", "1,2"]).is_err());
        assert!(parse(&["--diffuse", "a,b,c"]).is_err());
    }

    #[test]
    fn tiny_surface_is_refused() {
        assert!(parse(&["--width", "10"]).is_err());
    }

    #[test]
    fn bad_texture_leaves_slot_unbound() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.png");
        let bad = dir.path().join("bad.png");
        std::fs::write(&good, png_bytes(256, 256)).unwrap();
        std::fs::write(&bad, png_bytes(100, 100)).unwrap();

        let config = parse(&[
            "--cube-texture",
            good.to_str().unwrap(),
            "--floor-texture",
            bad.to_str().unwrap(),
        ])
        .unwrap();
        let mut state = SceneState::new();
        config.apply(&mut state);
        assert!(state.texture(TextureSlot::Cube).is_some());
        assert!(state.texture(TextureSlot::Floor).is_none());
    }
}
