use crate::math::{channel_to_unit, Rgba};
use crate::texture::{Texture, TextureRejected};
use log::{debug, info, warn};
use std::fmt;
use std::path::Path;
use std::rc::Rc;

/// Fixed-point rotation units per degree
pub const UNITS_PER_DEGREE: i32 = 16;
/// One full turn in fixed-point units
pub const FULL_TURN: i32 = 360 * UNITS_PER_DEGREE;
/// Pointer-drag pixels to rotation units
pub const DRAG_SENSITIVITY: i32 = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    pub fn index(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureSlot {
    Cube,
    Floor,
}

impl fmt::Display for TextureSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextureSlot::Cube => f.write_str("cube"),
            TextureSlot::Floor => f.write_str("floor"),
        }
    }
}

type RejectionListener = Box<dyn FnMut(TextureSlot, &TextureRejected)>;

/// Every adjustable rendering parameter of the scene.
///
/// Setters never fail except the texture ones. Out-of-range color input
/// resets the channel to zero instead of clamping.
pub struct SceneState {
    cube_color: [u8; 3],
    /// Rotation per axis in 1/16 degree, always in [0, FULL_TURN)
    rotation: [i32; 3],
    ambient_light: [f64; 3],
    diffuse_light: [f64; 3],
    lighting_enabled: bool,
    reflection_enabled: bool,
    fog_enabled: bool,
    fog_color: [f64; 3],
    fog_start: f64,
    fog_end: f64,
    cube_texture: Option<Rc<Texture>>,
    floor_texture: Option<Rc<Texture>>,
    rejection_listeners: Vec<RejectionListener>,
}

impl Default for SceneState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SceneState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneState")
            .field("cube_color", &self.cube_color)
            .field("rotation", &self.rotation)
            .field("ambient_light", &self.ambient_light)
            .field("diffuse_light", &self.diffuse_light)
            .field("lighting_enabled", &self.lighting_enabled)
            .field("reflection_enabled", &self.reflection_enabled)
            .field("fog_enabled", &self.fog_enabled)
            .field("fog_color", &self.fog_color)
            .field("fog_start", &self.fog_start)
            .field("fog_end", &self.fog_end)
            .field("cube_texture", &self.cube_texture)
            .field("floor_texture", &self.floor_texture)
            .finish()
    }
}

/// Raw 8-bit channel, or 0 when the input is outside [0, 255]
fn color_channel(value: i32) -> u8 {
    u8::try_from(value).unwrap_or(0)
}

/// Light/fog channel in [0, 1], or 0 when the input is outside [0, 255]
fn unit_channel(value: i32) -> f64 {
    u8::try_from(value).map(channel_to_unit).unwrap_or(0.0)
}

fn wrap_angle(angle: i64) -> i32 {
    angle.rem_euclid(FULL_TURN as i64) as i32
}

impl SceneState {
    pub fn new() -> Self {
        SceneState {
            cube_color: [0; 3],
            rotation: [0; 3],
            ambient_light: [0.0; 3],
            diffuse_light: [0.0; 3],
            lighting_enabled: false,
            reflection_enabled: false,
            fog_enabled: false,
            fog_color: [0.0; 3],
            fog_start: 0.0,
            fog_end: 0.0,
            cube_texture: None,
            floor_texture: None,
            rejection_listeners: Vec::new(),
        }
    }

    pub fn set_cube_color(&mut self, channel: Channel, value: i32) {
        self.cube_color[channel.index()] = color_channel(value);
        debug!("cube color {:?} = {}", channel, self.cube_color[channel.index()]);
    }

    pub fn set_ambient_light(&mut self, channel: Channel, value: i32) {
        self.ambient_light[channel.index()] = unit_channel(value);
        debug!("ambient light {:?} = {:.4}", channel, self.ambient_light[channel.index()]);
    }

    pub fn set_diffuse_light(&mut self, channel: Channel, value: i32) {
        self.diffuse_light[channel.index()] = unit_channel(value);
        debug!("diffuse light {:?} = {:.4}", channel, self.diffuse_light[channel.index()]);
    }

    pub fn set_fog_color(&mut self, channel: Channel, value: i32) {
        self.fog_color[channel.index()] = unit_channel(value);
        debug!("fog color {:?} = {:.4}", channel, self.fog_color[channel.index()]);
    }

    /// Adds `delta * DRAG_SENSITIVITY` to the axis and wraps into [0, FULL_TURN)
    pub fn rotate(&mut self, axis: Axis, delta: i32) {
        let current = self.rotation[axis.index()] as i64;
        self.set_rotation(axis, current + delta as i64 * DRAG_SENSITIVITY as i64);
    }

    /// Sets an absolute angle in 1/16 degree, wrapped into [0, FULL_TURN)
    pub fn set_rotation(&mut self, axis: Axis, angle: i64) {
        self.rotation[axis.index()] = wrap_angle(angle);
        debug!("rotation {:?} = {}", axis, self.rotation[axis.index()]);
    }

    pub fn set_lighting_enabled(&mut self, enabled: bool) {
        self.lighting_enabled = enabled;
        debug!("lighting {}", enabled);
    }

    pub fn set_reflection_enabled(&mut self, enabled: bool) {
        self.reflection_enabled = enabled;
        debug!("reflection {}", enabled);
    }

    pub fn set_fog_enabled(&mut self, enabled: bool) {
        self.fog_enabled = enabled;
        debug!("fog {}", enabled);
    }

    /// Stores both fog distances as given; `start > end` is allowed.
    pub fn set_fog_planes(&mut self, start: f64, end: f64) {
        self.fog_start = start;
        self.fog_end = end;
        debug!("fog planes {} .. {}", start, end);
    }

    pub fn set_fog_start(&mut self, start: f64) {
        self.set_fog_planes(start, self.fog_end);
    }

    pub fn set_fog_end(&mut self, end: f64) {
        self.set_fog_planes(self.fog_start, end);
    }

    /// Decodes `bytes` and binds the result to `slot`. On failure the slot
    /// keeps its previous texture and rejection listeners are notified.
    pub fn set_texture(&mut self, slot: TextureSlot, bytes: &[u8]) -> Result<(), TextureRejected> {
        self.bind(slot, Texture::decode(bytes))
    }

    /// Like `set_texture`, reading the image from a file
    pub fn load_texture(&mut self, slot: TextureSlot, path: impl AsRef<Path>) -> Result<(), TextureRejected> {
        self.bind(slot, Texture::load(path))
    }

    /// Unbinds the slot
    pub fn clear_texture(&mut self, slot: TextureSlot) {
        *self.slot_mut(slot) = None;
        debug!("{} texture cleared", slot);
    }

    /// Registers a callback run synchronously whenever a texture is rejected
    pub fn on_texture_rejected(&mut self, listener: impl FnMut(TextureSlot, &TextureRejected) + 'static) {
        self.rejection_listeners.push(Box::new(listener));
    }

    fn bind(&mut self, slot: TextureSlot, loaded: Result<Texture, TextureRejected>) -> Result<(), TextureRejected> {
        match loaded {
            Ok(texture) => {
                info!("{} texture bound ({}x{})", slot, texture.width(), texture.height());
                *self.slot_mut(slot) = Some(Rc::new(texture));
                Ok(())
            }
            Err(reason) => {
                warn!("{} texture rejected: {}", slot, reason);
                for listener in self.rejection_listeners.iter_mut() {
                    listener(slot, &reason);
                }
                Err(reason)
            }
        }
    }

    fn slot_mut(&mut self, slot: TextureSlot) -> &mut Option<Rc<Texture>> {
        match slot {
            TextureSlot::Cube => &mut self.cube_texture,
            TextureSlot::Floor => &mut self.floor_texture,
        }
    }

    pub fn cube_color(&self) -> [u8; 3] {
        self.cube_color
    }

    pub fn rotation(&self, axis: Axis) -> i32 {
        self.rotation[axis.index()]
    }

    /// Rotation in whole degrees, truncated the way the angles are applied
    pub fn rotation_degrees(&self, axis: Axis) -> f64 {
        (self.rotation[axis.index()] / UNITS_PER_DEGREE) as f64
    }

    pub fn ambient_light(&self) -> [f64; 3] {
        self.ambient_light
    }

    pub fn diffuse_light(&self) -> [f64; 3] {
        self.diffuse_light
    }

    pub fn lighting_enabled(&self) -> bool {
        self.lighting_enabled
    }

    pub fn reflection_enabled(&self) -> bool {
        self.reflection_enabled
    }

    pub fn fog_enabled(&self) -> bool {
        self.fog_enabled
    }

    /// Fog color with its fixed alpha of 1
    pub fn fog_color(&self) -> Rgba {
        [self.fog_color[0], self.fog_color[1], self.fog_color[2], 1.0]
    }

    pub fn fog_planes(&self) -> (f64, f64) {
        (self.fog_start, self.fog_end)
    }

    pub fn texture(&self, slot: TextureSlot) -> Option<&Rc<Texture>> {
        match slot {
            TextureSlot::Cube => self.cube_texture.as_ref(),
            TextureSlot::Floor => self.floor_texture.as_ref(),
        }
    }
}
