use crate::graphics::{Framebuffer, Rasterizer};
use crate::renderer::{Frame, FrameRenderer, Viewport};
use crate::state::SceneState;
use log::debug;
use std::path::Path;

/// Owns the scene and everything needed to turn it into pixels.
///
/// Front ends mutate the state through `state_mut` and call `render`
/// whenever they need a new image.
pub struct Viewer {
    state: SceneState,
    renderer: FrameRenderer,
    rasterizer: Rasterizer,
}

impl Viewer {
    pub fn new(state: SceneState, viewport: Viewport) -> Self {
        Viewer {
            state,
            renderer: FrameRenderer::new(viewport),
            rasterizer: Rasterizer::new(viewport),
        }
    }

    pub fn state(&self) -> &SceneState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SceneState {
        &mut self.state
    }

    pub fn viewport(&self) -> Viewport {
        self.renderer.viewport()
    }

    pub fn resize(&mut self, viewport: Viewport) {
        if viewport != self.renderer.viewport() {
            debug!("resize to {}x{}", viewport.width, viewport.height);
            self.renderer.resize(viewport);
            self.rasterizer.resize(viewport);
        }
    }

    /// The display list for the current state
    pub fn frame(&self) -> Frame {
        self.renderer.render(&self.state)
    }

    /// Renders the current state into the framebuffer
    pub fn render(&mut self) -> &Framebuffer {
        let frame = self.renderer.render(&self.state);
        self.rasterizer.execute(&frame)
    }

    /// Renders one frame and writes it as an image; the format follows the extension
    pub fn snapshot(&mut self, path: &Path) -> image::ImageResult<()> {
        let framebuffer = self.render();
        image::save_buffer(
            path,
            framebuffer.as_rgba(),
            framebuffer.width() as u32,
            framebuffer.height() as u32,
            image::ExtendedColorType::Rgba8,
        )
    }
}
