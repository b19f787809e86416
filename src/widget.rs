use crate::input::{DragButton, DragTracker};
use crate::renderer::Viewport;
use crate::state::{Axis, Channel, TextureSlot};
use crate::viewer::Viewer;
use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue};
use log::{debug, info, warn};
use std::cell::RefCell;
use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;

/// Slider step for one key press
const STEP: i32 = 8;
/// Fog plane sliders run 0..=FOG_PLANE_MAX
const FOG_PLANE_MAX: i32 = 500;

/// Raw mode and the alternate screen for as long as it lives. Dropping it
/// puts the terminal back, including when setup fails halfway.
struct TerminalGuard<W: Write> {
    out: W,
}

impl<W: Write> TerminalGuard<W> {
    fn enter(out: W) -> Result<Self> {
        terminal::enable_raw_mode().context("failed to enable raw mode")?;
        let mut guard = TerminalGuard { out };
        execute!(guard.out, EnterAlternateScreen, EnableMouseCapture, cursor::Hide)
            .context("failed to set up terminal")?;
        Ok(guard)
    }
}

impl<W: Write> Drop for TerminalGuard<W> {
    fn drop(&mut self) {
        if let Err(err) = execute!(self.out, ResetColor, cursor::Show, DisableMouseCapture, LeaveAlternateScreen) {
            warn!("failed to restore terminal: {}", err);
        }
        if let Err(err) = terminal::disable_raw_mode() {
            warn!("failed to disable raw mode: {}", err);
        }
    }
}

/// Which bank of sliders the channel keys adjust
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Group {
    CubeColor,
    Ambient,
    Diffuse,
    FogColor,
    FogPlanes,
}

impl Group {
    fn next(self) -> Group {
        match self {
            Group::CubeColor => Group::Ambient,
            Group::Ambient => Group::Diffuse,
            Group::Diffuse => Group::FogColor,
            Group::FogColor => Group::FogPlanes,
            Group::FogPlanes => Group::CubeColor,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Group::CubeColor => "cube",
            Group::Ambient => "ambient",
            Group::Diffuse => "diffuse",
            Group::FogColor => "fog",
            Group::FogPlanes => "fog planes",
        }
    }
}

/// Terminal front end: keys drive the sliders and toggles, mouse drags
/// rotate the cube, and every terminal cell shows two stacked pixels.
pub struct ViewportWidget {
    viewer: Viewer,
    tracker: DragTracker,
    group: Group,
    /// Index into the group: R/G/B, or start/end for fog planes
    selected: usize,
    /// Slider positions as the shell shows them: cube, ambient, diffuse, fog
    sliders: [[i32; 3]; 4],
    fog_planes: [i32; 2],
    texture_paths: [Option<PathBuf>; 2],
    message: Rc<RefCell<Option<String>>>,
}

impl ViewportWidget {
    pub fn new(mut viewer: Viewer, cube_texture: Option<PathBuf>, floor_texture: Option<PathBuf>) -> Self {
        let message = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&message);
        viewer.state_mut().on_texture_rejected(move |slot, reason| {
            *sink.borrow_mut() = Some(format!("{} texture rejected: {}", slot, reason));
        });

        let state = viewer.state();
        let to_slider = |v: f64| (v * 256.0).round() as i32;
        let [ar, ag, ab] = state.ambient_light().map(to_slider);
        let [dr, dg, db] = state.diffuse_light().map(to_slider);
        let [fr, fg, fb, _] = state.fog_color().map(to_slider);
        let [cr, cg, cb] = state.cube_color().map(i32::from);
        let (start, end) = state.fog_planes();

        ViewportWidget {
            viewer,
            tracker: DragTracker::new(),
            group: Group::CubeColor,
            selected: 0,
            sliders: [[cr, cg, cb], [ar, ag, ab], [dr, dg, db], [fr, fg, fb]],
            fog_planes: [start as i32, end as i32],
            texture_paths: [cube_texture, floor_texture],
            message,
        }
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    /// Resizes the drawing area to fit a terminal of `cols` x `rows`,
    /// keeping the last row for the status line
    pub fn fit_terminal(&mut self, cols: u16, rows: u16) {
        let rows = rows.saturating_sub(1).max(1);
        self.viewer.resize(Viewport::new(cols as u32, rows as u32 * 2));
    }

    /// Handles a key press; returns false when the user asked to quit
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return true;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return false,
            KeyCode::Tab => {
                self.group = self.group.next();
                self.selected = 0;
            }
            KeyCode::Char('1') => self.selected = 0,
            KeyCode::Char('2') => self.selected = 1,
            KeyCode::Char('3') if self.group != Group::FogPlanes => self.selected = 2,
            KeyCode::Up | KeyCode::Char('+') | KeyCode::Char('=') => self.nudge(STEP),
            KeyCode::Down | KeyCode::Char('-') => self.nudge(-STEP),
            KeyCode::Char('l') => {
                let on = !self.viewer.state().lighting_enabled();
                self.viewer.state_mut().set_lighting_enabled(on);
            }
            KeyCode::Char('r') => {
                let on = !self.viewer.state().reflection_enabled();
                self.viewer.state_mut().set_reflection_enabled(on);
            }
            KeyCode::Char('f') => {
                let on = !self.viewer.state().fog_enabled();
                self.viewer.state_mut().set_fog_enabled(on);
            }
            KeyCode::Char('t') => self.toggle_texture(TextureSlot::Cube),
            KeyCode::Char('g') => self.toggle_texture(TextureSlot::Floor),
            _ => {}
        }
        true
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        let (x, y) = (mouse.column as i32, mouse.row as i32 * 2);
        let button = |b: MouseButton| match b {
            MouseButton::Left => Some(DragButton::Left),
            MouseButton::Right => Some(DragButton::Right),
            MouseButton::Middle => None,
        };
        match mouse.kind {
            MouseEventKind::Down(_) => self.tracker.press(x, y),
            MouseEventKind::Drag(b) => {
                if let Some(b) = button(b) {
                    self.tracker.drag(x, y, b, self.viewer.state_mut());
                }
            }
            _ => {}
        }
    }

    fn nudge(&mut self, delta: i32) {
        let state = self.viewer.state_mut();
        if self.group == Group::FogPlanes {
            let slider = &mut self.fog_planes[self.selected];
            *slider = (*slider + delta).clamp(0, FOG_PLANE_MAX);
            match self.selected {
                0 => state.set_fog_start(*slider as f64),
                _ => state.set_fog_end(*slider as f64),
            }
            return;
        }

        let bank = match self.group {
            Group::CubeColor => 0,
            Group::Ambient => 1,
            Group::Diffuse => 2,
            _ => 3,
        };
        let channel = Channel::ALL[self.selected];
        let slider = &mut self.sliders[bank][self.selected];
        *slider = (*slider + delta).clamp(0, 255);
        match self.group {
            Group::CubeColor => state.set_cube_color(channel, *slider),
            Group::Ambient => state.set_ambient_light(channel, *slider),
            Group::Diffuse => state.set_diffuse_light(channel, *slider),
            _ => state.set_fog_color(channel, *slider),
        }
    }

    /// Binds the slot from its configured file, or clears it when bound
    fn toggle_texture(&mut self, slot: TextureSlot) {
        if self.viewer.state().texture(slot).is_some() {
            self.viewer.state_mut().clear_texture(slot);
            return;
        }
        let index = match slot {
            TextureSlot::Cube => 0,
            TextureSlot::Floor => 1,
        };
        match self.texture_paths[index].clone() {
            Some(path) => {
                if self.viewer.state_mut().load_texture(slot, &path).is_ok() {
                    *self.message.borrow_mut() = None;
                }
            }
            None => {
                *self.message.borrow_mut() = Some(format!("no {} texture file given", slot));
            }
        }
    }

    pub fn status_line(&self) -> String {
        let state = self.viewer.state();
        let flag = |on: bool, name: &str| if on { name.to_uppercase() } else { name.to_string() };
        let values = match self.group {
            Group::FogPlanes => format!("{:?}", self.fog_planes),
            Group::CubeColor => format!("{:?}", self.sliders[0]),
            Group::Ambient => format!("{:?}", self.sliders[1]),
            Group::Diffuse => format!("{:?}", self.sliders[2]),
            Group::FogColor => format!("{:?}", self.sliders[3]),
        };
        let mut line = format!(
            "[{} #{}] {} | {} {} {} | rot {},{},{} | tab 1-3 +/- l r f t g q",
            self.group.label(),
            self.selected + 1,
            values,
            flag(state.lighting_enabled(), "light"),
            flag(state.reflection_enabled(), "refl"),
            flag(state.fog_enabled(), "fog"),
            state.rotation_degrees(Axis::X),
            state.rotation_degrees(Axis::Y),
            state.rotation_degrees(Axis::Z),
        );
        if let Some(message) = self.message.borrow().as_ref() {
            line.push_str(" | ");
            line.push_str(message);
        }
        line
    }

    /// Draws the current frame and status line
    pub fn paint(&mut self, out: &mut impl Write) -> Result<()> {
        let status = self.status_line();
        let framebuffer = self.viewer.render();
        let (width, height) = (framebuffer.width(), framebuffer.height());

        queue!(out, cursor::MoveTo(0, 0))?;
        for row in 0..height / 2 {
            queue!(out, cursor::MoveTo(0, row as u16))?;
            for col in 0..width {
                let [tr, tg, tb, _] = framebuffer.pixel(col, row * 2);
                let [br, bg, bb, _] = framebuffer.pixel(col, row * 2 + 1);
                queue!(
                    out,
                    SetForegroundColor(Color::Rgb { r: tr, g: tg, b: tb }),
                    SetBackgroundColor(Color::Rgb { r: br, g: bg, b: bb }),
                    Print('▀')
                )?;
            }
        }
        let status: String = status.chars().take(width).collect();
        queue!(
            out,
            ResetColor,
            cursor::MoveTo(0, (height / 2) as u16),
            Clear(ClearType::CurrentLine),
            Print(status)
        )?;
        out.flush()?;
        Ok(())
    }

    /// Takes over the terminal until the user quits
    pub fn run(mut self) -> Result<()> {
        let mut guard = TerminalGuard::enter(std::io::stdout())?;
        self.event_loop(&mut guard.out)
    }

    fn event_loop(&mut self, out: &mut impl Write) -> Result<()> {
        let (cols, rows) = match termsize::get() {
            Some(size) => (size.cols, size.rows),
            None => terminal::size().context("failed to query terminal size")?,
        };
        self.fit_terminal(cols, rows);
        info!("terminal view {}x{}", cols, rows);
        self.paint(out)?;

        loop {
            match event::read().context("failed to read terminal event")? {
                Event::Key(key) => {
                    if !self.handle_key(key) {
                        debug!("quit requested");
                        return Ok(());
                    }
                }
                Event::Mouse(mouse) => self.handle_mouse(mouse),
                Event::Resize(cols, rows) => {
                    queue!(out, Clear(ClearType::All))?;
                    self.fit_terminal(cols, rows);
                }
                _ => continue,
            }
            self.paint(out)?;
        }
    }
}
