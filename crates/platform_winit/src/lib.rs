//! platform_winit: window + input + present loop (winit 0.30).
//!
//! Provides a minimal `run()` that creates a window and drives one frame per
//! redraw in a fixed order: input snapshot, orientation integration,
//! movement resolution, then render. All simulation state lives in
//! `viewer_core`; this crate only translates platform events.

use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::time::Instant;

use glam::{Quat, Vec2, Vec3};
use viewer_core::input::{InputState, Intents};
use viewer_core::rig::{Rig, StepConfig};
use viewer_core::systems::mouselook::MouselookConfig;
use viewer_core::systems::movement::MovementConfig;
use viewer_core::systems::touch::TouchTracker;
use viewer_core::walkable::WalkableQuery;
use wgpu::SurfaceError;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseButton, TouchPhase, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes},
};

use nav_static::WalkableIndex;
use render_wgpu::Renderer;
use render_wgpu::gfx::dome::{DomeParams, build_scene};
use render_wgpu::gfx::media::{self, FrameSequence};
use ux_panel::PanelModel;

/// Decoded media handed back from the loader thread.
enum MediaMsg {
    Still(image::RgbaImage),
    Sequence(FrameSequence),
}

struct App {
    window: Option<Window>,
    state: Option<Renderer>,
    rig: Rig,
    input: InputState,
    touch: TouchTracker,
    panel: PanelModel,
    nav: Option<WalkableIndex>,
    step_cfg: StepConfig,
    max_frame_dt_s: f32,
    dome_radius_m: f32,
    vsync: bool,
    startup_media: Option<PathBuf>,
    sequence: Option<FrameSequence>,
    home_pose: (Vec3, Quat),

    last_time: Option<Instant>,
    mouse_pressed: bool,
    last_cursor: Option<Vec2>,
    warned_degraded: bool,
    frames: u32,
    fps_window_start: Option<Instant>,

    media_tx: Sender<MediaMsg>,
    media_rx: Receiver<MediaMsg>,
}

impl App {
    fn from_configs() -> Self {
        let controls = data_runtime::configs::controls::load_default().unwrap_or_else(|e| {
            log::warn!("controls config unavailable, using defaults: {e:#}");
            data_runtime::configs::controls::ControlsCfg::default()
        });
        let display = data_runtime::configs::display::load_default().unwrap_or_else(|e| {
            log::warn!("display config unavailable, using defaults: {e:#}");
            data_runtime::configs::display::DisplayCfg::default()
        });

        let defaults = data_runtime::configs::controls::ControlsCfg::default();
        let pick = |v: Option<f32>, d: Option<f32>| v.or(d).unwrap_or_default();
        let mouselook = MouselookConfig {
            sensitivity_deg_per_px: pick(
                controls.sensitivity_deg_per_px,
                defaults.sensitivity_deg_per_px,
            ),
            invert_y: controls.invert_y.or(defaults.invert_y).unwrap_or_default(),
            min_pitch_deg: pick(controls.min_pitch_deg, defaults.min_pitch_deg),
            max_pitch_deg: pick(controls.max_pitch_deg, defaults.max_pitch_deg),
        };
        let base_speed = pick(controls.base_speed_mps, defaults.base_speed_mps);
        let eye_height = pick(controls.eye_height_m, defaults.eye_height_m);
        let half_extent = controls
            .search_half_extent_m
            .or(defaults.search_half_extent_m)
            .map_or(Vec3::new(2.0, 4.0, 2.0), Vec3::from_array);
        let movement = MovementConfig {
            base_speed_mps: base_speed,
            touch_speed_mult: pick(controls.touch_speed_mult, defaults.touch_speed_mult),
            eye_height_m: eye_height,
            search_half_extent_m: half_extent,
        };
        let step_cfg = StepConfig {
            mouselook,
            movement,
            turn_rate_rad_per_s: base_speed * pick(controls.turn_scale, defaults.turn_scale),
        };

        let mut panel = PanelModel::default();
        let display_defaults = data_runtime::configs::display::DisplayCfg::default();
        let fov = pick(display.fov_deg, display_defaults.fov_deg);
        panel.set_fov_deg(fov);
        panel.set_dome_tilt_deg(pick(display.dome_tilt_deg, display_defaults.dome_tilt_deg));
        panel.set_brightness(pick(display.brightness, display_defaults.brightness));
        panel.set_contrast(pick(display.contrast, display_defaults.contrast));
        panel.set_saturation(pick(display.saturation, display_defaults.saturation));
        panel.set_fly(controls.fly_mode.or(defaults.fly_mode).unwrap_or_default());

        let start = Vec3::new(0.0, eye_height, 0.0);
        let mut rig = Rig::new(start);
        rig.fly_mode = panel.fly_mode();

        let (media_tx, media_rx) = channel();
        Self {
            window: None,
            state: None,
            rig,
            input: InputState::default(),
            touch: TouchTracker::default(),
            panel,
            nav: None,
            step_cfg,
            max_frame_dt_s: pick(controls.max_frame_dt_s, defaults.max_frame_dt_s),
            dome_radius_m: pick(display.dome_radius_m, display_defaults.dome_radius_m),
            vsync: display.vsync.or(display_defaults.vsync).unwrap_or(true),
            startup_media: display.media_path.map(PathBuf::from),
            sequence: None,
            home_pose: (start, Quat::IDENTITY),
            last_time: None,
            mouse_pressed: false,
            last_cursor: None,
            warned_degraded: false,
            frames: 0,
            fps_window_start: None,
            media_tx,
            media_rx,
        }
    }

    fn handle_key(&mut self, code: KeyCode, pressed: bool) {
        // Movement/orientation intents are gated until the scene is ready so
        // an uninitialized camera never moves.
        if self.rig.ready() {
            let kb = &mut self.input.keyboard;
            match code {
                KeyCode::KeyW | KeyCode::ArrowUp => kb.forward = pressed,
                KeyCode::KeyS | KeyCode::ArrowDown => kb.backward = pressed,
                KeyCode::KeyA | KeyCode::ArrowLeft => kb.left = pressed,
                KeyCode::KeyD | KeyCode::ArrowRight => kb.right = pressed,
                KeyCode::KeyQ => kb.turn_left = pressed,
                KeyCode::KeyE => kb.turn_right = pressed,
                KeyCode::KeyR => kb.up = pressed,
                KeyCode::KeyF => kb.down = pressed,
                _ => {}
            }
        }
        if !pressed {
            return;
        }
        match code {
            KeyCode::KeyG => {
                self.panel.toggle_fly();
                log::info!(
                    "fly mode {}",
                    if self.panel.fly_mode() { "on" } else { "off" }
                );
            }
            KeyCode::Home => {
                let (pos, rot) = self.home_pose;
                self.rig.teleport(pos, rot);
                log::info!("view reset");
            }
            KeyCode::F1 => {
                self.panel.toggle_stats();
            }
            _ => {}
        }
    }

    fn spawn_media_load(&self, path: PathBuf) {
        let tx = self.media_tx.clone();
        std::thread::spawn(move || {
            let msg = if path.is_dir() {
                FrameSequence::from_dir(&path, 24.0).map(MediaMsg::Sequence)
            } else {
                media::load_image(&path).map(MediaMsg::Still)
            };
            match msg {
                Ok(m) => {
                    if tx.send(m).is_err() {
                        log::debug!("media channel closed before {path:?} arrived");
                    }
                }
                // Failed loads keep the previous texture in place.
                Err(e) => log::warn!("media load failed: {e}"),
            }
        });
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let dt = self
            .last_time
            .take()
            .map_or(1.0 / 60.0, |t0| (now - t0).as_secs_f32());
        self.last_time = Some(now);
        // Long stalls (tab suspend, debugger) otherwise become one giant
        // step that can tunnel past the walkable boundary.
        let dt = dt.clamp(0.0, self.max_frame_dt_s);

        while let Ok(msg) = self.media_rx.try_recv() {
            match msg {
                MediaMsg::Still(img) => {
                    self.sequence = None;
                    if let Some(state) = &mut self.state {
                        state.set_media(&img);
                    }
                }
                MediaMsg::Sequence(seq) => {
                    log::info!("frame sequence: {} frames", seq.len());
                    self.sequence = Some(seq);
                }
            }
        }
        if let (Some(seq), Some(state)) = (&mut self.sequence, &mut self.state)
            && let Some(frame) = seq.advance(dt)
        {
            state.set_media(frame);
        }

        // Touch gestures and the panel's on-screen buttons share the
        // touch/on-screen intent channel (and its speed compensation).
        let b = self.panel.buttons;
        self.input.touch = Intents {
            forward: self.touch.forward_held() || b.forward,
            backward: b.backward,
            left: b.left,
            right: b.right,
            turn_left: b.turn_left,
            turn_right: b.turn_right,
            up: b.up,
            down: b.down,
        };
        // Mode flags take effect on the next simulated frame.
        self.rig.fly_mode = self.panel.fly_mode();

        if self.nav.is_none() && !self.warned_degraded && self.rig.ready() {
            log::warn!("no walkable surface; movement is unconstrained");
            self.warned_degraded = true;
        }
        let nav = self.nav.as_ref().map(|n| n as &dyn WalkableQuery);
        self.rig.step(&self.input, nav, &self.step_cfg, dt);

        let grade = self.panel.grade();
        if let Some(state) = &mut self.state {
            state.update_globals(
                self.rig.pos,
                self.rig.rotation(),
                self.panel.fov_deg(),
                [grade.brightness, grade.contrast, grade.saturation],
            );
            if let Err(err) = state.render() {
                match err {
                    SurfaceError::Lost | SurfaceError::Outdated => {
                        let size = state.size;
                        state.resize(size);
                    }
                    SurfaceError::OutOfMemory => event_loop.exit(),
                    e => log::error!("render error: {e:?}"),
                }
            }
        }

        self.frames += 1;
        let window_start = *self.fps_window_start.get_or_insert(now);
        let elapsed = (now - window_start).as_secs_f32();
        if elapsed >= 1.0 {
            if self.panel.stats_enabled() {
                log::info!("fps: {:.1}", self.frames as f32 / elapsed);
            }
            self.frames = 0;
            self.fps_window_start = Some(now);
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let window = match event_loop.create_window(
            WindowAttributes::default()
                .with_title("Domeview")
                .with_inner_size(winit::dpi::LogicalSize::new(1280, 720)),
        ) {
            Ok(w) => w,
            Err(e) => {
                log::error!("create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let params = DomeParams {
            radius_m: self.dome_radius_m,
            tilt_deg: self.panel.dome_tilt_deg(),
            ..Default::default()
        };
        let scene = build_scene(&params);
        let nav = WalkableIndex::from_mesh(&scene.floor.positions, &scene.floor.indices, 45.0);
        if nav.is_empty() {
            log::warn!("walkable index came up empty");
            self.nav = None;
        } else {
            log::info!("walkable index: {} triangles", nav.len());
            self.nav = Some(nav);
        }

        let state = match pollster::block_on(Renderer::new(&window, &scene, self.vsync)) {
            Ok(s) => s,
            Err(e) => {
                log::info!("renderer init skipped: {e:#}");
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window);
        self.state = Some(state);

        if let Some(path) = self.startup_media.take() {
            self.spawn_media_load(path);
        }

        // Scene + surface are live: unlock movement and adopt the camera's
        // starting transform as the orientation base.
        let (pos, rot) = self.home_pose;
        self.rig.teleport(pos, rot);
        self.rig.set_ready(true);
        self.last_time = Some(Instant::now());
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = &self.window else {
            return;
        };
        if window.id() != window_id {
            return;
        }
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(state) = &mut self.state {
                    state.resize(size);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.repeat {
                    return;
                }
                if let PhysicalKey::Code(code) = event.physical_key {
                    self.handle_key(code, event.state.is_pressed());
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left {
                    self.mouse_pressed = state == ElementState::Pressed;
                    if !self.mouse_pressed {
                        self.last_cursor = None;
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let pos = Vec2::new(position.x as f32, position.y as f32);
                if self.mouse_pressed {
                    if let Some(last) = self.last_cursor {
                        let d = pos - last;
                        self.rig.apply_look(&self.step_cfg.mouselook, d.x, d.y);
                    }
                    self.last_cursor = Some(pos);
                }
            }
            WindowEvent::Touch(t) => {
                let pos = Vec2::new(t.location.x as f32, t.location.y as f32);
                match t.phase {
                    TouchPhase::Started => self.touch.begin(t.id, pos),
                    TouchPhase::Moved => {
                        if let Some(d) = self.touch.moved(t.id, pos) {
                            self.rig.apply_look(&self.step_cfg.mouselook, d.x, d.y);
                        }
                    }
                    TouchPhase::Ended | TouchPhase::Cancelled => self.touch.end(t.id),
                }
            }
            WindowEvent::Focused(false) => {
                // Keys released while unfocused never send their key-up.
                self.input.keyboard.clear();
                self.touch.clear();
                self.mouse_pressed = false;
                self.last_cursor = None;
            }
            WindowEvent::DroppedFile(path) => {
                log::info!("media dropped: {path:?}");
                self.spawn_media_load(path);
            }
            WindowEvent::RedrawRequested => self.frame(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(win) = &self.window {
            win.request_redraw();
        }
    }
}

fn is_headless() -> bool {
    if std::env::var("DOME_HEADLESS")
        .map(|v| v == "1")
        .unwrap_or(false)
    {
        return true;
    }
    if std::env::var("CI")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false)
    {
        return true;
    }
    #[cfg(any(
        target_os = "linux",
        target_os = "freebsd",
        target_os = "dragonfly",
        target_os = "netbsd",
        target_os = "openbsd",
    ))]
    {
        if std::env::var_os("DISPLAY").is_none() && std::env::var_os("WAYLAND_DISPLAY").is_none() {
            return true;
        }
    }
    false
}

pub fn run() -> anyhow::Result<()> {
    if is_headless() {
        return Ok(());
    }
    let event_loop = EventLoop::new()?;
    let mut app = App::from_configs();
    event_loop.run_app(&mut app)?;
    Ok(())
}
