use crate::canvas::{Canvas, Surface};
use crate::compositor::Compositor;
use crate::config::{Config, Quality};
use crate::export::{snapshot_path, write_snapshot, SNAPSHOT_SIZE};
use crate::prefs::{prefs_storage_path, ViewerPrefs};
use crate::render::{self, Frame, HalfBlockRenderer};
use crate::session::{LogHaptics, Session, ShakeBurst};
use crate::simulation::SimulationState;
use crate::terminal::TerminalGuard;
use anyhow::Context;
use crossterm::event::{
    self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use glam::Vec2;
use log::{info, warn};
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

const NUDGE_STEP: f32 = 0.25;
const SHAKE_PEAK: f32 = 0.9;
const SHAKE_SECONDS: f64 = 0.35;

type ViewerSession = Session<LogHaptics, ShakeBurst>;

/// Everything the input handlers mutate. Kept apart from the terminal so key
/// handling can run without one.
pub struct Viewer {
    pub session: ViewerSession,
    pub show_hud: bool,
    pub show_help: bool,
    pub export_status: Option<String>,
    export_request: bool,
    pointer: Pointer,
}

#[derive(Debug, Default, Clone, Copy)]
struct Pointer {
    down_at: Option<(u16, u16)>,
    dragged: bool,
}

impl Viewer {
    pub fn new(state: SimulationState, show_hud: bool) -> Self {
        Self {
            session: Session::new(state, LogHaptics, ShakeBurst::new()),
            show_hud,
            show_help: false,
            export_status: None,
            export_request: false,
            pointer: Pointer::default(),
        }
    }

    /// Takes the pending `e` request, if any.
    pub fn take_export_request(&mut self) -> bool {
        std::mem::take(&mut self.export_request)
    }

    fn pinch_step(&mut self, delta: i32) {
        let n = self.session.state().symmetry_count() as f32;
        self.session.on_pinch_start();
        self.session.on_pinch((n + delta as f32) / n);
    }

    fn shake(&mut self, now: f64) {
        let dir = Vec2::from_angle(fastrand::f32() * std::f32::consts::TAU);
        self.session
            .motion_mut()
            .trigger(now, dir, SHAKE_PEAK, SHAKE_SECONDS);
    }

}

/// Returns true when the viewer should quit.
pub fn handle_key(code: KeyCode, mods: KeyModifiers, viewer: &mut Viewer, now: f64) -> bool {
    if mods.contains(KeyModifiers::CONTROL) && matches!(code, KeyCode::Char('c')) {
        return true;
    }
    match code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Left => viewer.session.nudge(Vec2::new(-NUDGE_STEP, 0.0)),
        KeyCode::Right => viewer.session.nudge(Vec2::new(NUDGE_STEP, 0.0)),
        KeyCode::Up => viewer.session.nudge(Vec2::new(0.0, -NUDGE_STEP)),
        KeyCode::Down => viewer.session.nudge(Vec2::new(0.0, NUDGE_STEP)),
        KeyCode::Char('+') | KeyCode::Char('=') => viewer.pinch_step(1),
        KeyCode::Char('-') | KeyCode::Char('_') => viewer.pinch_step(-1),
        KeyCode::Char('s') => viewer.shake(now),
        KeyCode::Char('p') => {
            let next = viewer.session.state().palette().next();
            viewer.session.select_palette(next);
        }
        KeyCode::Char('P') => {
            let prev = viewer.session.state().palette().prev();
            viewer.session.select_palette(prev);
        }
        KeyCode::Char('e') => viewer.export_request = true,
        KeyCode::Char('i') => viewer.show_hud = !viewer.show_hud,
        KeyCode::Char('h') | KeyCode::Char('?') | KeyCode::F(1) => {
            viewer.show_help = !viewer.show_help
        }
        _ => {}
    }
    false
}

/// Mouse input over a `cols` x `visual_rows` picture whose canvas has two
/// pixel rows per cell.
pub fn handle_mouse(ev: MouseEvent, viewer: &mut Viewer, cols: u16, visual_rows: u16) {
    let (cols_f, rows_f) = (cols.max(1) as f32, visual_rows.max(1) as f32);
    match ev.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if ev.row >= visual_rows {
                return;
            }
            viewer.pointer = Pointer {
                down_at: Some((ev.column, ev.row)),
                dragged: false,
            };
            let canvas_pos = Vec2::new(ev.column as f32 + 0.5, ev.row as f32 * 2.0 + 1.0);
            let normalized = Vec2::new(
                (ev.column as f32 + 0.5) / cols_f,
                (ev.row as f32 + 0.5) / rows_f,
            );
            viewer.session.on_tap(canvas_pos, normalized);
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            let Some((x0, y0)) = viewer.pointer.down_at else {
                return;
            };
            viewer.pointer.dragged = true;
            let translation = Vec2::new(
                (ev.column as f32 - x0 as f32) / cols_f,
                (ev.row as f32 - y0 as f32) / rows_f,
            );
            viewer.session.on_drag(translation);
        }
        MouseEventKind::Up(MouseButton::Left) => {
            if viewer.pointer.dragged {
                viewer.session.on_drag_end();
            }
            viewer.pointer = Pointer::default();
        }
        MouseEventKind::ScrollUp => viewer.pinch_step(1),
        MouseEventKind::ScrollDown => viewer.pinch_step(-1),
        _ => {}
    }
}

pub fn run(cfg: Config) -> anyhow::Result<()> {
    let prefs_path = cfg.prefs.as_ref().map(PathBuf::from).or_else(prefs_storage_path);
    let prefs = match ViewerPrefs::load(prefs_path.as_deref()) {
        Ok(p) => p,
        Err(err) => {
            warn!("ignoring prefs: {err}");
            ViewerPrefs::default()
        }
    };
    let palette = cfg.palette.unwrap_or(prefs.palette);
    let symmetry = cfg.symmetry.unwrap_or(prefs.symmetry);
    let state = match cfg.seed {
        Some(seed) => SimulationState::with_seed(palette, symmetry, seed),
        None => SimulationState::new(palette, symmetry),
    };
    info!(
        "starting: palette={} symmetry={} quality={}",
        palette.label(),
        state.symmetry_count(),
        cfg.quality.label()
    );

    let mut viewer = Viewer::new(state, cfg.hud);
    let result = run_terminal(&cfg, &mut viewer);

    let state = viewer.session.state();
    let remembered = ViewerPrefs {
        palette: state.palette(),
        symmetry: state.symmetry_count(),
    };
    if let Err(err) = remembered.save(prefs_path.as_deref()) {
        warn!("could not save prefs: {err}");
    }
    result
}

fn run_terminal(cfg: &Config, viewer: &mut Viewer) -> anyhow::Result<()> {
    let _term = TerminalGuard::new()?;
    let mut out = BufWriter::new(TerminalGuard::stdout());
    let mut renderer = HalfBlockRenderer::new();

    let mut last_size = crossterm::terminal::size().context("get terminal size")?;
    if last_size.1 < 2 || last_size.0 < 4 {
        return Err(anyhow::anyhow!(
            "terminal too small (need at least 4x2, got {}x{})",
            last_size.0,
            last_size.1
        ));
    }

    let mut runtime = RuntimeTuning::new(cfg.quality, cfg.adaptive_quality);
    let mut compositor = Compositor::new(runtime.quality);
    let mut canvas = Canvas::new(0, 0);
    let mut fps = FpsCounter::new();
    let mut exports: Option<Receiver<anyhow::Result<PathBuf>>> = None;
    let mut last_render_ms = 0.0f32;
    let mut last_total_ms = 0.0f32;
    let start = Instant::now();

    loop {
        let frame_start = Instant::now();
        let now = frame_start.duration_since(start).as_secs_f64();
        let mut hud_rows = hud_rows_for(last_size.1, viewer.show_hud);
        let mut visual_rows = render::visual_rows(last_size.1, hud_rows);

        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(k) if k.kind != KeyEventKind::Release => {
                    if handle_key(k.code, k.modifiers, viewer, now) {
                        return Ok(());
                    }
                }
                Event::Mouse(m) => handle_mouse(m, viewer, last_size.0, visual_rows),
                Event::Resize(c, r) => last_size = (c, r),
                _ => {}
            }
        }
        // Some terminals drop resize events.
        let sz = crossterm::terminal::size()?;
        if sz != last_size {
            last_size = sz;
        }
        let (term_cols, term_rows) = last_size;
        hud_rows = hud_rows_for(term_rows, viewer.show_hud);
        visual_rows = render::visual_rows(term_rows, hud_rows);

        viewer.session.on_frame(now);

        if viewer.take_export_request() {
            if exports.is_some() {
                viewer.export_status = Some("export already running".to_string());
            } else {
                exports = Some(spawn_export(viewer.session.state().clone(), cfg, now as f32));
                viewer.export_status = Some("exporting...".to_string());
            }
        }
        if let Some(rx) = &exports {
            if let Ok(done) = rx.try_recv() {
                viewer.export_status = Some(match done {
                    Ok(path) => format!("saved {}", path.display()),
                    Err(err) => {
                        warn!("export failed: {err:#}");
                        format!("export failed: {err}")
                    }
                });
                exports = None;
            }
        }

        let (w, h) = render::canvas_size(term_cols, visual_rows);
        if (canvas.width(), canvas.height()) != (w, h) {
            canvas = Canvas::new(w, h);
        }
        compositor.set_quality(runtime.quality);
        let render_start = Instant::now();
        compositor.render_into(&mut canvas, viewer.session.state(), now as f32);

        let hud = if viewer.show_hud {
            build_hud(viewer, runtime.quality, fps.fps(), last_render_ms, last_total_ms)
        } else {
            String::new()
        };
        let help = help_popup_text();
        let frame = Frame {
            term_cols,
            term_rows,
            visual_rows,
            canvas: &canvas,
            hud: &hud,
            hud_rows,
            overlay: viewer.show_help.then_some(help),
            sync_updates: cfg.sync_updates,
        };
        renderer.render(&frame, &mut out)?;
        last_render_ms = render_start.elapsed().as_secs_f32() * 1000.0;
        last_total_ms = frame_start.elapsed().as_secs_f32() * 1000.0;

        fps.tick();
        runtime.update(last_total_ms, 1000.0 / cfg.fps.max(1) as f32);

        let target = Duration::from_secs_f32(1.0 / cfg.fps.max(1) as f32);
        let elapsed = frame_start.elapsed();
        if elapsed < target {
            std::thread::sleep(target - elapsed);
        }
    }
}

/// Renders a full-size still from a detached copy of the state.
fn spawn_export(
    state: SimulationState,
    cfg: &Config,
    wall_time: f32,
) -> Receiver<anyhow::Result<PathBuf>> {
    let (tx, rx) = mpsc::channel();
    let dir = PathBuf::from(&cfg.snapshot_dir);
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    std::thread::spawn(move || {
        let path = snapshot_path(&dir, state.palette(), stamp);
        let res = write_snapshot(
            &state,
            Quality::High,
            SNAPSHOT_SIZE,
            SNAPSHOT_SIZE,
            wall_time,
            &path,
        )
        .map(|()| path);
        let _ = tx.send(res);
    });
    rx
}

fn hud_rows_for(term_rows: u16, show_hud: bool) -> u16 {
    if !show_hud || term_rows <= 1 {
        return 0;
    }
    (term_rows - 1).min(3)
}

pub fn build_hud(
    viewer: &Viewer,
    quality: Quality,
    fps: f32,
    render_ms: f32,
    total_ms: f32,
) -> String {
    let state = viewer.session.state();
    let palette = if state.color_transition_progress() < 1.0 {
        format!(
            "{} ({:>3.0}%)",
            state.palette().label(),
            state.color_transition_progress() * 100.0
        )
    } else {
        state.palette().label().to_string()
    };
    let evolution = if state.is_transitioning() {
        format!("morph {:>3.0}%", state.transition_progress() * 100.0)
    } else {
        format!(
            "{:>4.1}/{:.1}s",
            state.time_since_last_evolution(),
            state.evolution_interval()
        )
    };
    let mut lines = vec![
        format!(
            "Palette: {} | Folds: {} | Energy: {:.2}{} | Evolve: {} | Ripples: {} | Q: {} | FPS: {:>4.1} | ms(R/T): {:.1}/{:.1}",
            palette,
            state.symmetry_count(),
            state.kinetic_energy(),
            if state.is_resting() { " (rest)" } else { "" },
            evolution,
            state.ripple_count(),
            quality.label(),
            fps,
            render_ms,
            total_ms,
        ),
        "Keys: click ripple | drag/arrows pan | wheel/+/- folds | p/P palette | s shake | e export | i HUD | h help | q quit"
            .to_string(),
    ];
    if let Some(status) = &viewer.export_status {
        lines.push(format!("Export: {status}"));
    }
    lines.join("\n")
}

fn help_popup_text() -> &'static str {
    "Kaleidoscope\n\
click  drop a ripple\n\
drag  pan the view\n\
arrows  nudge the view\n\
wheel or + / -  more / fewer folds\n\
p / P  next / previous palette\n\
s  shake\n\
e  export a 1080x1080 PNG\n\
i  show/hide HUD\n\
h or ?  toggle this help\n\
q or esc  quit"
}

struct FpsCounter {
    last: Instant,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            last: Instant::now(),
            frames: 0,
            fps: 0.0,
        }
    }

    fn tick(&mut self) {
        self.frames += 1;
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        if dt >= 0.5 {
            self.fps = self.frames as f32 / dt;
            self.frames = 0;
            self.last = now;
        }
    }

    fn fps(&self) -> f32 {
        self.fps
    }
}

/// Steps compositor detail down when frames run long and back up to the
/// requested level when there is headroom.
#[derive(Debug, Clone)]
pub struct RuntimeTuning {
    base_quality: Quality,
    pub quality: Quality,
    adaptive: bool,
    ema_ms: f32,
}

impl RuntimeTuning {
    pub fn new(base_quality: Quality, adaptive: bool) -> Self {
        Self {
            base_quality,
            quality: base_quality,
            adaptive,
            ema_ms: 0.0,
        }
    }

    pub fn update(&mut self, frame_ms: f32, target_ms: f32) {
        if !self.adaptive {
            return;
        }
        self.ema_ms = if self.ema_ms == 0.0 {
            frame_ms
        } else {
            self.ema_ms * 0.95 + frame_ms * 0.05
        };

        if self.ema_ms > target_ms * 1.22 {
            self.quality = self.quality.lower();
        } else if self.ema_ms < target_ms * 0.72 && self.quality.rank() < self.base_quality.rank() {
            self.quality = self.quality.higher();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::Palette;

    fn viewer() -> Viewer {
        Viewer::new(SimulationState::with_seed(Palette::Dawn, 6, 11), true)
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn quit_keys() {
        let mut v = viewer();
        assert!(handle_key(KeyCode::Char('q'), KeyModifiers::NONE, &mut v, 0.0));
        assert!(handle_key(KeyCode::Esc, KeyModifiers::NONE, &mut v, 0.0));
        assert!(handle_key(KeyCode::Char('c'), KeyModifiers::CONTROL, &mut v, 0.0));
        assert!(!handle_key(KeyCode::Char('c'), KeyModifiers::NONE, &mut v, 0.0));
    }

    #[test]
    fn plus_and_minus_change_folds() {
        let mut v = viewer();
        handle_key(KeyCode::Char('+'), KeyModifiers::NONE, &mut v, 0.0);
        assert_eq!(v.session.state().symmetry_count(), 7);
        handle_key(KeyCode::Char('-'), KeyModifiers::NONE, &mut v, 0.0);
        handle_key(KeyCode::Char('-'), KeyModifiers::NONE, &mut v, 0.0);
        assert_eq!(v.session.state().symmetry_count(), 5);
    }

    #[test]
    fn palette_keys_cycle_and_start_fade() {
        let mut v = viewer();
        handle_key(KeyCode::Char('p'), KeyModifiers::NONE, &mut v, 0.0);
        assert_eq!(v.session.state().palette(), Palette::Ocean);
        assert_eq!(v.session.state().color_transition_progress(), 0.0);
        handle_key(KeyCode::Char('P'), KeyModifiers::NONE, &mut v, 0.0);
        assert_eq!(v.session.state().palette(), Palette::Dawn);
    }

    #[test]
    fn export_request_is_taken_once() {
        let mut v = viewer();
        handle_key(KeyCode::Char('e'), KeyModifiers::NONE, &mut v, 0.0);
        assert!(v.take_export_request());
        assert!(!v.take_export_request());
    }

    #[test]
    fn arrows_nudge_and_settle_back() {
        let mut v = viewer();
        for _ in 0..10 {
            handle_key(KeyCode::Right, KeyModifiers::NONE, &mut v, 0.0);
        }
        assert_eq!(v.session.state().touch_offset().x, 1.0);
        v.session.on_frame(0.0);
        v.session.on_frame(0.1);
        let x = v.session.state().touch_offset().x;
        assert!(x < 1.0 && x > 0.0);
        assert!(v.session.state().smooth_touch_offset().x > 0.0);
        for i in 2..200 {
            v.session.on_frame(i as f64 * 0.1);
        }
        assert_eq!(v.session.state().touch_offset(), Vec2::ZERO);
    }

    #[test]
    fn click_taps_and_drag_pans() {
        let mut v = viewer();
        handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 10, 5), &mut v, 40, 20);
        assert_eq!(v.session.state().ripple_count(), 1);

        handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 30, 5), &mut v, 40, 20);
        assert!(v.session.is_dragging());
        assert!((v.session.state().touch_offset().x - 0.5).abs() < 1e-6);

        handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 30, 5), &mut v, 40, 20);
        assert!(!v.session.is_dragging());
        assert!((v.session.state().touch_offset().x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn clicks_on_the_hud_are_ignored() {
        let mut v = viewer();
        handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 3, 21), &mut v, 40, 20);
        assert_eq!(v.session.state().ripple_count(), 0);
    }

    #[test]
    fn hud_mentions_palette_and_export_status() {
        let mut v = viewer();
        v.export_status = Some("saved x.png".to_string());
        let hud = build_hud(&v, Quality::Balanced, 60.0, 3.0, 5.0);
        assert!(hud.contains("Palette: Dawn"));
        assert!(hud.contains("Folds: 6"));
        assert!(hud.lines().last().unwrap().contains("saved x.png"));
    }

    #[test]
    fn runtime_tuning_steps_down_then_recovers() {
        let mut t = RuntimeTuning::new(Quality::High, true);
        for _ in 0..5 {
            t.update(40.0, 16.6);
        }
        assert!(t.quality.rank() < Quality::High.rank());
        for _ in 0..400 {
            t.update(2.0, 16.6);
        }
        assert_eq!(t.quality, Quality::High);

        let mut fixed = RuntimeTuning::new(Quality::Balanced, false);
        fixed.update(100.0, 16.6);
        assert_eq!(fixed.quality, Quality::Balanced);
    }
}
