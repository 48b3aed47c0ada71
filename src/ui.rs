use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Instant;

use eframe::{App, CreationContext};
use egui::{Align2, CentralPanel, Color32, Context, FontId, Pos2, Rect, Sense, SidePanel, Stroke, Vec2};
use egui_plot::{Plot, PlotPoints, Points};
use emotion_canvas::collab::MoodIndicator;
use emotion_canvas::region::RegionStrategy;
use emotion_canvas::{Mood, MoveOutcome, Phase, SessionController, Viewport};
use tracing::info;

/// How many emitted notes the history plot keeps.
const NOTE_HISTORY: usize = 256;

/// The region indicator: remembers which mood label should be lit.
#[derive(Clone, Default)]
pub struct RegionIndicator {
    current: Rc<Cell<Option<Mood>>>,
}

impl RegionIndicator {
    pub fn current(&self) -> Option<Mood> {
        self.current.get()
    }
}

impl MoodIndicator for RegionIndicator {
    fn on_mood_changed(&mut self, mood: Option<Mood>) {
        self.current.set(mood);
    }
}

/// The canvas window.
pub struct CanvasApp {
    session: SessionController,
    indicator: RegionIndicator,
    label_positions: Vec<(Mood, (f32, f32))>,
    note_history: VecDeque<[f64; 2]>,
    status: String,
    hovered: bool,
    opened_at: Instant,
}

impl CanvasApp {
    pub fn new(session: SessionController, indicator: RegionIndicator) -> Self {
        let label_positions = label_positions(&session.config().regions);
        Self {
            session,
            indicator,
            label_positions,
            note_history: VecDeque::with_capacity(NOTE_HISTORY),
            status: "Status: Ready".to_string(),
            hovered: false,
            opened_at: Instant::now(),
        }
    }

    fn toggle_session(&mut self) {
        if self.session.phase().is_active() {
            self.session.stop();
            self.status = "Status: Stopped".to_string();
        } else {
            match self.session.start() {
                Ok(_) => self.status = "Status: Exploring".to_string(),
                Err(e) => self.status = e.to_string(),
            }
        }
    }

    fn controls(&mut self, ui: &mut egui::Ui) {
        ui.heading("Emotion Canvas");
        ui.separator();

        let mood_text = match self.indicator.current() {
            Some(mood) => mood.label(),
            None => "Awaiting exploration",
        };
        ui.label(format!("Current mood: {mood_text}"));
        ui.label(format!("Notes: {}", self.session.step_counter()));
        ui.label(self.status.as_str());
        let recording = match (self.session.phase(), self.session.last_recording()) {
            (Phase::Recording, _) => "Recording: In progress".to_string(),
            (_, Some(artifact)) => format!("Recording: Completed ({:.1}s)", artifact.duration_secs()),
            _ => "Recording: Off".to_string(),
        };
        ui.label(recording);
        ui.separator();

        let label = if self.session.phase().is_active() {
            "Stop Exploring"
        } else {
            "Start Exploring"
        };
        if ui.button(label).clicked() {
            self.toggle_session();
        }
        let can_clear = self.session.phase() != Phase::Recording;
        if ui.add_enabled(can_clear, egui::Button::new("Clear")).clicked() {
            if let Err(e) = self.session.clear() {
                self.status = e.to_string();
            } else {
                self.note_history.clear();
                self.status = "Status: Cleared".to_string();
            }
        }

        ui.separator();
        ui.label("Recent notes");
        let range = self.session.config().pitch.range;
        let points: Vec<[f64; 2]> = self.note_history.iter().copied().collect();
        Plot::new("notes")
            .height(180.0)
            .include_y(range.low() as f64)
            .include_y(range.high() as f64)
            .show(ui, |plot_ui| {
                plot_ui.points(Points::new(PlotPoints::from(points)).radius(3.0));
            });
    }

    fn canvas(&mut self, ui: &mut egui::Ui, now: Instant) {
        let config = self.session.config();
        let (design_w, design_h) = (config.design_width, config.design_height);
        let available = ui.available_size();
        let scale = (available.x / design_w).min(available.y / design_h).max(0.01);
        let (response, painter) = ui.allocate_painter(Vec2::new(design_w * scale, design_h * scale), Sense::hover());
        let rect = response.rect;
        let viewport = Viewport {
            origin: (rect.min.x, rect.min.y),
            scale,
        };
        let to_screen = |x: f32, y: f32| Pos2::new(rect.min.x + x * scale, rect.min.y + y * scale);

        painter.rect_filled(rect, 0.0, Color32::from_gray(24));

        let mapper = *self.session.mapper();
        for handle in self.session.effects().active() {
            let (x, y, w, h) = mapper.cell_rect(handle.cell);
            let [r, g, b] = handle.mood.color();
            let alpha = ((1.0 - handle.progress(now)) * 200.0) as u8;
            painter.rect_filled(
                Rect::from_min_max(to_screen(x, y), to_screen(x + w, y + h)),
                2.0,
                Color32::from_rgba_unmultiplied(r, g, b, alpha),
            );
        }

        let stroke = Stroke::new(1.0, Color32::from_gray(60));
        for col in 0..=mapper.grid_width {
            let x = col as f32 * mapper.cell_width();
            painter.line_segment([to_screen(x, 0.0), to_screen(x, design_h)], stroke);
        }
        for row in 0..=mapper.grid_height {
            let y = row as f32 * mapper.cell_height();
            painter.line_segment([to_screen(0.0, y), to_screen(design_w, y)], stroke);
        }

        let active = self.indicator.current();
        for &(mood, (nx, ny)) in &self.label_positions {
            let [r, g, b] = mood.color();
            let color = if active == Some(mood) {
                Color32::from_rgb(r, g, b)
            } else {
                Color32::from_rgba_unmultiplied(r, g, b, 90)
            };
            painter.text(
                to_screen(nx * design_w, ny * design_h),
                Align2::CENTER_CENTER,
                mood.label(),
                FontId::proportional(20.0),
                color,
            );
        }

        match response.hover_pos() {
            Some(pos) => {
                self.hovered = true;
                let outcome = self.session.pointer_move(pos.x, pos.y, viewport, now);
                if let MoveOutcome::Entered { notes, .. } = outcome {
                    let t = now.duration_since(self.opened_at).as_secs_f64();
                    for note in notes {
                        if self.note_history.len() == NOTE_HISTORY {
                            self.note_history.pop_front();
                        }
                        self.note_history.push_back([t + note.offset, note.pitch as f64]);
                    }
                }
            }
            None if self.hovered => {
                self.hovered = false;
                self.session.pointer_leave();
            }
            None => {}
        }
    }
}

impl App for CanvasApp {
    fn update(&mut self, ctx: &Context, _: &mut eframe::Frame) {
        let now = Instant::now();
        self.session.tick(now);
        ctx.request_repaint();

        SidePanel::right("controls").min_width(220.0).show(ctx, |ui| self.controls(ui));
        CentralPanel::default().show(ctx, |ui| self.canvas(ui, now));
    }
}

/// Where to print each mood's name: the centroid of a coarse sampling of its
/// region, in normalized coordinates.
fn label_positions(strategy: &RegionStrategy) -> Vec<(Mood, (f32, f32))> {
    const STEPS: u32 = 24;
    let mut sums = [(0.0f32, 0.0f32, 0u32); 4];
    for i in 0..=STEPS {
        for j in 0..=STEPS {
            let (x, y) = (i as f32 / STEPS as f32, j as f32 / STEPS as f32);
            if let Some(mood) = strategy.classify(x, y) {
                let slot = &mut sums[mood as usize];
                slot.0 += x;
                slot.1 += y;
                slot.2 += 1;
            }
        }
    }
    Mood::ALL
        .into_iter()
        .zip(sums)
        .filter(|(_, (_, _, n))| *n > 0)
        .map(|(mood, (sx, sy, n))| (mood, (sx / n as f32, sy / n as f32)))
        .collect()
}

/// Initializes and runs the eframe application.
pub fn run_ui(app: CanvasApp) -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions::default();
    info!("Opening canvas window");
    eframe::run_native(
        "Emotion Canvas",
        options,
        Box::new(|_cc: &CreationContext| Ok(Box::new(app))),
    )
}
