use std::f32::consts::TAU;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::symbols::Marker;
use ratatui::widgets::canvas::{Canvas, Circle, Line};
use ratatui::widgets::{Block, Widget};

use crate::analysis::AnalysisFrame;
use crate::config::VisualSettings;

use super::frame_loop::{FrameConsumer, FrameContext};

/// The spinning record. Rotation freezes (never resets) while paused.
pub struct DiscRenderer {
    angle: f32,
    step: f32,
    glow: f32,
    has_track: bool,
}

impl DiscRenderer {
    /// `step` is the rotation per frame, in radians.
    pub fn new(step: f32) -> Self {
        Self {
            angle: 0.0,
            step,
            glow: 0.0,
            has_track: false,
        }
    }

    pub fn from_settings(settings: &VisualSettings) -> Self {
        Self::new(settings.disc_step)
    }

    pub fn update(&mut self, frame: &AnalysisFrame, ctx: FrameContext) {
        self.has_track = ctx.has_track;
        if ctx.has_track && ctx.playing {
            self.angle = (self.angle + self.step).rem_euclid(TAU);
            self.glow = frame.intensity();
        } else {
            self.glow = 0.0;
        }
    }

    /// Current rotation in `[0, TAU)`.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Glow strength in `[0, 1]`.
    pub fn glow(&self) -> f32 {
        self.glow
    }

    pub fn has_track(&self) -> bool {
        self.has_track
    }

    /// `cover_art` tints the label when the track carries a picture.
    pub fn widget(&self, cover_art: bool) -> Disc<'_> {
        Disc {
            angle: self.angle,
            glow: self.glow,
            has_track: self.has_track,
            cover_art,
            block: None,
        }
    }
}

impl FrameConsumer for DiscRenderer {
    fn on_frame(&mut self, frame: &AnalysisFrame, ctx: FrameContext) {
        self.update(frame, ctx);
    }
}

pub struct Disc<'a> {
    angle: f32,
    glow: f32,
    has_track: bool,
    cover_art: bool,
    block: Option<Block<'a>>,
}

impl<'a> Disc<'a> {
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

const GLOW: (u8, u8, u8) = (138, 43, 226);

impl Widget for Disc<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let has_track = self.has_track;
        let angle = self.angle as f64;
        let glow = self.glow.clamp(0.0, 1.0) as f64;
        let label = if self.cover_art {
            Color::Rgb(236, 72, 153)
        } else {
            Color::Rgb(139, 92, 246)
        };

        let mut canvas = Canvas::default()
            .marker(Marker::Braille)
            .x_bounds([-1.4, 1.4])
            .y_bounds([-1.4, 1.4])
            .paint(move |ctx| {
                if !has_track {
                    ctx.draw(&Circle {
                        x: 0.0,
                        y: 0.0,
                        radius: 1.0,
                        color: Color::DarkGray,
                    });
                    ctx.print(-0.45, 0.0, "no track");
                    return;
                }

                if glow > 0.02 {
                    let shade = |c: u8| (c as f64 * (0.3 + 0.7 * glow)) as u8;
                    ctx.draw(&Circle {
                        x: 0.0,
                        y: 0.0,
                        radius: 1.0 + 0.3 * glow,
                        color: Color::Rgb(shade(GLOW.0), shade(GLOW.1), shade(GLOW.2)),
                    });
                }
                ctx.draw(&Circle {
                    x: 0.0,
                    y: 0.0,
                    radius: 1.0,
                    color: Color::Gray,
                });
                for groove in [0.85, 0.7, 0.55] {
                    ctx.draw(&Circle {
                        x: 0.0,
                        y: 0.0,
                        radius: groove,
                        color: Color::DarkGray,
                    });
                }
                ctx.draw(&Circle {
                    x: 0.0,
                    y: 0.0,
                    radius: 0.3,
                    color: label,
                });
                // a highlight streak makes the rotation visible
                let (sin, cos) = angle.sin_cos();
                ctx.draw(&Line {
                    x1: 0.35 * cos,
                    y1: 0.35 * sin,
                    x2: 0.95 * cos,
                    y2: 0.95 * sin,
                    color: Color::White,
                });
            });
        if let Some(block) = self.block {
            canvas = canvas.block(block);
        }
        canvas.render(area, buf);
    }
}
