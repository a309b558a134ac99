use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::widgets::{Block, Widget};

use crate::analysis::AnalysisFrame;
use crate::config::VisualSettings;

use super::frame_loop::{FrameConsumer, FrameContext};

/// Share of the panel a full-scale bin reaches.
const PEAK_SCALE: f32 = 0.8;
/// Height band of the idle pattern.
const IDLE_MIN: f32 = 0.05;
const IDLE_MAX: f32 = 0.16;

const EIGHTHS: [char; 8] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇'];

/// Spectrum bars. Heights are fractions of the panel height.
pub struct BarVisualizer {
    heights: Vec<f32>,
    idle: bool,
    max_bars: usize,
    idle_bars: usize,
    rng: StdRng,
}

impl BarVisualizer {
    pub fn new(max_bars: usize, idle_bars: usize) -> Self {
        Self::with_rng(max_bars, idle_bars, StdRng::from_os_rng())
    }

    pub fn with_rng(max_bars: usize, idle_bars: usize, rng: StdRng) -> Self {
        Self {
            heights: Vec::new(),
            idle: true,
            max_bars,
            idle_bars,
            rng,
        }
    }

    pub fn from_settings(settings: &VisualSettings) -> Self {
        Self::new(settings.max_bars, settings.idle_bars)
    }

    /// Recompute bar heights. Paused playback or an empty frame shows a low
    /// random pattern instead of a flat line.
    pub fn update(&mut self, frame: &AnalysisFrame, ctx: FrameContext) {
        self.heights.clear();
        if !ctx.playing || frame.is_empty() {
            self.idle = true;
            for _ in 0..self.idle_bars {
                self.heights.push(self.rng.random_range(IDLE_MIN..IDLE_MAX));
            }
            return;
        }

        self.idle = false;
        let count = frame.len().min(self.max_bars);
        self.heights.extend(
            frame.bins()[..count]
                .iter()
                .map(|&b| b as f32 / 255.0 * PEAK_SCALE),
        );
    }

    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    pub fn is_idle(&self) -> bool {
        self.idle
    }

    pub fn widget(&self) -> Bars<'_> {
        Bars {
            heights: &self.heights,
            idle: self.idle,
            block: None,
        }
    }
}

impl FrameConsumer for BarVisualizer {
    fn on_frame(&mut self, frame: &AnalysisFrame, ctx: FrameContext) {
        self.update(frame, ctx);
    }
}

/// Bars drawn bottom-up with eighth-block resolution.
pub struct Bars<'a> {
    heights: &'a [f32],
    idle: bool,
    block: Option<Block<'a>>,
}

impl<'a> Bars<'a> {
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

/// Magenta through violet to cyan, left to right.
fn bar_color(position: f32) -> Color {
    const STOPS: [(f32, f32, f32); 3] = [
        (255.0, 0.0, 255.0),
        (139.0, 92.0, 246.0),
        (6.0, 182.0, 212.0),
    ];
    let t = position.clamp(0.0, 1.0) * 2.0;
    let (a, b, f) = if t < 1.0 {
        (STOPS[0], STOPS[1], t)
    } else {
        (STOPS[1], STOPS[2], t - 1.0)
    };
    let mix = |x: f32, y: f32| (x + (y - x) * f).round() as u8;
    Color::Rgb(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

impl Widget for Bars<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = if let Some(block) = self.block {
            let inner = block.inner(area);
            block.render(area, buf);
            inner
        } else {
            area
        };

        if inner.width == 0 || inner.height == 0 || self.heights.is_empty() {
            return;
        }

        let n = self.heights.len();
        let cols = inner.width as usize;
        let rows = inner.height as usize;
        for cx in 0..cols {
            let bar = cx * n / cols;
            let eighths = (self.heights[bar].clamp(0.0, 1.0) * (rows * 8) as f32).round() as usize;
            let color = if self.idle {
                Color::DarkGray
            } else {
                bar_color(bar as f32 / n.max(2).saturating_sub(1) as f32)
            };

            for row in 0..rows {
                let filled = eighths.saturating_sub(row * 8).min(8);
                if filled == 0 {
                    break;
                }
                let ch = if filled == 8 { '█' } else { EIGHTHS[filled] };
                let x = inner.x + cx as u16;
                let y = inner.y + (rows - 1 - row) as u16;
                buf[(x, y)].set_char(ch).set_fg(color);
            }
        }
    }
}
