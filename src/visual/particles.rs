//! Ambient particle backdrop. Purely cosmetic: particles spawn with the
//! music's energy, drift, fade and die.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::symbols::Marker;
use ratatui::widgets::canvas::{Canvas, Points};
use ratatui::widgets::Widget;

use crate::analysis::{AnalysisFrame, Band};
use crate::config::VisualSettings;

use super::color::hsl_to_rgb;
use super::frame_loop::{FrameConsumer, FrameContext};

/// Extent of the virtual field particles live in; scaled onto the screen.
pub const FIELD_WIDTH: f32 = 160.0;
pub const FIELD_HEIGHT: f32 = 90.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub vx: f32,
    pub vy: f32,
    /// Hue in degrees.
    pub hue: f32,
    /// Lightness in `[0, 1]`.
    pub lightness: f32,
    pub alpha: f32,
    pub life: u32,
    pub max_life: u32,
}

impl Particle {
    pub fn speed(&self) -> f32 {
        self.vx.hypot(self.vy)
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        hsl_to_rgb(self.hue, 1.0, self.lightness * self.alpha)
    }
}

pub struct ParticleField {
    particles: Vec<Particle>,
    max_per_frame: u32,
    spawn_chance: f32,
    life_min: u32,
    life_max: u32,
    rng: StdRng,
}

impl ParticleField {
    pub fn new(settings: &VisualSettings) -> Self {
        Self::with_rng(settings, StdRng::from_os_rng())
    }

    pub fn with_rng(settings: &VisualSettings, rng: StdRng) -> Self {
        Self {
            particles: Vec::new(),
            max_per_frame: settings.max_particles_per_frame,
            spawn_chance: settings.spawn_chance,
            life_min: settings.particle_life_min.max(1),
            life_max: settings.particle_life_max.max(settings.particle_life_min.max(1)),
            rng,
        }
    }

    /// One animation step. Spawning and perturbation only happen while
    /// playing a non-empty frame; existing particles always age.
    pub fn update(&mut self, frame: &AnalysisFrame, ctx: FrameContext) {
        if ctx.playing && !frame.is_empty() {
            let intensity = frame.intensity();
            if self.rng.random::<f32>() < intensity * self.spawn_chance {
                self.spawn(frame, intensity);
            }
            self.perturb(intensity);
        }
        self.advance();
    }

    fn spawn(&mut self, frame: &AnalysisFrame, intensity: f32) {
        let count = (intensity * self.max_per_frame as f32).floor() as u32;
        let bands = frame.band_intensities();
        let (base, spread, level) = match frame.dominant_band().unwrap_or(Band::Low) {
            Band::Low => (320.0, 20.0, bands[0]),
            Band::Mid => (270.0, 30.0, bands[1]),
            Band::High => (180.0, 40.0, bands[2]),
        };

        for _ in 0..count {
            let rng = &mut self.rng;
            let max_life = if self.life_max > self.life_min {
                rng.random_range(self.life_min..self.life_max)
            } else {
                self.life_min
            };
            self.particles.push(Particle {
                x: rng.random::<f32>() * FIELD_WIDTH,
                y: rng.random::<f32>() * FIELD_HEIGHT,
                size: 1.0 + rng.random::<f32>() * 3.0 * intensity,
                vx: (rng.random::<f32>() - 0.5) * 2.0 * intensity,
                vy: (rng.random::<f32>() - 0.5) * 2.0 * intensity,
                hue: base + rng.random::<f32>() * spread,
                lightness: 0.5 + level * 0.3,
                alpha: 0.7 + rng.random::<f32>() * 0.3,
                life: 0,
                max_life,
            });
        }
    }

    /// Nudge every velocity by up to `0.05 * intensity` per axis, then cap
    /// the speed at `2 * intensity`.
    fn perturb(&mut self, intensity: f32) {
        let cap = 2.0 * intensity;
        for p in &mut self.particles {
            p.vx += (self.rng.random::<f32>() - 0.5) * 0.1 * intensity;
            p.vy += (self.rng.random::<f32>() - 0.5) * 0.1 * intensity;
            let speed = p.speed();
            if speed > cap {
                let k = if speed > 0.0 { cap / speed } else { 0.0 };
                p.vx *= k;
                p.vy *= k;
            }
        }
    }

    fn advance(&mut self) {
        for p in &mut self.particles {
            p.x += p.vx;
            p.y += p.vy;
            p.life += 1;
            p.alpha = (1.0 - p.life as f32 / p.max_life as f32).max(0.0);
        }
        self.particles.retain(|p| p.life < p.max_life && p.alpha > 0.0);
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn widget(&self) -> ParticleCanvas<'_> {
        ParticleCanvas {
            particles: &self.particles,
        }
    }
}

impl FrameConsumer for ParticleField {
    fn on_frame(&mut self, frame: &AnalysisFrame, ctx: FrameContext) {
        self.update(frame, ctx);
    }
}

/// Draws particles over whatever is already in the buffer; empty cells are
/// left untouched.
pub struct ParticleCanvas<'a> {
    particles: &'a [Particle],
}

impl Widget for ParticleCanvas<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 || self.particles.is_empty() {
            return;
        }
        let particles = self.particles;
        Canvas::default()
            .marker(Marker::Braille)
            .x_bounds([0.0, FIELD_WIDTH as f64])
            .y_bounds([0.0, FIELD_HEIGHT as f64])
            .paint(move |ctx| {
                for p in particles {
                    let (r, g, b) = p.rgb();
                    ctx.draw(&Points {
                        coords: &[(p.x as f64, p.y as f64)],
                        color: Color::Rgb(r, g, b),
                    });
                }
            })
            .render(area, buf);
    }
}
