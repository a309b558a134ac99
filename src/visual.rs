//! Audio-reactive visuals and the frame loop that drives them.
//!
//! Each visual is a [`FrameConsumer`]: the [`FrameLoop`] samples the analyser
//! once per frame and hands the same [`AnalysisFrame`](crate::analysis::AnalysisFrame)
//! to every mounted consumer before anything is drawn.

mod bars;
mod color;
mod disc;
mod frame_loop;
mod mount;
mod particles;

pub use bars::{BarVisualizer, Bars};
pub use color::hsl_to_rgb;
pub use disc::{Disc, DiscRenderer};
pub use frame_loop::{FrameConsumer, FrameContext, FrameLoop, SubscriptionId};
pub use mount::Visuals;
pub use particles::{FIELD_HEIGHT, FIELD_WIDTH, Particle, ParticleCanvas, ParticleField};
