use std::cell::RefCell;
use std::rc::Rc;

use crate::config::VisualSettings;

use super::bars::BarVisualizer;
use super::disc::DiscRenderer;
use super::frame_loop::{FrameLoop, SubscriptionId};
use super::particles::ParticleField;

/// The three visuals, subscribed to a [`FrameLoop`] while mounted.
pub struct Visuals {
    pub bars: Rc<RefCell<BarVisualizer>>,
    pub disc: Rc<RefCell<DiscRenderer>>,
    pub particles: Rc<RefCell<ParticleField>>,
    subscriptions: Vec<SubscriptionId>,
}

impl Visuals {
    pub fn new(settings: &VisualSettings) -> Self {
        Self {
            bars: Rc::new(RefCell::new(BarVisualizer::from_settings(settings))),
            disc: Rc::new(RefCell::new(DiscRenderer::from_settings(settings))),
            particles: Rc::new(RefCell::new(ParticleField::new(settings))),
            subscriptions: Vec::new(),
        }
    }

    /// Subscribe every visual. Mounting twice is a no-op.
    pub fn mount(&mut self, frames: &mut FrameLoop) {
        if self.is_mounted() {
            return;
        }
        self.subscriptions = vec![
            frames.subscribe(self.bars.clone()),
            frames.subscribe(self.disc.clone()),
            frames.subscribe(self.particles.clone()),
        ];
    }

    /// Cancel the subscriptions; the visuals keep their last state.
    pub fn unmount(&mut self, frames: &mut FrameLoop) {
        for id in self.subscriptions.drain(..) {
            frames.cancel(id);
        }
    }

    pub fn is_mounted(&self) -> bool {
        !self.subscriptions.is_empty()
    }
}
