use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use log::{debug, trace};

use crate::analysis::{AnalyserBridge, AnalysisFrame};
use crate::config::VisualSettings;

/// Playback facts every consumer gets alongside the frame.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct FrameContext {
    pub playing: bool,
    pub has_track: bool,
}

/// Something redrawn from every sampled frame.
pub trait FrameConsumer {
    fn on_frame(&mut self, frame: &AnalysisFrame, ctx: FrameContext);
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Fixed-cadence scheduler standing in for the display refresh callback.
///
/// Each [`tick`](Self::tick) samples the analyser exactly once and then
/// dispatches that frame to the live subscribers in subscription order.
pub struct FrameLoop {
    interval: Duration,
    last: Option<Instant>,
    subscribers: Vec<(SubscriptionId, Rc<RefCell<dyn FrameConsumer>>)>,
    next_id: u64,
    latest: AnalysisFrame,
}

impl FrameLoop {
    pub fn new(fps: u32) -> Self {
        Self {
            interval: Duration::from_secs(1) / fps.max(1),
            last: None,
            subscribers: Vec::new(),
            next_id: 0,
            latest: AnalysisFrame::empty(),
        }
    }

    pub fn from_settings(settings: &VisualSettings) -> Self {
        Self::new(settings.fps)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn subscribe(&mut self, consumer: Rc<RefCell<dyn FrameConsumer>>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, consumer));
        debug!("frames: subscribed {id:?}");
        id
    }

    /// Stop calling the consumer behind `id`. Returns whether it was live.
    pub fn cancel(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        before != self.subscribers.len()
    }

    pub fn cancel_all(&mut self) {
        if !self.subscribers.is_empty() {
            debug!("frames: cancelled {} subscriptions", self.subscribers.len());
        }
        self.subscribers.clear();
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Whether a frame should run at `now`.
    pub fn due(&self, now: Instant) -> bool {
        self.last
            .is_none_or(|last| now.saturating_duration_since(last) >= self.interval)
    }

    /// How long until the next frame is due.
    pub fn time_until_next(&self, now: Instant) -> Duration {
        match self.last {
            Some(last) => self
                .interval
                .saturating_sub(now.saturating_duration_since(last)),
            None => Duration::ZERO,
        }
    }

    /// Run one frame: sample, then dispatch.
    pub fn tick(
        &mut self,
        now: Instant,
        analyser: &mut AnalyserBridge,
        ctx: FrameContext,
    ) -> &AnalysisFrame {
        self.last = Some(now);
        let frame = match analyser.current() {
            Some(handle) => analyser.sample(handle),
            None => AnalysisFrame::empty(),
        };
        trace!("frames: dispatching to {} consumers", self.subscribers.len());
        for (_, consumer) in &self.subscribers {
            if let Ok(mut consumer) = consumer.try_borrow_mut() {
                consumer.on_frame(&frame, ctx);
            }
        }
        self.latest = frame;
        &self.latest
    }

    /// The frame dispatched by the last tick.
    pub fn latest(&self) -> &AnalysisFrame {
        &self.latest
    }
}
