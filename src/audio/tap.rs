//! Output tap: a shared ring of the most recent (mono) samples played by the
//! engine, read by the analyser once per frame.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rodio::source::SeekError;
use rodio::{ChannelCount, SampleRate, Source};

/// Samples buffered in the decoder thread before the tap lock is taken.
const BATCH: usize = 256;

#[derive(Debug)]
struct TapBuffer {
    samples: VecDeque<f32>,
    capacity: usize,
    sample_rate: u32,
    /// Total samples ever written; lets readers tell fresh data from stale.
    written: u64,
}

/// Cloneable handle to the ring. All clones see the same samples.
#[derive(Debug, Clone)]
pub struct SampleTap {
    inner: Arc<Mutex<TapBuffer>>,
}

impl SampleTap {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(TapBuffer {
                samples: VecDeque::with_capacity(capacity),
                capacity: capacity.max(1),
                sample_rate: 44_100,
                written: 0,
            })),
        }
    }

    /// Append mono samples, evicting the oldest beyond capacity.
    pub fn push(&self, samples: &[f32], sample_rate: u32) {
        let Ok(mut buf) = self.inner.lock() else {
            return;
        };
        buf.sample_rate = sample_rate;
        buf.written += samples.len() as u64;
        let cap = buf.capacity;
        let skip = samples.len().saturating_sub(cap);
        for &s in &samples[skip..] {
            if buf.samples.len() == cap {
                buf.samples.pop_front();
            }
            buf.samples.push_back(s);
        }
    }

    /// Copy the newest samples into the tail of `out`, zero-filling the
    /// head when fewer are buffered. Returns the write counter at read time.
    pub fn read_latest(&self, out: &mut [f32]) -> u64 {
        out.fill(0.0);
        let Ok(buf) = self.inner.lock() else {
            return 0;
        };
        let n = out.len().min(buf.samples.len());
        let src_start = buf.samples.len() - n;
        let dst_start = out.len() - n;
        for (dst, src) in out[dst_start..]
            .iter_mut()
            .zip(buf.samples.range(src_start..))
        {
            *dst = *src;
        }
        buf.written
    }

    pub fn written(&self) -> u64 {
        self.inner.lock().map(|b| b.written).unwrap_or(0)
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().map(|b| b.capacity).unwrap_or(0)
    }

    pub fn sample_rate(&self) -> u32 {
        self.inner.lock().map(|b| b.sample_rate).unwrap_or(44_100)
    }

    pub fn clear(&self) {
        if let Ok(mut buf) = self.inner.lock() {
            buf.samples.clear();
        }
    }
}

/// Pass-through source that mirrors a mono downmix of everything it yields
/// into a [`SampleTap`].
pub struct TappedSource<S> {
    inner: S,
    tap: SampleTap,
    batch: Vec<f32>,
    acc: f32,
    channel: ChannelCount,
}

impl<S: Source> TappedSource<S> {
    pub fn new(inner: S, tap: SampleTap) -> Self {
        Self {
            inner,
            tap,
            batch: Vec::with_capacity(BATCH),
            acc: 0.0,
            channel: 0,
        }
    }

    fn flush(&mut self) {
        if !self.batch.is_empty() {
            self.tap.push(&self.batch, self.inner.sample_rate());
            self.batch.clear();
        }
    }
}

impl<S: Source> Iterator for TappedSource<S> {
    type Item = rodio::Sample;

    fn next(&mut self) -> Option<Self::Item> {
        let Some(sample) = self.inner.next() else {
            self.flush();
            return None;
        };

        let channels = self.inner.channels().max(1);
        self.acc += sample;
        self.channel += 1;
        if self.channel >= channels {
            self.batch.push(self.acc / channels as f32);
            self.acc = 0.0;
            self.channel = 0;
            if self.batch.len() >= BATCH {
                self.flush();
            }
        }
        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<S: Source> Source for TappedSource<S> {
    fn current_span_len(&self) -> Option<usize> {
        self.inner.current_span_len()
    }

    fn channels(&self) -> ChannelCount {
        self.inner.channels()
    }

    fn sample_rate(&self) -> SampleRate {
        self.inner.sample_rate()
    }

    fn total_duration(&self) -> Option<Duration> {
        self.inner.total_duration()
    }

    fn try_seek(&mut self, pos: Duration) -> Result<(), SeekError> {
        self.batch.clear();
        self.acc = 0.0;
        self.channel = 0;
        self.inner.try_seek(pos)
    }
}
