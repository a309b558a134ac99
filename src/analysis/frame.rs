/// Frequency range a bin belongs to, by thirds of the frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Band {
    Low,
    Mid,
    High,
}

/// One sampled spectrum: a magnitude in `0..=255` per frequency bin, lowest
/// frequency first. Only the most recent frame matters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisFrame(Vec<u8>);

impl AnalysisFrame {
    /// What consumers get when nothing is attached.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn bins(&self) -> &[u8] {
        &self.0
    }

    /// Mean bin value, 0 for an empty frame.
    pub fn mean(&self) -> f32 {
        mean(&self.0)
    }

    /// Mean bin value scaled to `[0, 1]`.
    pub fn intensity(&self) -> f32 {
        self.mean() / 255.0
    }

    /// Intensity of the low, mid and high thirds of the frame.
    pub fn band_intensities(&self) -> [f32; 3] {
        let len = self.0.len();
        let mut out = [0.0; 3];
        for (i, slot) in out.iter_mut().enumerate() {
            let band = &self.0[i * len / 3..(i + 1) * len / 3];
            *slot = mean(band) / 255.0;
        }
        out
    }

    /// The loudest third. Ties go to the lower band; `None` when empty.
    pub fn dominant_band(&self) -> Option<Band> {
        if self.0.is_empty() {
            return None;
        }
        let [low, mid, high] = self.band_intensities();
        Some(if low >= mid && low >= high {
            Band::Low
        } else if mid >= high {
            Band::Mid
        } else {
            Band::High
        })
    }
}

impl From<Vec<u8>> for AnalysisFrame {
    fn from(bins: Vec<u8>) -> Self {
        Self(bins)
    }
}

fn mean(bins: &[u8]) -> f32 {
    if bins.is_empty() {
        return 0.0;
    }
    bins.iter().map(|&b| b as u32).sum::<u32>() as f32 / bins.len() as f32
}
