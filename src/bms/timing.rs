use super::{BpmPoint, StopEvent};

/// Beats closer than this are the same position.
pub const BEAT_EPSILON: f64 = 1e-6;

/// Stop ticks per beat (192 ticks per 4-beat measure).
pub const STOP_TICKS_PER_BEAT: f64 = 48.0;

/// Tempo used when the chart declares none.
pub const DEFAULT_BPM: f64 = 120.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeEventKind {
    /// New tempo in beats per minute.
    Tempo(f64),
    /// Pause length in beats at the tempo in effect.
    Stop(f64),
}

/// A tempo or stop change at an absolute beat.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeEvent {
    pub beat: f64,
    pub kind: TimeEventKind,
}

impl TimeEvent {
    pub fn tempo(beat: f64, bpm: f64) -> Self {
        Self {
            beat,
            kind: TimeEventKind::Tempo(bpm),
        }
    }

    pub fn stop_ticks(beat: f64, ticks: f64) -> Self {
        Self {
            beat,
            kind: TimeEventKind::Stop(ticks / STOP_TICKS_PER_BEAT),
        }
    }

    // Tempo applies before a stop at the same beat.
    fn priority(&self) -> u8 {
        match self.kind {
            TimeEventKind::Tempo(_) => 0,
            TimeEventKind::Stop(_) => 1,
        }
    }
}

/// Beat to seconds lookup built by walking every critical beat in order.
#[derive(Debug, Clone)]
pub struct TimingMap {
    initial_bpm: f64,
    breakpoints: Vec<f64>,
    /// Clock value at each breakpoint after its events were applied.
    time_after: Vec<f64>,
    bpm_after: Vec<f64>,
    bpms: Vec<BpmPoint>,
    stops: Vec<StopEvent>,
}

impl TimingMap {
    /// Integrate `events` into absolute time. `extra_beats` are positions that
    /// need an exact lookup entry (note beats, measure boundaries).
    pub fn build(
        initial_bpm: f64,
        events: &[TimeEvent],
        extra_beats: impl IntoIterator<Item = f64>,
    ) -> Self {
        let initial_bpm = if initial_bpm > 0.0 {
            initial_bpm
        } else {
            log::warn!("ignoring non-positive base tempo {initial_bpm}");
            DEFAULT_BPM
        };

        let mut events = events.to_vec();
        events.sort_by(|a, b| {
            a.beat
                .total_cmp(&b.beat)
                .then(a.priority().cmp(&b.priority()))
        });

        let breakpoints = Self::collect_breakpoints(&events, extra_beats);

        let mut time_after = Vec::with_capacity(breakpoints.len());
        let mut bpm_after = Vec::with_capacity(breakpoints.len());
        let mut bpms = vec![BpmPoint {
            time: 0.0,
            bpm: initial_bpm,
        }];
        let mut stops = Vec::new();

        let mut seconds = 0.0;
        let mut bpm = initial_bpm;
        let mut prev = breakpoints.first().copied().unwrap_or(0.0);
        let mut pending = events.iter().peekable();

        for &beat in &breakpoints {
            seconds += Self::beats_to_seconds(beat - prev, bpm);

            while let Some(event) = pending.next_if(|e| e.beat < beat + BEAT_EPSILON) {
                match event.kind {
                    TimeEventKind::Tempo(value) if value > 0.0 => {
                        bpm = value;
                        match bpms.last_mut() {
                            Some(last) if (last.time - seconds).abs() < f64::EPSILON => {
                                last.bpm = value;
                            }
                            _ => bpms.push(BpmPoint {
                                time: seconds,
                                bpm: value,
                            }),
                        }
                    }
                    TimeEventKind::Stop(beats) if beats > 0.0 => {
                        let duration = Self::beats_to_seconds(beats, bpm);
                        stops.push(StopEvent {
                            time: seconds,
                            duration,
                        });
                        seconds += duration;
                    }
                    kind => {
                        log::warn!("ignoring non-positive {kind:?} at beat {}", event.beat);
                    }
                }
            }

            time_after.push(seconds);
            bpm_after.push(bpm);
            prev = beat;
        }

        Self {
            initial_bpm,
            breakpoints,
            time_after,
            bpm_after,
            bpms,
            stops,
        }
    }

    fn collect_breakpoints(
        events: &[TimeEvent],
        extra_beats: impl IntoIterator<Item = f64>,
    ) -> Vec<f64> {
        let mut points: Vec<f64> = std::iter::once(0.0)
            .chain(events.iter().map(|e| e.beat))
            .chain(extra_beats)
            .filter(|b| b.is_finite())
            .collect();
        points.sort_by(f64::total_cmp);
        points.dedup_by(|later, earlier| (*later - *earlier).abs() < BEAT_EPSILON);
        points
    }

    fn beats_to_seconds(beats: f64, bpm: f64) -> f64 {
        if beats <= 0.0 || bpm <= 0.0 {
            return 0.0;
        }
        beats * 60.0 / bpm
    }

    /// Seconds at `beat`. Critical beats report the clock after their tempo
    /// and stop events; other beats are interpolated from the previous one.
    pub fn seconds_at(&self, beat: f64) -> f64 {
        let index = self
            .breakpoints
            .partition_point(|b| *b < beat - BEAT_EPSILON);
        if let Some(point) = self.breakpoints.get(index) {
            if (point - beat).abs() < BEAT_EPSILON {
                return self.time_after[index];
            }
        }
        if index == 0 {
            return Self::beats_to_seconds(beat, self.initial_bpm);
        }
        let base = index - 1;
        self.time_after[base]
            + Self::beats_to_seconds(beat - self.breakpoints[base], self.bpm_after[base])
    }

    /// Critical beats in increasing order.
    pub fn breakpoints(&self) -> &[f64] {
        &self.breakpoints
    }

    pub fn bpms(&self) -> &[BpmPoint] {
        &self.bpms
    }

    pub fn stops(&self) -> &[StopEvent] {
        &self.stops
    }

    /// Clock value at the last critical beat.
    pub fn total_seconds(&self) -> f64 {
        self.time_after.last().copied().unwrap_or(0.0)
    }
}
