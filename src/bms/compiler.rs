use super::channel::{self, Channel, NULL_ID};
use super::parser::RawChart;
use super::timing::{DEFAULT_BPM, TimeEvent, TimingMap};
use super::{BgmEvent, Chart, LANE_COUNT, LnMode, Metadata, Note};

/// Beats in a measure without a `02` length scale.
pub const DEFAULT_MEASURE_BEATS: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelEventKind {
    Tap,
    Hold,
    Background,
}

/// A note or background cue found while scanning the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelEvent {
    pub beat: f64,
    pub kind: ChannelEventKind,
    pub lane: Option<usize>,
    /// Raw two-character step value.
    pub id: String,
}

impl ChannelEvent {
    fn is_null(&self) -> bool {
        self.id == NULL_ID
    }
}

/// Start beat and length of every measure from 0 to the last used index.
#[derive(Debug, Clone, Default)]
pub struct MeasureLayout {
    starts: Vec<f64>,
    lengths: Vec<f64>,
}

impl MeasureLayout {
    pub fn from_raw(raw: &RawChart) -> Self {
        let Some(max_measure) = raw.max_measure() else {
            return Self::default();
        };

        let mut layout = Self::default();
        let mut start = 0.0;
        for index in 0..=max_measure {
            let beats = raw
                .measures
                .get(&index)
                .and_then(|channels| channels.get("02"))
                .map_or(DEFAULT_MEASURE_BEATS, |scale| {
                    Self::scaled_length(index, scale)
                });
            layout.starts.push(start);
            layout.lengths.push(beats);
            start += beats;
        }
        layout
    }

    fn scaled_length(index: u32, scale: &str) -> f64 {
        match scale.parse::<f64>() {
            Ok(value) if value > 0.0 && value.is_finite() => DEFAULT_MEASURE_BEATS * value,
            _ => {
                log::warn!("measure {index}: ignoring invalid length scale {scale:?}");
                DEFAULT_MEASURE_BEATS
            }
        }
    }

    /// `(start_beat, length_in_beats)` for a measure.
    pub fn get(&self, index: u32) -> Option<(f64, f64)> {
        let index = index as usize;
        Some((*self.starts.get(index)?, *self.lengths.get(index)?))
    }

    /// Beat at which the last measure ends.
    pub fn end_beat(&self) -> f64 {
        match (self.starts.last(), self.lengths.last()) {
            (Some(start), Some(len)) => start + len,
            _ => 0.0,
        }
    }

    /// Every measure start plus the chart end.
    pub fn boundaries(&self) -> impl Iterator<Item = f64> + '_ {
        self.starts
            .iter()
            .copied()
            .chain(std::iter::once(self.end_beat()))
    }
}

/// Compile a parsed chart into an absolute-time schedule.
pub fn compile(raw: &RawChart) -> Chart {
    let metadata = extract_metadata(raw);
    let layout = MeasureLayout::from_raw(raw);
    let (time_events, mut channel_events) = scan_grid(raw, &layout, metadata.ln_mode);

    let critical_beats: Vec<f64> = channel_events
        .iter()
        .map(|e| e.beat)
        .chain(layout.boundaries())
        .collect();
    let timing = TimingMap::build(metadata.initial_bpm, &time_events, critical_beats);

    channel_events.sort_by(|a, b| a.beat.total_cmp(&b.beat));
    let (notes, bgm_events) = materialize(&channel_events, &timing, metadata.ln_mode, raw);

    let chart = Chart {
        metadata,
        notes,
        bgm_events,
        bpms: timing.bpms().to_vec(),
        stops: timing.stops().to_vec(),
        duration: timing.total_seconds(),
        lane_count: LANE_COUNT,
    };
    log::debug!(
        "compiled \"{}\": {} notes, {} bgm events, {:.3}s",
        chart.metadata.title,
        chart.notes.len(),
        chart.bgm_events.len(),
        chart.duration
    );
    chart
}

fn extract_metadata(raw: &RawChart) -> Metadata {
    let initial_bpm = raw
        .header("BPM")
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|bpm| *bpm > 0.0)
        .unwrap_or(DEFAULT_BPM);

    Metadata {
        title: raw.header("TITLE").unwrap_or("Unknown").to_string(),
        artist: raw.header("ARTIST").unwrap_or("Unknown").to_string(),
        genre: raw.header("GENRE").unwrap_or("").to_string(),
        initial_bpm,
        ln_mode: raw.header("LNTYPE").map(LnMode::from_header).unwrap_or_default(),
        rank: raw.header("RANK").and_then(|v| v.trim().parse().ok()),
    }
}

/// Walk every measure/channel and emit typed events at absolute beats.
pub fn scan_grid(
    raw: &RawChart,
    layout: &MeasureLayout,
    ln_mode: LnMode,
) -> (Vec<TimeEvent>, Vec<ChannelEvent>) {
    let mut time_events = Vec::new();
    let mut channel_events = Vec::new();

    for (&index, channels) in &raw.measures {
        let Some((start, beats)) = layout.get(index) else {
            continue;
        };

        for (code, data) in channels {
            let Some(channel) = Channel::from_code(code) else {
                log::trace!("measure {index}: ignoring channel {code}");
                continue;
            };
            if !channel.is_step_channel() {
                continue;
            }

            let step_count = data.len() / 2;
            for (i, id) in channel::steps(data) {
                let beat = start + (i as f64 / step_count as f64) * beats;
                let is_null = id == NULL_ID;

                match channel {
                    Channel::BpmInline if !is_null => {
                        if let Some(bpm) = channel::parse_hex_id(id) {
                            time_events.push(TimeEvent::tempo(beat, bpm as f64));
                        }
                    }
                    Channel::BpmIndirect if !is_null => {
                        if let Some(&bpm) = raw.bpm_defs.get(id) {
                            time_events.push(TimeEvent::tempo(beat, bpm));
                        }
                    }
                    Channel::Stop if !is_null => {
                        if let Some(&ticks) = raw.stop_defs.get(id) {
                            time_events.push(TimeEvent::stop_ticks(beat, ticks));
                        }
                    }
                    Channel::Bgm if !is_null => channel_events.push(ChannelEvent {
                        beat,
                        kind: ChannelEventKind::Background,
                        lane: None,
                        id: id.to_string(),
                    }),
                    Channel::Tap(lane) if !is_null => channel_events.push(ChannelEvent {
                        beat,
                        kind: ChannelEventKind::Tap,
                        lane: Some(lane),
                        id: id.to_string(),
                    }),
                    Channel::Hold(lane) if !is_null || ln_mode == LnMode::ExplicitOff => {
                        channel_events.push(ChannelEvent {
                            beat,
                            kind: ChannelEventKind::Hold,
                            lane: Some(lane),
                            id: id.to_string(),
                        });
                    }
                    _ => {}
                }
            }
        }
    }

    (time_events, channel_events)
}

/// Resolve beat-ordered channel events into notes and background cues.
fn materialize(
    events: &[ChannelEvent],
    timing: &TimingMap,
    ln_mode: LnMode,
    raw: &RawChart,
) -> (Vec<Note>, Vec<BgmEvent>) {
    let mut notes = Vec::new();
    let mut bgm_events = Vec::new();
    // Open hold start time per lane.
    let mut pending_holds: [Option<f64>; LANE_COUNT] = [None; LANE_COUNT];

    for event in events {
        let time = timing.seconds_at(event.beat);
        match (event.kind, event.lane) {
            (ChannelEventKind::Background, _) => bgm_events.push(BgmEvent {
                time,
                sample_id: event.id.clone(),
                file: raw.wav_defs.get(&event.id).cloned(),
            }),
            (ChannelEventKind::Tap, Some(lane)) => notes.push(Note::tap(time, lane)),
            (ChannelEventKind::Hold, Some(lane)) => {
                let Some(slot) = pending_holds.get_mut(lane) else {
                    continue;
                };
                match ln_mode {
                    LnMode::Toggle => match slot.take() {
                        Some(start) => notes.push(Note::hold(start, lane, time - start)),
                        None => *slot = Some(time),
                    },
                    LnMode::ExplicitOff => {
                        if let Some(start) = slot.take() {
                            notes.push(Note::hold(start, lane, time - start));
                        }
                        if !event.is_null() {
                            *slot = Some(time);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    for (lane, slot) in pending_holds.iter().enumerate() {
        if let Some(start) = slot {
            log::warn!("discarding unterminated hold in lane {lane} starting at {start:.3}s");
        }
    }

    notes.sort_by(|a, b| a.time.total_cmp(&b.time));
    bgm_events.sort_by(|a, b| a.time.total_cmp(&b.time));
    (notes, bgm_events)
}
