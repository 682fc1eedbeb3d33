use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use regex::Regex;

/// `#mmmcc:data`: three-digit measure, two-character channel.
static GRID_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#([0-9]{3})([0-9A-Za-z]{2}):(.*)$").expect("grid pattern is valid")
});

/// `#KEY value`
static DIRECTIVE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#([0-9A-Za-z_]+)[ \t]+(.*)$").expect("directive pattern is valid")
});

/// Parsed but uncompiled chart text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawChart {
    /// Header directives, keys upper-cased.
    pub headers: HashMap<String, String>,
    /// Measure index -> channel code -> step data.
    pub measures: BTreeMap<u32, BTreeMap<String, String>>,
    /// `#BPMxx` tempo values.
    pub bpm_defs: HashMap<String, f64>,
    /// `#STOPxx` durations in 1/192-measure ticks.
    pub stop_defs: HashMap<String, f64>,
    /// `#WAVxx` sample files.
    pub wav_defs: HashMap<String, String>,
}

impl RawChart {
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(String::as_str)
    }

    pub fn max_measure(&self) -> Option<u32> {
        self.measures.keys().next_back().copied()
    }
}

/// Parse chart text into headers, measure grids and definition tables.
///
/// Best-effort: lines that match neither the grid nor the directive pattern are
/// skipped, and later lines overwrite earlier ones for the same key.
pub fn parse_chart(source: &str) -> RawChart {
    let mut raw = RawChart::default();

    for line in source.lines() {
        let line = line.trim();
        if !line.starts_with('#') {
            continue;
        }

        if let Some(caps) = GRID_LINE.captures(line) {
            let Ok(measure) = caps[1].parse::<u32>() else {
                continue;
            };
            let channel = caps[2].to_ascii_uppercase();
            let data = caps[3].trim().to_ascii_uppercase();
            raw.measures
                .entry(measure)
                .or_default()
                .insert(channel, data);
            continue;
        }

        if let Some(caps) = DIRECTIVE_LINE.captures(line) {
            let key = caps[1].to_ascii_uppercase();
            let value = caps[2].trim().to_string();
            register_definition(&mut raw, &key, &value);
            raw.headers.insert(key, value);
            continue;
        }

        log::trace!("skipping unrecognized line: {line}");
    }

    raw
}

fn register_definition(raw: &mut RawChart, key: &str, value: &str) {
    if let Some(id) = definition_id(key, "STOP", 6) {
        if let Ok(ticks) = value.parse::<f64>() {
            raw.stop_defs.insert(id, ticks);
        }
    } else if let Some(id) = definition_id(key, "BPM", 5) {
        if let Ok(bpm) = value.parse::<f64>() {
            raw.bpm_defs.insert(id, bpm);
        }
    } else if let Some(id) = definition_id(key, "WAV", 5) {
        raw.wav_defs.insert(id, value.to_string());
    }
}

fn definition_id(key: &str, prefix: &str, total_len: usize) -> Option<String> {
    if key.len() == total_len {
        key.strip_prefix(prefix).map(str::to_string)
    } else {
        None
    }
}
