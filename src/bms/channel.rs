/// Null step value.
pub const NULL_ID: &str = "00";

/// Typed meaning of a two-character channel code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// `01`: background sample.
    Bgm,
    /// `02`: measure length scale.
    MeasureLength,
    /// `03`: tempo written inline as a hex byte.
    BpmInline,
    /// `08`: tempo looked up in `#BPMxx`.
    BpmIndirect,
    /// `09`: stop looked up in `#STOPxx`.
    Stop,
    /// `11`-`19`: tap note in the given lane.
    Tap(usize),
    /// `51`-`59`: hold note in the given lane.
    Hold(usize),
}

impl Channel {
    pub fn from_code(code: &str) -> Option<Self> {
        let bytes = code.as_bytes();
        let [bank, key] = bytes else {
            return None;
        };
        match (bank, key) {
            (b'0', b'1') => Some(Self::Bgm),
            (b'0', b'2') => Some(Self::MeasureLength),
            (b'0', b'3') => Some(Self::BpmInline),
            (b'0', b'8') => Some(Self::BpmIndirect),
            (b'0', b'9') => Some(Self::Stop),
            (b'1', key) => key_lane(*key).map(Self::Tap),
            (b'5', key) => key_lane(*key).map(Self::Hold),
            _ => None,
        }
    }

    pub fn is_step_channel(self) -> bool {
        self != Self::MeasureLength
    }
}

/// Natural lane for the key digit of a 1P note channel.
/// Keys 1-5 and 6-7 take lanes 0-6, scratch takes lane 7; `7` (free zone) is
/// reserved and has no lane.
fn key_lane(key: u8) -> Option<usize> {
    match key {
        b'1'..=b'5' => Some((key - b'1') as usize),
        b'8' => Some(5),
        b'9' => Some(6),
        b'6' => Some(7),
        _ => None,
    }
}

/// Split channel data into two-character steps, each with its position in the
/// measure. A trailing odd character is dropped, as is any step that does not
/// fall on a character boundary; the remaining steps keep their positions.
pub fn steps(data: &str) -> impl Iterator<Item = (usize, &str)> {
    let step_count = data.len() / 2;
    (0..step_count).filter_map(move |i| data.get(i * 2..i * 2 + 2).map(|id| (i, id)))
}

/// Inline tempo values are hex bytes.
pub fn parse_hex_id(id: &str) -> Option<u32> {
    u32::from_str_radix(id, 16).ok()
}
