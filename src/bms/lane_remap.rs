use std::collections::{BTreeMap, BTreeSet};

use super::Note;

/// Lanes that carry at least one note.
pub fn used_lanes(notes: &[Note]) -> BTreeSet<usize> {
    notes.iter().map(|n| n.lane).collect()
}

/// Lane assignment for folding `used` onto `target_lane_count` lanes.
///
/// Lanes already in range keep their index. Out-of-range lanes take the unused
/// in-range lanes in ascending order; once those run out they wrap with
/// `lane % target_lane_count`.
pub fn lane_mapping(used: &BTreeSet<usize>, target_lane_count: usize) -> BTreeMap<usize, usize> {
    let mut mapping = BTreeMap::new();
    if target_lane_count == 0 {
        return mapping;
    }

    let mut free = (0..target_lane_count).filter(|lane| !used.contains(lane));
    for &lane in used {
        let target = if lane < target_lane_count {
            lane
        } else {
            free.next().unwrap_or(lane % target_lane_count)
        };
        mapping.insert(lane, target);
    }
    mapping
}

/// Rewrite note lanes so every note fits in `target_lane_count` lanes.
/// Note order and timing are untouched.
pub fn remap_lanes(notes: &[Note], target_lane_count: usize) -> Vec<Note> {
    let mapping = lane_mapping(&used_lanes(notes), target_lane_count);
    notes
        .iter()
        .map(|note| Note {
            lane: mapping.get(&note.lane).copied().unwrap_or(note.lane),
            ..*note
        })
        .collect()
}
