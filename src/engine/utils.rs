use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::{Hazard, HazardKind};

pub fn now_ms() -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    now as u64
}

pub(super) fn next_index(index: usize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (index + 1) % len
}

pub(super) fn describe_hazard(hazard: &Hazard) -> String {
    match hazard.kind {
        HazardKind::Snake => format!("snake {}->{}", hazard.from, hazard.to),
        HazardKind::Ladder => format!("ladder {}->{}", hazard.from, hazard.to),
    }
}
