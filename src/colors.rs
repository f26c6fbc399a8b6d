use crate::models::RecordId;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColorPair {
    pub border: &'static str,
    pub background: &'static str,
}

const fn pair(border: &'static str, background: &'static str) -> ColorPair {
    ColorPair { border, background }
}

/// Dark-theme palette, cycled by id hash.
pub const PALETTE: [ColorPair; 12] = [
    pair("#60a5fa", "#1e3a5f"), // blue
    pair("#4ade80", "#1a3d2e"), // green
    pair("#fb923c", "#3d2817"), // orange
    pair("#c084fc", "#3d2054"), // purple
    pair("#f87171", "#3d1a1a"), // red
    pair("#22d3ee", "#0f3d47"), // cyan
    pair("#fbbf24", "#3d3410"), // yellow
    pair("#f472b6", "#3d1a30"), // pink
    pair("#2dd4bf", "#0f3d3a"), // teal
    pair("#fb7185", "#3d1721"), // rose
    pair("#a78bfa", "#2d1f54"), // violet
    pair("#86efac", "#1a3d28"), // light green
];

/// Memoizing category → color lookup for one session.
#[derive(Debug, Default)]
pub struct ColorAssigner {
    assigned: HashMap<RecordId, ColorPair>,
}

impl ColorAssigner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color_for(&mut self, category_id: &RecordId) -> ColorPair {
        *self
            .assigned
            .entry(category_id.clone())
            .or_insert_with(|| PALETTE[palette_index(category_id.as_str(), PALETTE.len())])
    }

    pub fn assigned_count(&self) -> usize {
        self.assigned.len()
    }
}

/// 32-bit string hash over UTF-16 code units, `hash * 31 + unit` with wrap.
pub fn id_hash(id: &str) -> i32 {
    id.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit))
    })
}

pub fn palette_index(id: &str, palette_len: usize) -> usize {
    id_hash(id).unsigned_abs() as usize % palette_len
}
