use std::collections::HashMap;
use std::fmt;

use crate::model::{Graph, RECOGNIZED_ATTRIBUTES};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb(pub u32);

impl Rgb {
    pub const NEUTRAL: Rgb = Rgb(0xcccccc);
    pub const UNASSIGNED: Rgb = Rgb(0x4b5563);

    /// Accepts `#rrggbb` or `rrggbb`.
    pub fn from_hex(text: &str) -> Option<Self> {
        let digits = text.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        u32::from_str_radix(digits, 16).ok().map(Rgb)
    }

    pub fn from_channels([r, g, b]: [u8; 3]) -> Self {
        Rgb((u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b))
    }

    pub fn channels(self) -> [u8; 3] {
        [(self.0 >> 16) as u8, (self.0 >> 8) as u8, self.0 as u8]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0 & 0xff_ffff)
    }
}

const PALETTE: [u32; 10] = [
    0x1f77b4, 0xff7f0e, 0x2ca02c, 0xd62728, 0x9467bd, 0x8c564b, 0xe377c2, 0x7f7f7f, 0xbcbd22,
    0x17becf,
];

/// Color per (attribute, value). Values get palette entries in first-seen order; explicit
/// overrides win and survive recomputation.
#[derive(Clone, Debug, Default)]
pub struct PropertyColors {
    assigned: HashMap<String, HashMap<String, Rgb>>,
    overrides: HashMap<(String, String), Rgb>,
}

impl PropertyColors {
    pub fn refresh(&mut self, graph: &Graph) {
        self.assigned.clear();
        for attribute in RECOGNIZED_ATTRIBUTES {
            let values = graph.distinct_values(attribute);
            if values.is_empty() {
                continue;
            }
            let colors = values
                .into_iter()
                .enumerate()
                .map(|(index, value)| (value, Rgb(PALETTE[index % PALETTE.len()])))
                .collect();
            self.assigned.insert(attribute.to_owned(), colors);
        }
    }

    pub fn set_override(&mut self, attribute: &str, value: &str, color: Rgb) {
        self.overrides
            .insert((attribute.to_owned(), value.to_owned()), color);
    }

    pub fn color(&self, attribute: &str, value: &str) -> Option<Rgb> {
        if let Some(color) = self
            .overrides
            .get(&(attribute.to_owned(), value.to_owned()))
        {
            return Some(*color);
        }
        self.assigned.get(attribute)?.get(value).copied()
    }

    /// Color for a node value under `color_by`; `None` means coloring is off.
    pub fn color_for(&self, color_by: Option<&str>, value: Option<&str>) -> Rgb {
        let Some(attribute) = color_by else {
            return Rgb::NEUTRAL;
        };
        value
            .and_then(|value| self.color(attribute, value))
            .unwrap_or(Rgb::UNASSIGNED)
    }
}
