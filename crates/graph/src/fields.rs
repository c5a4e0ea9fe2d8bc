use crate::{Graph, ItemType};
use std::collections::HashSet;

/// Value statistics of one attribute field over a sample of items
///
/// Only items carrying a non-null value count towards the sample. Items
/// are visited in enumeration order until `sample_size` values are found.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldStats {
    /// Sampled items with a non-null value
    pub present: usize,
    /// Sampled values coercible to a finite number
    pub numeric: usize,
    /// Distinct sampled values
    pub distinct: usize,
}

impl FieldStats {
    pub fn sample(graph: &dyn Graph, item_type: ItemType, field: &str, sample_size: usize) -> Self {
        let mut stats = FieldStats::default();
        let mut seen = HashSet::new();

        for id in graph.item_ids(item_type) {
            if stats.present >= sample_size {
                break;
            }
            let Some(value) = graph.attribute(item_type, id, field) else {
                continue;
            };
            if value.is_null() {
                continue;
            }
            stats.present += 1;
            if value.as_number().is_some() {
                stats.numeric += 1;
            }
            seen.insert(value.key());
        }

        stats.distinct = seen.len();
        stats
    }

    /// At least one item carries the field
    pub fn exists(&self) -> bool {
        self.present > 0
    }

    /// Every sampled value is a finite number or a numeric string
    pub fn is_quantitative(&self) -> bool {
        self.exists() && self.numeric == self.present
    }

    /// Sampled values fall into a small set of categories
    pub fn is_qualitative(&self, max_distinct: usize) -> bool {
        self.exists() && self.distinct <= max_distinct
    }
}
