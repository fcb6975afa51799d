use std::collections::{BTreeMap, HashMap};

use crate::models::chart::{ChartDataset, ChartRow, ChartScale};
use crate::models::price::SeriesMap;

/// Generates chart-ready data sets from a published series map.
///
/// The core computes all the numbers; the frontend only renders.
/// Series are merged on their date label: rows appear in the order a label
/// is first seen (coins in registry order), and a coin missing a label simply
/// has no value in that row.
pub struct ChartService;

impl ChartService {
    pub fn new() -> Self {
        Self
    }

    pub fn build_dataset(&self, series_map: &SeriesMap, scale: ChartScale) -> ChartDataset {
        let mut rows: Vec<ChartRow> = Vec::new();
        let mut row_by_date: HashMap<String, usize> = HashMap::new();
        let mut coins = Vec::new();

        for (coin, series) in series_map.iter() {
            let base = match scale {
                ChartScale::Absolute => None,
                ChartScale::Indexed => match series.first() {
                    Some(first) if first.price != 0.0 => Some(first.price),
                    // Cannot rebase a series starting at 0 (or an empty one).
                    _ => continue,
                },
            };
            if series.is_empty() {
                continue;
            }
            coins.push(coin);

            for sample in series {
                let value = match base {
                    Some(b) => sample.price / b * 100.0,
                    None => sample.price,
                };
                let idx = *row_by_date.entry(sample.date.clone()).or_insert_with(|| {
                    rows.push(ChartRow {
                        date: sample.date.clone(),
                        values: BTreeMap::new(),
                    });
                    rows.len() - 1
                });
                rows[idx].values.insert(coin, value);
            }
        }

        ChartDataset {
            window: series_map.window(),
            scale,
            coins,
            rows,
        }
    }
}

impl Default for ChartService {
    fn default() -> Self {
        Self::new()
    }
}
