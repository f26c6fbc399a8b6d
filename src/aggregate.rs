use crate::colors::{ColorAssigner, ColorPair};
use crate::models::{Category, LogRow, RecordId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which figure of a log row counts toward category totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointSource {
    /// The habit's current default points.
    #[default]
    DefaultPoints,
    /// The points stored on the log row when it was recorded.
    RecordedPoints,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateRow {
    pub category: RecordId,
    pub habit_name: String,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HabitPoints {
    pub name: String,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotals {
    pub category: RecordId,
    pub total_points: u64,
    pub habits: Vec<HabitPoints>,
}

/// Per-date rollup. Groups appear in order of first row; absent categories
/// scored nothing that day.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct AggregatedView {
    groups: Vec<CategoryTotals>,
}

impl AggregatedView {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn get(&self, category: &RecordId) -> Option<&CategoryTotals> {
        self.groups.iter().find(|group| &group.category == category)
    }

    pub fn groups(&self) -> &[CategoryTotals] {
        &self.groups
    }

    pub fn total_for(&self, category: &RecordId) -> u64 {
        self.get(category).map(|group| group.total_points).unwrap_or(0)
    }
}

pub fn project_rows(rows: &[LogRow], source: PointSource) -> Vec<AggregateRow> {
    rows.iter()
        .map(|row| AggregateRow {
            category: row.habit.category.clone(),
            habit_name: row.habit.name.clone(),
            points: match source {
                PointSource::DefaultPoints => row.habit.default_points,
                PointSource::RecordedPoints => {
                    row.recorded_points.unwrap_or(row.habit.default_points)
                }
            },
        })
        .collect()
}

pub fn aggregate(rows: &[AggregateRow]) -> AggregatedView {
    let mut groups: Vec<CategoryTotals> = Vec::new();
    let mut positions: HashMap<&RecordId, usize> = HashMap::new();

    for row in rows {
        let index = *positions.entry(&row.category).or_insert_with(|| {
            groups.push(CategoryTotals {
                category: row.category.clone(),
                total_points: 0,
                habits: Vec::new(),
            });
            groups.len() - 1
        });

        let group = &mut groups[index];
        group.total_points = group.total_points.saturating_add(u64::from(row.points));
        group.habits.push(HabitPoints {
            name: row.habit_name.clone(),
            points: row.points,
        });
    }

    AggregatedView { groups }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartBar {
    pub category: RecordId,
    pub label: String,
    pub points: u64,
    pub color: ColorPair,
}

/// One bar per known category in roster order, zero-filled.
pub fn chart_series(
    view: &AggregatedView,
    roster: &[Category],
    colors: &mut ColorAssigner,
) -> Vec<ChartBar> {
    roster
        .iter()
        .map(|category| ChartBar {
            category: category.id.clone(),
            label: category.name.clone(),
            points: view.total_for(&category.id),
            color: colors.color_for(&category.id),
        })
        .collect()
}
