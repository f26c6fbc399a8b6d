use crate::aggregate::{chart_series, AggregatedView, ChartBar};
use crate::colors::{ColorAssigner, ColorPair};
use crate::models::{Category, RecordId};
use crate::selection::SelectionView;
use crate::session::SessionContext;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// One-shot message shown on the next render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryGroup {
    pub category: RecordId,
    pub label: String,
    pub color: ColorPair,
    pub habits: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Activity {
    Loading,
    NoActivity { message: String },
    Groups { groups: Vec<CategoryGroup> },
    Error { message: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    pub user_email: Option<String>,
    pub today: NaiveDate,
    pub selected_date: NaiveDate,
    pub heading: String,
    pub categories: Vec<Category>,
    pub categories_error: Option<String>,
    pub habits_error: Option<String>,
    pub selection: SelectionView,
    pub activity: Activity,
    pub chart: Vec<ChartBar>,
    pub recording: bool,
    pub notice: Option<Notice>,
}

pub fn build_page(
    session: &mut SessionContext,
    today: NaiveDate,
    recording: bool,
    notice: Option<Notice>,
) -> PageView {
    let date = session.selected_date;
    let (activity, chart) = match (&session.view, &session.view_error) {
        (_, Some(message)) => (
            Activity::Error {
                message: message.clone(),
            },
            Vec::new(),
        ),
        (Some(view), None) => {
            let activity = if view.is_empty() {
                Activity::NoActivity {
                    message: no_activity_message(date, today),
                }
            } else {
                Activity::Groups {
                    groups: category_groups(view, &session.categories, &mut session.colors),
                }
            };
            let chart = chart_series(view, &session.categories, &mut session.colors);
            (activity, chart)
        }
        (None, None) => (Activity::Loading, Vec::new()),
    };

    PageView {
        user_email: session.user.email.clone(),
        today,
        selected_date: date,
        heading: heading(date, today),
        categories: session.categories.clone(),
        categories_error: session.categories_error.clone(),
        habits_error: session.habits_error.clone(),
        selection: session.selection.view(),
        activity,
        chart,
        recording,
        notice,
    }
}

fn category_groups(
    view: &AggregatedView,
    roster: &[Category],
    colors: &mut ColorAssigner,
) -> Vec<CategoryGroup> {
    view.groups()
        .iter()
        .map(|group| {
            let name = roster
                .iter()
                .find(|category| category.id == group.category)
                .map(|category| category.name.clone())
                .unwrap_or_else(|| format!("Category {}", group.category));
            CategoryGroup {
                category: group.category.clone(),
                label: format!(
                    "{name}: {} total {}",
                    group.total_points,
                    point_word(group.total_points)
                ),
                color: colors.color_for(&group.category),
                habits: group
                    .habits
                    .iter()
                    .map(|habit| {
                        let points = u64::from(habit.points);
                        format!("{}; {points} {}", habit.name, point_word(points))
                    })
                    .collect(),
            }
        })
        .collect()
}

pub fn point_word(points: u64) -> &'static str {
    if points == 1 { "point" } else { "points" }
}

pub fn describe_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

pub fn heading(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "Today's Logged Points".to_string()
    } else {
        format!("Logged Points for {}", describe_date(date))
    }
}

pub fn no_activity_message(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "No points earned today.".to_string()
    } else {
        format!("No points earned on {}.", describe_date(date))
    }
}
