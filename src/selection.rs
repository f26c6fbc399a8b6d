use crate::errors::AppError;
use crate::models::{Habit, RecordId};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HabitOption {
    pub id: RecordId,
    pub name: String,
}

/// Dependent category → habit selection.
///
/// A habit can only be chosen while a category is chosen; an empty option
/// list is the "no habits" sub-state of `CategoryChosen`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    Idle,
    CategoryChosen {
        category: RecordId,
        options: Vec<HabitOption>,
    },
    HabitChosen {
        category: RecordId,
        options: Vec<HabitOption>,
        habit: RecordId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionView {
    pub category: Option<RecordId>,
    pub options: Vec<HabitOption>,
    pub habit_list_visible: bool,
    pub selected_habit: Option<RecordId>,
    pub record_visible: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SelectionFlow {
    state: SelectionState,
}

impl SelectionFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn select_category(&mut self, category_id: &RecordId, habits: &[Habit]) {
        if category_id.is_empty() {
            self.reset();
            return;
        }

        let options: Vec<HabitOption> = habits
            .iter()
            .filter(|habit| &habit.category_id == category_id)
            .map(|habit| HabitOption {
                id: habit.id.clone(),
                name: habit.name.clone(),
            })
            .collect();

        if options.is_empty() {
            debug!(category = %category_id, "no habits for category");
        }

        self.state = SelectionState::CategoryChosen {
            category: category_id.clone(),
            options,
        };
    }

    pub fn select_habit(&mut self, habit_id: &RecordId) -> Result<(), AppError> {
        let (category, options) = match &self.state {
            SelectionState::Idle => {
                return Err(AppError::validation("Please choose a category first"));
            }
            SelectionState::CategoryChosen { category, options }
            | SelectionState::HabitChosen {
                category, options, ..
            } => (category.clone(), options.clone()),
        };

        if habit_id.is_empty() {
            self.state = SelectionState::CategoryChosen { category, options };
            return Ok(());
        }

        if !options.iter().any(|option| &option.id == habit_id) {
            return Err(AppError::validation("Habit not found in selected category"));
        }

        self.state = SelectionState::HabitChosen {
            category,
            options,
            habit: habit_id.clone(),
        };
        Ok(())
    }

    pub fn reset(&mut self) {
        self.state = SelectionState::Idle;
    }

    pub fn selected_habit(&self) -> Option<&RecordId> {
        match &self.state {
            SelectionState::HabitChosen { habit, .. } => Some(habit),
            _ => None,
        }
    }

    pub fn view(&self) -> SelectionView {
        match &self.state {
            SelectionState::Idle => SelectionView {
                category: None,
                options: Vec::new(),
                habit_list_visible: false,
                selected_habit: None,
                record_visible: false,
            },
            SelectionState::CategoryChosen { category, options } => SelectionView {
                category: Some(category.clone()),
                options: options.clone(),
                habit_list_visible: !options.is_empty(),
                selected_habit: None,
                record_visible: false,
            },
            SelectionState::HabitChosen {
                category,
                options,
                habit,
            } => SelectionView {
                category: Some(category.clone()),
                options: options.clone(),
                habit_list_visible: true,
                selected_habit: Some(habit.clone()),
                record_visible: true,
            },
        }
    }
}
