use crate::backend::Backend;
use crate::errors::AppError;
use crate::models::{LogEntry, RecordId, RecordedEntry};
use crate::session::{refresh_view, SessionSlot};
use chrono::{Local, NaiveDate};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info};

/// Commits habit occurrences, one write in flight at a time.
#[derive(Debug, Default)]
pub struct RecordingFlow {
    in_flight: AtomicBool,
}

/// Holds the record action disabled until dropped.
pub struct RecordGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for RecordGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

impl RecordingFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_recording(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn try_begin(&self) -> Option<RecordGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RecordGuard {
                flag: &self.in_flight,
            })
    }

    pub async fn record(
        &self,
        slot: &SessionSlot,
        backend: &dyn Backend,
        habit_id: &RecordId,
    ) -> Result<RecordedEntry, AppError> {
        self.record_on(Local::now().date_naive(), slot, backend, habit_id)
            .await
    }

    /// Records `habit_id` as done on `today`, refreshes the view of the
    /// selected date and resets the selection. Validation and write failures
    /// leave the selection untouched so the user can retry. A rejected access
    /// token marks the session expired instead of reporting a write error.
    pub async fn record_on(
        &self,
        today: NaiveDate,
        slot: &SessionSlot,
        backend: &dyn Backend,
        habit_id: &RecordId,
    ) -> Result<RecordedEntry, AppError> {
        let _guard = self.try_begin().ok_or_else(AppError::busy)?;

        if habit_id.is_empty() {
            return Err(AppError::validation("Please select a habit first"));
        }

        let habit = {
            let session = slot.lock().await;
            let session = session.as_ref().ok_or_else(AppError::auth_required)?;
            session
                .find_habit(habit_id)
                .cloned()
                .ok_or_else(|| AppError::validation("Habit not found"))?
        };

        let entry = LogEntry {
            date: today,
            habit_id: habit.id.clone(),
            recorded_points: habit.default_points,
        };

        info!(habit = %habit.id, date = %entry.date, points = entry.recorded_points, "recording habit");
        if let Err(err) = backend.insert_log_entry(&entry).await {
            error!("failed to record habit: {err}");
            if err.is_unauthorized() {
                if let Some(session) = slot.lock().await.as_mut() {
                    session.note_rejection(&err);
                }
                return Err(AppError::session_expired());
            }
            let message = if err.is_api() {
                format!("Error recording habit: {err}")
            } else {
                "An unexpected error occurred".to_string()
            };
            return Err(AppError::write(message));
        }

        refresh_view(slot, backend).await;

        if let Some(session) = slot.lock().await.as_mut() {
            session.selection.reset();
        }

        Ok(RecordedEntry {
            entry,
            habit_name: habit.name,
        })
    }
}
