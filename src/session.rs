use crate::aggregate::{aggregate, project_rows, AggregatedView, PointSource};
use crate::backend::{Backend, BackendError};
use crate::colors::ColorAssigner;
use crate::models::{Category, Habit, LogRow, RecordId, User};
use crate::selection::SelectionFlow;
use chrono::{Local, NaiveDate};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

static NEXT_EPOCH: AtomicU64 = AtomicU64::new(1);

pub type SessionSlot = Mutex<Option<SessionContext>>;

/// Everything cached for one signed-in user, from login until logout.
#[derive(Debug)]
pub struct SessionContext {
    pub user: User,
    pub categories: Vec<Category>,
    pub habits: Vec<Habit>,
    pub categories_error: Option<String>,
    pub habits_error: Option<String>,
    pub colors: ColorAssigner,
    pub selection: SelectionFlow,
    pub selected_date: NaiveDate,
    pub point_source: PointSource,
    pub view: Option<AggregatedView>,
    pub view_error: Option<String>,
    expired: bool,
    epoch: u64,
    view_generation: u64,
}

/// Identifies one log fetch so that only the newest response is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewTicket {
    pub epoch: u64,
    pub generation: u64,
    pub date: NaiveDate,
}

impl SessionContext {
    pub fn new(user: User, selected_date: NaiveDate, point_source: PointSource) -> Self {
        Self {
            user,
            categories: Vec::new(),
            habits: Vec::new(),
            categories_error: None,
            habits_error: None,
            colors: ColorAssigner::new(),
            selection: SelectionFlow::new(),
            selected_date,
            point_source,
            view: None,
            view_error: None,
            expired: false,
            epoch: NEXT_EPOCH.fetch_add(1, Ordering::Relaxed),
            view_generation: 0,
        }
    }

    /// Loads the roster, the habits and today's log for a verified user.
    /// Fetch failures are kept per region instead of failing the login.
    pub async fn open(
        backend: &dyn Backend,
        user: User,
        point_source: PointSource,
    ) -> SessionContext {
        let mut session = SessionContext::new(user, Local::now().date_naive(), point_source);

        match backend.fetch_habits().await {
            Ok(habits) => {
                info!(count = habits.len(), "loaded habits");
                session.habits = habits;
            }
            Err(err) => {
                warn!("failed to fetch habits: {err}");
                session.note_rejection(&err);
                session.habits_error = Some(format!("Error loading habits: {err}"));
            }
        }

        match backend.fetch_categories().await {
            Ok(categories) => {
                info!(count = categories.len(), "loaded categories");
                session.categories = categories;
            }
            Err(err) => {
                warn!("failed to fetch categories: {err}");
                session.note_rejection(&err);
                session.categories_error = Some(format!("Error loading categories: {err}"));
            }
        }

        let ticket = session.begin_view_fetch();
        let result = backend.fetch_log_for_date(ticket.date).await;
        session.apply_view(ticket, result);
        session
    }

    pub fn find_habit(&self, id: &RecordId) -> Option<&Habit> {
        self.habits.iter().find(|habit| &habit.id == id)
    }

    pub fn select_category(&mut self, id: &RecordId) {
        self.selection.select_category(id, &self.habits);
    }

    /// Whether the backend has rejected this session's access token.
    pub fn is_expired(&self) -> bool {
        self.expired
    }

    pub fn note_rejection(&mut self, err: &BackendError) {
        if err.is_unauthorized() {
            self.expired = true;
        }
    }

    pub fn begin_view_fetch(&mut self) -> ViewTicket {
        self.view_generation += 1;
        ViewTicket {
            epoch: self.epoch,
            generation: self.view_generation,
            date: self.selected_date,
        }
    }

    /// Applies a log fetch if it is still the latest one issued by this
    /// session. Returns whether it was applied.
    pub fn apply_view(
        &mut self,
        ticket: ViewTicket,
        result: Result<Vec<LogRow>, BackendError>,
    ) -> bool {
        if ticket.epoch != self.epoch || ticket.generation != self.view_generation {
            debug!(
                generation = ticket.generation,
                latest = self.view_generation,
                "dropping stale log fetch"
            );
            return false;
        }

        match result {
            Ok(rows) => {
                self.view = Some(aggregate(&project_rows(&rows, self.point_source)));
                self.view_error = None;
            }
            Err(err) => {
                warn!(date = %ticket.date, "failed to fetch log: {err}");
                self.note_rejection(&err);
                self.view = None;
                self.view_error = Some(format!("Error loading points: {err}"));
            }
        }
        true
    }
}

/// Fetches the log for the session's selected date without holding the
/// session lock across the request.
pub async fn refresh_view(slot: &SessionSlot, backend: &dyn Backend) -> bool {
    let ticket = match slot.lock().await.as_mut() {
        Some(session) => session.begin_view_fetch(),
        None => return false,
    };

    let result = backend.fetch_log_for_date(ticket.date).await;

    match slot.lock().await.as_mut() {
        Some(session) => session.apply_view(ticket, result),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LoggedHabit;

    fn user() -> User {
        User {
            id: "user-1".to_string(),
            email: Some("me@example.com".to_string()),
        }
    }

    fn rows(points: u32) -> Vec<LogRow> {
        vec![LogRow {
            date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            recorded_points: Some(points),
            habit: LoggedHabit {
                name: "Run".to_string(),
                default_points: points,
                category: RecordId::from(1),
            },
        }]
    }

    #[test]
    fn only_latest_fetch_is_applied() {
        let day = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let mut session = SessionContext::new(user(), day, PointSource::DefaultPoints);

        let first = session.begin_view_fetch();
        session.selected_date = day.succ_opt().unwrap();
        let second = session.begin_view_fetch();

        assert!(session.apply_view(second, Ok(rows(3))));
        assert!(!session.apply_view(first, Ok(rows(9))));

        let view = session.view.as_ref().unwrap();
        assert_eq!(view.total_for(&RecordId::from(1)), 3);
    }

    #[test]
    fn tickets_from_another_session_are_ignored() {
        let day = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let mut old = SessionContext::new(user(), day, PointSource::DefaultPoints);
        let mut current = SessionContext::new(user(), day, PointSource::DefaultPoints);

        let stale = old.begin_view_fetch();
        current.begin_view_fetch();
        assert!(!current.apply_view(stale, Ok(rows(1))));
        assert!(current.view.is_none());
    }

    #[test]
    fn fetch_error_is_kept_for_the_view_region() {
        let day = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let mut session = SessionContext::new(user(), day, PointSource::DefaultPoints);
        let ticket = session.begin_view_fetch();

        let applied = session.apply_view(
            ticket,
            Err(BackendError::Api {
                status: 500,
                message: "boom".to_string(),
            }),
        );

        assert!(applied);
        assert!(session.view.is_none());
        assert_eq!(session.view_error.as_deref(), Some("Error loading points: boom"));
    }

    #[test]
    fn rejected_token_marks_the_session_expired() {
        let day = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let mut session = SessionContext::new(user(), day, PointSource::DefaultPoints);

        let ticket = session.begin_view_fetch();
        session.apply_view(ticket, Err(BackendError::Transport("offline".to_string())));
        assert!(!session.is_expired());

        let ticket = session.begin_view_fetch();
        session.apply_view(
            ticket,
            Err(BackendError::Api {
                status: 401,
                message: "JWT expired".to_string(),
            }),
        );
        assert!(session.is_expired());
    }
}
