use crate::config::{save_config, AppConfig, ConfigForm};
use crate::errors::{AppError, ErrorKind};
use crate::models::{
    CategoryRequest, DateRequest, HabitRequest, LoginRequest, RecordId, RecordRequest,
    RecordedEntry, SessionRequest,
};
use crate::session::{refresh_view, SessionContext};
use crate::state::{AppState, Configured};
use crate::ui::{render_callback_page, render_config_page, render_index, render_login_page};
use crate::view::{build_page, Notice, PageView};
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, Redirect},
    Form, Json,
};
use chrono::{Local, NaiveDate};
use tracing::{error, info, warn};

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let notice = state.take_notice().await;
    if state.configured().await.is_err() {
        return Html(render_config_page(notice.as_ref()));
    }

    match current_page(&state, notice.clone()).await {
        Ok(page) => Html(render_index(&page)),
        Err(err) if err.kind == ErrorKind::SessionExpired => {
            let notice = notice.unwrap_or_else(|| Notice::error(err.message));
            Html(render_login_page(Some(&notice)))
        }
        Err(_) => Html(render_login_page(notice.as_ref())),
    }
}

pub async fn auth_callback() -> Html<String> {
    Html(render_callback_page())
}

pub async fn submit_config(
    State(state): State<AppState>,
    Form(form): Form<ConfigForm>,
) -> Result<Redirect, AppError> {
    let config = AppConfig::from(form);
    if config.validate().is_err() {
        let notice = Notice::error("Configuration cancelled. The app requires configuration to work.");
        state.set_notice(notice).await;
        return Ok(Redirect::to("/"));
    }

    save_config(&state.config_path, &config).await?;
    let backend = (state.connector)(&config);
    *state.configured.lock().await = Some(Configured { config, backend });
    *state.session.lock().await = None;
    info!(path = %state.config_path.display(), "configuration saved");

    state.set_notice(Notice::success("Configuration saved successfully!")).await;
    Ok(Redirect::to("/"))
}

pub async fn reset_config(State(state): State<AppState>) -> Result<Redirect, AppError> {
    match tokio::fs::remove_file(&state.config_path).await {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => return Err(err.into()),
    }
    *state.configured.lock().await = None;
    *state.session.lock().await = None;
    info!("configuration cleared");
    Ok(Redirect::to("/"))
}

pub async fn login(State(state): State<AppState>, Form(payload): Form<LoginRequest>) -> Redirect {
    let notice = match send_login_link(&state, payload.email.trim()).await {
        Ok(()) => Notice::info("Check your email for the login link!"),
        Err(err) => Notice::error(err.message),
    };
    state.set_notice(notice).await;
    Redirect::to("/")
}

pub async fn logout(State(state): State<AppState>) -> Redirect {
    end_session(&state).await;
    Redirect::to("/")
}

pub async fn open_session(
    State(state): State<AppState>,
    Json(payload): Json<SessionRequest>,
) -> Result<Json<PageView>, AppError> {
    let token = payload.access_token.trim();
    if token.is_empty() {
        return Err(AppError::bad_request("access_token is required"));
    }

    let configured = state.configured().await?;
    let backend = configured.backend;

    let user = match backend.user_for_token(token).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            warn!("login link rejected");
            return Err(AppError::auth_required());
        }
        Err(err) => {
            error!("failed to verify login: {err}");
            return Err(AppError::fetch(format!("Error verifying login: {err}")));
        }
    };

    backend.set_access_token(Some(token.to_string())).await;
    info!(email = user.email.as_deref().unwrap_or(""), "logged in");
    let session = SessionContext::open(backend.as_ref(), user, configured.config.point_source).await;
    *state.session.lock().await = Some(session);

    Ok(Json(current_page(&state, None).await?))
}

pub async fn close_session(State(state): State<AppState>) -> StatusCode {
    end_session(&state).await;
    StatusCode::NO_CONTENT
}

pub async fn get_view(State(state): State<AppState>) -> Result<Json<PageView>, AppError> {
    let notice = state.take_notice().await;
    Ok(Json(current_page(&state, notice).await?))
}

pub async fn change_date(
    State(state): State<AppState>,
    Json(payload): Json<DateRequest>,
) -> Result<Json<PageView>, AppError> {
    apply_date(&state, &payload.date).await?;
    Ok(Json(current_page(&state, None).await?))
}

pub async fn change_date_form(
    State(state): State<AppState>,
    Form(payload): Form<DateRequest>,
) -> Redirect {
    let result = apply_date(&state, &payload.date).await.map(|()| None);
    redirect_home(&state, result).await
}

pub async fn select_category(
    State(state): State<AppState>,
    Json(payload): Json<CategoryRequest>,
) -> Result<Json<PageView>, AppError> {
    apply_category(&state, &payload.category_id).await?;
    Ok(Json(current_page(&state, None).await?))
}

pub async fn select_category_form(
    State(state): State<AppState>,
    Form(payload): Form<CategoryRequest>,
) -> Redirect {
    let result = apply_category(&state, &payload.category_id).await.map(|()| None);
    redirect_home(&state, result).await
}

pub async fn select_habit(
    State(state): State<AppState>,
    Json(payload): Json<HabitRequest>,
) -> Result<Json<PageView>, AppError> {
    apply_habit(&state, &payload.habit_id).await?;
    Ok(Json(current_page(&state, None).await?))
}

pub async fn select_habit_form(
    State(state): State<AppState>,
    Form(payload): Form<HabitRequest>,
) -> Redirect {
    let result = apply_habit(&state, &payload.habit_id).await.map(|()| None);
    redirect_home(&state, result).await
}

pub async fn record(
    State(state): State<AppState>,
    payload: Option<Json<RecordRequest>>,
) -> Result<Json<RecordedEntry>, AppError> {
    let Json(payload) = payload.unwrap_or_default();
    Ok(Json(record_selected(&state, payload).await?))
}

pub async fn record_form(
    State(state): State<AppState>,
    payload: Option<Form<RecordRequest>>,
) -> Redirect {
    let Form(payload) = payload.unwrap_or_default();
    let result = record_selected(&state, payload).await.map(|recorded| {
        Some(Notice::success(format!(
            "Habit \"{}\" recorded successfully! ({} points)",
            recorded.habit_name, recorded.entry.recorded_points
        )))
    });
    redirect_home(&state, result).await
}

async fn redirect_home(state: &AppState, result: Result<Option<Notice>, AppError>) -> Redirect {
    match result {
        Ok(Some(notice)) => state.set_notice(notice).await,
        Ok(None) => {}
        Err(err) if matches!(err.kind, ErrorKind::ConfigMissing | ErrorKind::AuthRequired) => {}
        Err(err) => state.set_notice(Notice::error(err.message)).await,
    }
    Redirect::to("/")
}

async fn current_page(state: &AppState, notice: Option<Notice>) -> Result<PageView, AppError> {
    state.configured().await?;
    let recording = state.recorder.is_recording();
    let mut slot = state.session.lock().await;
    if slot.as_ref().is_some_and(SessionContext::is_expired) {
        *slot = None;
        drop(slot);
        warn!("access token rejected, session ended");
        forget_token(state).await;
        return Err(AppError::session_expired());
    }
    let session = slot.as_mut().ok_or_else(AppError::auth_required)?;
    Ok(build_page(session, today(), recording, notice))
}

async fn send_login_link(state: &AppState, email: &str) -> Result<(), AppError> {
    if email.is_empty() {
        return Err(AppError::validation("Please enter your email to login"));
    }
    let configured = state.configured().await?;
    configured
        .backend
        .sign_in_with_email_link(email, &configured.config.redirect_url)
        .await
        .map_err(|err| {
            warn!("failed to send login link: {err}");
            AppError::fetch(err.to_string())
        })?;
    info!("login link sent");
    Ok(())
}

async fn end_session(state: &AppState) {
    if state.session.lock().await.take().is_some() {
        info!("logged out");
    }
    forget_token(state).await;
}

async fn forget_token(state: &AppState) {
    if let Ok(backend) = state.backend().await {
        backend.set_access_token(None).await;
    }
}

async fn apply_date(state: &AppState, raw: &str) -> Result<(), AppError> {
    let date = parse_date(raw)?;
    let backend = state.backend().await?;
    {
        let mut session = state.session.lock().await;
        let session = session.as_mut().ok_or_else(AppError::auth_required)?;
        session.selected_date = date;
    }
    refresh_view(&state.session, backend.as_ref()).await;
    Ok(())
}

async fn apply_category(state: &AppState, raw: &str) -> Result<(), AppError> {
    state.configured().await?;
    let mut session = state.session.lock().await;
    let session = session.as_mut().ok_or_else(AppError::auth_required)?;
    session.select_category(&RecordId::new(raw));
    Ok(())
}

async fn apply_habit(state: &AppState, raw: &str) -> Result<(), AppError> {
    state.configured().await?;
    let mut session = state.session.lock().await;
    let session = session.as_mut().ok_or_else(AppError::auth_required)?;
    session.selection.select_habit(&RecordId::new(raw))
}

async fn record_selected(
    state: &AppState,
    payload: RecordRequest,
) -> Result<RecordedEntry, AppError> {
    let viewer_today = match payload.today.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(parse_date(raw)?),
        _ => None,
    };
    let backend = state.backend().await?;
    let habit_id = {
        let session = state.session.lock().await;
        let session = session.as_ref().ok_or_else(AppError::auth_required)?;
        session.selection.selected_habit().cloned().unwrap_or_default()
    };
    let recorder = &state.recorder;
    match viewer_today {
        Some(day) => {
            recorder
                .record_on(day, &state.session, backend.as_ref(), &habit_id)
                .await
        }
        None => recorder.record(&state.session, backend.as_ref(), &habit_id).await,
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::bad_request("date must be YYYY-MM-DD"))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
