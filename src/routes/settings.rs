use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::api::{ApiSession, WorkspaceApi};
use crate::responses::JsonResponse;
use crate::routes::session::Viewer;
use crate::settings::{
    forms::{BillingForm, ChangeRoleForm, InviteForm},
    notifications::NotificationKind,
    render::render_page,
    Outcome, PageError, WorkspaceSettingsPage,
};
use crate::state::AppState;
use crate::store::{PageKey, SharedPage};
use crate::utils::csrf::{ensure_csrf_token, verify_csrf};

pub const FLASH_COOKIE: &str = "flash";

/// A form post carrying only the CSRF field.
#[derive(Debug, Default, Deserialize)]
pub struct CsrfOnly {
    #[serde(default)]
    pub csrf_token: Option<String>,
}

/// A form post with its fields next to the CSRF field.
#[derive(Debug, Deserialize)]
pub struct Submission<T> {
    #[serde(default)]
    pub csrf_token: Option<String>,
    #[serde(flatten)]
    pub fields: T,
}

/// One user interaction with a mounted page.
#[derive(Debug)]
pub enum Action {
    ToggleMember(Uuid),
    ChangeLevel(Uuid, ChangeRoleForm),
    RemoveMember(Uuid),
    CreateInvite(InviteForm),
    CancelInvite(Uuid),
    ResendInvite(Uuid),
    Leave,
    ChangeBilling(BillingForm),
    RequestDelete,
    ConfirmDelete,
}

impl Action {
    fn name(&self) -> &'static str {
        match self {
            Action::ToggleMember(_) => "toggle_member",
            Action::ChangeLevel(..) => "change_level",
            Action::RemoveMember(_) => "remove_member",
            Action::CreateInvite(_) => "create_invite",
            Action::CancelInvite(_) => "cancel_invite",
            Action::ResendInvite(_) => "resend_invite",
            Action::Leave => "leave",
            Action::ChangeBilling(_) => "change_billing",
            Action::RequestDelete => "request_delete",
            Action::ConfirmDelete => "confirm_delete",
        }
    }

    async fn apply(
        self,
        page: &mut WorkspaceSettingsPage,
        api: &dyn WorkspaceApi,
    ) -> Result<Outcome, PageError> {
        match self {
            Action::ToggleMember(id) => page.toggle_member_details(id).map(|_| Outcome::Stay),
            Action::ChangeLevel(id, form) => page.change_member_level(api, id, &form).await,
            Action::RemoveMember(id) => page.remove_member(api, id).await,
            Action::CreateInvite(form) => page.create_invite(api, form).await,
            Action::CancelInvite(id) => page.cancel_invite(api, id).await,
            Action::ResendInvite(id) => page.resend_invite(api, id).await,
            Action::Leave => page.leave_workspace(api).await,
            Action::ChangeBilling(form) => page.change_billing_info(api, form).await,
            Action::RequestDelete => page.request_delete(),
            Action::ConfirmDelete => page.confirm_delete(api).await,
        }
    }
}

fn page_error_response(state: &AppState, err: PageError) -> Response {
    match err {
        PageError::WorkspaceNotFound(name) => {
            JsonResponse::not_found(&format!("Workspace '{}' not found", name))
        }
        PageError::NotPermitted(reason) => JsonResponse::forbidden(reason),
        PageError::CannotActOnSelf => {
            JsonResponse::forbidden("You cannot change your own membership here")
        }
        PageError::Api(err) if err.is_auth_error() => {
            JsonResponse::redirect_to_login_with_error(&state.config.frontend_origin, "Session expired")
        }
        PageError::Api(err) => {
            tracing::error!(?err, "failed to load workspace settings");
            JsonResponse::bad_gateway(&err.user_message())
        }
    }
}

async fn mount(
    state: &AppState,
    session: ApiSession,
    workspace: &str,
) -> Result<SharedPage, PageError> {
    let key = PageKey::new(&session, workspace);
    let page = WorkspaceSettingsPage::mount(state.api.as_ref(), session, workspace).await?;
    Ok(state.pages.insert(key, page))
}

fn render(page: &mut WorkspaceSettingsPage, jar: CookieJar, secure: bool) -> Response {
    let (jar, csrf_token) = ensure_csrf_token(jar, secure);
    let notifications = page.take_notifications();
    let html = render_page(page, &notifications, &csrf_token, OffsetDateTime::now_utc());
    (jar, Html(html)).into_response()
}

/// GET `/{workspace}/settings`: always mounts a fresh instance.
pub async fn show_settings(
    State(state): State<AppState>,
    Viewer(session): Viewer,
    jar: CookieJar,
    Path(workspace): Path<String>,
) -> Response {
    match mount(&state, session, &workspace).await {
        Ok(page) => {
            let mut page = page.lock().await;
            render(&mut page, jar, state.config.auth_cookie_secure)
        }
        Err(err) => page_error_response(&state, err),
    }
}

async fn submit(
    state: AppState,
    session: ApiSession,
    jar: CookieJar,
    workspace: String,
    csrf_token: Option<String>,
    action: Action,
) -> Response {
    if !verify_csrf(&jar, csrf_token.as_deref()) {
        tracing::warn!(workspace = %workspace, action = action.name(), "rejected form post with bad csrf token");
        return JsonResponse::forbidden_with_code("Invalid CSRF token", "CSRF_MISMATCH");
    }

    let key = PageKey::new(&session, &workspace);
    let shared = match state.pages.get(&key) {
        Some(page) => page,
        // swept or never mounted in this process
        None => match mount(&state, session, &workspace).await {
            Ok(page) => page,
            Err(err) => return page_error_response(&state, err),
        },
    };

    let mut page = shared.lock().await;
    let action_name = action.name();
    match action.apply(&mut page, state.api.as_ref()).await {
        Ok(Outcome::Stay) => render(&mut page, jar, state.config.auth_cookie_secure),
        Ok(Outcome::Redirect(to)) => {
            let flash = page
                .take_notifications()
                .into_iter()
                .rev()
                .find(|note| note.kind == NotificationKind::Success)
                .map(|note| note.message);
            drop(page);
            state.pages.remove_if_same(&key, &shared);
            tracing::info!(workspace = %workspace, action = action_name, "leaving settings page");

            let jar = match flash {
                Some(message) => jar.add(
                    Cookie::build((FLASH_COOKIE, urlencoding::encode(&message).into_owned()))
                        .path("/")
                        .http_only(true)
                        .secure(state.config.auth_cookie_secure)
                        .same_site(SameSite::Lax)
                        .build(),
                ),
                None => jar,
            };
            (jar, Redirect::to(&to)).into_response()
        }
        Err(err) => {
            tracing::warn!(workspace = %workspace, action = action_name, %err, "settings action refused");
            page_error_response(&state, err)
        }
    }
}

pub async fn toggle_member(
    State(state): State<AppState>,
    Viewer(session): Viewer,
    jar: CookieJar,
    Path((workspace, member_id)): Path<(String, Uuid)>,
    Form(form): Form<CsrfOnly>,
) -> Response {
    submit(state, session, jar, workspace, form.csrf_token, Action::ToggleMember(member_id)).await
}

pub async fn change_member_level(
    State(state): State<AppState>,
    Viewer(session): Viewer,
    jar: CookieJar,
    Path((workspace, member_id)): Path<(String, Uuid)>,
    Form(form): Form<Submission<ChangeRoleForm>>,
) -> Response {
    let action = Action::ChangeLevel(member_id, form.fields);
    submit(state, session, jar, workspace, form.csrf_token, action).await
}

pub async fn remove_member(
    State(state): State<AppState>,
    Viewer(session): Viewer,
    jar: CookieJar,
    Path((workspace, member_id)): Path<(String, Uuid)>,
    Form(form): Form<CsrfOnly>,
) -> Response {
    submit(state, session, jar, workspace, form.csrf_token, Action::RemoveMember(member_id)).await
}

pub async fn create_invite(
    State(state): State<AppState>,
    Viewer(session): Viewer,
    jar: CookieJar,
    Path(workspace): Path<String>,
    Form(form): Form<Submission<InviteForm>>,
) -> Response {
    let action = Action::CreateInvite(form.fields);
    submit(state, session, jar, workspace, form.csrf_token, action).await
}

pub async fn cancel_invite(
    State(state): State<AppState>,
    Viewer(session): Viewer,
    jar: CookieJar,
    Path((workspace, invite_id)): Path<(String, Uuid)>,
    Form(form): Form<CsrfOnly>,
) -> Response {
    submit(state, session, jar, workspace, form.csrf_token, Action::CancelInvite(invite_id)).await
}

pub async fn resend_invite(
    State(state): State<AppState>,
    Viewer(session): Viewer,
    jar: CookieJar,
    Path((workspace, invite_id)): Path<(String, Uuid)>,
    Form(form): Form<CsrfOnly>,
) -> Response {
    submit(state, session, jar, workspace, form.csrf_token, Action::ResendInvite(invite_id)).await
}

pub async fn leave_workspace(
    State(state): State<AppState>,
    Viewer(session): Viewer,
    jar: CookieJar,
    Path(workspace): Path<String>,
    Form(form): Form<CsrfOnly>,
) -> Response {
    submit(state, session, jar, workspace, form.csrf_token, Action::Leave).await
}

pub async fn change_billing_info(
    State(state): State<AppState>,
    Viewer(session): Viewer,
    jar: CookieJar,
    Path(workspace): Path<String>,
    Form(form): Form<Submission<BillingForm>>,
) -> Response {
    let action = Action::ChangeBilling(form.fields);
    submit(state, session, jar, workspace, form.csrf_token, action).await
}

pub async fn request_delete(
    State(state): State<AppState>,
    Viewer(session): Viewer,
    jar: CookieJar,
    Path(workspace): Path<String>,
    Form(form): Form<CsrfOnly>,
) -> Response {
    submit(state, session, jar, workspace, form.csrf_token, Action::RequestDelete).await
}

pub async fn confirm_delete(
    State(state): State<AppState>,
    Viewer(session): Viewer,
    jar: CookieJar,
    Path(workspace): Path<String>,
    Form(form): Form<CsrfOnly>,
) -> Response {
    submit(state, session, jar, workspace, form.csrf_token, Action::ConfirmDelete).await
}
