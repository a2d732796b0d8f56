use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::Utc;
use tracing::{error, info};

use crate::{
    captcha_client::CaptchaClient,
    database::{DbManager, NewSignup},
    email_client::EmailClient,
    web::{
        types::{SignupRequest, SignupResponse, ValidSignup},
        Error, WebResult,
    },
    AppState,
};

/// Takes a waitlist signup through validation, the reCAPTCHA check, the datastore insert
/// and the operator notification, in that order. The first failing step ends the request.
///
/// A notification failure leaves the stored signup in place.
#[tracing::instrument(name = "Handling a waitlist signup", skip(app_state, payload))]
pub async fn subscribe(
    State(app_state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> WebResult<Json<SignupResponse>> {
    let Json(signup_req) = payload.map_err(|rej| Error::InvalidBody(rej.body_text()))?;
    let signup = ValidSignup::try_from(signup_req)?;

    let (captcha_client, database_mgr, email_client) = configured_clients(&app_state)?;

    captcha_client.verify(&signup.captcha_token).await?;

    let row = store_signup(database_mgr, &signup, app_state.project_id).await?;

    let email_id = send_notification(&app_state, email_client, &signup)
        .await
        .inspect_err(|er| {
            error!(
                signup_id = row.id,
                "signup was stored but the operator was not notified: {er}"
            )
        })?;

    info!(signup_id = row.id, email_id = %email_id, "SUCCESS");
    Ok(Json(SignupResponse::new(row.id, email_id)))
}

/// All three collaborators have to be configured before any of them is called.
fn configured_clients(
    app_state: &AppState,
) -> WebResult<(&CaptchaClient, &DbManager, &EmailClient)> {
    let captcha_client = app_state
        .captcha_client
        .as_ref()
        .ok_or(Error::Configuration("RECAPTCHA_SECRET_KEY is not set"))?;
    let database_mgr = app_state
        .database_mgr
        .as_ref()
        .ok_or(Error::Configuration("SUPABASE_URL or SUPABASE_ANON_KEY is not set"))?;
    let email_client = app_state
        .email_client
        .as_ref()
        .ok_or(Error::Configuration("RESEND_API is not set"))?;

    Ok((captcha_client, database_mgr, email_client))
}

#[tracing::instrument(
    name = "Saving new signup to the database",
    skip(database_mgr, signup),
    fields(signup_email = %signup.email.as_ref())
)]
async fn store_signup(
    database_mgr: &DbManager,
    signup: &ValidSignup,
    project_id: i64,
) -> WebResult<crate::database::Signup> {
    let row = database_mgr
        .insert_signup(&NewSignup::new(signup, project_id))
        .await?;

    Ok(row)
}

#[tracing::instrument(name = "Sending signup notification", skip_all)]
async fn send_notification(
    app_state: &AppState,
    email_client: &EmailClient,
    signup: &ValidSignup,
) -> WebResult<String> {
    let submitted_at = Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();
    let subject = format!(
        "New BibleFit Early Access Request from {}",
        signup.name.as_ref()
    );
    let html = app_state
        .templ_mgr
        .render_signup_notification(signup, &submitted_at)?;

    let email_id = email_client
        .send_email(&app_state.operator_addr, &subject, &html)
        .await?;

    Ok(email_id)
}
