use crate::google_oauth::endpoints::GoogleOauthEndpoints;
use crate::{GadsError, router::GadsState};
use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, PrivateCookieJar, SameSite};
use oauth2::{AuthorizationCode, CsrfToken, PkceCodeChallenge, PkceCodeVerifier};
use serde::Deserialize;
use serde_json::json;
use subtle::ConstantTimeEq;
use time::Duration;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub struct AuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

const CSRF_COOKIE: &str = "oauth_csrf_token";
const PKCE_COOKIE: &str = "oauth_pkce_verifier";

/// GET /auth/login -> redirects to Google's OAuth2 consent page.
pub async fn google_oauth_entry(
    State(state): State<GadsState>,
    jar: PrivateCookieJar,
) -> Result<impl IntoResponse, GadsError> {
    let (challenge, verifier) = PkceCodeChallenge::new_random_sha256();
    let pkce_verifier = verifier.secret().to_string();

    let (auth_url, csrf_token) = GoogleOauthEndpoints::build_authorize_url(&state.cfg, challenge)?;

    let secure = !state.cfg.insecure_cookie;
    let jar = store_oauth_cookies(jar, &csrf_token, &pkce_verifier, secure);

    info!("Dispatching OAuth redirect");
    Ok((jar, Redirect::temporary(auth_url.as_ref())).into_response())
}

/// GET /auth/callback -> exchanges auth code for tokens and stores them.
pub async fn google_oauth_callback(
    State(state): State<GadsState>,
    Query(query): Query<AuthCallbackQuery>,
    jar: PrivateCookieJar,
) -> impl IntoResponse {
    let secure = !state.cfg.insecure_cookie;
    let (pkce_verifier, csrf_cookie, jar) = match load_oauth_session(jar, secure) {
        Ok(data) => data,
        Err((jar, err)) => return respond_with_error(jar, err),
    };

    if let Some(error) = query.error.as_deref() {
        warn!(error, "consent screen returned an error");
        return respond_with_error(
            jar,
            GadsError::OauthFlow(format!("authorization denied: {error}")),
        );
    }

    let state_param = match query.state.as_deref() {
        Some(s) => s,
        None => {
            return respond_with_error(
                jar,
                GadsError::OauthFlow("missing `state` in callback".to_string()),
            );
        }
    };

    if !bool::from(state_param.as_bytes().ct_eq(csrf_cookie.as_bytes())) {
        return respond_with_error(jar, GadsError::OauthFlow("CSRF token mismatch".to_string()));
    }

    let code = match query.code.as_deref() {
        Some(code) => code,
        None => {
            return respond_with_error(
                jar,
                GadsError::OauthFlow("missing `code` in callback".to_string()),
            );
        }
    };

    let token_response = match GoogleOauthEndpoints::exchange_authorization_code(
        &state.cfg,
        AuthorizationCode::new(code.to_owned()),
        PkceCodeVerifier::new(pkce_verifier),
        &state.client,
    )
    .await
    {
        Ok(res) => res,
        Err(err) => return respond_with_error(jar, err),
    };

    let token = match state.tokens.store_authorization(&token_response).await {
        Ok(token) => token,
        Err(err) => return respond_with_error(jar, err),
    };

    info!(user_id = %token.user_id, "OAuth callback stored token");
    (
        jar,
        Json(json!({
            "user_id": token.user_id,
            "email": token.email,
            "name": token.name,
            "expires_at": token.expiry.to_rfc3339(),
            "has_refresh_token": token.refresh_token.is_some(),
            "message": "Authenticated. Pass this user_id to the Google Ads tools."
        })),
    )
        .into_response()
}

fn store_oauth_cookies(
    jar: PrivateCookieJar,
    csrf: &CsrfToken,
    pkce_verifier: &str,
    secure: bool,
) -> PrivateCookieJar {
    jar.add(build_cookie(CSRF_COOKIE, csrf.secret().to_string(), secure))
        .add(build_cookie(PKCE_COOKIE, pkce_verifier.to_string(), secure))
}

fn load_oauth_session(
    jar: PrivateCookieJar,
    secure: bool,
) -> Result<(String, String, PrivateCookieJar), (PrivateCookieJar, GadsError)> {
    let Some(csrf_cookie) = jar.get(CSRF_COOKIE).map(|c| c.value().to_owned()) else {
        let jar = clear_oauth_cookies(jar, secure);
        return Err((
            jar,
            GadsError::OauthFlow("Missing CSRF token in cookie".to_string()),
        ));
    };

    let Some(pkce_cookie) = jar.get(PKCE_COOKIE).map(|c| c.value().to_owned()) else {
        let jar = clear_oauth_cookies(jar, secure);
        return Err((
            jar,
            GadsError::OauthFlow("Missing PKCE verifier in cookie".to_string()),
        ));
    };

    let jar = clear_oauth_cookies(jar, secure);

    Ok((pkce_cookie, csrf_cookie, jar))
}

fn clear_oauth_cookies(jar: PrivateCookieJar, secure: bool) -> PrivateCookieJar {
    jar.remove(clear_cookie(CSRF_COOKIE, secure))
        .remove(clear_cookie(PKCE_COOKIE, secure))
}

fn build_cookie(name: &str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build(Cookie::new(name.to_string(), value))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(Duration::minutes(15))
        .build()
}

fn clear_cookie(name: &str, secure: bool) -> Cookie<'static> {
    Cookie::build(Cookie::new(name.to_string(), ""))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

fn respond_with_error(jar: PrivateCookieJar, err: GadsError) -> Response {
    (jar, err.into_response()).into_response()
}
