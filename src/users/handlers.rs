use hyper::{Body, Method, Request, StatusCode};
use once_cell::sync::OnceCell;

use super::api::{GetMe, Login, LoginReturn, QueryUser, Register};
use super::models::User;
use crate::api::{self, parse_body, parse_query};
use crate::campaigns::Campaign;
use crate::database::Store;
use crate::error::AppError;
use crate::invites::CampaignInvite;
use crate::session::{self, SessionMap};
use crate::{context, csrf};

async fn register(req: Request<Body>, store: &dyn Store) -> api::Result {
    let form: Register = parse_body(req).await?;
    let user = User::register(store, &*form.email, &*form.username, &*form.nickname, &*form.password).await?;
    log::info!("{} ({}) was registered", user.username, user.email);
    api::Return::new(&user).status(StatusCode::CREATED).build()
}

async fn login(req: Request<Body>, store: &dyn Store) -> api::Result {
    use cookie::{CookieBuilder, SameSite};
    use hyper::header::{HeaderValue, SET_COOKIE};

    let form: Login = parse_body(req).await?;
    let login = User::login(store, &*form.username, &*form.password)
        .await?
        .ok_or(AppError::NoPermission);
    if login.is_err() {
        log::warn!("Someone failed to log in: {}", form.username);
    }
    let user = login?;
    let session = SessionMap::get().start(&user.id).await;
    let token = session.token();
    let session_cookie = CookieBuilder::new("session", token.clone())
        .same_site(SameSite::Lax)
        .secure(!context::debug())
        .http_only(true)
        .path("/api/")
        .max_age(time::Duration::days(256))
        .finish()
        .to_string();

    let token = if form.with_token { Some(token) } else { None };
    let mut response = api::Return::new(&LoginReturn { user, token }).build()?;
    response
        .headers_mut()
        .insert(SET_COOKIE, HeaderValue::from_str(&*session_cookie).map_err(unexpected!())?);
    Ok(response)
}

async fn logout(req: Request<Body>) -> api::Result {
    use cookie::CookieBuilder;
    use hyper::header::{HeaderValue, SET_COOKIE};

    if let Ok(session) = session::authenticate(&req).await {
        SessionMap::get().end(&session.key).await;
    }
    let mut response = api::Return::new(&true).build()?;
    static HEADER_VALUE: OnceCell<HeaderValue> = OnceCell::new();
    let header_value = HEADER_VALUE.get_or_init(|| {
        let cookie = CookieBuilder::new("session", "")
            .http_only(true)
            .path("/api/")
            .expires(time::OffsetDateTime::now_utc())
            .finish()
            .to_string();
        HeaderValue::from_str(&*cookie).unwrap()
    });
    response.headers_mut().append(SET_COOKIE, header_value.clone());
    Ok(response)
}

async fn query_user(req: Request<Body>, store: &dyn Store) -> api::Result {
    let QueryUser { id } = parse_query(req.uri())?;
    let id = if let Some(id) = id {
        id
    } else {
        session::authenticate(&req).await?.user_id
    };
    let user = User::get_by_id(store, &id).await?.ok_or(AppError::NotFound("User"))?;
    api::Return::new(&user).build()
}

async fn get_me(req: Request<Body>, store: &dyn Store) -> api::Result {
    let session = session::authenticate(&req).await?;
    let user = match User::get_by_id(store, &session.user_id).await? {
        Some(user) => user,
        None => {
            SessionMap::get().end(&session.key).await;
            log::warn!("the session is valid, but the user cannot be found in the store");
            return api::Return::new(&None::<GetMe>).build();
        }
    };
    let my_campaigns = Campaign::get_by_user(store, &user.id).await?;
    let my_invites = CampaignInvite::get_by_user(store, &user.id).await?;
    api::Return::new(&Some(GetMe {
        user,
        my_campaigns,
        my_invites,
    }))
    .build()
}

pub async fn router(req: Request<Body>, path: &str, store: &dyn Store) -> api::Result {
    match (path, req.method().clone()) {
        ("/login", Method::POST) => login(req, store).await,
        ("/register", Method::POST) => register(req, store).await,
        ("/logout", _) => logout(req).await,
        ("/query", Method::GET) => query_user(req, store).await,
        ("/get_me", Method::GET) => get_me(req, store).await,
        ("/csrf_token", Method::GET) => csrf::get_csrf_token(req).await,
        _ => Err(AppError::missing()),
    }
}
