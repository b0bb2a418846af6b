use crate::error::AppError;
use crate::utils::{id, sign, verify};
use futures::lock::Mutex;
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Clone)]
pub struct Session {
    pub key: Uuid,
    pub user_id: Uuid,
}

impl Session {
    pub fn new(user_id: &Uuid) -> Session {
        Session {
            key: id(),
            user_id: *user_id,
        }
    }

    pub fn token(&self) -> String {
        let mut token = base64::encode(self.key.as_bytes());
        let signed = sign(&*token);
        token.push('.');
        token.push_str(&*signed);
        token
    }
}

pub struct SessionMap {
    inner: Mutex<HashMap<Uuid, Session>>,
}

static SESSION_MAP: OnceCell<SessionMap> = OnceCell::new();

impl SessionMap {
    pub fn new() -> SessionMap {
        SessionMap {
            inner: Mutex::new(HashMap::new()),
        }
    }

    pub async fn start(&self, user_id: &Uuid) -> Session {
        let mut inner = self.inner.lock().await;
        let session = Session::new(user_id);
        let key = session.key;
        inner.insert(key, session.clone());
        session
    }

    pub async fn get_session(&self, key: &Uuid) -> Option<Session> {
        let inner = self.inner.lock().await;
        inner.get(key).map(Clone::clone)
    }

    pub async fn end(&self, key: &Uuid) {
        let mut inner = self.inner.lock().await;
        inner.remove(key);
    }

    pub fn get() -> &'static SessionMap {
        SESSION_MAP.get_or_init(SessionMap::new)
    }
}

fn get_cookie(value: &hyper::header::HeaderValue) -> Option<&str> {
    let value = value.to_str().ok()?;
    regex!(r#"\bsession=([^;\s]+)"#).captures(value)?.get(1).map(|m| m.as_str())
}

async fn get_session(value: &str) -> Option<Session> {
    let mut iter = value.split('.');
    let session_id = iter.next()?;
    let sign = iter.next()?;
    verify(session_id, sign)?;
    let bytes = base64::decode(session_id).ok()?;
    let session_id = Uuid::from_slice(&*bytes).ok()?;
    SessionMap::get().get_session(&session_id).await
}

pub async fn authenticate(req: &hyper::Request<hyper::Body>) -> Result<Session, AppError> {
    use hyper::header::{AUTHORIZATION, COOKIE};

    let headers = req.headers();
    if let Some(token) = headers.get(AUTHORIZATION) {
        let token = token
            .to_str()
            .map_err(|_| AppError::BadRequest(String::from("Failed to parse the authorization header")))?;
        return get_session(token).await.ok_or(AppError::Unauthenticated);
    }
    let cookie_value = headers
        .get(COOKIE)
        .and_then(get_cookie)
        .ok_or(AppError::Unauthenticated)?;
    get_session(cookie_value).await.ok_or(AppError::Unauthenticated)
}

#[tokio::test]
async fn test_session_token() {
    std::env::set_var("SECRET", "the magic words are squeamish ossifrage");
    let user_id = uuid::Uuid::new_v4();
    let session = SessionMap::get().start(&user_id).await;
    let token = session.token();
    assert!(get_session("").await.is_none());
    let restored = get_session(&*token).await.unwrap();
    assert_eq!(restored.key, session.key);
    assert_eq!(restored.user_id, user_id);
    SessionMap::get().end(&session.key).await;
    assert!(get_session(&*token).await.is_none());
}
