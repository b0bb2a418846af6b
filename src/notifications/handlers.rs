use hyper::{Body, Method, Request};

use super::api::{MarkedAllRead, UnreadCount};
use super::Notification;
use crate::api::{self, parse_query, IdQuery};
use crate::csrf::authenticate;
use crate::database::Store;
use crate::error::AppError;

async fn list(req: Request<Body>, store: &dyn Store) -> api::Result {
    let session = authenticate(&req).await?;
    let notifications = Notification::get_by_user(store, &session.user_id).await?;
    api::Return::new(&notifications).build()
}

async fn unread_count(req: Request<Body>, store: &dyn Store) -> api::Result {
    let session = authenticate(&req).await?;
    let count = Notification::unread_count(store, &session.user_id).await?;
    api::Return::new(&UnreadCount { count }).build()
}

async fn read_all(req: Request<Body>, store: &dyn Store) -> api::Result {
    let session = authenticate(&req).await?;
    let marked = Notification::mark_all_read(store, &session.user_id).await?;
    api::Return::new(&MarkedAllRead { marked }).build()
}

async fn read(req: Request<Body>, store: &dyn Store) -> api::Result {
    let session = authenticate(&req).await?;
    let IdQuery { id } = parse_query(req.uri())?;
    let notification = Notification::mark_read(store, &id, &session.user_id).await?;
    api::Return::new(&notification).build()
}

pub async fn router(req: Request<Body>, path: &str, store: &dyn Store) -> api::Result {
    match (path, req.method().clone()) {
        ("/list", Method::GET) => list(req, store).await,
        ("/unread_count", Method::GET) => unread_count(req, store).await,
        ("/read_all", Method::POST) => read_all(req, store).await,
        ("/read", Method::PATCH) => read(req, store).await,
        _ => Err(AppError::missing()),
    }
}
