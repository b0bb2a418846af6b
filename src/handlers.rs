use hyper::{Body, Request};

use crate::database::Store;
use crate::error::AppError;
use crate::{api, campaigns, invites, members, notifications, users};

pub async fn router(req: Request<Body>, store: &dyn Store) -> api::Result {
    let path = req.uri().path().to_string();

    let users_prefix = "/api/users";
    if path.starts_with(users_prefix) {
        return users::router(req, &path[users_prefix.len()..], store).await;
    }
    let campaigns_prefix = "/api/campaigns";
    if path.starts_with(campaigns_prefix) {
        return campaigns::router(req, &path[campaigns_prefix.len()..], store).await;
    }
    let members_prefix = "/api/members";
    if path.starts_with(members_prefix) {
        return members::router(req, &path[members_prefix.len()..], store).await;
    }
    let invites_prefix = "/api/invites";
    if path.starts_with(invites_prefix) {
        return invites::router(req, &path[invites_prefix.len()..], store).await;
    }
    let notifications_prefix = "/api/notifications";
    if path.starts_with(notifications_prefix) {
        return notifications::router(req, &path[notifications_prefix.len()..], store).await;
    }
    Err(AppError::missing())
}
