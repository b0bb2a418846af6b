use hyper::{Body, Method, Request};

use super::api::{Create, Edit};
use super::Campaign;
use crate::api::{self, parse_query, IdQuery};
use crate::csrf::authenticate;
use crate::database::Store;
use crate::error::AppError;
use crate::members::MemberWithUser;
use crate::roles::{self, CampaignRole};

async fn create(req: Request<Body>, store: &dyn Store) -> api::Result {
    let session = authenticate(&req).await?;
    let form: Create = api::parse_body(req).await?;
    let campaign = Campaign::create(store, &session.user_id, &*form.name, &*form.setting, &*form.edition).await?;
    log::info!("a campaign ({}) was just created", campaign.id);
    api::Return::new(&campaign).build()
}

async fn query(req: Request<Body>, store: &dyn Store) -> api::Result {
    let IdQuery { id } = parse_query(req.uri())?;
    let campaign = Campaign::get_by_id(store, &id).await?.ok_or(AppError::NotFound("Campaign"))?;
    api::Return::new(&campaign).build()
}

async fn my_campaigns(req: Request<Body>, store: &dyn Store) -> api::Result {
    let session = authenticate(&req).await?;
    let joined = Campaign::get_by_user(store, &session.user_id).await?;
    api::Return::new(&joined).build()
}

async fn owned_campaigns(req: Request<Body>, store: &dyn Store) -> api::Result {
    let session = authenticate(&req).await?;
    let owned = Campaign::user_owned(store, &session.user_id).await?;
    api::Return::new(&owned).build()
}

async fn edit(req: Request<Body>, store: &dyn Store) -> api::Result {
    let session = authenticate(&req).await?;
    let Edit {
        campaign_id,
        name,
        setting,
        edition,
    } = api::parse_body(req).await?;
    let campaign = Campaign::edit(store, &campaign_id, &session.user_id, name, setting, edition).await?;
    api::Return::new(&campaign).build()
}

async fn members(req: Request<Body>, store: &dyn Store) -> api::Result {
    let session = authenticate(&req).await?;
    let IdQuery { id } = parse_query(req.uri())?;
    roles::require_role(store, &id, &session.user_id, CampaignRole::Observer).await?;
    let members = MemberWithUser::get_by_campaign(store, &id).await?;
    api::Return::new(&members).build()
}

async fn delete(req: Request<Body>, store: &dyn Store) -> api::Result {
    let session = authenticate(&req).await?;
    let IdQuery { id } = parse_query(req.uri())?;
    let campaign = Campaign::delete(store, &id, &session.user_id).await?;
    api::Return::new(&campaign).build()
}

pub async fn router(req: Request<Body>, path: &str, store: &dyn Store) -> api::Result {
    match (path, req.method().clone()) {
        ("/create", Method::POST) => create(req, store).await,
        ("/query", Method::GET) => query(req, store).await,
        ("/my", Method::GET) => my_campaigns(req, store).await,
        ("/owned", Method::GET) => owned_campaigns(req, store).await,
        ("/edit", Method::POST) => edit(req, store).await,
        ("/members", Method::GET) => members(req, store).await,
        ("/delete", Method::DELETE) => delete(req, store).await,
        _ => Err(AppError::missing()),
    }
}
