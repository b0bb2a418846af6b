use hyper::{Body, Method, Request};

use super::api::{AddMember, EditCharacterStatus};
use super::{CampaignMember, MemberStatus};
use crate::api::{self, parse_query, IdQuery};
use crate::csrf::authenticate;
use crate::database::Store;
use crate::error::AppError;
use crate::roles::{self, CampaignRole};

async fn approve(req: Request<Body>, store: &dyn Store) -> api::Result {
    let session = authenticate(&req).await?;
    let IdQuery { id } = parse_query(req.uri())?;
    let member = CampaignMember::approve(store, &id, &session.user_id).await?;
    api::Return::new(&member).build()
}

async fn reject(req: Request<Body>, store: &dyn Store) -> api::Result {
    let session = authenticate(&req).await?;
    let IdQuery { id } = parse_query(req.uri())?;
    let member = CampaignMember::reject(store, &id, &session.user_id).await?;
    api::Return::new(&member).build()
}

async fn character_status(req: Request<Body>, store: &dyn Store) -> api::Result {
    let session = authenticate(&req).await?;
    let EditCharacterStatus {
        member_id,
        character_status,
    } = api::parse_body(req).await?;
    let member = CampaignMember::update_character_status(store, &member_id, character_status, &session.user_id).await?;
    api::Return::new(&member).build()
}

async fn add(req: Request<Body>, store: &dyn Store) -> api::Result {
    let session = authenticate(&req).await?;
    let AddMember {
        campaign_id,
        user_id,
        character_id,
        role,
        approved,
    } = api::parse_body(req).await?;
    roles::require_role(store, &campaign_id, &session.user_id, CampaignRole::Admin).await?;
    let initial_status = if approved {
        MemberStatus::Approved
    } else {
        MemberStatus::Pending
    };
    let member = CampaignMember::create(store, &campaign_id, &character_id, &user_id, role, initial_status).await?;
    api::Return::new(&member).build()
}

pub async fn router(req: Request<Body>, path: &str, store: &dyn Store) -> api::Result {
    match (path, req.method().clone()) {
        ("/approve", Method::POST) => approve(req, store).await,
        ("/reject", Method::POST) => reject(req, store).await,
        ("/character_status", Method::PATCH) => character_status(req, store).await,
        ("/add", Method::POST) => add(req, store).await,
        _ => Err(AppError::missing()),
    }
}
