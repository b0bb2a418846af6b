use hyper::{Body, Method, Request};

use super::api::{Create, InviteOutcome, Respond, RespondAction};
use super::CampaignInvite;
use crate::api::{self, parse_query, IdQuery};
use crate::csrf::authenticate;
use crate::database::Store;
use crate::error::AppError;
use crate::roles::{self, CampaignRole};
use crate::users::User;

async fn create(req: Request<Body>, store: &dyn Store) -> api::Result {
    let session = authenticate(&req).await?;
    let form: Create = api::parse_body(req).await?;
    let invitee = match (form.user_id, &form.email) {
        (Some(user_id), _) => User::get_by_id(store, &user_id).await?,
        (None, Some(email)) => User::get_by_email(store, email).await?,
        (None, None) => {
            return Err(AppError::BadRequest(String::from(
                "Either a user id or an e-mail address is required",
            )))
        }
    };
    let outcome = match invitee {
        Some(invitee) => {
            let invite =
                CampaignInvite::create(store, &form.campaign_id, &invitee.id, &session.user_id, form.role).await?;
            InviteOutcome::Invited { invite }
        }
        None => {
            let email = form.email.ok_or(AppError::NotFound("User"))?;
            // no account: the invite becomes a signup nudge instead of a
            // record, and mail delivery is somebody else's job
            roles::require_role(store, &form.campaign_id, &session.user_id, CampaignRole::Admin).await?;
            log::info!("a signup invitation for {} to the campaign {} was requested", email, form.campaign_id);
            InviteOutcome::SignupInviteSent { email }
        }
    };
    api::Return::new(&outcome).build()
}

async fn my_invites(req: Request<Body>, store: &dyn Store) -> api::Result {
    let session = authenticate(&req).await?;
    let invites = CampaignInvite::get_by_user(store, &session.user_id).await?;
    api::Return::new(&invites).build()
}

async fn query(req: Request<Body>, store: &dyn Store) -> api::Result {
    let session = authenticate(&req).await?;
    let IdQuery { id } = parse_query(req.uri())?;
    let invite = CampaignInvite::get_by_id(store, &id).await?.ok_or(AppError::NotFound("Invite"))?;
    if invite.invited_user_id != session.user_id && invite.invited_by != session.user_id {
        return Err(AppError::NoPermission);
    }
    api::Return::new(&invite).build()
}

async fn respond(req: Request<Body>, store: &dyn Store) -> api::Result {
    let session = authenticate(&req).await?;
    let Respond {
        invite_id,
        action,
        character_id,
    } = api::parse_body(req).await?;
    let invite = CampaignInvite::respond(
        store,
        &invite_id,
        &session.user_id,
        action == RespondAction::Accept,
        character_id.as_ref(),
    )
    .await?;
    api::Return::new(&invite).build()
}

pub async fn router(req: Request<Body>, path: &str, store: &dyn Store) -> api::Result {
    match (path, req.method().clone()) {
        ("/create", Method::POST) => create(req, store).await,
        ("/my", Method::GET) => my_invites(req, store).await,
        ("/query", Method::GET) => query(req, store).await,
        ("/respond", Method::POST) => respond(req, store).await,
        _ => Err(AppError::missing()),
    }
}
