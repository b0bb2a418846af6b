use chrono::naive::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::{InviteStore, Store};
use crate::error::AppError;
use crate::members::{CampaignMember, MemberStatus};
use crate::notifications::{Notification, NotificationBody, NotificationContext};
use crate::roles::{self, CampaignRole, MemberRole};
use crate::utils;

/// An invite settles at most once. `Expired` is reserved for an expiry
/// sweep that does not exist yet; nothing currently produces it.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InviteStatus {
    Pending,
    Accepted,
    Declined,
    Expired,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CampaignInvite {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub invited_user_id: Uuid,
    pub invited_by: Uuid,
    pub role: MemberRole,
    pub status: InviteStatus,
    #[serde(with = "crate::date_format")]
    pub created: NaiveDateTime,
    #[serde(default, with = "crate::date_format::option")]
    pub responded: Option<NaiveDateTime>,
}

impl CampaignInvite {
    /// Offers a user a seat in the campaign.
    ///
    /// Only the campaign admin may invite. At most one pending invite per
    /// campaign and invitee exists: a repeated call hands back the
    /// existing one without a second notification.
    pub async fn create<S: Store + ?Sized>(
        store: &S,
        campaign_id: &Uuid,
        invited_user_id: &Uuid,
        invited_by: &Uuid,
        role: MemberRole,
    ) -> Result<CampaignInvite, AppError> {
        let campaign = store
            .campaign_by_id(campaign_id)
            .await?
            .ok_or(AppError::NotFound("Campaign"))?;
        roles::require_role(store, campaign_id, invited_by, CampaignRole::Admin).await?;
        let invitee = store
            .user_by_id(invited_user_id)
            .await?
            .ok_or(AppError::NotFound("User"))?;
        if let Some(existing) = store.pending_invite(campaign_id, invited_user_id).await? {
            return Ok(existing);
        }
        let invite = store
            .insert_invite(CampaignInvite {
                id: utils::id(),
                campaign_id: *campaign_id,
                invited_user_id: *invited_user_id,
                invited_by: *invited_by,
                role,
                status: InviteStatus::Pending,
                created: utils::now(),
                responded: None,
            })
            .await?;
        log::info!("{} was invited to the campaign {}", invitee.username, campaign.id);

        let inviter_name = match store.user_by_id(invited_by).await {
            Ok(Some(user)) => user.nickname,
            _ => String::new(),
        };
        let context = NotificationContext {
            campaign_id: Some(campaign.id),
            invite_id: Some(invite.id),
            ..Default::default()
        };
        Notification::post(
            store,
            invited_user_id,
            context,
            NotificationBody::CampaignInvite {
                campaign_name: campaign.name.clone(),
                inviter_name,
                role,
            },
        )
        .await;
        Ok(invite)
    }

    pub async fn get_by_id<S: InviteStore + ?Sized>(store: &S, id: &Uuid) -> Result<Option<CampaignInvite>, AppError> {
        store.invite_by_id(id).await.map_err(Into::into)
    }

    pub async fn get_by_user<S: InviteStore + ?Sized>(
        store: &S,
        user_id: &Uuid,
    ) -> Result<Vec<CampaignInvite>, AppError> {
        store.invites_by_user(user_id).await.map_err(Into::into)
    }

    /// Answers the invite.
    ///
    /// Somebody else's invite, or one that is already settled, is handed
    /// back unchanged so a double submit stays harmless. Accepting needs a
    /// character owned by the respondent with a free campaign slot, and
    /// produces a membership that still waits for the admin's approval.
    pub async fn respond<S: Store + ?Sized>(
        store: &S,
        id: &Uuid,
        responding_user: &Uuid,
        accept: bool,
        character_id: Option<&Uuid>,
    ) -> Result<CampaignInvite, AppError> {
        let invite = store.invite_by_id(id).await?.ok_or(AppError::NotFound("Invite"))?;
        if invite.invited_user_id != *responding_user || invite.status != InviteStatus::Pending {
            return Ok(invite);
        }
        let character_id = if accept {
            let character_id = character_id.ok_or_else(|| {
                AppError::BadRequest(String::from("A character is required to accept an invite"))
            })?;
            let character = store
                .character_by_id(character_id)
                .await?
                .filter(|character| !character.deleted)
                .ok_or(AppError::NotFound("Character"))?;
            if character.user_id != *responding_user {
                return Err(AppError::NoPermission);
            }
            if !store.active_members_by_character(character_id).await?.is_empty() {
                return Err(AppError::AlreadyExists("Membership"));
            }
            Some(character_id)
        } else {
            None
        };

        let status = if accept {
            InviteStatus::Accepted
        } else {
            InviteStatus::Declined
        };
        let now = utils::now();
        let settled = match store.respond_pending(id, status, now).await? {
            Some(invite) => invite,
            None => {
                // settled by an earlier call in the meantime
                return store.invite_by_id(id).await?.ok_or(AppError::NotFound("Invite"));
            }
        };
        if let Err(e) = store.mark_action_taken_for_invite(id, now).await {
            log::warn!("failed to retire the invite notification for {}: {}", id, e);
        }
        if let Some(character_id) = character_id {
            CampaignMember::create(
                store,
                &settled.campaign_id,
                character_id,
                responding_user,
                settled.role,
                MemberStatus::Pending,
            )
            .await?;
        }
        Ok(settled)
    }
}

#[cfg(test)]
async fn invite_fixture(
    store: &crate::database::MemoryStore,
) -> Result<
    (
        crate::users::User,
        crate::users::User,
        crate::campaigns::Campaign,
        crate::characters::Character,
    ),
    AppError,
> {
    use crate::campaigns::Campaign;
    use crate::characters::Character;
    use crate::users::User;

    let gm = User::register(store, "keeper@tavern.net", "keeper", "The Keeper", "no password").await?;
    let player = User::register(store, "rime@tavern.net", "rime", "Rime", "no password").await?;
    let campaign = Campaign::create(store, &gm.id, "Curse of the Amber Throne", "Ravenloft", "5e").await?;
    let character = Character::create(store, &player.id, "Sorsha of House Vex").await?;
    Ok((gm, player, campaign, character))
}

#[tokio::test]
async fn invite_accept_test() -> Result<(), AppError> {
    use crate::database::{MemberStore, MemoryStore};

    let store = MemoryStore::new();
    let (gm, player, campaign, character) = invite_fixture(&store).await?;

    // a mere player cannot invite
    let result = CampaignInvite::create(&store, &campaign.id, &gm.id, &player.id, MemberRole::Player).await;
    assert!(matches!(result, Err(AppError::NoPermission)));

    let invite = CampaignInvite::create(&store, &campaign.id, &player.id, &gm.id, MemberRole::Player).await?;
    assert_eq!(invite.status, InviteStatus::Pending);
    // inviting again hands back the same pending invite, with no second
    // notification
    let again = CampaignInvite::create(&store, &campaign.id, &player.id, &gm.id, MemberRole::Dm).await?;
    assert_eq!(again.id, invite.id);
    assert_eq!(again.role, MemberRole::Player);
    let inbox = Notification::get_by_user(&store, &player.id).await?;
    assert_eq!(inbox.len(), 1);
    assert!(inbox[0].requires_action);

    // accepting requires a character
    let result = CampaignInvite::respond(&store, &invite.id, &player.id, true, None).await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));
    // and it has to be the respondent's own
    let imposter = crate::characters::Character::create(&store, &gm.id, "Keeper's Pawn").await?;
    let result = CampaignInvite::respond(&store, &invite.id, &player.id, true, Some(&imposter.id)).await;
    assert!(matches!(result, Err(AppError::NoPermission)));

    let settled = CampaignInvite::respond(&store, &invite.id, &player.id, true, Some(&character.id)).await?;
    assert_eq!(settled.status, InviteStatus::Accepted);
    assert!(settled.responded.is_some());

    // acceptance never seats the character directly; the admin still has
    // the final word
    let members = store.members_by_campaign(&campaign.id).await?;
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].status, MemberStatus::Pending);
    assert_eq!(members[0].character_id, character.id);
    let gm_inbox = Notification::get_by_user(&store, &gm.id).await?;
    assert!(matches!(
        gm_inbox[0].body,
        NotificationBody::CharacterPendingApproval { .. }
    ));
    // answering retired the invite from the pending-action list
    let inbox = Notification::get_by_user(&store, &player.id).await?;
    assert!(inbox[0].action_taken_at.is_some());

    // the first answer stands, whatever comes later
    let repeated = CampaignInvite::respond(&store, &invite.id, &player.id, false, None).await?;
    assert_eq!(repeated.status, InviteStatus::Accepted);
    assert_eq!(store.members_by_campaign(&campaign.id).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn invite_decline_test() -> Result<(), AppError> {
    use crate::database::{MemberStore, MemoryStore};

    let store = MemoryStore::new();
    let (gm, player, campaign, character) = invite_fixture(&store).await?;
    let invite = CampaignInvite::create(&store, &campaign.id, &player.id, &gm.id, MemberRole::Player).await?;

    // somebody else's invite is none of the keeper's business
    let untouched = CampaignInvite::respond(&store, &invite.id, &gm.id, false, None).await?;
    assert_eq!(untouched.status, InviteStatus::Pending);

    let declined = CampaignInvite::respond(&store, &invite.id, &player.id, false, None).await?;
    assert_eq!(declined.status, InviteStatus::Declined);
    assert!(store.members_by_campaign(&campaign.id).await?.is_empty());

    // declining is final too
    let repeated = CampaignInvite::respond(&store, &invite.id, &player.id, true, Some(&character.id)).await?;
    assert_eq!(repeated.status, InviteStatus::Declined);
    assert!(store.members_by_campaign(&campaign.id).await?.is_empty());

    // a declined invite frees the way for a fresh one
    let fresh = CampaignInvite::create(&store, &campaign.id, &player.id, &gm.id, MemberRole::Player).await?;
    assert_ne!(fresh.id, invite.id);
    Ok(())
}

#[tokio::test]
async fn invite_occupied_character_test() -> Result<(), AppError> {
    use crate::campaigns::Campaign;
    use crate::database::MemoryStore;

    let store = MemoryStore::new();
    let (gm, player, campaign, character) = invite_fixture(&store).await?;
    let invite = CampaignInvite::create(&store, &campaign.id, &player.id, &gm.id, MemberRole::Player).await?;
    CampaignInvite::respond(&store, &invite.id, &player.id, true, Some(&character.id)).await?;

    // the character's slot is taken by the (still pending) membership
    let second_campaign = Campaign::create(&store, &gm.id, "Tomb of the Serpent", "Ravenloft", "5e").await?;
    let second_invite =
        CampaignInvite::create(&store, &second_campaign.id, &player.id, &gm.id, MemberRole::Player).await?;
    let result = CampaignInvite::respond(&store, &second_invite.id, &player.id, true, Some(&character.id)).await;
    assert!(matches!(result, Err(AppError::AlreadyExists(_))));
    // the uniqueness check fired before any write, the invite is still open
    let second_invite = CampaignInvite::get_by_id(&store, &second_invite.id).await?.unwrap();
    assert_eq!(second_invite.status, InviteStatus::Pending);
    Ok(())
}
