use chrono::naive::NaiveDateTime;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::{CharacterStore, MemberStore, Store, UserStore};
use crate::error::AppError;
use crate::notifications::{Notification, NotificationBody, NotificationContext};
use crate::roles::{self, CampaignRole, MemberRole};
use crate::users::User;
use crate::utils;

/// Admission status. Once settled it never goes back to pending.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Pending,
    Approved,
    Rejected,
}

/// In-fiction status of the character, meaningful once the membership is
/// approved.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CharacterStatus {
    Active,
    Inactive,
    Deceased,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CampaignMember {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub character_id: Uuid,
    pub user_id: Uuid,
    pub role: MemberRole,
    pub status: MemberStatus,
    pub character_status: CharacterStatus,
    #[serde(with = "crate::date_format")]
    pub requested: NaiveDateTime,
    #[serde(default, with = "crate::date_format::option")]
    pub approved: Option<NaiveDateTime>,
    pub approved_by: Option<Uuid>,
    #[serde(default, with = "crate::date_format::option")]
    pub joined: Option<NaiveDateTime>,
}

impl CampaignMember {
    /// The one place a fresh membership record is shaped: a new member
    /// always starts with a playable character, and an approved one is
    /// stamped immediately.
    fn new(
        campaign_id: &Uuid,
        character_id: &Uuid,
        user_id: &Uuid,
        role: MemberRole,
        initial_status: MemberStatus,
    ) -> CampaignMember {
        let now = utils::now();
        let mut member = CampaignMember {
            id: utils::id(),
            campaign_id: *campaign_id,
            character_id: *character_id,
            user_id: *user_id,
            role,
            status: initial_status,
            character_status: CharacterStatus::Active,
            requested: now,
            approved: None,
            approved_by: None,
            joined: None,
        };
        if initial_status == MemberStatus::Approved {
            member.approved = Some(now);
            member.joined = Some(now);
        }
        member
    }

    /// Attaches a character to a campaign.
    ///
    /// Callers are responsible for the permission check; this enforces the
    /// data rules: the character must exist, belong to the user, and must
    /// not already occupy a campaign slot anywhere.
    pub async fn create<S: Store + ?Sized>(
        store: &S,
        campaign_id: &Uuid,
        character_id: &Uuid,
        user_id: &Uuid,
        role: MemberRole,
        initial_status: MemberStatus,
    ) -> Result<CampaignMember, AppError> {
        if initial_status == MemberStatus::Rejected {
            return Err(AppError::BadRequest(String::from("A membership cannot start rejected")));
        }
        let campaign = store
            .campaign_by_id(campaign_id)
            .await?
            .ok_or(AppError::NotFound("Campaign"))?;
        let character = store
            .character_by_id(character_id)
            .await?
            .filter(|character| !character.deleted)
            .ok_or(AppError::NotFound("Character"))?;
        if character.user_id != *user_id {
            return Err(AppError::BadRequest(String::from(
                "The character does not belong to this user",
            )));
        }
        if !store.active_members_by_character(character_id).await?.is_empty() {
            return Err(AppError::AlreadyExists("Membership"));
        }
        let member = store
            .insert_member(CampaignMember::new(campaign_id, character_id, user_id, role, initial_status))
            .await?;
        let context = NotificationContext {
            campaign_id: Some(campaign.id),
            member_id: Some(member.id),
            character_id: Some(member.character_id),
            ..Default::default()
        };
        if member.status == MemberStatus::Pending {
            let player_name = user_display_name(store, user_id).await;
            Notification::post(
                store,
                &campaign.owner_id,
                context,
                NotificationBody::CharacterPendingApproval {
                    campaign_name: campaign.name.clone(),
                    character_name: character.name.clone(),
                    player_name,
                },
            )
            .await;
        } else {
            let player_name = user_display_name(store, user_id).await;
            for recipient in party_audience(store, &campaign.id, &[member.user_id]).await? {
                Notification::post(
                    store,
                    &recipient,
                    context.clone(),
                    NotificationBody::NewPartyMember {
                        campaign_name: campaign.name.clone(),
                        character_name: character.name.clone(),
                        player_name: player_name.clone(),
                    },
                )
                .await;
            }
        }
        Ok(member)
    }

    pub async fn get_by_id<S: MemberStore + ?Sized>(store: &S, id: &Uuid) -> Result<Option<CampaignMember>, AppError> {
        store.member_by_id(id).await.map_err(Into::into)
    }

    pub async fn get_by_campaign<S: MemberStore + ?Sized>(
        store: &S,
        campaign_id: &Uuid,
    ) -> Result<Vec<CampaignMember>, AppError> {
        store.members_by_campaign(campaign_id).await.map_err(Into::into)
    }

    /// The member list the messaging side reads to decide who may talk to
    /// whom in a campaign.
    pub async fn approved_by_campaign<S: MemberStore + ?Sized>(
        store: &S,
        campaign_id: &Uuid,
    ) -> Result<Vec<CampaignMember>, AppError> {
        let members = store.members_by_campaign(campaign_id).await?;
        Ok(members
            .into_iter()
            .filter(|member| member.status == MemberStatus::Approved)
            .collect())
    }

    /// Settles a pending application as approved.
    ///
    /// The write is conditional on the member still being pending, so of
    /// two concurrent approvals exactly one performs the transition; the
    /// other gets the already-settled record back unchanged.
    pub async fn approve<S: Store + ?Sized>(
        store: &S,
        id: &Uuid,
        approving_user: &Uuid,
    ) -> Result<CampaignMember, AppError> {
        let member = store.member_by_id(id).await?.ok_or(AppError::NotFound("Member"))?;
        let campaign = store
            .campaign_by_id(&member.campaign_id)
            .await?
            .ok_or(AppError::NotFound("Campaign"))?;
        roles::require_role(store, &campaign.id, approving_user, CampaignRole::Admin).await?;

        let now = utils::now();
        let approved = match store.approve_pending(id, approving_user, now).await? {
            Some(member) => member,
            None => {
                let current = store.member_by_id(id).await?.ok_or(AppError::NotFound("Member"))?;
                log::info!("member {} is already {:?}, the approval was skipped", id, current.status);
                return Ok(current);
            }
        };
        resolve_member_actions(store, id, now).await;

        let character_name = character_display_name(store, &approved.character_id).await;
        let player_name = user_display_name(store, &approved.user_id).await;
        let context = NotificationContext {
            campaign_id: Some(campaign.id),
            member_id: Some(approved.id),
            character_id: Some(approved.character_id),
            ..Default::default()
        };
        Notification::post(
            store,
            &approved.user_id,
            context.clone(),
            NotificationBody::CharacterApproved {
                campaign_name: campaign.name.clone(),
                character_name: character_name.clone(),
            },
        )
        .await;
        for recipient in party_audience(store, &campaign.id, &[approved.user_id, *approving_user]).await? {
            Notification::post(
                store,
                &recipient,
                context.clone(),
                NotificationBody::NewPartyMember {
                    campaign_name: campaign.name.clone(),
                    character_name: character_name.clone(),
                    player_name: player_name.clone(),
                },
            )
            .await;
        }
        log::info!("character {} joined the campaign {}", approved.character_id, campaign.id);
        Ok(approved)
    }

    /// Settles a pending application as rejected, with the same
    /// pending-only guard as [`CampaignMember::approve`]. Only the
    /// applicant is told.
    pub async fn reject<S: Store + ?Sized>(
        store: &S,
        id: &Uuid,
        rejecting_user: &Uuid,
    ) -> Result<CampaignMember, AppError> {
        let member = store.member_by_id(id).await?.ok_or(AppError::NotFound("Member"))?;
        let campaign = store
            .campaign_by_id(&member.campaign_id)
            .await?
            .ok_or(AppError::NotFound("Campaign"))?;
        roles::require_role(store, &campaign.id, rejecting_user, CampaignRole::Admin).await?;

        let now = utils::now();
        let rejected = match store.reject_pending(id, now).await? {
            Some(member) => member,
            None => {
                let current = store.member_by_id(id).await?.ok_or(AppError::NotFound("Member"))?;
                log::info!("member {} is already {:?}, the rejection was skipped", id, current.status);
                return Ok(current);
            }
        };
        resolve_member_actions(store, id, now).await;

        let character_name = character_display_name(store, &rejected.character_id).await;
        let context = NotificationContext {
            campaign_id: Some(campaign.id),
            member_id: Some(rejected.id),
            character_id: Some(rejected.character_id),
            ..Default::default()
        };
        Notification::post(
            store,
            &rejected.user_id,
            context,
            NotificationBody::CharacterRejected {
                campaign_name: campaign.name.clone(),
                character_name,
            },
        )
        .await;
        Ok(rejected)
    }

    /// Changes the in-fiction status of an approved member's character.
    ///
    /// The campaign admin may set any status; the player owning the
    /// membership may only retire their own character (`inactive`). A
    /// change on a non-approved membership, or to the status it already
    /// has, returns the record untouched.
    pub async fn update_character_status<S: Store + ?Sized>(
        store: &S,
        id: &Uuid,
        new_status: CharacterStatus,
        acting_user: &Uuid,
    ) -> Result<CampaignMember, AppError> {
        let member = store.member_by_id(id).await?.ok_or(AppError::NotFound("Member"))?;
        let campaign = store
            .campaign_by_id(&member.campaign_id)
            .await?
            .ok_or(AppError::NotFound("Campaign"))?;
        let is_admin = campaign.owner_id == *acting_user;
        let is_own = member.user_id == *acting_user;
        if !is_admin && !(is_own && new_status == CharacterStatus::Inactive) {
            return Err(AppError::NoPermission);
        }
        if member.status != MemberStatus::Approved || member.character_status == new_status {
            return Ok(member);
        }
        let updated = store
            .set_character_status(id, new_status)
            .await?
            .ok_or(AppError::NotFound("Member"))?;

        let character_name = character_display_name(store, &updated.character_id).await;
        let context = NotificationContext {
            campaign_id: Some(campaign.id),
            member_id: Some(updated.id),
            character_id: Some(updated.character_id),
            ..Default::default()
        };
        let body = match new_status {
            CharacterStatus::Deceased => NotificationBody::CharacterDeceased {
                campaign_name: campaign.name.clone(),
                character_name,
            },
            _ => NotificationBody::CharacterLeft {
                campaign_name: campaign.name.clone(),
                character_name,
            },
        };
        for recipient in party_audience(store, &campaign.id, &[updated.user_id, *acting_user]).await? {
            Notification::post(store, &recipient, context.clone(), body.clone()).await;
        }
        Ok(updated)
    }

    /// Retires the character from every campaign it is actively playing
    /// in, through the same path as a player-initiated leave. Memberships
    /// that already sat out are left alone.
    pub async fn cascade_on_character_delete<S: Store + ?Sized>(
        store: &S,
        character_id: &Uuid,
        acting_user: &Uuid,
    ) -> Result<(), AppError> {
        let memberships = store.active_members_by_character(character_id).await?;
        for member in memberships {
            if member.status != MemberStatus::Approved || member.character_status != CharacterStatus::Active {
                continue;
            }
            CampaignMember::update_character_status(store, &member.id, CharacterStatus::Inactive, acting_user).await?;
        }
        Ok(())
    }
}

/// User ids of every approved member of the campaign, minus `exclude`.
/// A user playing several characters in the campaign is counted once.
async fn party_audience<S: MemberStore + ?Sized>(
    store: &S,
    campaign_id: &Uuid,
    exclude: &[Uuid],
) -> Result<Vec<Uuid>, AppError> {
    let members = store.members_by_campaign(campaign_id).await?;
    Ok(members
        .into_iter()
        .filter(|member| member.status == MemberStatus::Approved)
        .map(|member| member.user_id)
        .filter(|user_id| !exclude.contains(user_id))
        .unique()
        .collect())
}

/// Retires actionable notifications about the member once its application
/// is settled. Best-effort, like the rest of the side channel.
async fn resolve_member_actions<S: Store + ?Sized>(store: &S, member_id: &Uuid, now: NaiveDateTime) {
    if let Err(e) = store.mark_action_taken_for_member(member_id, now).await {
        log::warn!("failed to retire actionable notifications for member {}: {}", member_id, e);
    }
}

async fn character_display_name<S: CharacterStore + ?Sized>(store: &S, id: &Uuid) -> String {
    match store.character_by_id(id).await {
        Ok(Some(character)) => character.name,
        _ => String::new(),
    }
}

async fn user_display_name<S: UserStore + ?Sized>(store: &S, id: &Uuid) -> String {
    match store.user_by_id(id).await {
        Ok(Some(user)) => user.nickname,
        _ => String::new(),
    }
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MemberWithUser {
    pub member: CampaignMember,
    pub user: User,
}

impl MemberWithUser {
    pub async fn get_by_campaign<S: Store + ?Sized>(
        store: &S,
        campaign_id: &Uuid,
    ) -> Result<Vec<MemberWithUser>, AppError> {
        let members = store.members_by_campaign(campaign_id).await?;
        let mut result = Vec::with_capacity(members.len());
        for member in members {
            let user = store
                .user_by_id(&member.user_id)
                .await?
                .ok_or(AppError::NotFound("User"))?;
            result.push(MemberWithUser { member, user });
        }
        Ok(result)
    }
}

#[cfg(test)]
async fn party_fixture(
    store: &crate::database::MemoryStore,
) -> Result<(User, crate::campaigns::Campaign), AppError> {
    use crate::campaigns::Campaign;

    let gm = User::register(store, "keeper@tavern.net", "keeper", "The Keeper", "no password").await?;
    let campaign = Campaign::create(store, &gm.id, "Curse of the Amber Throne", "Ravenloft", "5e").await?;
    Ok((gm, campaign))
}

#[tokio::test]
async fn member_approval_test() -> Result<(), AppError> {
    use crate::characters::Character;
    use crate::database::MemoryStore;

    let store = MemoryStore::new();
    let (gm, campaign) = party_fixture(&store).await?;
    let player = User::register(&store, "rime@tavern.net", "rime", "Rime", "no password").await?;
    let character = Character::create(&store, &player.id, "Sorsha of House Vex").await?;

    assert_eq!(
        roles::resolve_role(&store, &campaign.id, &gm.id).await?,
        Some(CampaignRole::Admin)
    );
    assert_eq!(roles::resolve_role(&store, &campaign.id, &player.id).await?, None);

    let member = CampaignMember::create(
        &store,
        &campaign.id,
        &character.id,
        &player.id,
        MemberRole::Player,
        MemberStatus::Pending,
    )
    .await?;
    assert_eq!(member.status, MemberStatus::Pending);
    assert!(member.approved.is_none());
    // a pending applicant may look, not act
    assert_eq!(
        roles::resolve_role(&store, &campaign.id, &player.id).await?,
        Some(CampaignRole::Observer)
    );
    // the admin has an application to answer
    let gm_inbox = Notification::get_by_user(&store, &gm.id).await?;
    assert_eq!(gm_inbox.len(), 1);
    assert!(gm_inbox[0].requires_action);
    assert!(matches!(
        gm_inbox[0].body,
        NotificationBody::CharacterPendingApproval { .. }
    ));

    // the applicant cannot approve their own application
    let result = CampaignMember::approve(&store, &member.id, &player.id).await;
    assert!(matches!(result, Err(AppError::NoPermission)));

    let approved = CampaignMember::approve(&store, &member.id, &gm.id).await?;
    assert_eq!(approved.status, MemberStatus::Approved);
    assert_eq!(approved.character_status, CharacterStatus::Active);
    assert_eq!(approved.approved_by, Some(gm.id));
    assert!(approved.joined.is_some());
    assert_eq!(
        roles::resolve_role(&store, &campaign.id, &player.id).await?,
        Some(CampaignRole::Player)
    );

    // answering the application retired the admin's actionable item
    let gm_inbox = Notification::get_by_user(&store, &gm.id).await?;
    assert!(gm_inbox[0].action_taken_at.is_some());
    let player_inbox = Notification::get_by_user(&store, &player.id).await?;
    assert!(matches!(player_inbox[0].body, NotificationBody::CharacterApproved { .. }));

    // settled is settled: approving or rejecting again changes nothing
    let again = CampaignMember::approve(&store, &member.id, &gm.id).await?;
    assert_eq!(again.status, MemberStatus::Approved);
    assert_eq!(again.approved, approved.approved);
    let rejected = CampaignMember::reject(&store, &member.id, &gm.id).await?;
    assert_eq!(rejected.status, MemberStatus::Approved);

    // the character already occupies a campaign slot
    let second = Character::create(&store, &player.id, "Vex the Younger").await?;
    let result = CampaignMember::create(
        &store,
        &campaign.id,
        &character.id,
        &player.id,
        MemberRole::Dm,
        MemberStatus::Pending,
    )
    .await;
    assert!(matches!(result, Err(AppError::AlreadyExists(_))));
    // but a different character of the same player is welcome
    let dm_member = CampaignMember::create(
        &store,
        &campaign.id,
        &second.id,
        &player.id,
        MemberRole::Dm,
        MemberStatus::Approved,
    )
    .await?;
    assert_eq!(dm_member.status, MemberStatus::Approved);
    // the highest approved role wins
    assert_eq!(
        roles::resolve_role(&store, &campaign.id, &player.id).await?,
        Some(CampaignRole::Dm)
    );
    Ok(())
}

#[tokio::test]
async fn member_rejection_test() -> Result<(), AppError> {
    use crate::characters::Character;
    use crate::database::MemoryStore;

    let store = MemoryStore::new();
    let (gm, campaign) = party_fixture(&store).await?;
    let player = User::register(&store, "petra@tavern.net", "petra", "Petra", "no password").await?;
    let character = Character::create(&store, &player.id, "Petra the Unlucky").await?;
    let member = CampaignMember::create(
        &store,
        &campaign.id,
        &character.id,
        &player.id,
        MemberRole::Player,
        MemberStatus::Pending,
    )
    .await?;

    let rejected = CampaignMember::reject(&store, &member.id, &gm.id).await?;
    assert_eq!(rejected.status, MemberStatus::Rejected);
    let player_inbox = Notification::get_by_user(&store, &player.id).await?;
    assert_eq!(player_inbox.len(), 1);
    assert!(matches!(player_inbox[0].body, NotificationBody::CharacterRejected { .. }));

    // a rejected membership no longer holds the character's slot
    assert!(roles::resolve_role(&store, &campaign.id, &player.id).await?.is_some());
    let retry = CampaignMember::create(
        &store,
        &campaign.id,
        &character.id,
        &player.id,
        MemberRole::Player,
        MemberStatus::Pending,
    )
    .await?;
    assert_eq!(retry.status, MemberStatus::Pending);

    // approval after rejection is a no-op on the settled record
    let still_rejected = CampaignMember::approve(&store, &member.id, &gm.id).await?;
    assert_eq!(still_rejected.status, MemberStatus::Rejected);
    Ok(())
}

#[tokio::test]
async fn concurrent_approval_test() -> Result<(), AppError> {
    use crate::characters::Character;
    use crate::database::{MemberStore, MemoryStore};

    let store = MemoryStore::new();
    let (gm, campaign) = party_fixture(&store).await?;
    let player = User::register(&store, "race@tavern.net", "racer", "Racer", "no password").await?;
    let character = Character::create(&store, &player.id, "Blink of an Eye").await?;
    let member = CampaignMember::create(
        &store,
        &campaign.id,
        &character.id,
        &player.id,
        MemberRole::Player,
        MemberStatus::Pending,
    )
    .await?;

    // exactly one of two simultaneous conditional updates finds a match
    let (first, second) = tokio::join!(
        store.approve_pending(&member.id, &gm.id, utils::now()),
        store.approve_pending(&member.id, &gm.id, utils::now()),
    );
    let settled = [first?, second?];
    assert_eq!(settled.iter().filter(|outcome| outcome.is_some()).count(), 1);

    // the loser of the race still gets the settled record, not an error
    let outcome = CampaignMember::approve(&store, &member.id, &gm.id).await?;
    assert_eq!(outcome.status, MemberStatus::Approved);
    Ok(())
}

#[tokio::test]
async fn character_status_test() -> Result<(), AppError> {
    use crate::characters::Character;
    use crate::database::MemoryStore;

    let store = MemoryStore::new();
    let (gm, campaign) = party_fixture(&store).await?;
    let ulrich = User::register(&store, "ulrich@tavern.net", "ulrich", "Ulrich", "no password").await?;
    let vesna = User::register(&store, "vesna@tavern.net", "vesna", "Vesna", "no password").await?;
    let knight = Character::create(&store, &ulrich.id, "Knight of Daggers").await?;
    let oracle = Character::create(&store, &vesna.id, "Oracle of Smoke").await?;
    let knight_member = CampaignMember::create(
        &store,
        &campaign.id,
        &knight.id,
        &ulrich.id,
        MemberRole::Player,
        MemberStatus::Approved,
    )
    .await?;
    let oracle_member = CampaignMember::create(
        &store,
        &campaign.id,
        &oracle.id,
        &vesna.id,
        MemberRole::Player,
        MemberStatus::Approved,
    )
    .await?;
    // the knight was already in the party when the oracle arrived
    let ulrich_inbox = Notification::get_by_user(&store, &ulrich.id).await?;
    assert!(matches!(ulrich_inbox[0].body, NotificationBody::NewPartyMember { .. }));

    // a player may not kill off their own character record
    let result =
        CampaignMember::update_character_status(&store, &knight_member.id, CharacterStatus::Deceased, &ulrich.id)
            .await;
    assert!(matches!(result, Err(AppError::NoPermission)));
    // nor touch anyone else's
    let result =
        CampaignMember::update_character_status(&store, &oracle_member.id, CharacterStatus::Inactive, &ulrich.id)
            .await;
    assert!(matches!(result, Err(AppError::NoPermission)));

    // leaving the campaign is the player's own call
    let left = CampaignMember::update_character_status(&store, &knight_member.id, CharacterStatus::Inactive, &ulrich.id)
        .await?;
    assert_eq!(left.character_status, CharacterStatus::Inactive);
    assert_eq!(left.status, MemberStatus::Approved);
    // a retired character still counts as an approved member
    assert_eq!(CampaignMember::approved_by_campaign(&store, &campaign.id).await?.len(), 2);
    let vesna_inbox = Notification::get_by_user(&store, &vesna.id).await?;
    assert!(matches!(vesna_inbox[0].body, NotificationBody::CharacterLeft { .. }));

    // the admin may set any status
    let fallen = CampaignMember::update_character_status(&store, &oracle_member.id, CharacterStatus::Deceased, &gm.id)
        .await?;
    assert_eq!(fallen.character_status, CharacterStatus::Deceased);
    let ulrich_inbox = Notification::get_by_user(&store, &ulrich.id).await?;
    assert!(matches!(ulrich_inbox[0].body, NotificationBody::CharacterDeceased { .. }));

    // setting the status it already has tells nobody anything
    let before = Notification::get_by_user(&store, &ulrich.id).await?.len();
    let unchanged =
        CampaignMember::update_character_status(&store, &oracle_member.id, CharacterStatus::Deceased, &gm.id).await?;
    assert_eq!(unchanged.character_status, CharacterStatus::Deceased);
    assert_eq!(Notification::get_by_user(&store, &ulrich.id).await?.len(), before);
    Ok(())
}

#[tokio::test]
async fn character_delete_cascade_test() -> Result<(), AppError> {
    use crate::characters::Character;
    use crate::database::MemoryStore;

    let store = MemoryStore::new();
    let (_gm, campaign) = party_fixture(&store).await?;
    let ulrich = User::register(&store, "ulrich@tavern.net", "ulrich", "Ulrich", "no password").await?;
    let vesna = User::register(&store, "vesna@tavern.net", "vesna", "Vesna", "no password").await?;
    let knight = Character::create(&store, &ulrich.id, "Knight of Daggers").await?;
    let oracle = Character::create(&store, &vesna.id, "Oracle of Smoke").await?;
    let knight_member = CampaignMember::create(
        &store,
        &campaign.id,
        &knight.id,
        &ulrich.id,
        MemberRole::Player,
        MemberStatus::Approved,
    )
    .await?;
    CampaignMember::create(
        &store,
        &campaign.id,
        &oracle.id,
        &vesna.id,
        MemberRole::Player,
        MemberStatus::Approved,
    )
    .await?;

    Character::delete(&store, &knight.id, &ulrich.id).await?;
    assert!(Character::get_by_id(&store, &knight.id).await?.is_none());
    // the membership survives as campaign history, retired from play
    let member = CampaignMember::get_by_id(&store, &knight_member.id).await?.unwrap();
    assert_eq!(member.status, MemberStatus::Approved);
    assert_eq!(member.character_status, CharacterStatus::Inactive);
    let vesna_inbox = Notification::get_by_user(&store, &vesna.id).await?;
    assert!(matches!(vesna_inbox[0].body, NotificationBody::CharacterLeft { .. }));

    // deleting again finds nothing to retire
    let result = Character::delete(&store, &knight.id, &ulrich.id).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert_eq!(Notification::get_by_user(&store, &vesna.id).await?.len(), 1);
    Ok(())
}
