//! The store seam.
//!
//! Every model operation reaches durable state through the narrow traits
//! below, passed in explicitly by the caller. The server binary and the
//! tests both use [`MemoryStore`]; nothing in the crate reaches for a
//! process-wide store handle.
use async_trait::async_trait;
use chrono::naive::NaiveDateTime;
use thiserror::Error;
use uuid::Uuid;

use crate::campaigns::Campaign;
use crate::characters::Character;
use crate::invites::{CampaignInvite, InviteStatus};
use crate::members::{CampaignMember, CharacterStatus};
use crate::notifications::Notification;
use crate::users::User;

mod memory;
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("the data store is unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert_user(&self, user: User) -> StoreResult<User>;
    async fn user_by_id(&self, id: &Uuid) -> StoreResult<Option<User>>;
    async fn user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
}

#[async_trait]
pub trait CharacterStore: Send + Sync {
    async fn insert_character(&self, character: Character) -> StoreResult<Character>;
    async fn character_by_id(&self, id: &Uuid) -> StoreResult<Option<Character>>;
    async fn set_character_deleted(&self, id: &Uuid) -> StoreResult<Option<Character>>;
}

#[async_trait]
pub trait CampaignStore: Send + Sync {
    async fn insert_campaign(&self, campaign: Campaign) -> StoreResult<Campaign>;
    async fn campaign_by_id(&self, id: &Uuid) -> StoreResult<Option<Campaign>>;
    async fn update_campaign(&self, campaign: Campaign) -> StoreResult<Option<Campaign>>;
    async fn remove_campaign(&self, id: &Uuid) -> StoreResult<bool>;
    async fn campaigns_by_owner(&self, owner_id: &Uuid) -> StoreResult<Vec<Campaign>>;
}

#[async_trait]
pub trait MemberStore: Send + Sync {
    async fn insert_member(&self, member: CampaignMember) -> StoreResult<CampaignMember>;
    async fn member_by_id(&self, id: &Uuid) -> StoreResult<Option<CampaignMember>>;
    async fn members_by_campaign(&self, campaign_id: &Uuid) -> StoreResult<Vec<CampaignMember>>;
    async fn members_by_campaign_user(&self, campaign_id: &Uuid, user_id: &Uuid) -> StoreResult<Vec<CampaignMember>>;
    async fn members_by_user(&self, user_id: &Uuid) -> StoreResult<Vec<CampaignMember>>;
    /// Memberships of the character that still occupy its campaign slot,
    /// that is, with a pending or approved admission status.
    async fn active_members_by_character(&self, character_id: &Uuid) -> StoreResult<Vec<CampaignMember>>;
    /// Conditional update: succeeds only when the member is still pending.
    /// Returns `None` when no row matched, without touching anything.
    async fn approve_pending(
        &self,
        id: &Uuid,
        approved_by: &Uuid,
        now: NaiveDateTime,
    ) -> StoreResult<Option<CampaignMember>>;
    /// Conditional update with the same pending-only guard as `approve_pending`.
    async fn reject_pending(&self, id: &Uuid, now: NaiveDateTime) -> StoreResult<Option<CampaignMember>>;
    async fn set_character_status(&self, id: &Uuid, status: CharacterStatus)
        -> StoreResult<Option<CampaignMember>>;
}

#[async_trait]
pub trait InviteStore: Send + Sync {
    async fn insert_invite(&self, invite: CampaignInvite) -> StoreResult<CampaignInvite>;
    async fn invite_by_id(&self, id: &Uuid) -> StoreResult<Option<CampaignInvite>>;
    async fn invites_by_user(&self, user_id: &Uuid) -> StoreResult<Vec<CampaignInvite>>;
    async fn pending_invite(&self, campaign_id: &Uuid, invited_user_id: &Uuid)
        -> StoreResult<Option<CampaignInvite>>;
    /// Conditional update: settles the invite only when it is still pending.
    async fn respond_pending(
        &self,
        id: &Uuid,
        status: InviteStatus,
        now: NaiveDateTime,
    ) -> StoreResult<Option<CampaignInvite>>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert_notification(&self, notification: Notification) -> StoreResult<Notification>;
    /// Newest first.
    async fn notifications_by_user(&self, user_id: &Uuid) -> StoreResult<Vec<Notification>>;
    async fn unread_count(&self, user_id: &Uuid) -> StoreResult<u64>;
    async fn mark_read(&self, id: &Uuid, user_id: &Uuid, now: NaiveDateTime) -> StoreResult<Option<Notification>>;
    async fn mark_all_read(&self, user_id: &Uuid, now: NaiveDateTime) -> StoreResult<u64>;
    async fn mark_action_taken_for_invite(&self, invite_id: &Uuid, now: NaiveDateTime) -> StoreResult<u64>;
    async fn mark_action_taken_for_member(&self, member_id: &Uuid, now: NaiveDateTime) -> StoreResult<u64>;
}

pub trait Store:
    UserStore + CharacterStore + CampaignStore + MemberStore + InviteStore + NotificationStore
{
}

impl<T> Store for T where
    T: UserStore + CharacterStore + CampaignStore + MemberStore + InviteStore + NotificationStore
{
}
