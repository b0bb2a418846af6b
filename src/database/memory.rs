//! A shared in-memory document store.
//!
//! All records live behind a single lock, so every store call is atomic,
//! including the conditional status updates that guard concurrent
//! approve/reject/respond calls.
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::naive::NaiveDateTime;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{
    CampaignStore, CharacterStore, InviteStore, MemberStore, NotificationStore, StoreResult, UserStore,
};
use crate::campaigns::Campaign;
use crate::characters::Character;
use crate::invites::{CampaignInvite, InviteStatus};
use crate::members::{CampaignMember, CharacterStatus, MemberStatus};
use crate::notifications::Notification;
use crate::users::User;

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    characters: HashMap<Uuid, Character>,
    campaigns: HashMap<Uuid, Campaign>,
    members: HashMap<Uuid, CampaignMember>,
    invites: HashMap<Uuid, CampaignInvite>,
    notifications: Vec<Notification>,
}

pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore {
            inner: Mutex::new(Inner::default()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> MemoryStore {
        MemoryStore::new()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: User) -> StoreResult<User> {
        let mut inner = self.inner.lock().await;
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn user_by_id(&self, id: &Uuid) -> StoreResult<Option<User>> {
        let inner = self.inner.lock().await;
        Ok(inner.users.get(id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let inner = self.inner.lock().await;
        Ok(inner.users.values().find(|user| user.email == email).cloned())
    }

    async fn user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let inner = self.inner.lock().await;
        Ok(inner.users.values().find(|user| user.username == username).cloned())
    }
}

#[async_trait]
impl CharacterStore for MemoryStore {
    async fn insert_character(&self, character: Character) -> StoreResult<Character> {
        let mut inner = self.inner.lock().await;
        inner.characters.insert(character.id, character.clone());
        Ok(character)
    }

    async fn character_by_id(&self, id: &Uuid) -> StoreResult<Option<Character>> {
        let inner = self.inner.lock().await;
        Ok(inner.characters.get(id).cloned())
    }

    async fn set_character_deleted(&self, id: &Uuid) -> StoreResult<Option<Character>> {
        let mut inner = self.inner.lock().await;
        Ok(inner.characters.get_mut(id).map(|character| {
            character.deleted = true;
            character.clone()
        }))
    }
}

#[async_trait]
impl CampaignStore for MemoryStore {
    async fn insert_campaign(&self, campaign: Campaign) -> StoreResult<Campaign> {
        let mut inner = self.inner.lock().await;
        inner.campaigns.insert(campaign.id, campaign.clone());
        Ok(campaign)
    }

    async fn campaign_by_id(&self, id: &Uuid) -> StoreResult<Option<Campaign>> {
        let inner = self.inner.lock().await;
        Ok(inner.campaigns.get(id).cloned())
    }

    async fn update_campaign(&self, campaign: Campaign) -> StoreResult<Option<Campaign>> {
        let mut inner = self.inner.lock().await;
        match inner.campaigns.get_mut(&campaign.id) {
            Some(stored) => {
                *stored = campaign.clone();
                Ok(Some(campaign))
            }
            None => Ok(None),
        }
    }

    async fn remove_campaign(&self, id: &Uuid) -> StoreResult<bool> {
        let mut inner = self.inner.lock().await;
        Ok(inner.campaigns.remove(id).is_some())
    }

    async fn campaigns_by_owner(&self, owner_id: &Uuid) -> StoreResult<Vec<Campaign>> {
        let inner = self.inner.lock().await;
        let mut campaigns: Vec<Campaign> = inner
            .campaigns
            .values()
            .filter(|campaign| campaign.owner_id == *owner_id)
            .cloned()
            .collect();
        campaigns.sort_by_key(|campaign| campaign.created);
        Ok(campaigns)
    }
}

#[async_trait]
impl MemberStore for MemoryStore {
    async fn insert_member(&self, member: CampaignMember) -> StoreResult<CampaignMember> {
        let mut inner = self.inner.lock().await;
        inner.members.insert(member.id, member.clone());
        Ok(member)
    }

    async fn member_by_id(&self, id: &Uuid) -> StoreResult<Option<CampaignMember>> {
        let inner = self.inner.lock().await;
        Ok(inner.members.get(id).cloned())
    }

    async fn members_by_campaign(&self, campaign_id: &Uuid) -> StoreResult<Vec<CampaignMember>> {
        let inner = self.inner.lock().await;
        let mut members: Vec<CampaignMember> = inner
            .members
            .values()
            .filter(|member| member.campaign_id == *campaign_id)
            .cloned()
            .collect();
        members.sort_by_key(|member| member.requested);
        Ok(members)
    }

    async fn members_by_campaign_user(&self, campaign_id: &Uuid, user_id: &Uuid) -> StoreResult<Vec<CampaignMember>> {
        let inner = self.inner.lock().await;
        let mut members: Vec<CampaignMember> = inner
            .members
            .values()
            .filter(|member| member.campaign_id == *campaign_id && member.user_id == *user_id)
            .cloned()
            .collect();
        members.sort_by_key(|member| member.requested);
        Ok(members)
    }

    async fn members_by_user(&self, user_id: &Uuid) -> StoreResult<Vec<CampaignMember>> {
        let inner = self.inner.lock().await;
        let mut members: Vec<CampaignMember> = inner
            .members
            .values()
            .filter(|member| member.user_id == *user_id)
            .cloned()
            .collect();
        members.sort_by_key(|member| member.requested);
        Ok(members)
    }

    async fn active_members_by_character(&self, character_id: &Uuid) -> StoreResult<Vec<CampaignMember>> {
        let inner = self.inner.lock().await;
        let mut members: Vec<CampaignMember> = inner
            .members
            .values()
            .filter(|member| {
                member.character_id == *character_id
                    && matches!(member.status, MemberStatus::Pending | MemberStatus::Approved)
            })
            .cloned()
            .collect();
        members.sort_by_key(|member| member.requested);
        Ok(members)
    }

    async fn approve_pending(
        &self,
        id: &Uuid,
        approved_by: &Uuid,
        now: NaiveDateTime,
    ) -> StoreResult<Option<CampaignMember>> {
        let mut inner = self.inner.lock().await;
        let member = match inner.members.get_mut(id) {
            Some(member) if member.status == MemberStatus::Pending => member,
            _ => return Ok(None),
        };
        member.status = MemberStatus::Approved;
        member.approved = Some(now);
        member.approved_by = Some(*approved_by);
        member.joined = Some(now);
        Ok(Some(member.clone()))
    }

    async fn reject_pending(&self, id: &Uuid, _now: NaiveDateTime) -> StoreResult<Option<CampaignMember>> {
        let mut inner = self.inner.lock().await;
        let member = match inner.members.get_mut(id) {
            Some(member) if member.status == MemberStatus::Pending => member,
            _ => return Ok(None),
        };
        member.status = MemberStatus::Rejected;
        Ok(Some(member.clone()))
    }

    async fn set_character_status(
        &self,
        id: &Uuid,
        status: CharacterStatus,
    ) -> StoreResult<Option<CampaignMember>> {
        let mut inner = self.inner.lock().await;
        Ok(inner.members.get_mut(id).map(|member| {
            member.character_status = status;
            member.clone()
        }))
    }
}

#[async_trait]
impl InviteStore for MemoryStore {
    async fn insert_invite(&self, invite: CampaignInvite) -> StoreResult<CampaignInvite> {
        let mut inner = self.inner.lock().await;
        inner.invites.insert(invite.id, invite.clone());
        Ok(invite)
    }

    async fn invite_by_id(&self, id: &Uuid) -> StoreResult<Option<CampaignInvite>> {
        let inner = self.inner.lock().await;
        Ok(inner.invites.get(id).cloned())
    }

    async fn invites_by_user(&self, user_id: &Uuid) -> StoreResult<Vec<CampaignInvite>> {
        let inner = self.inner.lock().await;
        let mut invites: Vec<CampaignInvite> = inner
            .invites
            .values()
            .filter(|invite| invite.invited_user_id == *user_id)
            .cloned()
            .collect();
        invites.sort_by(|a, b| b.created.cmp(&a.created));
        Ok(invites)
    }

    async fn pending_invite(
        &self,
        campaign_id: &Uuid,
        invited_user_id: &Uuid,
    ) -> StoreResult<Option<CampaignInvite>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .invites
            .values()
            .find(|invite| {
                invite.campaign_id == *campaign_id
                    && invite.invited_user_id == *invited_user_id
                    && invite.status == InviteStatus::Pending
            })
            .cloned())
    }

    async fn respond_pending(
        &self,
        id: &Uuid,
        status: InviteStatus,
        now: NaiveDateTime,
    ) -> StoreResult<Option<CampaignInvite>> {
        let mut inner = self.inner.lock().await;
        let invite = match inner.invites.get_mut(id) {
            Some(invite) if invite.status == InviteStatus::Pending => invite,
            _ => return Ok(None),
        };
        invite.status = status;
        invite.responded = Some(now);
        Ok(Some(invite.clone()))
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn insert_notification(&self, notification: Notification) -> StoreResult<Notification> {
        let mut inner = self.inner.lock().await;
        inner.notifications.push(notification.clone());
        Ok(notification)
    }

    async fn notifications_by_user(&self, user_id: &Uuid) -> StoreResult<Vec<Notification>> {
        let inner = self.inner.lock().await;
        // the log is append-only, so reverse order is newest first
        Ok(inner
            .notifications
            .iter()
            .rev()
            .filter(|notification| notification.user_id == *user_id)
            .cloned()
            .collect())
    }

    async fn unread_count(&self, user_id: &Uuid) -> StoreResult<u64> {
        let inner = self.inner.lock().await;
        let count = inner
            .notifications
            .iter()
            .filter(|notification| notification.user_id == *user_id && notification.read_at.is_none())
            .count();
        Ok(count as u64)
    }

    async fn mark_read(&self, id: &Uuid, user_id: &Uuid, now: NaiveDateTime) -> StoreResult<Option<Notification>> {
        let mut inner = self.inner.lock().await;
        let notification = inner
            .notifications
            .iter_mut()
            .find(|notification| notification.id == *id && notification.user_id == *user_id);
        Ok(notification.map(|notification| {
            notification.read_at.get_or_insert(now);
            notification.clone()
        }))
    }

    async fn mark_all_read(&self, user_id: &Uuid, now: NaiveDateTime) -> StoreResult<u64> {
        let mut inner = self.inner.lock().await;
        let mut count = 0;
        for notification in inner.notifications.iter_mut() {
            if notification.user_id == *user_id && notification.read_at.is_none() {
                notification.read_at = Some(now);
                count += 1;
            }
        }
        Ok(count)
    }

    async fn mark_action_taken_for_invite(&self, invite_id: &Uuid, now: NaiveDateTime) -> StoreResult<u64> {
        let mut inner = self.inner.lock().await;
        let mut count = 0;
        for notification in inner.notifications.iter_mut() {
            if notification.context.invite_id == Some(*invite_id) && notification.action_taken_at.is_none() {
                notification.action_taken_at = Some(now);
                notification.read_at.get_or_insert(now);
                count += 1;
            }
        }
        Ok(count)
    }

    async fn mark_action_taken_for_member(&self, member_id: &Uuid, now: NaiveDateTime) -> StoreResult<u64> {
        let mut inner = self.inner.lock().await;
        let mut count = 0;
        for notification in inner.notifications.iter_mut() {
            if notification.context.member_id == Some(*member_id) && notification.action_taken_at.is_none() {
                notification.action_taken_at = Some(now);
                notification.read_at.get_or_insert(now);
                count += 1;
            }
        }
        Ok(count)
    }
}
