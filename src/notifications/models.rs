use chrono::naive::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::NotificationStore;
use crate::error::AppError;
use crate::roles::MemberRole;
use crate::utils;

/// What the notification is about, one variant per kind.
///
/// On the wire this is the flat `type` string plus a `payload` object with
/// denormalized display data, which is what the clients render directly.
/// The `type` names are part of the client contract and are not uniform.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "type", content = "payload")]
pub enum NotificationBody {
    #[serde(rename = "campaign.invite", rename_all = "camelCase")]
    CampaignInvite {
        campaign_name: String,
        inviter_name: String,
        role: MemberRole,
    },
    #[serde(rename = "character_pending_approval", rename_all = "camelCase")]
    CharacterPendingApproval {
        campaign_name: String,
        character_name: String,
        player_name: String,
    },
    #[serde(rename = "character_approved", rename_all = "camelCase")]
    CharacterApproved {
        campaign_name: String,
        character_name: String,
    },
    #[serde(rename = "character_rejected", rename_all = "camelCase")]
    CharacterRejected {
        campaign_name: String,
        character_name: String,
    },
    #[serde(rename = "newPartyMember", rename_all = "camelCase")]
    NewPartyMember {
        campaign_name: String,
        character_name: String,
        player_name: String,
    },
    #[serde(rename = "character.deceased", rename_all = "camelCase")]
    CharacterDeceased {
        campaign_name: String,
        character_name: String,
    },
    #[serde(rename = "character.left", rename_all = "camelCase")]
    CharacterLeft {
        campaign_name: String,
        character_name: String,
    },
}

impl NotificationBody {
    /// Whether the recipient is expected to act on it (answer an invite,
    /// approve an application).
    pub fn requires_action(&self) -> bool {
        matches!(
            self,
            NotificationBody::CampaignInvite { .. } | NotificationBody::CharacterPendingApproval { .. }
        )
    }
}

/// The records the notification refers to.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct NotificationContext {
    pub campaign_id: Option<Uuid>,
    pub member_id: Option<Uuid>,
    pub invite_id: Option<Uuid>,
    pub character_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(flatten)]
    pub body: NotificationBody,
    pub context: NotificationContext,
    pub requires_action: bool,
    #[serde(with = "crate::date_format")]
    pub created: NaiveDateTime,
    #[serde(default, with = "crate::date_format::option")]
    pub read_at: Option<NaiveDateTime>,
    #[serde(default, with = "crate::date_format::option")]
    pub action_taken_at: Option<NaiveDateTime>,
}

impl Notification {
    /// Appends a notification to the recipient's log.
    ///
    /// This is a side channel: a failed write is logged and swallowed so
    /// that it never undoes the state transition that caused it.
    pub async fn post<S: NotificationStore + ?Sized>(
        store: &S,
        user_id: &Uuid,
        context: NotificationContext,
        body: NotificationBody,
    ) {
        let requires_action = body.requires_action();
        let notification = Notification {
            id: utils::id(),
            user_id: *user_id,
            body,
            context,
            requires_action,
            created: utils::now(),
            read_at: None,
            action_taken_at: None,
        };
        if let Err(e) = store.insert_notification(notification).await {
            log::warn!("failed to deliver a notification to {}: {}", user_id, e);
        }
    }

    pub async fn get_by_user<S: NotificationStore + ?Sized>(
        store: &S,
        user_id: &Uuid,
    ) -> Result<Vec<Notification>, AppError> {
        store.notifications_by_user(user_id).await.map_err(Into::into)
    }

    pub async fn unread_count<S: NotificationStore + ?Sized>(store: &S, user_id: &Uuid) -> Result<u64, AppError> {
        store.unread_count(user_id).await.map_err(Into::into)
    }

    /// Recipient-only: marks one of the caller's notifications read.
    pub async fn mark_read<S: NotificationStore + ?Sized>(
        store: &S,
        id: &Uuid,
        user_id: &Uuid,
    ) -> Result<Notification, AppError> {
        store
            .mark_read(id, user_id, utils::now())
            .await?
            .ok_or(AppError::NotFound("Notification"))
    }

    pub async fn mark_all_read<S: NotificationStore + ?Sized>(store: &S, user_id: &Uuid) -> Result<u64, AppError> {
        store.mark_all_read(user_id, utils::now()).await.map_err(Into::into)
    }
}

#[tokio::test]
async fn notification_test() -> Result<(), crate::error::AppError> {
    use crate::database::{MemoryStore, NotificationStore};

    let store = MemoryStore::new();
    let recipient = uuid::Uuid::new_v4();
    let stranger = uuid::Uuid::new_v4();
    let context = NotificationContext {
        campaign_id: Some(uuid::Uuid::new_v4()),
        ..Default::default()
    };
    Notification::post(
        &store,
        &recipient,
        context.clone(),
        NotificationBody::CampaignInvite {
            campaign_name: "Pure Illusion".to_string(),
            inviter_name: "The Keeper".to_string(),
            role: crate::roles::MemberRole::Player,
        },
    )
    .await;
    Notification::post(
        &store,
        &recipient,
        context.clone(),
        NotificationBody::CharacterLeft {
            campaign_name: "Pure Illusion".to_string(),
            character_name: "Cocona".to_string(),
        },
    )
    .await;

    let notifications = Notification::get_by_user(&store, &recipient).await?;
    assert_eq!(notifications.len(), 2);
    // newest first
    assert!(matches!(notifications[0].body, NotificationBody::CharacterLeft { .. }));
    assert!(notifications[1].requires_action);
    assert_eq!(Notification::unread_count(&store, &recipient).await?, 2);

    // the wire shape is a flat type plus its payload
    let value = serde_json::to_value(&notifications[1]).unwrap();
    assert_eq!(value["type"], "campaign.invite");
    assert_eq!(value["payload"]["inviterName"], "The Keeper");

    // only the recipient may mark it read
    let id = notifications[1].id;
    let result = Notification::mark_read(&store, &id, &stranger).await;
    assert!(matches!(result, Err(crate::error::AppError::NotFound(_))));
    let read = Notification::mark_read(&store, &id, &recipient).await?;
    assert!(read.read_at.is_some());
    assert_eq!(Notification::unread_count(&store, &recipient).await?, 1);
    assert_eq!(Notification::mark_all_read(&store, &recipient).await?, 1);
    assert_eq!(Notification::unread_count(&store, &recipient).await?, 0);

    // an unknown recipient has an empty log
    assert!(store.notifications_by_user(&stranger).await?.is_empty());
    Ok(())
}
