use chrono::naive::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

use crate::campaigns::api::CampaignWithMember;
use crate::database::{CampaignStore, Store};
use crate::error::AppError;
use crate::members::MemberStatus;
use crate::utils;

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub setting: String,
    pub edition: String,
    #[serde(with = "crate::date_format")]
    pub created: NaiveDateTime,
    #[serde(with = "crate::date_format")]
    pub modified: NaiveDateTime,
}

impl Campaign {
    pub async fn create<S: CampaignStore + ?Sized>(
        store: &S,
        owner_id: &Uuid,
        name: &str,
        setting: &str,
        edition: &str,
    ) -> Result<Campaign, AppError> {
        use crate::validators::{CAMPAIGN_SETTING, DISPLAY_NAME, GAME_EDITION};
        let name = name.trim();
        let setting = setting.trim();
        let edition = edition.trim();
        DISPLAY_NAME.run(name)?;
        CAMPAIGN_SETTING.run(setting)?;
        GAME_EDITION.run(edition)?;
        let now = utils::now();
        let campaign = Campaign {
            id: utils::id(),
            owner_id: *owner_id,
            name: name.to_string(),
            setting: setting.to_string(),
            edition: edition.to_string(),
            created: now,
            modified: now,
        };
        store.insert_campaign(campaign).await.map_err(Into::into)
    }

    pub async fn get_by_id<S: CampaignStore + ?Sized>(store: &S, id: &Uuid) -> Result<Option<Campaign>, AppError> {
        store.campaign_by_id(id).await.map_err(Into::into)
    }

    pub async fn edit<S: CampaignStore + ?Sized>(
        store: &S,
        id: &Uuid,
        acting_user: &Uuid,
        name: Option<String>,
        setting: Option<String>,
        edition: Option<String>,
    ) -> Result<Campaign, AppError> {
        use crate::validators::{CAMPAIGN_SETTING, DISPLAY_NAME, GAME_EDITION};
        let mut campaign = store.campaign_by_id(id).await?.ok_or(AppError::NotFound("Campaign"))?;
        if campaign.owner_id != *acting_user {
            return Err(AppError::NoPermission);
        }
        if let Some(name) = name {
            let name = name.trim().to_string();
            DISPLAY_NAME.run(&*name)?;
            campaign.name = name;
        }
        if let Some(setting) = setting {
            let setting = setting.trim().to_string();
            CAMPAIGN_SETTING.run(&*setting)?;
            campaign.setting = setting;
        }
        if let Some(edition) = edition {
            let edition = edition.trim().to_string();
            GAME_EDITION.run(&*edition)?;
            campaign.edition = edition;
        }
        campaign.modified = utils::now();
        store
            .update_campaign(campaign)
            .await?
            .ok_or_else(|| unexpected!("The campaign vanished while editing it"))
    }

    pub async fn delete<S: CampaignStore + ?Sized>(store: &S, id: &Uuid, acting_user: &Uuid) -> Result<Campaign, AppError> {
        let campaign = store.campaign_by_id(id).await?.ok_or(AppError::NotFound("Campaign"))?;
        if campaign.owner_id != *acting_user {
            log::warn!("the user {} tried to delete the campaign {}", acting_user, id);
            return Err(AppError::NoPermission);
        }
        store.remove_campaign(id).await?;
        log::info!("a campaign ({}) was deleted", id);
        Ok(campaign)
    }

    /// Campaigns the user participates in through an approved membership.
    pub async fn get_by_user<S: Store + ?Sized>(store: &S, user_id: &Uuid) -> Result<Vec<CampaignWithMember>, AppError> {
        let members = store.members_by_user(user_id).await?;
        let mut joined = Vec::with_capacity(members.len());
        for member in members {
            if member.status != MemberStatus::Approved {
                continue;
            }
            if let Some(campaign) = store.campaign_by_id(&member.campaign_id).await? {
                joined.push(CampaignWithMember { campaign, member });
            }
        }
        Ok(joined)
    }

    pub async fn user_owned<S: CampaignStore + ?Sized>(store: &S, user_id: &Uuid) -> Result<Vec<Campaign>, AppError> {
        store.campaigns_by_owner(user_id).await.map_err(Into::into)
    }
}

#[tokio::test]
async fn campaign_test() -> Result<(), crate::error::AppError> {
    use crate::database::MemoryStore;
    use crate::users::User;

    let store = MemoryStore::new();
    let email = "keeper@tavern.net";
    let username = "keeper";
    let password = "no password";
    let nickname = "The Keeper";
    let campaign_name = "Pure Illusion";
    let user = User::register(&store, email, username, nickname, password).await?;
    let other = User::register(&store, "guest@tavern.net", "guest", "A Guest", "no password").await?;

    let campaign = Campaign::create(&store, &user.id, campaign_name, "Ravenloft", "5e").await?;
    let campaign = Campaign::get_by_id(&store, &campaign.id).await?.unwrap();
    assert_eq!(campaign.name, campaign_name);

    let owned = Campaign::user_owned(&store, &user.id).await?;
    assert!(owned.into_iter().any(|c| c.id == campaign.id));

    let result = Campaign::edit(&store, &campaign.id, &other.id, Some("Hijacked".to_string()), None, None).await;
    assert!(matches!(result, Err(crate::error::AppError::NoPermission)));

    let new_name = "Mythal";
    let edited = Campaign::edit(&store, &campaign.id, &user.id, Some(new_name.to_string()), None, None).await?;
    assert_eq!(edited.name, new_name);
    assert_eq!(edited.setting, "Ravenloft");

    let result = Campaign::delete(&store, &campaign.id, &other.id).await;
    assert!(matches!(result, Err(crate::error::AppError::NoPermission)));
    Campaign::delete(&store, &campaign.id, &user.id).await?;
    assert!(Campaign::get_by_id(&store, &campaign.id).await?.is_none());
    Ok(())
}
