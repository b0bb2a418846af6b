use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::members::CampaignMember;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Create {
    pub name: String,
    #[serde(default)]
    pub setting: String,
    #[serde(default)]
    pub edition: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Edit {
    pub campaign_id: Uuid,
    pub name: Option<String>,
    pub setting: Option<String>,
    pub edition: Option<String>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CampaignWithMember {
    pub campaign: super::Campaign,
    pub member: CampaignMember,
}
