use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::User;
use crate::campaigns::api::CampaignWithMember;
use crate::invites::CampaignInvite;

#[derive(Debug, Deserialize)]
pub struct QueryUser {
    pub id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Register {
    pub email: String,
    pub username: String,
    pub nickname: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Login {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub with_token: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginReturn {
    pub user: User,
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetMe {
    pub user: User,
    pub my_campaigns: Vec<CampaignWithMember>,
    pub my_invites: Vec<CampaignInvite>,
}
