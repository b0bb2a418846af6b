use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::CampaignInvite;
use crate::roles::MemberRole;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Create {
    pub campaign_id: Uuid,
    pub user_id: Option<Uuid>,
    pub email: Option<String>,
    pub role: MemberRole,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RespondAction {
    Accept,
    Decline,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Respond {
    pub invite_id: Uuid,
    pub action: RespondAction,
    pub character_id: Option<Uuid>,
}

/// Inviting an address without an account produces no invite record, only
/// an out-of-band nudge to sign up.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum InviteOutcome {
    #[serde(rename = "invited")]
    Invited { invite: CampaignInvite },
    #[serde(rename = "signupInviteSent")]
    SignupInviteSent { email: String },
}
