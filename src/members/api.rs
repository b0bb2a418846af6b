use serde::Deserialize;
use uuid::Uuid;

use super::CharacterStatus;
use crate::roles::MemberRole;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AddMember {
    pub campaign_id: Uuid,
    pub user_id: Uuid,
    pub character_id: Uuid,
    pub role: MemberRole,
    /// When set, the member skips the approval queue.
    #[serde(default)]
    pub approved: bool,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct EditCharacterStatus {
    pub member_id: Uuid,
    pub character_status: CharacterStatus,
}
