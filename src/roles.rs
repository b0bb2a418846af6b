use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::{CampaignStore, MemberStore};
use crate::error::AppError;
use crate::members::MemberStatus;

/// The campaign permission scale.
///
/// The variant order is the authority order, so the derived `Ord` carries
/// the hierarchy. `Admin` is derived from campaign ownership and is never
/// written to a member record.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum CampaignRole {
    Observer,
    Player,
    Dm,
    Admin,
}

/// The subset of roles a member record may carry.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Player,
    Dm,
}

impl From<MemberRole> for CampaignRole {
    fn from(role: MemberRole) -> CampaignRole {
        match role {
            MemberRole::Player => CampaignRole::Player,
            MemberRole::Dm => CampaignRole::Dm,
        }
    }
}

/// Computes the user's effective role in the campaign.
///
/// The owner is always `Admin`. A user whose member records are all
/// unapproved is an `Observer` (a pending applicant may look, not act);
/// otherwise the highest approved role wins. `None` means no role at all,
/// including when the campaign itself does not exist.
pub async fn resolve_role<S>(store: &S, campaign_id: &Uuid, user_id: &Uuid) -> Result<Option<CampaignRole>, AppError>
where
    S: CampaignStore + MemberStore + ?Sized,
{
    let campaign = match store.campaign_by_id(campaign_id).await? {
        Some(campaign) => campaign,
        None => return Ok(None),
    };
    if campaign.owner_id == *user_id {
        return Ok(Some(CampaignRole::Admin));
    }
    let members = store.members_by_campaign_user(campaign_id, user_id).await?;
    if members.is_empty() {
        return Ok(None);
    }
    let highest = members
        .iter()
        .filter(|member| member.status == MemberStatus::Approved)
        .map(|member| CampaignRole::from(member.role))
        .max();
    Ok(Some(highest.unwrap_or(CampaignRole::Observer)))
}

/// Fails with `NoPermission` unless the user's resolved role reaches
/// `least`. Used by every mutating operation.
pub async fn require_role<S>(
    store: &S,
    campaign_id: &Uuid,
    user_id: &Uuid,
    least: CampaignRole,
) -> Result<CampaignRole, AppError>
where
    S: CampaignStore + MemberStore + ?Sized,
{
    match resolve_role(store, campaign_id, user_id).await? {
        Some(role) if role >= least => Ok(role),
        _ => Err(AppError::NoPermission),
    }
}

#[test]
fn role_order() {
    use CampaignRole::*;
    assert!(Observer < Player);
    assert!(Player < Dm);
    assert!(Dm < Admin);
    assert!(None < Some(Observer));
    assert_eq!(CampaignRole::from(MemberRole::Dm), Dm);
}
