//! The character collaborator.
//!
//! The character builder proper lives elsewhere; campaigns only need
//! existence and ownership checks, plus the membership cascade when a
//! character is deleted.
use chrono::naive::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

use crate::database::{CharacterStore, Store};
use crate::error::AppError;
use crate::members::CampaignMember;
use crate::utils;

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    #[serde(with = "crate::date_format")]
    pub created: NaiveDateTime,
    #[serde(skip)]
    pub deleted: bool,
}

impl Character {
    pub async fn create<S: CharacterStore + ?Sized>(
        store: &S,
        user_id: &Uuid,
        name: &str,
    ) -> Result<Character, AppError> {
        let name = name.trim();
        crate::validators::DISPLAY_NAME.run(name)?;
        let character = Character {
            id: utils::id(),
            user_id: *user_id,
            name: name.to_string(),
            created: utils::now(),
            deleted: false,
        };
        store.insert_character(character).await.map_err(Into::into)
    }

    pub async fn get_by_id<S: CharacterStore + ?Sized>(store: &S, id: &Uuid) -> Result<Option<Character>, AppError> {
        let character = store.character_by_id(id).await?;
        Ok(character.filter(|character| !character.deleted))
    }

    /// Deletes the character and retires it from every campaign it is
    /// playing in. The membership records stay on file.
    pub async fn delete<S: Store + ?Sized>(store: &S, id: &Uuid, deleting_user: &Uuid) -> Result<(), AppError> {
        let character = store.character_by_id(id).await?.ok_or(AppError::NotFound("Character"))?;
        if character.deleted {
            return Err(AppError::NotFound("Character"));
        }
        if character.user_id != *deleting_user {
            return Err(AppError::NoPermission);
        }
        store.set_character_deleted(id).await?;
        CampaignMember::cascade_on_character_delete(store, id, deleting_user).await?;
        log::info!("a character ({}) was deleted", id);
        Ok(())
    }
}
