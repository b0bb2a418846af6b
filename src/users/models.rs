use chrono::naive::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

use crate::database::UserStore;
use crate::error::AppError;
use crate::utils;

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    #[serde(skip)]
    pub email: String,
    pub username: String,
    pub nickname: String,
    #[serde(skip)]
    pub password: String,
    #[serde(with = "crate::date_format")]
    pub joined: NaiveDateTime,
    #[serde(skip)]
    pub deactivated: bool,
}

// password record: [salt(base 64)].[pbkdf2 hash(base 64)]

fn pbkdf2_iterations() -> std::num::NonZeroU32 {
    std::num::NonZeroU32::new(100_000).unwrap()
}

fn hash_password(password: &str) -> String {
    use ring::digest::SHA256_OUTPUT_LEN;
    use ring::pbkdf2;
    use ring::rand::{SecureRandom, SystemRandom};

    let mut salt = [0u8; 16];
    SystemRandom::new().fill(&mut salt).expect("failed to generate a salt");
    let mut hash = [0u8; SHA256_OUTPUT_LEN];
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        pbkdf2_iterations(),
        &salt,
        password.as_bytes(),
        &mut hash,
    );
    let mut record = base64::encode(&salt);
    record.push('.');
    record.push_str(&*base64::encode(&hash));
    record
}

fn verify_password(password: &str, record: &str) -> bool {
    use ring::pbkdf2;

    let mut parts = record.split('.');
    let salt = parts.next().and_then(|part| base64::decode(part).ok());
    let hash = parts.next().and_then(|part| base64::decode(part).ok());
    match (salt, hash) {
        (Some(salt), Some(hash)) => pbkdf2::verify(
            pbkdf2::PBKDF2_HMAC_SHA256,
            pbkdf2_iterations(),
            &salt,
            password.as_bytes(),
            &hash,
        )
        .is_ok(),
        _ => false,
    }
}

impl User {
    pub async fn register<S: UserStore + ?Sized>(
        store: &S,
        email: &str,
        username: &str,
        nickname: &str,
        password: &str,
    ) -> Result<User, AppError> {
        use crate::validators::{DISPLAY_NAME, EMAIL, PASSWORD, USERNAME};
        let username = username.trim();
        let nickname = nickname.trim();
        let email = email.to_ascii_lowercase();

        EMAIL.run(&email)?;
        DISPLAY_NAME.run(nickname)?;
        USERNAME.run(username)?;
        PASSWORD.run(password)?;

        if store.user_by_email(&email).await?.is_some() || store.user_by_username(username).await?.is_some() {
            return Err(AppError::AlreadyExists("User"));
        }
        let user = User {
            id: utils::id(),
            email,
            username: username.to_string(),
            nickname: nickname.to_string(),
            password: hash_password(password),
            joined: utils::now(),
            deactivated: false,
        };
        store.insert_user(user).await.map_err(Into::into)
    }

    pub async fn login<S: UserStore + ?Sized>(
        store: &S,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, AppError> {
        let user = match store.user_by_username(username).await? {
            Some(user) if !user.deactivated => user,
            _ => return Ok(None),
        };
        if verify_password(password, &user.password) {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    pub async fn get_by_id<S: UserStore + ?Sized>(store: &S, id: &Uuid) -> Result<Option<User>, AppError> {
        store.user_by_id(id).await.map_err(Into::into)
    }

    pub async fn get_by_email<S: UserStore + ?Sized>(store: &S, email: &str) -> Result<Option<User>, AppError> {
        store.user_by_email(&email.to_ascii_lowercase()).await.map_err(Into::into)
    }
}

#[tokio::test]
async fn user_test() -> Result<(), crate::error::AppError> {
    use crate::database::MemoryStore;

    let store = MemoryStore::new();
    let email = "humura@humura.net";
    let username = "humura";
    let nickname = "Akami Humura";
    let password = "MadokaMadokaSuHaSuHa";
    let new_user = User::register(&store, email, username, nickname, password).await?;
    let user = User::get_by_id(&store, &new_user.id).await?.unwrap();
    assert_eq!(user.email, email);
    let user = User::get_by_email(&store, "Humura@Humura.net").await?.unwrap();
    assert_eq!(user.nickname, nickname);

    let user = User::login(&store, username, password).await?.unwrap();
    assert_eq!(user.id, new_user.id);
    assert!(User::login(&store, username, "wrong password").await?.is_none());

    let duplicate = User::register(&store, email, "humura_2", nickname, password).await;
    assert!(matches!(duplicate, Err(crate::error::AppError::AlreadyExists(_))));
    Ok(())
}
