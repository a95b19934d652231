use serde::Deserialize;

use crate::{
    cryptography::{hash_password, verify_password},
    error::{Error, ErrorKind},
    jwt::{SessionData, SessionKeys},
    schema::{NewUser, User, UserRole},
    store::Store,
    validation::{validate_password, validate_registration, UserForm},
};

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct PasswordForm {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct DeleteAccountForm {
    pub current_password: String,
}

pub async fn register(store: &dyn Store, form: UserForm) -> Result<User, Error> {
    let registration = validate_registration(form)?;
    let password = hash_password(&registration.password)?;

    let user = store
        .create_user(NewUser {
            email: registration.email,
            username: registration.username,
            first_name: registration.first_name,
            last_name: registration.last_name,
            password,
            role: UserRole::User,
        })
        .await?;

    log::info!("Registered user {} ({})", user.id, user.username);
    Ok(user)
}

/// Issues a session token for matching credentials.
pub async fn login(store: &dyn Store, keys: &SessionKeys, form: LoginForm) -> Result<String, Error> {
    let invalid =
        || ErrorKind::Validation.on("non_field_errors", "Unable to log in with provided credentials");

    let user = store
        .get_user_by_email(form.email.trim())
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&form.password, &user.password)? {
        return Err(invalid());
    }

    keys.issue(&user)
}

/// The user behind a session. Tokens outliving their account are unauthenticated.
pub async fn current_user(store: &dyn Store, session: &SessionData) -> Result<User, Error> {
    store
        .get_user(session.user_id)
        .await?
        .ok_or_else(|| ErrorKind::Unauthenticated.new("User no longer exists"))
}

async fn confirmed_user(
    store: &dyn Store,
    session: &SessionData,
    current_password: &str,
) -> Result<User, Error> {
    let user = current_user(store, session).await?;
    if !verify_password(current_password, &user.password)? {
        return Err(ErrorKind::Validation.on("current_password", "Wrong password"));
    }
    Ok(user)
}

pub async fn set_password(
    store: &dyn Store,
    session: &SessionData,
    form: PasswordForm,
) -> Result<(), Error> {
    let user = confirmed_user(store, session, &form.current_password).await?;
    validate_password(&form.new_password, "new_password")?;

    let hash = hash_password(&form.new_password)?;
    store.set_password(user.id, &hash).await
}

/// Removes the account along with its recipes, memberships and follows.
pub async fn delete_account(
    store: &dyn Store,
    session: &SessionData,
    form: DeleteAccountForm,
) -> Result<(), Error> {
    let user = confirmed_user(store, session, &form.current_password).await?;

    if !store.delete_user(user.id).await? {
        return Err(ErrorKind::NotFound.default());
    }

    log::info!("Deleted user {} ({})", user.id, user.username);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    fn form(email: &str, username: &str) -> UserForm {
        UserForm {
            email: Some(email.to_owned()),
            username: Some(username.to_owned()),
            first_name: Some("Ada".to_owned()),
            last_name: Some("Cook".to_owned()),
            password: Some("secret-password".to_owned()),
        }
    }

    #[tokio::test]
    async fn register_then_login() {
        let store = MemoryStore::new();
        let keys = SessionKeys::new(b"test", 1).unwrap();
        let user = register(&store, form("ada@example.com", "ada")).await.unwrap();
        assert_ne!(user.password, "secret-password");

        let token = login(
            &store,
            &keys,
            LoginForm {
                email: "ADA@example.com".to_owned(),
                password: "secret-password".to_owned(),
            },
        )
        .await
        .unwrap();
        assert_eq!(keys.verify(&token).unwrap().user_id, user.id);

        let error = login(
            &store,
            &keys,
            LoginForm {
                email: "ada@example.com".to_owned(),
                password: "wrong-password".to_owned(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(error.field.as_deref(), Some("non_field_errors"));
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let store = MemoryStore::new();
        register(&store, form("ada@example.com", "ada")).await.unwrap();
        let error = register(&store, form("other@example.com", "ada"))
            .await
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::Conflict);
        assert_eq!(error.field.as_deref(), Some("username"));
    }

    #[tokio::test]
    async fn password_change_requires_current_password() {
        let store = MemoryStore::new();
        let user = register(&store, form("ada@example.com", "ada")).await.unwrap();
        let session = SessionData {
            user_id: user.id,
            role: user.role,
        };

        let error = set_password(
            &store,
            &session,
            PasswordForm {
                current_password: "nope".to_owned(),
                new_password: "another-password".to_owned(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(error.field.as_deref(), Some("current_password"));

        set_password(
            &store,
            &session,
            PasswordForm {
                current_password: "secret-password".to_owned(),
                new_password: "another-password".to_owned(),
            },
        )
        .await
        .unwrap();
        let stored = store.get_user(user.id).await.unwrap().unwrap();
        assert!(verify_password("another-password", &stored.password).unwrap());
    }
}
