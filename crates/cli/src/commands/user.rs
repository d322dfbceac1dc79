//! User management commands.
//!
//! A user with no store manager or store representative record has no role
//! and is treated as an admin by the frontend.

use storedesk_api::db::UserRepository;
use storedesk_api::services::auth::hash_password;
use storedesk_core::{Email, UserId};

use super::{CliError, connect};

const MIN_PASSWORD_LENGTH: usize = 8;

/// Create a login user with no staff record.
///
/// # Returns
///
/// The ID of the created user.
pub async fn create(email: &str, name: &str, password: &str) -> Result<UserId, CliError> {
    let email = Email::parse(email).map_err(|_| CliError::InvalidEmail(email.to_owned()))?;

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(CliError::PasswordTooShort);
    }

    let pool = connect().await?;
    let users = UserRepository::new(&pool);

    if users.email_taken(&email, None).await? {
        return Err(CliError::UserExists(email.into_inner()));
    }

    let user = users.create(name, &email, &hash_password(password)?).await?;

    tracing::info!(
        "User created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );

    Ok(user.id)
}
