//! Admin user management.

use tracing::info;

use orchard_core::UserRole;
use orchard_storefront::services::auth::AuthService;

/// Create an admin user with the given credentials.
///
/// # Errors
///
/// Returns an error if the database connection fails, the email/password
/// fails validation, or the email is already registered.
pub async fn create_user(email: &str, password: &str) -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    let user = AuthService::new(&pool)
        .register_with_role(email, password, UserRole::Admin)
        .await?;

    info!("Created admin user {} (id {})", user.email, user.id);
    Ok(())
}
