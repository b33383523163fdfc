//! Account commands.

use melar_core::forms::{LoginForm, PasswordChangeForm, ProfileUpdate, RegistrationForm};
use melar_core::User;
use tracing::info;

use crate::error::AppResult;
use crate::events::{NavigationEvent, View};
use crate::App;

/// Logs in and switches the cart to the server cart.
///
/// Returns where to go next: `return_to` when the login was requested by a
/// protected view, the product list otherwise.
pub async fn login(app: &App, form: &LoginForm, return_to: Option<View>) -> AppResult<(User, View)> {
    let user = app.session.login(form).await?;
    app.cart.load().await?;
    Ok((user, return_to.unwrap_or(View::Products)))
}

/// Registers and, when the backend returns a key, logs in.
pub async fn register(app: &App, form: &RegistrationForm) -> AppResult<Option<User>> {
    let user = app.session.register(form).await?;
    if user.is_some() {
        app.cart.load().await?;
    } else {
        info!(username = %form.username, "Registered; login required");
    }
    Ok(user)
}

/// Logs out and falls back to the local cart.
pub async fn logout(app: &App) -> AppResult<()> {
    app.session.logout().await?;
    app.cart.load().await?;
    Ok(())
}

pub async fn update_profile(app: &App, update: &ProfileUpdate) -> AppResult<(User, NavigationEvent)> {
    let user = app.session.update_user(update).await?;
    Ok((user, NavigationEvent::ProfileUpdated))
}

pub async fn change_password(app: &App, form: &PasswordChangeForm) -> AppResult<()> {
    app.session.change_password(form).await
}

/// The logged-in user, or the event that sends the view to the login page.
pub async fn require_login(app: &App, return_to: View) -> Result<User, NavigationEvent> {
    app.session
        .require_user()
        .await
        .map_err(|_| NavigationEvent::LoginRequired { return_to })
}
