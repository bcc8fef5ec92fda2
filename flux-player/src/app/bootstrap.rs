use log::{info, warn};

use super::AppContext;

/// Initial loads a freshly constructed context needs before the first page
/// renders. Failures are logged; the player works with default settings.
pub async fn bootstrap(ctx: &AppContext) {
    match ctx.session.load_configuration().await {
        Ok(()) => info!(
            "[Bootstrap] Session ready (logged in: {:?})",
            ctx.session.get().logged_in
        ),
        Err(err) => {
            warn!("[Bootstrap] Could not load user configuration: {}", err);
            ctx.notifier.notify(err.to_notification());
        }
    }
}
