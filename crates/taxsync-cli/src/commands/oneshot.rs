use anyhow::Result;

use crate::Session;
use crate::display::{print_notifications, print_result, print_view};
use taxsync_application::{Action, ActionOutcome, Fields, dispatch};

/// Loads the session and prints it.
pub async fn show(session: &mut Session) -> Result<()> {
    let loaded = dispatch(
        &session.controller,
        &mut session.notifications,
        Action::Refresh,
        &Fields::new(),
    )
    .await;
    if let Err(e) = loaded {
        print_notifications(&session.notifications.drain());
        return Err(e.into());
    }

    print_view(&session.controller.render_view().await);
    Ok(())
}

/// Loads the session and prints the server's estimate for it.
pub async fn calculate(session: &mut Session) -> Result<()> {
    show(session).await?;
    println!();

    let outcome = dispatch(
        &session.controller,
        &mut session.notifications,
        Action::Calculate,
        &Fields::new(),
    )
    .await;
    match outcome {
        Ok(ActionOutcome::Calculated(result)) => {
            print_result(&result);
            Ok(())
        }
        Ok(ActionOutcome::Updated) => Ok(()),
        Err(e) => {
            print_notifications(&session.notifications.drain());
            Err(e.into())
        }
    }
}
