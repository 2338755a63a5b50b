//! Periodic chat advertisement for the quiz.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use csgf_core::VenueActions;

pub const ADVERT_TEXT: &str = "Вы можете воспользоваться функцией автоматического создания розыгрыша с примером, переведя на этот аккаунт любую сумму";

/// Post [`ADVERT_TEXT`] every `period`, first after one full period.
///
/// Runs until the returned handle is aborted. Send failures are logged and
/// the ticker keeps going.
pub fn spawn_advert_ticker(actions: Arc<dyn VenueActions>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match actions.send_chat_message(ADVERT_TEXT).await {
                Ok(()) => debug!("advert posted"),
                Err(e) => warn!(error = %e, "advert failed"),
            }
        }
    })
}
