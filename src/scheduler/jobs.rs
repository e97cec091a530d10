use std::sync::Arc;

use anyhow::Result;
use chrono_tz::Tz;
use tracing::{error, info};

use crate::card::result_card;
use crate::dispatch::{broadcast, DispatchReport};
use crate::error::RelayResult;
use crate::lotto::DrawResult;
use crate::marker::MarkerStore;
use crate::platform::{Message, PushClient};
use crate::registry::TargetRegistry;
use crate::scheduler::Scheduler;
use crate::server::AppState;

/// All broadcasts run on Bangkok civil time regardless of host timezone.
pub const BROADCAST_TZ: Tz = chrono_tz::Asia::Bangkok;

const OPEN_CRON: &str = "0 0 8 * * *";
const CLOSE_CRON: &str = "0 0 22 * * *";
const LOTTO_CRON: &str = "0 30 16 * * *";

/// Marker key for the dedup-guarded lottery broadcast.
pub const LOTTO_JOB: &str = "thaiLotto";

const OPEN_TEXT: &str = "✅ ร้านเปิดแล้ว (08:00)";
const CLOSE_TEXT: &str = "🌙 ร้านปิดแล้ว (22:00)";
pub const TEST_TEXT: &str = "🧪 TEST: บอทส่งข้อความเข้ากลุ่มสำเร็จแล้ว";

/// Register the three daily broadcast jobs. Each job body is wrapped in a
/// failure boundary that logs and discards the error so the next firing is
/// preserved.
pub async fn register_jobs(scheduler: &Scheduler, state: Arc<AppState>) -> Result<()> {
    for (cron, name, text) in [
        (OPEN_CRON, "announceOpen", OPEN_TEXT),
        (CLOSE_CRON, "announceClose", CLOSE_TEXT),
    ] {
        let state = state.clone();
        scheduler
            .add_tz_job(cron, BROADCAST_TZ, name, move || {
                let state = state.clone();
                Box::pin(async move {
                    match announce(&state, text).await {
                        Ok(report) => info!("Announcement broadcast: {}", report),
                        Err(e) => error!("Announcement broadcast failed: {:#}", e),
                    }
                })
            })
            .await?;
    }

    let lotto_state = state.clone();
    scheduler
        .add_tz_job(LOTTO_CRON, BROADCAST_TZ, "dailyLotteryResult", move || {
            let state = lotto_state.clone();
            Box::pin(async move {
                if let Err(e) = run_scheduled_lottery(&state).await {
                    error!("Lottery broadcast failed: {:#}", e);
                }
            })
        })
        .await?;

    Ok(())
}

/// Push a fixed text message to every registered target.
pub async fn announce(state: &AppState, text: &str) -> RelayResult<DispatchReport> {
    let targets = state.registry.list().await?;
    Ok(broadcast(state.push_client(), &Message::text(text), &targets).await)
}

/// Scheduled lottery path: fetch the latest draw, then run the dedup guard.
pub async fn run_scheduled_lottery(state: &AppState) -> RelayResult<()> {
    let draw = state.lotto_client()?.latest().await?;
    if let Some(report) =
        deliver_new_draw(&state.registry, &state.marker, state.push_client(), &draw).await?
    {
        info!("Lottery broadcast: {}", report);
    }
    Ok(())
}

/// On-demand trigger: fetch → format → dispatch, bypassing the marker. The
/// marker is neither read nor written, so the scheduled dedup is unaffected
/// by manual sends.
pub async fn trigger_lottery_now(state: &AppState) -> RelayResult<DispatchReport> {
    let draw = state.lotto_client()?.latest().await?;
    broadcast_draw(&state.registry, state.push_client(), &draw).await
}

/// Dedup guard for the scheduled path. Returns `None` when the run was
/// skipped (no draw identity yet, or the draw was already broadcast). The
/// marker advances only after a dispatch attempt was actually made, so a
/// no-target or failed run retries the same draw at the next firing.
async fn deliver_new_draw(
    registry: &TargetRegistry,
    marker: &MarkerStore,
    push: &dyn PushClient,
    draw: &DrawResult,
) -> RelayResult<Option<DispatchReport>> {
    let last = marker.get(LOTTO_JOB).await?;

    let Some(identity) = draw.identity().map(str::to_string) else {
        info!("Draw identity unavailable, nothing to send yet");
        return Ok(None);
    };

    if last.as_deref() == Some(identity.as_str()) {
        info!("Draw {} already broadcast, skipping", identity);
        return Ok(None);
    }

    let report = broadcast_draw(registry, push, draw).await?;
    if report.attempted() {
        marker.set(LOTTO_JOB, &identity).await?;
    }
    Ok(Some(report))
}

/// Format a draw and deliver the card to every registered target.
async fn broadcast_draw(
    registry: &TargetRegistry,
    push: &dyn PushClient,
    draw: &DrawResult,
) -> RelayResult<DispatchReport> {
    let card = result_card(draw);
    let targets = registry.list().await?;
    Ok(broadcast(push, &card, &targets).await)
}
