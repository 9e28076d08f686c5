//! Warm pool of idle `marvex-reserve-*` sessions.
//!
//! The session list inside tmux is the only state. Callers must hold the
//! cross-process lock across `ensure_session` so two launches cannot rename the
//! same reserved session.

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::info;

use super::Multiplexer;
use crate::error::Result;

pub const RESERVE_PREFIX: &str = "marvex-reserve-";

/// What `ensure_session` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ensured {
    AlreadyExists,
    Renamed { from: String },
    Created,
}

pub fn is_reserved(name: &str) -> bool {
    name.starts_with(RESERVE_PREFIX)
}

/// Make sure a session called `target` exists, preferring a reserved one.
pub async fn ensure_session<M: Multiplexer + ?Sized>(mux: &M, target: &str) -> Result<Ensured> {
    let sessions = mux.list_sessions().await?;

    if sessions.iter().any(|s| s == target) {
        info!(session = %target, "session already exists");
        return Ok(Ensured::AlreadyExists);
    }

    if let Some(reserved) = sessions.iter().find(|s| is_reserved(s)) {
        info!(from = %reserved, to = %target, "taking reserved session");
        mux.rename_session(reserved, target).await?;
        return Ok(Ensured::Renamed {
            from: reserved.clone(),
        });
    }

    info!(session = %target, "no reserved session, creating");
    mux.new_session(target).await?;
    Ok(Ensured::Created)
}

/// Top the pool back up to `target` reserved sessions. Returns how many were created.
pub async fn reserve_up_to<M: Multiplexer + ?Sized>(mux: &M, target: usize) -> Result<usize> {
    let reserved = mux
        .list_sessions()
        .await?
        .iter()
        .filter(|s| is_reserved(s))
        .count();

    let missing = target.saturating_sub(reserved);
    let mut last = 0;
    for _ in 0..missing {
        let suffix = unique_suffix(&mut last);
        mux.new_session(&format!("{}{}", RESERVE_PREFIX, suffix)).await?;
    }

    if missing > 0 {
        info!(created = missing, total = target, "replenished reserve pool");
    }
    Ok(missing)
}

/// Nanosecond timestamp, bumped past `last` so a fast burst never repeats.
fn unique_suffix(last: &mut u128) -> u128 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    *last = now.max(*last + 1);
    *last
}
