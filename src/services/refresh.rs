//! Live refresh: fetch once immediately, then optionally on a fixed interval,
//! delivering every result to the UI as a message.
//!
//! The refresh loop only ever sends fully built trees across the boundary; it
//! never touches UI state. Waiting between fetches is a `select!` between the
//! interval ticker and the cancellation channel, so a cancel is observed
//! without waiting for the next tick.

use crate::config::RefreshConfig;
use crate::model::ResourceNode;
use anyhow::Result;
use crossbeam_channel::{select, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use tracing::{debug, error, info, warn};

/// Stack of the refresh thread. Decoding a trace recurses once per nesting
/// level.
pub const REFRESH_STACK_SIZE: usize = 16 * 1024 * 1024;

/// Message delivered from the refresh loop to the shell.
#[derive(Debug)]
pub enum RefreshMsg {
    Loaded(Vec<ResourceNode>),
    Failed(String),
}

/// Shared cancellation signal. Cancelling disconnects the inner channel, which
/// wakes every `select!` waiting on `receiver()`.
#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<CancelInner>,
}

struct CancelInner {
    cancelled: AtomicBool,
    tx: Mutex<Option<Sender<()>>>,
    rx: Receiver<()>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::bounded(0);
        Self {
            inner: Arc::new(CancelInner {
                cancelled: AtomicBool::new(false),
                tx: Mutex::new(Some(tx)),
                rx,
            }),
        }
    }

    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        if let Ok(mut tx) = self.inner.tx.lock() {
            tx.take();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Becomes ready (disconnected) once `cancel` is called.
    pub fn receiver(&self) -> &Receiver<()> {
        &self.inner.rx
    }
}

/// Run the refresh loop on the current thread.
///
/// The first fetch happens before any waiting; its failure is returned as this
/// function's error. Later failures are delivered as `RefreshMsg::Failed` and
/// polling continues. Returns `Ok(())` on cancellation, when refresh is
/// disabled after the first delivery, or when `deliver` reports that the
/// receiving side is gone.
pub fn run_refresh<F, D>(
    mut fetch: F,
    mut deliver: D,
    config: RefreshConfig,
    cancel: &CancelToken,
) -> Result<()>
where
    F: FnMut() -> Result<Vec<ResourceNode>>,
    D: FnMut(RefreshMsg) -> bool,
{
    if cancel.is_cancelled() {
        return Ok(());
    }
    let first = fetch()?;
    info!(roots = first.len(), "initial trace loaded");
    if !deliver(RefreshMsg::Loaded(first)) {
        return Ok(());
    }
    if !config.enabled {
        debug!("periodic refresh disabled");
        return Ok(());
    }

    let ticker = crossbeam_channel::tick(config.interval);
    info!(interval = ?config.interval, "periodic refresh armed");
    loop {
        select! {
            recv(cancel.receiver()) -> _ => {
                debug!("refresh cancelled");
                return Ok(());
            }
            recv(ticker) -> _ => {
                if cancel.is_cancelled() {
                    return Ok(());
                }
                let msg = match fetch() {
                    Ok(forest) => {
                        debug!(roots = forest.len(), "trace refreshed");
                        RefreshMsg::Loaded(forest)
                    }
                    Err(e) => {
                        warn!(error = %format!("{e:#}"), "trace refresh failed");
                        RefreshMsg::Failed(format!("{e:#}"))
                    }
                };
                if cancel.is_cancelled() {
                    return Ok(());
                }
                if !deliver(msg) {
                    debug!("refresh receiver gone");
                    return Ok(());
                }
            }
        }
    }
}

/// Spawn `run_refresh` on a named background thread. `fatal` receives the
/// error if the loop fails (only the initial fetch can fail it).
pub fn spawn_refresh<F, D, E>(
    fetch: F,
    deliver: D,
    fatal: E,
    config: RefreshConfig,
    cancel: CancelToken,
) -> std::io::Result<thread::JoinHandle<()>>
where
    F: FnMut() -> Result<Vec<ResourceNode>> + Send + 'static,
    D: FnMut(RefreshMsg) -> bool + Send + 'static,
    E: FnOnce(anyhow::Error) + Send + 'static,
{
    thread::Builder::new()
        .name("trace-refresh".into())
        .stack_size(REFRESH_STACK_SIZE)
        .spawn(move || {
            if let Err(e) = run_refresh(fetch, deliver, config, &cancel) {
                error!(error = %format!("{e:#}"), "initial trace fetch failed");
                fatal(e);
            }
        })
}
