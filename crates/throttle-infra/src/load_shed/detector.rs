//! Scheduler-drift overload detector.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use throttle_core::OverloadDetectorConfig;
use throttle_core::ports::LoadShedder;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Detects overload by timing its own sampling loop.
///
/// Every `check_interval` the loop measures how long the last window really
/// took. When request handling starves the runtime, the loop wakes late and
/// the window exceeds `overload_factor`, which raises the flag until a later
/// window completes on time. The detector does no request accounting, so it
/// only means something when it shares workers with the request handlers.
pub struct OverloadDetector {
    overloaded: Arc<AtomicBool>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl OverloadDetector {
    /// Spawn the sampling loop on the current Tokio runtime.
    ///
    /// The loop stops on [`OverloadDetector::stop`], when `shutdown` is
    /// cancelled, or when the detector is dropped.
    pub fn start(config: OverloadDetectorConfig, shutdown: &CancellationToken) -> Self {
        let overloaded = Arc::new(AtomicBool::new(false));
        let cancel = shutdown.child_token();
        let task = tokio::spawn(run_sampling_loop(
            config,
            overloaded.clone(),
            cancel.clone(),
        ));

        info!(
            check_interval_ms = config.check_interval().as_millis() as u64,
            overload_factor_ms = config.overload_factor().as_millis() as u64,
            "Overload detector started"
        );

        Self {
            overloaded,
            cancel,
            task: Mutex::new(Some(task)),
        }
    }

    /// Current overload state. Never blocks.
    pub fn is_overloaded(&self) -> bool {
        self.overloaded.load(Ordering::Acquire)
    }

    /// Stop the sampling loop and wait for it to exit.
    ///
    /// Once this returns the flag keeps its last value for good.
    pub async fn stop(&self) {
        self.cancel.cancel();

        let task = self.task.lock().take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!(error = %e, "Overload detector task ended abnormally");
            }
            info!(
                overloaded = self.is_overloaded(),
                "Overload detector stopped"
            );
        }
    }
}

impl Drop for OverloadDetector {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl LoadShedder for OverloadDetector {
    fn is_overloaded(&self) -> bool {
        self.overloaded.load(Ordering::Acquire)
    }
}

async fn run_sampling_loop(
    config: OverloadDetectorConfig,
    overloaded: Arc<AtomicBool>,
    cancel: CancellationToken,
) {
    let period = config.check_interval();
    let mut ticker = interval_at(Instant::now() + period, period);
    // After a stall, sample once and resume a full period later.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut start_time = Instant::now();
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let now = Instant::now();
                let elapsed = now.duration_since(start_time);
                let is_overloaded = elapsed > config.overload_factor();

                let was_overloaded = overloaded.swap(is_overloaded, Ordering::AcqRel);
                match (was_overloaded, is_overloaded) {
                    (false, true) => warn!(
                        elapsed_ms = elapsed.as_millis() as u64,
                        "Overload detected, shedding load"
                    ),
                    (true, false) => info!(
                        elapsed_ms = elapsed.as_millis() as u64,
                        "Overload cleared"
                    ),
                    _ => {}
                }

                start_time = now;
            }
        }
    }
}
