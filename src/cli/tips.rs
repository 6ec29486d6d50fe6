// Rotating wellness tips
//
// Runs on its own timer and never touches a conversation session.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time;

pub const HEALTH_TIPS: [&str; 6] = [
    "Take 3 slow breaths — in 4, hold 2, out 6. 🌿",
    "Sip some water and relax your shoulders. 💧",
    "Step away for 2 minutes; stretch gently. 🧘",
    "Write one worry down; park it for later. 📝",
    "Text a friend or loved one to say hi. 💬",
    "Notice 5 things you can see right now. 👀",
];

pub const TIP_PERIOD: Duration = Duration::from_secs(7);

/// Background tip rotation. Dropping it cancels the timer.
pub struct TipRotator {
    rotations: Arc<AtomicUsize>,
    handle: JoinHandle<()>,
}

impl TipRotator {
    /// Must be called inside a tokio runtime
    pub fn spawn(period: Duration) -> Self {
        let rotations = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&rotations);

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(period);
            // The first tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                counter.fetch_add(1, Ordering::Relaxed);
            }
        });

        Self { rotations, handle }
    }

    pub fn rotations(&self) -> usize {
        self.rotations.load(Ordering::Relaxed)
    }

    pub fn current(&self) -> &'static str {
        HEALTH_TIPS[self.rotations() % HEALTH_TIPS.len()]
    }

    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for TipRotator {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
