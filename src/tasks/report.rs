use crate::config::LED_THRESHOLDS;
use crate::drivers::Band;
use crate::tasks::aggregator::WindowReport;

/// Per-second summary built from window reports.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WindowStats {
    pub windows: u32,
    pub peak: u32,
    pub last: Option<WindowReport>,
}

impl WindowStats {
    pub fn record(&mut self, report: WindowReport) {
        self.windows += 1;
        self.peak = self.peak.max(report.magnitude);
        self.last = Some(report);
    }

    pub fn peak_band(&self) -> Band {
        Band::from_magnitude(self.peak, &LED_THRESHOLDS)
    }

    /// Current figures, then start over.
    pub fn take(&mut self) -> Self {
        core::mem::take(self)
    }
}

#[cfg(target_os = "none")]
pub use task::report_task;

#[cfg(target_os = "none")]
mod task {
    use embassy_executor::task;
    use embassy_time::{Duration, Instant};

    use super::WindowStats;
    use crate::ipc::{REPORTS, SAMPLES};

    #[task]
    pub async fn report_task() {
        info!("report task started");
        let mut last_sec = Instant::now();
        let mut stats = WindowStats::default();

        loop {
            let report = REPORTS.wait().await;
            stats.record(report);

            if last_sec.elapsed() >= Duration::from_secs(1) {
                let s = stats.take();
                if let Some(last) = s.last {
                    info!(
                        "accel: {} windows/s, peak {} ({:?}), last sums={} dev={}, overruns={}",
                        s.windows,
                        s.peak,
                        s.peak_band(),
                        last.sums,
                        last.deviation,
                        SAMPLES.overruns()
                    );
                }
                last_sec = Instant::now();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(window: u32, magnitude: u32) -> WindowReport {
        WindowReport {
            window,
            sums: [0; 3],
            deviation: [0; 3],
            magnitude,
        }
    }

    #[test]
    fn stats_track_peak_and_reset() {
        let mut stats = WindowStats::default();
        stats.record(report(1, 11_200));
        stats.record(report(2, 12_500));
        stats.record(report(3, 300));

        assert_eq!(stats.windows, 3);
        assert_eq!(stats.peak, 12_500);
        assert_eq!(stats.peak_band(), Band::High);
        assert_eq!(stats.last.map(|r| r.window), Some(3));

        let taken = stats.take();
        assert_eq!(taken.windows, 3);
        assert_eq!(stats, WindowStats::default());
        assert_eq!(stats.peak_band(), Band::Off);
    }
}
