use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Terminal progress for a dump import: one tick per page, with
/// imported/skipped/failed tallies.
pub struct ImportProgress {
    bar: ProgressBar,
    imported: AtomicU64,
    skipped: AtomicU64,
    failed: AtomicU64,
    start: Instant,
}

impl ImportProgress {
    pub fn new(total: u64) -> Self {
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec}) ETA: {eta}",
            )
            .unwrap()
            .progress_chars("#>-"),
        );
        Self {
            bar,
            imported: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            start: Instant::now(),
        }
    }

    pub fn inc_imported(&self, count: u64) {
        self.imported.fetch_add(count, Ordering::Relaxed);
        self.bar.inc(count);
    }

    pub fn inc_skipped(&self, count: u64) {
        self.skipped.fetch_add(count, Ordering::Relaxed);
        self.bar.inc(count);
    }

    pub fn inc_failed(&self, count: u64) {
        self.failed.fetch_add(count, Ordering::Relaxed);
        self.bar.inc(count);
    }

    pub fn finish(&self) {
        let elapsed = self.start.elapsed();
        self.bar.finish_with_message(format!(
            "Imported {} articles in {:.1}s ({} skipped, {} failed)",
            self.imported(),
            elapsed.as_secs_f64(),
            self.skipped(),
            self.failed()
        ));
    }

    pub fn imported(&self) -> u64 {
        self.imported.load(Ordering::Relaxed)
    }

    pub fn skipped(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }
}
