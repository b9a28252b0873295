//! Wall-clock accounting for collaborator calls (`--timing`).

use std::fmt::Write as _;
use std::time::{Duration, Instant};

/// What a timed call was spent on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TimingCategory {
    Shell,
    Sql,
    Siard,
}

#[derive(Debug)]
pub struct Timings {
    enabled: bool,
    start: Instant,
    shell: Duration,
    sql: Duration,
    siard: Duration,
}

impl Timings {
    pub fn new(enabled: bool) -> Self {
        Timings {
            enabled,
            start: Instant::now(),
            shell: Duration::ZERO,
            sql: Duration::ZERO,
            siard: Duration::ZERO,
        }
    }

    pub fn add(&mut self, category: TimingCategory, elapsed: Duration) {
        if !self.enabled {
            return;
        }
        let total = match category {
            TimingCategory::Shell => &mut self.shell,
            TimingCategory::Sql => &mut self.sql,
            TimingCategory::Siard => &mut self.siard,
        };
        *total += elapsed;
    }

    /// Run `f`, charging its wall time to `category`.
    pub fn time<R>(&mut self, category: TimingCategory, f: impl FnOnce() -> R) -> R {
        let started = Instant::now();
        let result = f();
        self.add(category, started.elapsed());
        result
    }

    pub fn spent(&self, category: TimingCategory) -> Duration {
        match category {
            TimingCategory::Shell => self.shell,
            TimingCategory::Sql => self.sql,
            TimingCategory::Siard => self.siard,
        }
    }

    /// The end-of-run report, or `None` when timing is off.
    pub fn report(&self) -> Option<String> {
        if !self.enabled {
            return None;
        }
        let total = self.start.elapsed();
        let share = |part: Duration| {
            if total.is_zero() {
                0.0
            } else {
                part.as_secs_f64() * 100.0 / total.as_secs_f64()
            }
        };
        let mut out = String::from("\nTiming Report:\n");
        let _ = writeln!(out, "  Total time:         {:.3} s", total.as_secs_f64());
        for (label, part) in [
            ("Shell command time:", self.shell),
            ("SQL command time:  ", self.sql),
            ("SIARD extract time:", self.siard),
        ] {
            let _ = writeln!(
                out,
                "  {label} {:.3} s ({:.1}%)",
                part.as_secs_f64(),
                share(part)
            );
        }
        Some(out)
    }
}
