//! # Hierarchical Profiler
//!
//! Named timers that nest. Starting a timer while another runs makes it a
//! child, so the same name under different parents is tracked separately:
//!
//! ```text
//! /step
//! /step/motion
//! /step/logger
//! ```
//!
//! Timers are usually driven through [`ScopedTimer`] guards, which stop on
//! drop and give access to the profiler for nested scopes.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::ops::{Deref, DerefMut};
use std::time::{Duration, Instant};

/// Width of the report's separator lines.
const REPORT_WIDTH: usize = 83;

/// Accumulated statistics of one timer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimerStats {
    /// Completed start/stop pairs.
    pub count: u32,
    /// Total measured time.
    pub total: Duration,
}

impl TimerStats {
    /// Mean time per completed call.
    #[must_use]
    pub fn per_call(&self) -> Duration {
        if self.count == 0 {
            Duration::ZERO
        } else {
            self.total / self.count
        }
    }
}

#[derive(Debug)]
struct Entry {
    name: String,
    path: String,
    stats: TimerStats,
    parent: Option<usize>,
    children: Vec<usize>,
    started: Option<Instant>,
}

impl Entry {
    fn new(name: String, path: String, parent: Option<usize>) -> Self {
        Self {
            name,
            path,
            stats: TimerStats::default(),
            parent,
            children: Vec::new(),
            started: None,
        }
    }
}

/// Tree of named timers.
#[derive(Debug)]
pub struct Profiler {
    /// Entry 0 is the root; it is never started.
    entries: Vec<Entry>,
    by_path: HashMap<String, usize>,
    current: usize,
}

impl Profiler {
    /// Creates a profiler with no timers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: vec![Entry::new(String::new(), String::new(), None)],
            by_path: HashMap::new(),
            current: 0,
        }
    }

    /// Starts timer `name` as a child of the running timer.
    pub fn start(&mut self, name: &str) {
        let path = format!("{}/{}", self.entries[self.current].path, name);
        let index = match self.by_path.get(&path) {
            Some(&index) => index,
            None => {
                let index = self.entries.len();
                self.entries
                    .push(Entry::new(name.to_owned(), path.clone(), Some(self.current)));
                self.entries[self.current].children.push(index);
                self.by_path.insert(path, index);
                index
            }
        };
        self.entries[index].started = Some(Instant::now());
        self.current = index;
    }

    /// Stops the running timer and returns its elapsed time.
    ///
    /// Returns `None`, logging a warning, if no timer is running.
    pub fn stop(&mut self) -> Option<Duration> {
        let entry = &mut self.entries[self.current];
        let Some(parent) = entry.parent else {
            tracing::warn!("profiler stopped more often than started");
            return None;
        };

        let elapsed = entry.started.take().map_or(Duration::ZERO, |s| s.elapsed());
        entry.stats.count += 1;
        entry.stats.total += elapsed;
        self.current = parent;
        Some(elapsed)
    }

    /// Starts timer `name` and returns a guard that stops it on drop.
    pub fn scoped(&mut self, name: &str) -> ScopedTimer<'_> {
        self.start(name);
        ScopedTimer { profiler: self }
    }

    /// Statistics of the timer at `path`, e.g. `"/step/motion"`.
    #[must_use]
    pub fn stats(&self, path: &str) -> Option<TimerStats> {
        self.by_path.get(path).map(|&index| self.entries[index].stats)
    }

    /// Formats every timer as an indented table.
    #[must_use]
    pub fn report(&self) -> String {
        let rule = "=".repeat(REPORT_WIDTH);
        let mut out = String::new();
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(
            out,
            "{:<46} : {:>8} | {:>10} | {:>10}",
            "Function", "Count", "Time [s]", "Time/Call"
        );
        let root = &self.entries[0];
        for (i, &child) in root.children.iter().enumerate() {
            self.write_entry(&mut out, child, 0, i + 1 == root.children.len());
        }
        let _ = writeln!(out, "{rule}");
        out
    }

    fn write_entry(&self, out: &mut String, index: usize, level: usize, last: bool) {
        let entry = &self.entries[index];
        let label = match level {
            0 => entry.name.clone(),
            _ => format!(
                "{}{}{}",
                "  ".repeat(level - 1),
                if last { "`-" } else { "|-" },
                entry.name
            ),
        };
        let _ = writeln!(
            out,
            "{:<46} : {:>8} | {:>10.6} | {:>10.6}",
            label,
            entry.stats.count,
            entry.stats.total.as_secs_f64(),
            entry.stats.per_call().as_secs_f64()
        );
        for (i, &child) in entry.children.iter().enumerate() {
            self.write_entry(out, child, level + 1, i + 1 == entry.children.len());
        }
    }
}

impl Default for Profiler {
    fn default() -> Self {
        Self::new()
    }
}

/// Stops its timer when dropped.
///
/// Dereferences to the profiler, so nested scopes can be opened through it.
#[derive(Debug)]
pub struct ScopedTimer<'a> {
    profiler: &'a mut Profiler,
}

impl Deref for ScopedTimer<'_> {
    type Target = Profiler;

    fn deref(&self) -> &Profiler {
        &*self.profiler
    }
}

impl DerefMut for ScopedTimer<'_> {
    fn deref_mut(&mut self) -> &mut Profiler {
        &mut *self.profiler
    }
}

impl Drop for ScopedTimer<'_> {
    fn drop(&mut self) {
        self.profiler.stop();
    }
}
