use gorodump_parser::Goroutine;
use std::collections::HashMap;
use std::fmt;
use std::fmt::Write as _;

/// Goroutines whose full stack contains `pattern`, optionally restricted to one status.
pub fn grep<'a>(
    goroutines: &'a [Goroutine],
    pattern: &str,
    status: Option<&str>,
) -> Vec<&'a Goroutine> {
    goroutines
        .iter()
        .filter(|g| status.is_none_or(|s| g.status == s))
        .filter(|g| g.stack_contains(pattern))
        .collect()
}

/// Renders a goroutine as its header followed by one rendered frame per entry.
pub fn render(goroutine: &Goroutine) -> String {
    let mut out = format!("goroutine {} [{}", goroutine.id, goroutine.status);
    if goroutine.wait_since_minutes > 0 {
        let _ = write!(out, ", {} minutes", goroutine.wait_since_minutes);
    }
    if goroutine.locked_to_thread {
        out.push_str(", locked to thread");
    }
    out.push_str("]:\n");
    for frame in &goroutine.stack_trace {
        let _ = writeln!(out, "{frame}");
    }
    if let Some(frame) = &goroutine.created_by {
        let _ = writeln!(out, "created by {frame}");
    }
    out
}

#[derive(Debug, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    /// Sorted by count descending, then status.
    pub by_status: Vec<(String, usize)>,
    pub longest_wait_minutes: u64,
    pub locked_to_thread: usize,
}

impl Stats {
    pub fn collect(goroutines: &[Goroutine]) -> Self {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for g in goroutines {
            *counts.entry(g.status.as_str()).or_default() += 1;
        }
        let mut by_status: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(status, count)| (status.to_string(), count))
            .collect();
        by_status.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        Self {
            total: goroutines.len(),
            by_status,
            longest_wait_minutes: goroutines
                .iter()
                .map(|g| g.wait_since_minutes)
                .max()
                .unwrap_or(0),
            locked_to_thread: goroutines.iter().filter(|g| g.locked_to_thread).count(),
        }
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} goroutines", self.total)?;
        for (status, count) in &self.by_status {
            writeln!(f, "{count:>8}  {status}")?;
        }
        writeln!(f, "longest wait: {} minutes", self.longest_wait_minutes)?;
        writeln!(f, "locked to thread: {}", self.locked_to_thread)
    }
}
