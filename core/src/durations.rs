//! Fixed service duration per job category.

use crate::{config::DurationConfig, types::Minutes};

impl DurationConfig {
    /// Minutes on site for a job of `category`. Exact, case-sensitive
    /// match; unknown or missing categories get `default_minutes`.
    pub fn job_duration(&self, category: Option<&str>) -> Minutes {
        category
            .and_then(|c| self.by_category.get(c))
            .copied()
            .unwrap_or(self.default_minutes)
    }
}
