use std::fmt;

/// End-of-run accounting: one entry per entity, never a bare stack trace.
/// A skip is a recovered failure (the batch moved on); a failure means even
/// the placeholder/recovery path failed.
#[derive(Debug, Default)]
pub struct RunReport {
    succeeded: Vec<String>,
    skipped: Vec<(String, &'static str)>,
    failed: Vec<(String, &'static str)>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self, entity: impl Into<String>) {
        self.succeeded.push(entity.into());
    }

    pub fn record_skip(&mut self, entity: impl Into<String>, kind: &'static str) {
        self.skipped.push((entity.into(), kind));
    }

    pub fn record_failure(&mut self, entity: impl Into<String>, kind: &'static str) {
        self.failed.push((entity.into(), kind));
    }

    pub fn merge(&mut self, other: RunReport) {
        self.succeeded.extend(other.succeeded);
        self.skipped.extend(other.skipped);
        self.failed.extend(other.failed);
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded.len()
    }

    pub fn skipped(&self) -> &[(String, &'static str)] {
        &self.skipped
    }

    pub fn failed(&self) -> &[(String, &'static str)] {
        &self.failed
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "run summary: {} succeeded, {} skipped, {} failed",
            self.succeeded.len(),
            self.skipped.len(),
            self.failed.len()
        )?;
        for (entity, kind) in &self.skipped {
            writeln!(f, "  skipped {entity}: {kind}")?;
        }
        for (entity, kind) in &self.failed {
            writeln!(f, "  failed {entity}: {kind}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_counts_and_summary() {
        let mut report = RunReport::new();
        report.record_success("boston-celtics");
        report.record_skip("utah-jazz", "table_not_found");
        report.record_failure("denver-nuggets", "network");

        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.skipped().len(), 1);
        assert_eq!(report.failed().len(), 1);

        let text = report.to_string();
        assert!(text.contains("1 succeeded, 1 skipped, 1 failed"));
        assert!(text.contains("skipped utah-jazz: table_not_found"));
    }

    #[test]
    fn merge_combines_entries() {
        let mut a = RunReport::new();
        a.record_success("one");
        let mut b = RunReport::new();
        b.record_skip("two", "empty_result");
        a.merge(b);
        assert_eq!(a.succeeded(), 1);
        assert_eq!(a.skipped().len(), 1);
    }
}
