use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
pub enum Verdict {
    Skipped,
    #[strum(serialize = "Time limit exceeded")]
    TimedOut,
    #[strum(serialize = "Runtime error")]
    RuntimeError,
    #[strum(serialize = "Invalid output")]
    InvalidOutput,
    #[strum(serialize = "Accepted")]
    Passed,
    #[strum(serialize = "Wrong answer")]
    WrongAnswer,
}

impl Verdict {
    pub fn code(self) -> &'static str {
        match self {
            Self::Skipped => "--",
            Self::TimedOut => "TLE",
            Self::RuntimeError => "RE",
            Self::InvalidOutput => "IO",
            Self::Passed => "AC",
            Self::WrongAnswer => "WA",
        }
    }

    /// Whether the case was actually executed.
    pub fn ran(self) -> bool {
        self != Self::Skipped
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestOutcome {
    /// 1-based case index.
    pub index: usize,
    pub verdict: Verdict,
    /// Answer reported after the output marker; empty when none was found.
    pub actual: String,
    /// Stdout lines other than the answer line.
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
    /// Mismatch, shape, or spawn failure description.
    pub detail: Option<String>,
}

impl TestOutcome {
    pub fn skipped(index: usize) -> Self {
        Self {
            index,
            verdict: Verdict::Skipped,
            actual: String::new(),
            stdout: String::new(),
            stderr: String::new(),
            elapsed: Duration::ZERO,
            detail: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestReport {
    pub outcomes: Vec<TestOutcome>,
    pub ran: usize,
    pub passed: usize,
}

impl TestReport {
    pub fn push(&mut self, outcome: TestOutcome) {
        if outcome.verdict.ran() {
            self.ran += 1;
        }
        if outcome.verdict == Verdict::Passed {
            self.passed += 1;
        }
        self.outcomes.push(outcome);
    }

    pub fn all_passed(&self) -> bool {
        self.passed == self.ran
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn report_counts_only_ran_cases() {
        let mut report = TestReport::default();
        report.push(TestOutcome::skipped(1));
        assert!(report.all_passed());

        report.push(TestOutcome {
            verdict: Verdict::Passed,
            ..TestOutcome::skipped(2)
        });
        report.push(TestOutcome {
            verdict: Verdict::WrongAnswer,
            ..TestOutcome::skipped(3)
        });
        assert_eq!((report.ran, report.passed), (2, 1));
        assert!(!report.all_passed());
        assert_eq!(Verdict::TimedOut.to_string(), "Time limit exceeded");
    }
}
