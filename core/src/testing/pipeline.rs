use super::{
    judge::{canonical_output, check_output_shape, extract_output, Judge},
    range::Range,
    result::{TestOutcome, TestReport, Verdict},
    runner::{BuildError, Builder, ProcessOutput, Runner},
    testcase::{TestCase, TestCases},
};
use crate::problem::ProblemSignature;

/// Runs one case and judges what it printed.
pub async fn execute_case<R>(
    runner: &R,
    sig: &ProblemSignature,
    judge: &dyn Judge,
    case: &TestCase,
) -> TestOutcome
where
    R: Runner + ?Sized,
{
    let mut outcome = TestOutcome {
        verdict: Verdict::RuntimeError,
        ..TestOutcome::skipped(case.index)
    };

    let exec = match runner.run(&case.input_string()).await {
        Ok(exec) => exec,
        Err(e) => {
            outcome.detail = Some(format!("{:#}", e));
            return outcome;
        }
    };
    outcome.elapsed = exec.elapsed;

    let ProcessOutput {
        status,
        stdout,
        stderr,
    } = exec.output;
    let (actual, stdout) = extract_output(&stdout);
    outcome.actual = actual;
    outcome.stdout = stdout;
    outcome.stderr = stderr;

    if exec.timed_out {
        outcome.verdict = Verdict::TimedOut;
        return outcome;
    }
    if status != Some(0) {
        outcome.detail = Some(match status {
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_owned(),
        });
        return outcome;
    }

    let (verdict, detail) = judge_answer(sig, judge, case, &outcome.actual);
    outcome.verdict = verdict;
    outcome.detail = detail;
    outcome
}

/// Validates the shape of `actual` and compares it with the case's expected output.
pub fn judge_answer(
    sig: &ProblemSignature,
    judge: &dyn Judge,
    case: &TestCase,
    actual: &str,
) -> (Verdict, Option<String>) {
    let actual = match check_output_shape(sig, &case.input, actual)
        .and_then(|_| canonical_output(sig, actual))
    {
        Ok(a) => a,
        Err(e) => return (Verdict::InvalidOutput, Some(e.to_string())),
    };
    let expected = canonical_output(sig, &case.output).unwrap_or_else(|_| case.output.clone());

    match judge.judge(&case.input, &expected, &actual) {
        Ok(()) => (Verdict::Passed, None),
        Err(m) => (Verdict::WrongAnswer, Some(m.0)),
    }
}

/// Runs the selected cases one after another, streaming each outcome to `on_outcome`.
///
/// Cases outside `range` or without an expected output are skipped.
pub async fn run_cases<R, F>(
    runner: &R,
    sig: &ProblemSignature,
    judge: &dyn Judge,
    cases: &TestCases,
    range: &Range,
    mut on_outcome: F,
) -> TestReport
where
    R: Runner + ?Sized,
    F: FnMut(&TestOutcome),
{
    let mut report = TestReport::default();
    for case in cases {
        let outcome = if range.contains(case.index) && case.has_output() {
            execute_case(runner, sig, judge, case).await
        } else {
            TestOutcome::skipped(case.index)
        };
        on_outcome(&outcome);
        report.push(outcome);
    }
    report
}

/// Builds once, then runs every selected case.
pub async fn run_pipeline<R, F>(
    runner: &R,
    sig: &ProblemSignature,
    judge: &dyn Judge,
    cases: &TestCases,
    range: &Range,
    on_outcome: F,
) -> Result<TestReport, BuildError>
where
    R: Builder + Runner + ?Sized,
    F: FnMut(&TestOutcome),
{
    runner.build().await?;
    Ok(run_cases(runner, sig, judge, cases, range, on_outcome).await)
}

/// Collects answers from a reference solution, one per case.
///
/// Cases outside `range`, or whose run produced no valid answer, keep their current output.
pub async fn record_answers<R>(
    runner: &R,
    sig: &ProblemSignature,
    cases: &TestCases,
    range: &Range,
) -> Vec<String>
where
    R: Runner + ?Sized,
{
    let mut answers = Vec::with_capacity(cases.len());
    for case in cases {
        let answer = if range.contains(case.index) {
            record_one(runner, sig, case).await
        } else {
            None
        };
        answers.push(answer.unwrap_or_else(|| case.output.clone()));
    }
    answers
}

async fn record_one<R>(runner: &R, sig: &ProblemSignature, case: &TestCase) -> Option<String>
where
    R: Runner + ?Sized,
{
    let exec = match runner.run(&case.input_string()).await {
        Ok(exec) => exec,
        Err(e) => {
            log::warn!("case {}: {:#}", case.index, e);
            return None;
        }
    };
    let output = exec.output;
    if exec.timed_out || !output.success() {
        log::warn!("case {}: did not finish successfully", case.index);
        return None;
    }
    let (actual, _) = extract_output(&output.stdout);
    match check_output_shape(sig, &case.input, &actual).and_then(|_| canonical_output(sig, &actual))
    {
        Ok(answer) => Some(answer),
        Err(e) => {
            log::warn!("case {}: {}", case.index, e);
            None
        }
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::testing::{
        judge::{new_judge, OrderPolicy},
        runner::{Execution, TestCommand, TestRunner},
    };

    /// Prints canned stdout regardless of input.
    struct Canned(&'static str);

    #[async_trait]
    impl Runner for Canned {
        async fn run(&self, _input: &str) -> anyhow::Result<Execution> {
            Ok(Execution {
                elapsed: Duration::from_millis(1),
                timed_out: false,
                output: ProcessOutput {
                    status: Some(0),
                    stdout: self.0.to_owned(),
                    stderr: String::new(),
                },
            })
        }
    }

    fn sum_sig() -> ProblemSignature {
        ProblemSignature::from_json(
            r#"{
                "name": "sum",
                "params": [{"name": "a", "type": "integer"}, {"name": "b", "type": "integer"}],
                "return": {"type": "integer"}
            }"#,
        )
        .unwrap()
    }

    fn sum_runner() -> TestRunner {
        TestRunner::new(TestCommand {
            build: Some("true".into()),
            run: r#"read a; read b; echo "debug: $a $b"; echo "output:$((a + b))""#.into(),
        })
        .exec_time_limit(Duration::from_secs(2))
    }

    const SUM_CASES: &str = "\
input:
5
3
output:
8

input:
10
-2
output:
12
";

    #[tokio::test]
    async fn sum_end_to_end() {
        let sig = sum_sig();
        let cases = TestCases::parse(SUM_CASES, &sig).unwrap();
        let judge = new_judge(&sig, OrderPolicy::Strict);

        let mut streamed = Vec::new();
        let report = run_pipeline(&sum_runner(), &sig, judge.as_ref(), &cases, &Range::Whole, |o| {
            streamed.push((o.index, o.verdict))
        })
        .await
        .unwrap();

        assert_eq!(streamed, [(1, Verdict::Passed), (2, Verdict::WrongAnswer)]);
        assert_eq!((report.ran, report.passed), (2, 1));
        assert!(!report.all_passed());

        let wa = &report.outcomes[1];
        assert_eq!(wa.actual, "8");
        assert_eq!(wa.stdout, "debug: 10 -2");
        assert_eq!(wa.detail.as_deref(), Some(r#"expected "12", got "8""#));
    }

    #[tokio::test]
    async fn range_and_missing_output_skip() {
        let sig = sum_sig();
        let mut cases = TestCases::parse(SUM_CASES, &sig).unwrap();
        cases.push(vec!["1".into(), "1".into()], String::new());
        let judge = new_judge(&sig, OrderPolicy::Strict);

        let report = run_cases(
            &sum_runner(),
            &sig,
            judge.as_ref(),
            &cases,
            &Range::parse("1,3", 3).unwrap(),
            |_| (),
        )
        .await;
        let verdicts: Vec<_> = report.outcomes.iter().map(|o| o.verdict).collect();
        assert_eq!(verdicts, [Verdict::Passed, Verdict::Skipped, Verdict::Skipped]);
        assert!(report.all_passed());
    }

    #[tokio::test]
    async fn build_failure_aborts() {
        let sig = sum_sig();
        let cases = TestCases::parse(SUM_CASES, &sig).unwrap();
        let judge = new_judge(&sig, OrderPolicy::Strict);
        let runner = TestRunner::new(TestCommand {
            build: Some("echo 'error: expected ;'; exit 1".into()),
            run: "true".into(),
        });

        let mut called = false;
        let err = run_pipeline(&runner, &sig, judge.as_ref(), &cases, &Range::Whole, |_| {
            called = true
        })
        .await
        .unwrap_err();
        assert!(err.to_string().contains("error: expected ;"));
        assert!(!called);
    }

    #[tokio::test]
    async fn runtime_error_and_timeout() {
        let sig = sum_sig();
        let cases = TestCases::parse(SUM_CASES, &sig).unwrap();
        let judge = new_judge(&sig, OrderPolicy::Strict);
        let case = cases.get(1).unwrap();

        let crash = TestRunner::new(TestCommand {
            build: None,
            run: "echo output:8; exit 2".into(),
        });
        let o = execute_case(&crash, &sig, judge.as_ref(), case).await;
        assert_eq!(o.verdict, Verdict::RuntimeError);
        assert_eq!(o.detail.as_deref(), Some("exit code 2"));

        let slow = TestRunner::new(TestCommand {
            build: None,
            run: "echo 'still working'; echo 'almost' >&2; sleep 3".into(),
        })
        .exec_time_limit(Duration::from_millis(300));
        let o = execute_case(&slow, &sig, judge.as_ref(), case).await;
        assert_eq!(o.verdict, Verdict::TimedOut);
        assert_eq!(o.stdout, "still working");
        assert_eq!(o.stderr, "almost\n");
    }

    #[tokio::test]
    async fn void_result_is_compared_verbatim() {
        let sig = ProblemSignature::from_json(
            r#"{"name":"noop","params":[{"name":"a","type":"integer"}],"return":{"type":"void"}}"#,
        )
        .unwrap();
        let mut cases = TestCases::parse("input:\n1\noutput:\nnull\n", &sig).unwrap();
        let judge = new_judge(&sig, OrderPolicy::Strict);
        let case = cases.get(1).unwrap();

        let o = execute_case(&Canned("output:null\n"), &sig, judge.as_ref(), case).await;
        assert_eq!(o.verdict, Verdict::Passed);
        let o = execute_case(&Canned("output:1\n"), &sig, judge.as_ref(), case).await;
        assert_eq!(o.verdict, Verdict::WrongAnswer);

        cases.push(vec!["2".into()], String::new());
        let answers = record_answers(&Canned("output:null\n"), &sig, &cases, &Range::Whole).await;
        assert_eq!(answers, ["null", "null"]);
    }

    #[tokio::test]
    async fn missing_or_malformed_answer_is_invalid_output() {
        let sig = sum_sig();
        let cases = TestCases::parse(SUM_CASES, &sig).unwrap();
        let judge = new_judge(&sig, OrderPolicy::Strict);
        let case = cases.get(1).unwrap();

        for stdout in ["8\n", "output:eight\n", "output:\n"] {
            let o = execute_case(&Canned(stdout), &sig, judge.as_ref(), case).await;
            assert_eq!(o.verdict, Verdict::InvalidOutput, "stdout={:?}", stdout);
        }
    }

    #[tokio::test]
    async fn any_order_result() {
        let sig = ProblemSignature::from_json(
            r#"{"name":"f","params":[{"name":"nums","type":"integer[]"}],"return":{"type":"list<integer>"}}"#,
        )
        .unwrap();
        let cases = TestCases::parse("input:\n[1,2,2,3]\noutput:\n[1,2,2,3]\n", &sig).unwrap();
        let case = cases.get(1).unwrap();

        let policy = OrderPolicy::from_statement("<p>You may return the answer in any order.</p>");
        let judge = new_judge(&sig, policy);
        let o = execute_case(&Canned("output:[3, 2, 1, 2]\n"), &sig, judge.as_ref(), case).await;
        assert_eq!(o.verdict, Verdict::Passed);
        let o = execute_case(&Canned("output:[1,2,3]\n"), &sig, judge.as_ref(), case).await;
        assert_eq!(o.verdict, Verdict::WrongAnswer);

        let judge = new_judge(&sig, OrderPolicy::Strict);
        let o = execute_case(&Canned("output:[3,2,1,2]\n"), &sig, judge.as_ref(), case).await;
        assert_eq!(o.verdict, Verdict::WrongAnswer);
    }

    #[tokio::test]
    async fn stateful_length_mismatch_is_invalid_output() {
        let sig = ProblemSignature::from_json(
            r#"{
                "classname": "Counter",
                "systemdesign": true,
                "constructor": {"params": []},
                "methods": [
                    {"name": "inc", "params": [], "return": {"type": "integer"}}
                ]
            }"#,
        )
        .unwrap();
        let cases = TestCases::parse(
            "input:\n[\"Counter\",\"inc\",\"inc\",\"inc\"]\n[[],[],[],[]]\noutput:\n[null,1,2,3]\n",
            &sig,
        )
        .unwrap();
        let case = cases.get(1).unwrap();
        let judge = new_judge(&sig, OrderPolicy::AnyOrder);

        let o = execute_case(&Canned("output:[null,1,2]\n"), &sig, judge.as_ref(), case).await;
        assert_eq!(o.verdict, Verdict::InvalidOutput);
        let o = execute_case(&Canned("output:[null,1,2,3]\n"), &sig, judge.as_ref(), case).await;
        assert_eq!(o.verdict, Verdict::Passed);
        let o = execute_case(&Canned("output:[null,1,3,2]\n"), &sig, judge.as_ref(), case).await;
        assert_eq!(o.verdict, Verdict::WrongAnswer);
    }

    #[tokio::test]
    async fn record_then_update() {
        let sig = sum_sig();
        let mut cases = TestCases::parse(SUM_CASES, &sig).unwrap();
        cases.push(vec!["1".into(), "2".into()], String::new());

        let answers = record_answers(&sum_runner(), &sig, &cases, &Range::parse("2-", 3).unwrap()).await;
        assert_eq!(answers, ["8", "8", "3"]);
        assert!(cases.update_outputs(&answers).unwrap());
        assert_eq!(cases.get(3).unwrap().output, "3");
        assert!(!cases.update_outputs(&answers).unwrap());
    }
}
