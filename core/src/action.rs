pub mod error {
    #[allow(unused_imports)]
    pub(crate) use anyhow::{anyhow, bail, ensure, Context as _};
    pub use anyhow::{Error, Result};
}

use std::path::{Path, PathBuf};

use error::*;
use indicatif::MultiProgress;

use crate::config::{Config, TestConfig};
use crate::problem::Problem;
use crate::progress::{self, SpinnerExt};
use crate::storage::ProblemWorkspace;
use crate::style;
use crate::testing::{
    new_judge, record_answers, run_pipeline, OrderPolicy, Range, TestCases, TestReport,
    TestRunner, Verdict,
};

pub fn init_config_file(dir: impl AsRef<Path>) -> Result<PathBuf> {
    let filepath = dir.as_ref().join(Config::FILENAME);
    fsutil::create_new_with_mkdir(&filepath, Config::example_toml())
        .context("Failed to init leetrun config")?;
    Ok(filepath)
}

/// Loads the problem record and its test cases from `ws`.
pub fn load_workspace(ws: &ProblemWorkspace) -> Result<(Problem, TestCases)> {
    let problem = ws
        .load_problem()
        .context("Failed to load problem record")?;
    let cases = ws
        .load_testcases(&problem.signature)
        .context("Failed to load testcases")?;
    Ok((problem, cases))
}

fn prepare_runner(
    program_file: &Path,
    ws: &ProblemWorkspace,
    cfg: &TestConfig,
) -> Result<TestRunner> {
    let filename = program_file
        .file_name()
        .with_context(|| format!("Not a file: {:?}", program_file))?
        .to_string_lossy();
    let cmd = cfg.find_test_cmd_for_filename(&filename).with_context(|| {
        format!(
            "Unconfigured test command for filename '{}' (No entry matched glob in `test.command[]`)",
            filename
        )
    })?;

    let out_dir = ws.out_dir(&cfg.out_dir);
    fsutil::mkdir_all(&out_dir)?;

    let runner = TestRunner::new(cmd)
        .shell(&cfg.shell)
        .build_time_limit(cfg.build_time_limit())
        .exec_time_limit(cfg.exec_time_limit())
        .program_file(program_file, &out_dir)
        .context("Invalid test command")?;
    Ok(runner)
}

pub async fn do_test(
    program_file: impl AsRef<Path>,
    ws: &ProblemWorkspace,
    cfg: &TestConfig,
    range_expr: &str,
) -> Result<TestReport> {
    let (problem, cases) = load_workspace(ws)?;
    if cases.is_empty() {
        bail!(
            "No testcase is saved in {}",
            ws.testcases_filepath().to_string_lossy()
        );
    }
    let range = Range::parse(range_expr, cases.len())?;
    let runner = prepare_runner(program_file.as_ref(), ws, cfg)?;

    let policy = OrderPolicy::from_statement(&problem.content);
    log::debug!("Order policy: {:?}", policy);
    let judge = new_judge(&problem.signature, policy);

    let container = MultiProgress::new();
    let bars: Vec<_> = progress::spinners(
        &container,
        cases.iter().map(|c| format!("Case {} ...", c.index)),
    )
    .into_iter()
    .map(SpinnerExt::with_ticking)
    .collect();

    log::info!("Running: {}", runner.get_command().run);

    let result = run_pipeline(
        &runner,
        &problem.signature,
        judge.as_ref(),
        &cases,
        &range,
        |outcome| {
            if let Some(bar) = bars.get(outcome.index - 1) {
                bar.finish_with_message(style::outcome_line(outcome));
            }
        },
    )
    .await;
    bars.iter()
        .filter(|bar| !bar.is_finished())
        .for_each(|bar| bar.abandon());
    let report = result.with_context(|| format!("Failed to build {:?}", program_file.as_ref()))?;
    println!();

    let failed = report
        .outcomes
        .iter()
        .filter(|o| o.verdict.ran() && o.verdict != Verdict::Passed);
    for outcome in failed {
        if let Some(case) = cases.get(outcome.index) {
            style::print_test_outcome_detail(case, outcome);
        }
    }
    println!();
    style::print_test_report_summary(&report);
    Ok(report)
}

/// Runs a reference solution and stores its answers as the expected outputs.
///
/// Returns whether `testcases.txt` was rewritten.
pub async fn record_outputs(
    program_file: impl AsRef<Path>,
    ws: &ProblemWorkspace,
    cfg: &TestConfig,
    range_expr: &str,
) -> Result<bool> {
    let (problem, mut cases) = load_workspace(ws)?;
    let range = Range::parse(range_expr, cases.len())?;
    let runner = prepare_runner(program_file.as_ref(), ws, cfg)?;

    use crate::testing::Builder as _;
    runner
        .build()
        .await
        .with_context(|| format!("Failed to build {:?}", program_file.as_ref()))?;

    log::info!("Recording answers of: {}", runner.get_command().run);
    let answers = record_answers(&runner, &problem.signature, &cases, &range).await;

    let changed = cases.update_outputs(&answers)?;
    if changed {
        ws.save_testcases(&cases)
            .context("Failed to save testcases")?;
    }
    Ok(changed)
}

/// Validates `testcases.txt` and returns pairs of cases sharing the same input.
pub fn check_testcases(ws: &ProblemWorkspace) -> Result<(TestCases, Vec<(usize, usize)>)> {
    let (_, cases) = load_workspace(ws)?;
    let duplicates = cases.duplicates();
    Ok((cases, duplicates))
}
