use std::path::PathBuf;

use colored::Colorize as _;
use leetrun_core::{action, print_success, storage::ProblemWorkspace};

use crate::util;

use super::{GlobalArgs, SubcmdResult};

#[derive(Debug, clap::Args)]
pub struct Args {
    /// Problem workspace dir (defaults to the nearest one above the current dir)
    #[arg()]
    pub dir: Option<PathBuf>,
}

pub fn exec(args: &Args, _: &GlobalArgs) -> SubcmdResult {
    let ws = match &args.dir {
        Some(dir) => ProblemWorkspace::new(dir),
        None => ProblemWorkspace::find_in_ancestors(util::current_dir())?,
    };

    let (cases, duplicates) = action::check_testcases(&ws)?;
    for (first, later) in &duplicates {
        println!(
            "{}",
            format!("case {} has the same input as case {}", later, first).bright_yellow()
        );
    }
    print_success!(
        "{} testcases are valid ({})",
        cases.len(),
        util::replace_homedir_to_tilde(ws.testcases_filepath()).to_string_lossy()
    );
    Ok(())
}
