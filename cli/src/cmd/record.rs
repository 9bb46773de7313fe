use std::path::PathBuf;

use leetrun_core::{action, config::Config, print_success};

use crate::util;

use super::{GlobalArgs, SubcmdResult};

#[derive(Debug, clap::Args)]
pub struct Args {
    /// Reference solution whose answers become the expected outputs
    #[arg()]
    pub program_file_or_workspace_dir: Option<PathBuf>,

    #[arg(short = 'r', long, default_value = "")]
    pub range: String,
}

pub async fn exec(args: &Args, _global_args: &GlobalArgs) -> SubcmdResult {
    let cfg = Config::from_file_finding_in_ancestors(util::current_dir())?;

    let program_file =
        util::determine_program_file(&args.program_file_or_workspace_dir, &cfg.test.include)?;
    let ws = util::workspace_of(&program_file)?;
    log::debug!("Program file: {:?}, workspace: {:?}", program_file, ws.dir());

    let changed = action::record_outputs(&program_file, &ws, &cfg.test, &args.range).await?;
    let path = util::replace_homedir_to_tilde(ws.testcases_filepath());
    if changed {
        print_success!("Updated expected outputs in {}", path.to_string_lossy());
    } else {
        println!("{} is already up to date", path.to_string_lossy());
    }
    Ok(())
}
