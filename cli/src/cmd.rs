pub mod check;
pub mod init;
pub mod record;

#[derive(Debug, clap::Parser)]
#[command(author, version, about, long_about = None)]
pub struct GlobalArgs {
    #[command(subcommand)]
    pub subcmd: Subcommand,
}

#[derive(Debug, clap::Subcommand)]
pub enum Subcommand {
    Check(check::Args),
    Init(init::Args),
    Record(record::Args),

    #[command(alias("t"))]
    Test(test::Args),
}

pub type SubcmdResult = anyhow::Result<()>;

impl GlobalArgs {
    pub async fn exec_subcmd(&self) -> SubcmdResult {
        use Subcommand::*;
        match &self.subcmd {
            Check(args) => check::exec(args, self),
            Init(args) => init::exec(args, self),
            Record(args) => record::exec(args, self).await,
            Test(args) => test::exec(args, self).await,
        }
    }
}
