//! Problem workspace: the directory holding a problem record and its test cases.

use std::path::{Path, PathBuf};

use crate::{
    problem::{Problem, ProblemSignature},
    testing::{TestCaseError, TestCases},
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Fs(#[from] fsutil::Error),

    #[error("{}: {source}", .path.display())]
    TestCases {
        path: PathBuf,
        #[source]
        source: TestCaseError,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemWorkspace {
    dir: PathBuf,
}

impl ProblemWorkspace {
    pub const PROBLEM_FILENAME: &str = "problem.json";
    pub const TESTCASES_FILENAME: &str = "testcases.txt";

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Nearest directory from `start_dir` upward that holds a problem record.
    pub fn find_in_ancestors(start_dir: impl AsRef<Path>) -> Result<Self> {
        let path = fsutil::find_file_in_ancestors(start_dir, Self::PROBLEM_FILENAME)?;
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(Self::new(dir))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn problem_filepath(&self) -> PathBuf {
        self.dir.join(Self::PROBLEM_FILENAME)
    }

    pub fn testcases_filepath(&self) -> PathBuf {
        self.dir.join(Self::TESTCASES_FILENAME)
    }

    /// Resolves the configured build output dir against this workspace.
    pub fn out_dir(&self, configured: impl AsRef<Path>) -> PathBuf {
        self.dir.join(configured)
    }

    pub fn load_problem(&self) -> Result<Problem> {
        Ok(fsutil::read_json_with_deserialize(self.problem_filepath())?)
    }

    pub fn load_testcases(&self, sig: &ProblemSignature) -> Result<TestCases> {
        let path = self.testcases_filepath();
        let text = fsutil::read_to_string(&path)?;
        TestCases::parse(&text, sig).map_err(|source| Error::TestCases { path, source })
    }

    pub fn save_testcases(&self, cases: &TestCases) -> Result<()> {
        fsutil::write_with_mkdir(self.testcases_filepath(), cases.to_string())?;
        Ok(())
    }
}
