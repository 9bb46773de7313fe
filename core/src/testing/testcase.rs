use std::fmt;

use crate::{
    codec::{decode, decode_cyclic_list, split_array, DecodeError, Value},
    problem::{CanonicalType, ElemType, ProblemSignature, ScalarType},
};

pub const INPUT_MARK: &str = "input:";
pub const OUTPUT_MARK: &str = "output:";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckError {
    #[error("should have {expected} arguments, got {actual}")]
    Arity { expected: usize, actual: usize },

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("input[0] and input[1] should have the same length ({methods} calls, {args} argument lists)")]
    CallCountMismatch { methods: usize, args: usize },

    #[error("input and output should have the same length ({calls} calls, {outputs} outputs)")]
    OutputLength { calls: usize, outputs: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TestCaseError {
    #[error("invalid test case: output should be a single line (line {line})")]
    MultiLineOutput { line: usize },

    #[error("invalid test case: case {case}: {source}")]
    Invalid { case: usize, source: CheckError },

    #[error("expected {expected} answers, got {actual}")]
    AnswerCount { expected: usize, actual: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// 1-based position in the owning [`TestCases`].
    pub index: usize,
    pub input: Vec<String>,
    /// Expected output; empty when not known yet.
    pub output: String,
}

impl TestCase {
    pub fn has_output(&self) -> bool {
        !self.output.is_empty()
    }

    /// Input lines as fed to the program's stdin.
    pub fn input_string(&self) -> String {
        let mut s = self.input.join("\n");
        if !s.ends_with('\n') {
            s.push('\n');
        }
        s
    }

    pub fn check(&self, sig: &ProblemSignature) -> Result<(), CheckError> {
        if self.input.len() != sig.arity() {
            return Err(CheckError::Arity {
                expected: sig.arity(),
                actual: self.input.len(),
            });
        }

        if sig.is_stateful() {
            return self.check_calls();
        }

        for (i, line) in self.input.iter().enumerate() {
            if let Some(ty) = sig.input_type(i) {
                decode(&ty, line)?;
            }
        }
        if let Some((list, pos)) = sig.cycle_params() {
            let int = CanonicalType::Elem(ElemType::Scalar(ScalarType::Integer));
            if let Value::Integer(pos) = decode(&int, &self.input[pos])? {
                decode_cyclic_list(&self.input[list], pos)?;
            }
        }
        let result_ty = sig.result_type();
        if self.has_output() && result_ty != CanonicalType::Void {
            decode(&result_ty, &self.output)?;
        }
        Ok(())
    }

    /// Method names on the first line, one argument list per call on the second.
    fn check_calls(&self) -> Result<(), CheckError> {
        let methods = decode(&CanonicalType::STRING_LIST, &self.input[0])?
            .len()
            .unwrap_or_default();
        let args = split_array(&self.input[1])?.len();
        if methods != args {
            return Err(CheckError::CallCountMismatch { methods, args });
        }
        if self.has_output() {
            let outputs = split_array(&self.output)?.len();
            if outputs != methods {
                return Err(CheckError::OutputLength {
                    calls: methods,
                    outputs,
                });
            }
        }
        Ok(())
    }
}

/// Ordered collection of test cases for one problem.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestCases {
    cases: Vec<TestCase>,
}

impl TestCases {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the marker-delimited test-case file and validates every case against `sig`.
    ///
    /// ```
    /// # use leetrun_core::{problem::ProblemSignature, testing::TestCases};
    /// let sig = ProblemSignature::from_json(
    ///     r#"{"name":"add","params":[{"name":"a","type":"integer"}],"return":{"type":"integer"}}"#,
    /// ).unwrap();
    /// let cases = TestCases::parse("input:\n1\noutput:\n2\n", &sig).unwrap();
    /// assert_eq!(cases.len(), 1);
    /// assert_eq!(cases.get(1).unwrap().output, "2");
    /// ```
    pub fn parse(text: &str, sig: &ProblemSignature) -> Result<Self, TestCaseError> {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        enum State {
            Outside,
            Input,
            Output,
        }

        let mut cases = Self::new();
        let mut state = State::Outside;
        let mut input = Vec::new();
        let mut output = String::new();

        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with(INPUT_MARK) {
                if !input.is_empty() {
                    cases.push(std::mem::take(&mut input), std::mem::take(&mut output));
                }
                state = State::Input;
                continue;
            }
            if line.starts_with(OUTPUT_MARK) {
                state = State::Output;
                continue;
            }
            match state {
                State::Input => input.push(line.to_owned()),
                State::Output if output.is_empty() => output = line.to_owned(),
                State::Output => {
                    return Err(TestCaseError::MultiLineOutput { line: lineno + 1 })
                }
                State::Outside => log::debug!("Skipping line {} outside any case", lineno + 1),
            }
        }
        if !input.is_empty() {
            cases.push(input, output);
        }

        cases.check(sig)?;
        for (a, b) in cases.duplicates() {
            log::warn!("case {} has the same input as case {}", b, a);
        }
        Ok(cases)
    }

    pub fn check(&self, sig: &ProblemSignature) -> Result<(), TestCaseError> {
        self.cases.iter().try_for_each(|c| {
            c.check(sig).map_err(|source| TestCaseError::Invalid {
                case: c.index,
                source,
            })
        })
    }

    /// Appends a case, assigning the next index.
    pub fn push(&mut self, input: Vec<String>, output: String) -> &TestCase {
        let index = self.cases.len() + 1;
        self.cases.push(TestCase {
            index,
            input,
            output,
        });
        &self.cases[index - 1]
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Case by its 1-based index.
    pub fn get(&self, index: usize) -> Option<&TestCase> {
        index.checked_sub(1).and_then(|i| self.cases.get(i))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TestCase> {
        self.cases.iter()
    }

    pub fn contains_input(&self, input: &[String]) -> bool {
        self.cases.iter().any(|c| c.input == input)
    }

    /// Pairs `(first, later)` where case `later` repeats the input of case `first`.
    pub fn duplicates(&self) -> Vec<(usize, usize)> {
        self.cases
            .iter()
            .enumerate()
            .filter_map(|(j, later)| {
                self.cases[..j]
                    .iter()
                    .find(|first| first.input == later.input)
                    .map(|first| (first.index, later.index))
            })
            .collect()
    }

    /// Replaces every expected output with the matching answer.
    ///
    /// Returns whether any case changed.
    pub fn update_outputs<S: AsRef<str>>(&mut self, answers: &[S]) -> Result<bool, TestCaseError> {
        if answers.len() != self.cases.len() {
            return Err(TestCaseError::AnswerCount {
                expected: self.cases.len(),
                actual: answers.len(),
            });
        }
        let mut changed = false;
        for (c, answer) in self.cases.iter_mut().zip(answers) {
            if c.output != answer.as_ref() {
                c.output = answer.as_ref().to_owned();
                changed = true;
            }
        }
        Ok(changed)
    }

    /// All inputs back to back, for programs that read every case in one go.
    pub fn input_string(&self) -> String {
        self.cases.iter().map(TestCase::input_string).collect()
    }
}

impl fmt::Display for TestCases {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, c) in self.cases.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "{}", INPUT_MARK)?;
            write!(f, "{}", c.input_string())?;
            writeln!(f, "{}", OUTPUT_MARK)?;
            writeln!(f, "{}", c.output)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a TestCases {
    type Item = &'a TestCase;
    type IntoIter = std::slice::Iter<'a, TestCase>;

    fn into_iter(self) -> Self::IntoIter {
        self.cases.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn two_sum_sig() -> ProblemSignature {
        ProblemSignature::from_json(
            r#"{
                "name": "twoSum",
                "params": [
                    {"name": "nums", "type": "integer[]"},
                    {"name": "target", "type": "integer"}
                ],
                "return": {"type": "integer[]"}
            }"#,
        )
        .unwrap()
    }

    fn lru_sig() -> ProblemSignature {
        ProblemSignature::from_json(
            r#"{
                "classname": "LRUCache",
                "systemdesign": true,
                "constructor": {"params": [{"name": "capacity", "type": "integer"}]},
                "methods": [
                    {"name": "get", "params": [{"name": "key", "type": "integer"}], "return": {"type": "integer"}},
                    {"name": "put", "params": [{"name": "key", "type": "integer"}, {"name": "value", "type": "integer"}], "return": {"type": "void"}}
                ]
            }"#,
        )
        .unwrap()
    }

    const TWO_SUM_FILE: &str = "\
input:
[2,7,11,15]
9
output:
[0,1]

input:
[3,2,4]
6
output:
[1,2]
";

    #[test]
    fn parse_and_serialize() {
        let cases = TestCases::parse(TWO_SUM_FILE, &two_sum_sig()).unwrap();
        assert_eq!(cases.len(), 2);

        let c = cases.get(2).unwrap();
        assert_eq!(c.index, 2);
        assert_eq!(c.input, ["[3,2,4]", "6"]);
        assert_eq!(c.output, "[1,2]");
        assert_eq!(c.input_string(), "[3,2,4]\n6\n");

        assert_eq!(cases.to_string(), TWO_SUM_FILE);
        assert_eq!(cases.input_string(), "[2,7,11,15]\n9\n[3,2,4]\n6\n");
    }

    #[test]
    fn parse_tolerates_blank_lines_and_indentation() {
        let text = "\n\n  input:\n  [1]  \n\n 1\noutput:\n\n  [0]\n\n";
        let cases = TestCases::parse(text, &two_sum_sig()).unwrap();
        assert_eq!(cases.len(), 1);
        assert_eq!(cases.get(1).unwrap().input, ["[1]", "1"]);
        assert_eq!(cases.get(1).unwrap().output, "[0]");
    }

    #[test]
    fn cycle_position_must_point_into_list() {
        let sig = ProblemSignature::from_json(
            r#"{"name":"hasCycle","params":[{"name":"head","type":"ListNode"},{"name":"pos","type":"integer"}],"return":{"type":"boolean"}}"#,
        )
        .unwrap();
        let ok = "input:\n[3,2,0,-4]\n1\noutput:\ntrue\n\ninput:\n[1]\n-1\noutput:\nfalse\n";
        assert_eq!(TestCases::parse(ok, &sig).unwrap().len(), 2);

        let err = TestCases::parse("input:\n[1,2]\n5\noutput:\ntrue\n", &sig).unwrap_err();
        assert!(matches!(
            err,
            TestCaseError::Invalid {
                case: 1,
                source: CheckError::Decode(_)
            }
        ));
    }

    #[test]
    fn case_without_output() {
        let cases = TestCases::parse("input:\n[1,2]\n3\noutput:\n", &two_sum_sig()).unwrap();
        assert!(!cases.get(1).unwrap().has_output());
    }

    #[test]
    fn multi_line_output_is_rejected() {
        let text = "input:\n[1]\n1\noutput:\n[0]\n[1]\n";
        assert_eq!(
            TestCases::parse(text, &two_sum_sig()).unwrap_err(),
            TestCaseError::MultiLineOutput { line: 6 }
        );
        assert!(TestCases::parse(text, &two_sum_sig())
            .unwrap_err()
            .to_string()
            .contains("output should be a single line"));
    }

    #[test]
    fn first_invalid_case_aborts() {
        let text = "input:\n[1]\n1\noutput:\n[0]\n\ninput:\n[1]\noutput:\n[0]\n\ninput:\nx\n1\n";
        let err = TestCases::parse(text, &two_sum_sig()).unwrap_err();
        assert_eq!(
            err,
            TestCaseError::Invalid {
                case: 2,
                source: CheckError::Arity {
                    expected: 2,
                    actual: 1
                },
            }
        );
        assert!(err.to_string().contains("case 2: should have 2 arguments, got 1"));
    }

    #[test]
    fn undecodable_output_is_rejected() {
        let text = "input:\n[1]\n1\noutput:\n0\n";
        let err = TestCases::parse(text, &two_sum_sig()).unwrap_err();
        assert!(matches!(
            err,
            TestCaseError::Invalid {
                case: 1,
                source: CheckError::Decode(_)
            }
        ));
    }

    #[test]
    fn stateful_cases() {
        let sig = lru_sig();
        let ok = "input:\n[\"LRUCache\",\"put\",\"get\"]\n[[2],[1,1],[1]]\noutput:\n[null,null,1]\n";
        assert!(TestCases::parse(ok, &sig).is_ok());

        let cases = [
            (
                "input:\n[\"LRUCache\",\"put\"]\n[[2],[1,1],[1]]\n",
                CheckError::CallCountMismatch { methods: 2, args: 3 },
            ),
            (
                "input:\n[\"LRUCache\",\"put\",\"get\"]\n[[2],[1,1],[1]]\noutput:\n[null,1]\n",
                CheckError::OutputLength {
                    calls: 3,
                    outputs: 2,
                },
            ),
        ];
        for (text, want) in cases {
            match TestCases::parse(text, &sig).unwrap_err() {
                TestCaseError::Invalid { source, .. } => assert_eq!(source, want),
                e => panic!("unexpected error: {}", e),
            }
        }
    }

    #[test]
    fn duplicates_are_reported_not_rejected() {
        let text = "input:\n[1]\n1\n\ninput:\n[2]\n1\n\ninput:\n[1]\n1\n";
        let cases = TestCases::parse(text, &two_sum_sig()).unwrap();
        assert_eq!(cases.len(), 3);
        assert_eq!(cases.duplicates(), [(1, 3)]);
        assert!(cases.contains_input(&["[2]".to_owned(), "1".to_owned()]));
    }

    #[test]
    fn update_outputs() {
        let mut cases = TestCases::parse(TWO_SUM_FILE, &two_sum_sig()).unwrap();
        assert!(!cases.update_outputs(&["[0,1]", "[1,2]"]).unwrap());
        assert!(cases.update_outputs(&["[0,1]", "[2,1]"]).unwrap());
        assert_eq!(cases.get(2).unwrap().output, "[2,1]");
        assert_eq!(
            cases.update_outputs(&["[0,1]"]).unwrap_err(),
            TestCaseError::AnswerCount {
                expected: 2,
                actual: 1
            }
        );
    }
}
