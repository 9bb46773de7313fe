#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    #[error("invalid range: {0}")]
    Invalid(String),
}

/// Selection of 1-based case indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Range {
    Whole,
    /// Inclusive `(start, end)` spans, in the order they were written.
    Spans(Vec<(usize, usize)>),
}

impl Default for Range {
    fn default() -> Self {
        Self::Whole
    }
}

impl Range {
    /// Parses a selection such as `1,3-4,-1` against `max` cases.
    ///
    /// Negative numbers count from the end (`-1` is `max`) and an omitted
    /// end means `max`. `""` and `"-"` select everything.
    ///
    /// ```
    /// # use leetrun_core::testing::Range;
    /// let r = Range::parse("1-2,-1", 5).unwrap();
    /// assert!(r.contains(2) && r.contains(5) && !r.contains(3));
    /// ```
    pub fn parse(expr: &str, max: usize) -> Result<Self, RangeError> {
        if expr.is_empty() || expr == "-" {
            return Ok(Self::Whole);
        }
        expr.split(',')
            .map(|part| {
                parse_span(part, max as i64).ok_or_else(|| RangeError::Invalid(part.to_owned()))
            })
            .collect::<Result<_, _>>()
            .map(Self::Spans)
    }

    pub fn contains(&self, index: usize) -> bool {
        match self {
            Self::Whole => true,
            Self::Spans(spans) => spans.iter().any(|&(s, e)| s <= index && index <= e),
        }
    }

    pub fn is_whole(&self) -> bool {
        matches!(self, Self::Whole)
    }
}

fn parse_span(part: &str, max: i64) -> Option<(usize, usize)> {
    let (negative, rest) = match part.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, part),
    };
    let signed = |v: i64| if negative { -v } else { v };

    let (start, end) = match rest.split_once('-') {
        None => {
            let v = rest.parse::<i64>().ok()?;
            (signed(v), signed(v))
        }
        Some((start, end)) => {
            let start = start.parse::<i64>().ok()?;
            let end = if end.is_empty() {
                -1
            } else {
                end.parse::<i64>().ok()?
            };
            (signed(start), end)
        }
    };

    let resolve = |v: i64| if v < 0 { max + v + 1 } else { v };
    let (start, end) = (resolve(start), resolve(end));
    if !(1..=max).contains(&start) || !(1..=max).contains(&end) || start > end {
        return None;
    }
    Some((start as usize, end as usize))
}
