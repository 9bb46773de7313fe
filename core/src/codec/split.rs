use super::error::DecodeError;

/// Splits a bracketed array into its top-level elements.
///
/// Commas nested inside brackets or quotes do not split. Elements are trimmed.
///
/// ```
/// use leetrun_core::codec::split_array;
///
/// assert_eq!(split_array("[1,[2,3],4]").unwrap(), ["1", "[2,3]", "4"]);
/// assert_eq!(split_array(r#"["a,b","c"]"#).unwrap(), [r#""a,b""#, r#""c""#]);
/// assert!(split_array("[]").unwrap().is_empty());
/// ```
pub fn split_array(raw: &str) -> Result<Vec<&str>, DecodeError> {
    let raw = raw.trim();
    let invalid = |reason: &'static str| DecodeError::new(raw, "array", reason);

    let inner = raw
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| invalid("not enclosed in brackets"))?;
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut splits = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut begin = 0;

    for (i, c) in inner.char_indices() {
        if let Some(q) = quote {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                _ if c == q => quote = None,
                _ => (),
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth < 0 {
                    return Err(invalid("unbalanced brackets"));
                }
            }
            ',' if depth == 0 => {
                splits.push(inner[begin..i].trim());
                begin = i + 1;
            }
            _ => (),
        }
    }
    if depth != 0 {
        return Err(invalid("unbalanced brackets"));
    }
    if quote.is_some() {
        return Err(invalid("unclosed quote"));
    }
    splits.push(inner[begin..].trim());
    Ok(splits)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn split_ok() {
        let cases: &[(&str, &[&str])] = &[
            ("[]", &[]),
            ("[ ]", &[]),
            ("[1]", &["1"]),
            ("[1,2,3]", &["1", "2", "3"]),
            ("[1, 2 , 3]", &["1", "2", "3"]),
            ("[1,[2,3],4]", &["1", "[2,3]", "4"]),
            ("[[],[[]],[1,[2]]]", &["[]", "[[]]", "[1,[2]]"]),
            (r#"["a,b","c"]"#, &[r#""a,b""#, r#""c""#]),
            (r#"["[","]"]"#, &[r#""[""#, r#""]""#]),
            (r#"[",",'x']"#, &[r#"",""#, "'x'"]),
            (r#"["a\",b"]"#, &[r#""a\",b""#]),
            ("[1,]", &["1", ""]),
        ];
        for &(raw, want) in cases {
            assert_eq!(split_array(raw).unwrap(), want, "raw={}", raw);
        }
    }

    #[test]
    fn split_ng() {
        for raw in ["", "[", "]", "1,2", "[1,2", "[[1,2]", "[1]]", r#"["abc]"#, "[1],[2]"] {
            assert!(split_array(raw).is_err(), "raw={}", raw);
        }
    }
}
