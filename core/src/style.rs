use colored::{Color, ColoredString, Colorize};
use crossterm::terminal;
use strum::IntoEnumIterator;

use crate::testing::{TestCase, TestOutcome, TestReport, Verdict};

#[macro_export]
macro_rules! print_success {
    ($fmt:literal, $($e:tt)*) => {
        use ::colored::Colorize as _;
        println!("{}", format!($fmt, $($e)*).green())
    }
}

pub fn is_truecolor_supported() -> bool {
    let Ok(v) = std::env::var("COLORTERM") else {
        return false
    };
    matches!(v.as_str(), "truecolor" | "24bit")
}

pub trait ColorTheme {
    fn color(&self) -> Color;
}

impl ColorTheme for log::Level {
    fn color(&self) -> Color {
        use log::Level::*;
        match self {
            Error => Color::BrightRed,
            Warn => Color::BrightYellow,
            Info => Color::Cyan,
            Debug => Color::Magenta,
            Trace => Color::Blue,
        }
    }
}

impl ColorTheme for Verdict {
    fn color(&self) -> Color {
        use Verdict::*;
        if !self::is_truecolor_supported() {
            return match self {
                Passed => Color::Green,
                WrongAnswer => Color::Yellow,
                TimedOut => Color::Red,
                RuntimeError => Color::Magenta,
                InvalidOutput => Color::Blue,
                Skipped => Color::BrightBlack,
            };
        }

        let (r, g, b) = match self {
            Passed => (30, 180, 40),
            WrongAnswer => (210, 138, 4),
            TimedOut => (220, 42, 42),
            RuntimeError => (171, 40, 200),
            InvalidOutput => (40, 110, 220),
            Skipped => (110, 110, 110),
        };
        Color::TrueColor { r, g, b }
    }
}

pub fn verdict_icon(verdict: Verdict) -> ColoredString {
    let fg = if is_truecolor_supported() {
        Color::TrueColor {
            r: 255,
            g: 255,
            b: 255,
        }
    } else {
        Color::BrightBlack
    };
    format!(" {:<3} ", verdict.code())
        .on_color(verdict.color())
        .bold()
        .color(fg)
}

/// Single-line status shown next to a case's spinner.
pub fn outcome_line(outcome: &TestOutcome) -> String {
    let head = format!("Case {} ...", outcome.index);
    if !outcome.verdict.ran() {
        return format!("{} {}", head, verdict_icon(outcome.verdict)).dimmed().to_string();
    }
    format!(
        "{} {} [{}ms]",
        head.cyan(),
        verdict_icon(outcome.verdict),
        outcome.elapsed.as_millis(),
    )
}

pub fn print_test_report_summary(report: &TestReport) {
    let bar = "-".repeat(5);
    print!("{} ", bar);

    let num_skipped = report.outcomes.len() - report.ran;
    if report.ran == 0 {
        print!("{}", "No test was run".bright_yellow());
    } else if report.all_passed() {
        print!("{}", format!("All {} tests passed ✨", report.ran).green());
    } else {
        let num_failed = report.ran - report.passed;
        let summary_msg = if report.passed > 0 {
            format!("{}/{} tests failed 💣", num_failed, report.ran)
        } else {
            format!("All {} tests failed 💀", report.ran)
        };

        let detail_msg = Verdict::iter()
            .filter(|v| v.ran() && *v != Verdict::Passed)
            .filter_map(|v| {
                let cnt = report.outcomes.iter().filter(|o| o.verdict == v).count();
                (cnt > 0).then(|| {
                    format!(
                        "{}{}{}",
                        self::verdict_icon(v),
                        "x".dimmed(),
                        cnt.to_string().bold().bright_white(),
                    )
                })
            })
            .collect::<Vec<String>>()
            .join(", ");

        print!("{} ({})", summary_msg.bright_red(), detail_msg);
    }
    if num_skipped > 0 {
        print!(" {}", format!("[{} skipped]", num_skipped).dimmed());
    }

    println!(" {}", bar);
}

const BOLD_LINE: &str = "━";
const THIN_LINE: &str = "─";

pub fn print_test_outcome_detail(case: &TestCase, res: &TestOutcome) {
    let (cols, _) = terminal::size().unwrap_or((40, 40));
    let cols = cols as usize;

    let bold_bar = BOLD_LINE.repeat(cols).blue().bold();

    println!(
        "\n{}: {} [{}ms]\n{}",
        format!("Case {}", res.index).color(Color::BrightYellow).bold(),
        self::verdict_icon(res.verdict),
        res.elapsed.as_millis(),
        bold_bar,
    );

    print_sub_title("[input]", cols);
    for line in &case.input {
        println!("{}{}", line, "↩".bright_black());
    }

    print_sub_title("[expected]", cols);
    print_lines(&[case.output.as_str()]);

    print_sub_title("[actual]", cols);
    print_lines(&res.actual.lines().collect::<Vec<_>>());

    if let Some(detail) = &res.detail {
        print_sub_title("[detail]", cols);
        println!("{}", detail.bright_red());
    }

    if !res.stdout.is_empty() {
        print_sub_title("[stdout]", cols);
        print_lines(&res.stdout.lines().collect::<Vec<_>>());
    }

    if !res.stderr.is_empty() {
        print_sub_title("[stderr]", cols);
        print!("{}", res.stderr);
        if !res.stderr.ends_with('\n') {
            println!();
        }
    }

    println!("{}", bold_bar);
}

fn print_sub_title(s: &str, cols: usize) {
    println!(
        "{}{}",
        s.cyan().bold(),
        THIN_LINE
            .repeat(cols.saturating_sub(s.chars().count() + 1))
            .bright_black(),
    )
}

fn print_lines(lines: &[&str]) {
    if lines.iter().all(|l| l.is_empty()) {
        println!("{}", "<EMPTY>".magenta().dimmed());
        return;
    }
    for line in lines {
        let trimmed = line.trim_end();
        print!("{}", trimmed);

        let num_trailing_whitespace = line.len() - trimmed.len();
        if num_trailing_whitespace > 0 {
            print!(
                "{}{}",
                " ".repeat(num_trailing_whitespace).on_red(),
                "(Trailing whitespace)".bright_red().bold()
            );
        }
        println!();
    }
}
