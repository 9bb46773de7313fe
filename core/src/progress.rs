use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

pub trait SpinnerExt {
    /// Keeps the spinner ticking on a background task until it is finished.
    fn with_ticking(self) -> Self;
}

impl SpinnerExt for ProgressBar {
    fn with_ticking(self) -> Self {
        let spinner = self.clone();
        tokio::spawn(async move {
            while !spinner.is_finished() {
                spinner.tick();
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        });
        self
    }
}

/// One spinner per label, stacked in `container`.
pub fn spinners<I, S>(container: &MultiProgress, labels: I) -> Vec<ProgressBar>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let style = ProgressStyle::default_spinner()
        .template("{spinner} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());

    labels
        .into_iter()
        .map(|label| {
            container
                .add(ProgressBar::new_spinner())
                .with_style(style.clone())
                .with_message(label.into())
        })
        .collect()
}
