//! Progress reporting for long-running renders

use indicatif::{ProgressBar, ProgressStyle};

/// Creates a progress bar counting up to `len` items.
///
/// Falls back to the default style if the template fails to parse.
pub fn get_progressbar(len: u64) -> ProgressBar {
    let style = ProgressStyle::with_template(
        "{prefix:>12.cyan.bold} [{elapsed_precise}] {wide_bar} {pos}/{len} ({eta})",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar());

    ProgressBar::new(len).with_style(style)
}
