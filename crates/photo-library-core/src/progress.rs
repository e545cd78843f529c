use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar for a sequential pass over a known number of items.
pub(crate) fn pass_progress(len: u64, message: &'static str) -> ProgressBar {
    let bar = ProgressBar::new(len);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("[{eta}] {bar:40.cyan/blue} {pos}/{len} ({percent}%) {msg}")
            .unwrap()
            .progress_chars("##-"),
    );
    bar.set_message(message);
    bar
}
