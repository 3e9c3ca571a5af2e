use indicatif::ProgressBar;
use std::time::Duration;

/// Indeterminate spinner for long operations; inert when stdout is not a tty.
pub struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    pub fn new(message: impl Into<String>) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_message(message.into());
        if console::Term::stdout().is_term() {
            pb.enable_steady_tick(Duration::from_millis(100));
        }
        Self { pb }
    }

    pub fn finish_with_message(&self, msg: impl Into<String>) {
        self.pb.finish_with_message(msg.into());
    }
}
