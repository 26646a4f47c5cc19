use indicatif::{ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};
use polytwin::engine::progress::{Progress, ProgressCallback};
use std::fmt::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

/// The bar plus what it is currently reporting on.
struct GrainBar {
    pb: ProgressBar,
    phase: &'static str,
    /// Messages received during the current phase, e.g. approximate orientation pairs.
    notices: usize,
}

impl GrainBar {
    fn start_phase(&mut self, name: &'static str) {
        self.phase = name;
        self.notices = 0;
        self.pb.reset();
        self.pb.set_length(0);
        self.pb.set_style(spinner_style());
        self.pb.set_prefix(name);
        self.pb.set_message(format!("{name}..."));
        self.pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
    }

    fn finish_phase(&mut self) {
        self.pb.disable_steady_tick();
        let summary = match self.notices {
            0 => format!("✓ {}", self.phase),
            n => format!("✓ {} ({n} notice(s))", self.phase),
        };
        self.pb.finish_with_message(summary);
    }

    fn start_grains(&mut self, total: u64) {
        self.pb.disable_steady_tick();
        self.pb.reset();
        self.pb.set_length(total);
        self.pb.set_position(0);
        self.pb.set_style(bar_style());
    }

    fn finish_grains(&mut self) {
        let length = self.pb.length().unwrap_or(0);
        if self.pb.position() < length {
            self.pb.set_position(length);
        }
        self.pb.finish();
    }

    fn notice(&mut self, msg: String) {
        self.notices += 1;
        if self.pb.is_finished() {
            self.pb.set_message(msg);
        } else {
            self.pb.println(format!("  ⚠ [{}] {}", self.phase, msg));
        }
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{prefix:<18} [{bar:40.cyan/blue}] {pos}/{len} grains ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .with_key("eta", |state: &ProgressState, w: &mut dyn std::fmt::Write| {
            write!(w, "{:.1}s", state.eta().as_secs_f64()).ok();
        })
        .progress_chars("##-")
}

/// Renders library progress events as a per-phase spinner and a per-grain bar on stderr.
#[derive(Clone)]
pub struct CliProgressHandler {
    bar: Arc<Mutex<GrainBar>>,
}

impl CliProgressHandler {
    pub fn new() -> Self {
        let pb = ProgressBar::new(0).with_style(spinner_style());
        pb.set_draw_target(ProgressDrawTarget::stderr());
        pb.finish_and_clear();

        Self {
            bar: Arc::new(Mutex::new(GrainBar {
                pb,
                phase: "Initializing",
                notices: 0,
            })),
        }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let bar = Arc::clone(&self.bar);

        Box::new(move |progress: Progress| {
            let Ok(mut bar) = bar.lock() else {
                warn!("Progress bar mutex was poisoned. Cannot update progress.");
                return;
            };

            match progress {
                Progress::PhaseStart { name } => bar.start_phase(name),
                Progress::PhaseFinish => bar.finish_phase(),
                Progress::TaskStart { total_steps } => bar.start_grains(total_steps),
                Progress::TaskIncrement => bar.pb.inc(1),
                Progress::TaskFinish => bar.finish_grains(),
                Progress::Message(msg) => bar.notice(msg),
            }
        })
    }
}

impl Default for CliProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn handler_starts_finished_and_empty() {
        let handler = CliProgressHandler::new();
        let bar = handler.bar.lock().unwrap();
        assert_eq!(bar.pb.length(), Some(0));
        assert!(bar.pb.is_finished());
        assert_eq!(bar.notices, 0);
    }

    #[test]
    fn grain_bar_is_labelled_with_the_current_phase() {
        let handler = CliProgressHandler::new();
        let callback = handler.get_callback();

        callback(Progress::PhaseStart { name: "Twin Layout" });
        {
            let bar = handler.bar.lock().unwrap();
            assert_eq!(bar.pb.prefix(), "Twin Layout");
            assert_eq!(bar.pb.message(), "Twin Layout...");
            assert!(!bar.pb.is_finished());
        }

        callback(Progress::TaskStart { total_steps: 12 });
        callback(Progress::TaskIncrement);
        callback(Progress::TaskIncrement);
        {
            let bar = handler.bar.lock().unwrap();
            assert_eq!(bar.pb.length(), Some(12));
            assert_eq!(bar.pb.position(), 2);
        }

        callback(Progress::TaskFinish);
        {
            let bar = handler.bar.lock().unwrap();
            assert!(bar.pb.is_finished());
            assert_eq!(bar.pb.position(), 12);
        }

        callback(Progress::PhaseFinish);
        let bar = handler.bar.lock().unwrap();
        assert_eq!(bar.pb.message(), "✓ Twin Layout");
    }

    #[test]
    fn phase_summary_counts_notices_and_resets_per_phase() {
        let handler = CliProgressHandler::new();
        let callback = handler.get_callback();

        thread::spawn(move || {
            callback(Progress::PhaseStart {
                name: "Orientation Pairs",
            });
            callback(Progress::TaskStart { total_steps: 3 });
            callback(Progress::TaskIncrement);
            callback(Progress::TaskFinish);
            callback(Progress::PhaseFinish);
            callback(Progress::Message("2 orientation pair(s) are approximate.".to_string()));
            callback(Progress::PhaseStart { name: "Preparation" });
            callback(Progress::PhaseFinish);
        })
        .join()
        .unwrap();

        let bar = handler.bar.lock().unwrap();
        assert_eq!(bar.phase, "Preparation");
        assert_eq!(bar.notices, 0);
        assert_eq!(bar.pb.message(), "✓ Preparation");
    }

    #[test]
    fn notice_during_a_phase_is_reflected_in_its_summary() {
        let handler = CliProgressHandler::new();
        let callback = handler.get_callback();

        callback(Progress::PhaseStart {
            name: "Preparation",
        });
        callback(Progress::Message(
            "Twin thickness pool is empty; any twinned grain will fail.".to_string(),
        ));
        callback(Progress::PhaseFinish);

        let bar = handler.bar.lock().unwrap();
        assert_eq!(bar.notices, 1);
        assert_eq!(bar.pb.message(), "✓ Preparation (1 notice(s))");
    }
}
