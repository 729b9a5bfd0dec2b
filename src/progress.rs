use std::io::{IsTerminal, Write};
use std::time::Duration;

use clap::ValueEnum;
use console::style;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tracing::{debug, warn};

/// Number of cells in the progress bar
pub const BAR_WIDTH: usize = 100;

const BAR_CELL: &str = "█";

/// Receives progress of the translate loop
pub trait ProgressSink {
    /// `completed` of `total` translatable lines are done
    fn update(&mut self, completed: usize, total: usize);

    /// A recoverable problem worth showing without stopping the run
    fn warn(&mut self, message: &str);

    /// Replace the bar with a completion message
    fn finish(&mut self, message: &str);

    /// Replace the bar with a failure message
    fn fail(&mut self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProgressMode {
    /// Bar on terminals, plain lines otherwise
    Auto,
    /// Always redraw a bar in place
    Bar,
    /// Percentage lines, one per 10%
    Log,
}

/// Split the bar into (filled, remaining) cells, rounding the filled part down
pub fn bar_units(completed: usize, total: usize) -> (usize, usize) {
    let filled = if total == 0 {
        0
    } else {
        (BAR_WIDTH * completed.min(total)) / total
    };
    (filled, BAR_WIDTH - filled)
}

/// Seconds below a minute, minutes and seconds above
pub fn format_elapsed(elapsed: Duration) -> String {
    let seconds = elapsed.as_secs_f64().round() as u64;
    if seconds < 60 {
        format!("{} s", seconds)
    } else {
        format!("{} min {} s", seconds / 60, seconds % 60)
    }
}

fn render_bar(completed: usize, total: usize) -> String {
    let (filled, remaining) = bar_units(completed, total);
    format!(
        "{}{}",
        style(BAR_CELL.repeat(filled)).green().bold(),
        style(BAR_CELL.repeat(remaining)).white().bold()
    )
}

/// Single row redrawn in place on the terminal
pub struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    /// Draws an empty bar right away
    pub fn new() -> Self {
        let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stdout());
        bar.set_style(ProgressStyle::with_template("{msg}").unwrap_or_else(|_| ProgressStyle::default_bar()));
        bar.set_message(render_bar(0, 0));
        bar.tick();
        Self { bar }
    }
}

impl Default for TerminalProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for TerminalProgress {
    fn update(&mut self, completed: usize, total: usize) {
        self.bar.set_message(render_bar(completed, total));
    }

    fn warn(&mut self, message: &str) {
        self.bar.println(style(message).red().to_string());
    }

    fn finish(&mut self, message: &str) {
        self.bar.finish_and_clear();
        println!("{}", style(message).green().bold());
    }

    fn fail(&mut self, message: &str) {
        self.bar.finish_and_clear();
        println!("{}", style(message).red().bold());
    }
}

/// Plain percentage lines for pipes, CI logs and the like
pub struct LogProgress<W: Write> {
    writer: W,
    step: usize,
    last_reported: Option<usize>,
}

impl<W: Write> LogProgress<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            step: 10,
            last_reported: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.writer, "{}", line) {
            warn!("Failed to write progress: {}", e);
        }
    }
}

impl LogProgress<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ProgressSink for LogProgress<W> {
    fn update(&mut self, completed: usize, total: usize) {
        let (percent, _) = bar_units(completed, total);
        let bucket = percent / self.step * self.step;
        if self.last_reported.is_some_and(|last| last >= bucket) {
            return;
        }
        self.last_reported = Some(bucket);
        debug!("Progress {}/{}", completed, total);
        self.write_line(&format!("{:>3}% ({}/{})", bucket, completed, total));
    }

    fn warn(&mut self, message: &str) {
        self.write_line(message);
    }

    fn finish(&mut self, message: &str) {
        self.write_line(message);
    }

    fn fail(&mut self, message: &str) {
        self.write_line(message);
    }
}

/// Factory for progress sinks
pub struct ProgressFactory;

impl ProgressFactory {
    pub fn create(mode: ProgressMode) -> Box<dyn ProgressSink> {
        let use_bar = match mode {
            ProgressMode::Auto => std::io::stdout().is_terminal(),
            ProgressMode::Bar => true,
            ProgressMode::Log => false,
        };

        if use_bar {
            Box::new(TerminalProgress::new())
        } else {
            Box::new(LogProgress::stdout())
        }
    }
}
