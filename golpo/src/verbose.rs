//! -v/-q occurrence counting for tracing, after clap-verbosity-flag

use tracing::{level_filters::LevelFilter, Level};

#[derive(clap::Args, Debug, Clone)]
pub struct Verbosity {
    /// More output per occurrence
    #[clap(long, short = 'v', parse(from_occurrences), global = true)]
    verbose: i8,

    /// Less output per occurrence
    #[clap(
        long,
        short = 'q',
        parse(from_occurrences),
        global = true,
        conflicts_with = "verbose"
    )]
    quiet: i8,
}

impl Verbosity {
    /// Error-level baseline, raised by `-v`s and silenced by `-q`.
    pub fn log_level_filter(&self) -> LevelFilter {
        match self.verbose.saturating_sub(self.quiet) {
            i8::MIN..=-1 => LevelFilter::OFF,
            0 => LevelFilter::from_level(Level::ERROR),
            1 => LevelFilter::from_level(Level::WARN),
            2 => LevelFilter::from_level(Level::INFO),
            3 => LevelFilter::from_level(Level::DEBUG),
            4..=i8::MAX => LevelFilter::from_level(Level::TRACE),
        }
    }
}
