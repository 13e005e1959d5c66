use std::time::{Duration, Instant};

use log::LevelFilter;
use tracing::Level;

/// Logging configuration for statements run through the query pipeline.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub struct LogSettings {
    pub statements_level: LevelFilter,
    pub slow_statements_level: LevelFilter,
    /// Statements taking at least this long are logged at `slow_statements_level`.
    pub slow_statements_duration: Duration,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            statements_level: LevelFilter::Debug,
            slow_statements_level: LevelFilter::Warn,
            slow_statements_duration: Duration::from_secs(1),
        }
    }
}

impl LogSettings {
    pub fn log_statements(&mut self, level: LevelFilter) {
        self.statements_level = level;
    }

    pub fn log_slow_statements(&mut self, level: LevelFilter, duration: Duration) {
        self.slow_statements_level = level;
        self.slow_statements_duration = duration;
    }

    pub fn is_enabled(&self) -> bool {
        self.statements_level != LevelFilter::Off || self.slow_statements_level != LevelFilter::Off
    }
}

fn to_levels(filter: LevelFilter) -> Option<(Level, log::Level)> {
    let tracing_level = match filter {
        LevelFilter::Error => Some(Level::ERROR),
        LevelFilter::Warn => Some(Level::WARN),
        LevelFilter::Info => Some(Level::INFO),
        LevelFilter::Debug => Some(Level::DEBUG),
        LevelFilter::Trace => Some(Level::TRACE),
        LevelFilter::Off => None,
    };

    tracing_level.zip(filter.to_level())
}

fn tracing_enabled_for(level: Level) -> bool {
    match level {
        Level::ERROR => tracing::enabled!(target: "query", Level::ERROR),
        Level::WARN => tracing::enabled!(target: "query", Level::WARN),
        Level::INFO => tracing::enabled!(target: "query", Level::INFO),
        Level::DEBUG => tracing::enabled!(target: "query", Level::DEBUG),
        Level::TRACE => tracing::enabled!(target: "query", Level::TRACE),
    }
}

/// The statistics carried by one query event.
struct QueryEvent<'a> {
    summary: &'a str,
    sql: &'a str,
    rows_affected: u64,
    rows_returned: u64,
    elapsed: Duration,
}

// `tracing::event!` needs its level as a constant, hence one arm per level.
macro_rules! emit {
    ($level:expr, $ev:ident) => {
        tracing::event!(
            target: "query",
            $level,
            summary = $ev.summary,
            db.statement = $ev.sql,
            rows_affected = $ev.rows_affected,
            rows_returned = $ev.rows_returned,
            elapsed = ?$ev.elapsed,
        )
    };
}

impl QueryEvent<'_> {
    fn emit(&self, level: Level) {
        let ev = self;
        match level {
            Level::ERROR => emit!(Level::ERROR, ev),
            Level::WARN => emit!(Level::WARN, ev),
            Level::INFO => emit!(Level::INFO, ev),
            Level::DEBUG => emit!(Level::DEBUG, ev),
            Level::TRACE => emit!(Level::TRACE, ev),
        }
    }
}

/// Measures one statement and logs it on target `query` when dropped.
pub(crate) struct QueryLogger<'q> {
    sql: &'q str,
    rows_returned: u64,
    rows_affected: u64,
    start: Instant,
    settings: LogSettings,
}

impl<'q> QueryLogger<'q> {
    pub(crate) fn new(sql: &'q str, settings: LogSettings) -> Self {
        Self {
            sql,
            rows_returned: 0,
            rows_affected: 0,
            start: Instant::now(),
            settings,
        }
    }

    pub(crate) fn increase_rows_returned(&mut self, n: u64) {
        self.rows_returned += n;
    }

    pub(crate) fn increase_rows_affected(&mut self, n: u64) {
        self.rows_affected += n;
    }

    fn finish(&self) {
        if !self.settings.is_enabled() {
            return;
        }

        let elapsed = self.start.elapsed();
        let Some((tracing_level, log_level)) = to_levels(self.level_for_elapsed(elapsed)) else {
            return;
        };

        // The level may be enabled from either the log or the tracing side.
        if !log::log_enabled!(target: "query", log_level) && !tracing_enabled_for(tracing_level) {
            return;
        }

        let (summary, sql) = self.build_log_payload();
        QueryEvent {
            summary: &summary,
            sql: &sql,
            rows_affected: self.rows_affected,
            rows_returned: self.rows_returned,
            elapsed,
        }
        .emit(tracing_level);
    }

    fn level_for_elapsed(&self, elapsed: Duration) -> LevelFilter {
        if elapsed >= self.settings.slow_statements_duration {
            self.settings.slow_statements_level
        } else {
            self.settings.statements_level
        }
    }

    /// The summary line, plus the formatted statement when the summary had to be cut short.
    fn build_log_payload(&self) -> (String, String) {
        let mut summary = parse_query_summary(self.sql);
        if summary == self.sql {
            return (summary, String::new());
        }

        summary.push_str(" …");
        let formatted = sqlformat::format(
            self.sql,
            &sqlformat::QueryParams::None,
            &sqlformat::FormatOptions::default(),
        );
        (summary, format!("\n\n{formatted}\n"))
    }
}

impl Drop for QueryLogger<'_> {
    fn drop(&mut self) {
        self.finish();
    }
}

/// The first four words of a statement.
fn parse_query_summary(sql: &str) -> String {
    sql.split_whitespace()
        .take(4)
        .collect::<Vec<&str>>()
        .join(" ")
}
