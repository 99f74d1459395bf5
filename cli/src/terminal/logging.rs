use colored::*;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::FormatEvent;
use tracing_subscriber::fmt::format::{self, Writer};
use tracing_subscriber::registry::LookupSpan;

/// Event format for the diagnostic stream: a level glyph, the module path
/// for sub-info levels, then the fields.
pub struct KeyscoutFormatter;

impl<S, N> FormatEvent<S, N> for KeyscoutFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> format::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        let level = *meta.level();

        write!(writer, "{} ", level_symbol(level))?;

        // Debug and trace lines name their origin; the info stream stays
        // clean for interactive use.
        if level >= Level::DEBUG {
            write!(writer, "{} ", meta.target().dimmed())?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

fn level_symbol(level: Level) -> ColoredString {
    match level {
        Level::TRACE => "[.]".dimmed(),
        Level::DEBUG => "[~]".cyan(),
        Level::INFO => "[+]".green().bold(),
        Level::WARN => "[!]".yellow().bold(),
        Level::ERROR => "[x]".red().bold(),
    }
}

/// Installs the global subscriber. Diagnostics go to stderr so record output
/// on stdout stays machine-consumable.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .event_format(KeyscoutFormatter)
        .with_writer(std::io::stderr)
        .init();
}
