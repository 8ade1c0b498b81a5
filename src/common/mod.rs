use ringlog::*;

mod table;

pub use table::render_table;

/// Output format of the one-shot commands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    Table,
    Json,
}

impl Format {
    pub const VALUES: [&'static str; 2] = ["table", "json"];
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown format: {other}")),
        }
    }
}

/// Maps a `-v` count onto a log level.
pub fn verbosity(count: u8) -> Level {
    match count {
        0 => Level::Warn,
        1 => Level::Info,
        2 => Level::Debug,
        _ => Level::Trace,
    }
}

/// Starts the debug log on stderr. The returned drain must be flushed
/// periodically for messages to appear.
pub fn debug_log(level: Level) -> Box<dyn Drain> {
    let debug_output: Box<dyn Output> = Box::new(Stderr::new());

    let debug_log = if level <= Level::Info {
        LogBuilder::new().format(ringlog::default_format)
    } else {
        LogBuilder::new()
    }
    .output(debug_output)
    .build()
    .expect("failed to initialize debug log");

    MultiLogBuilder::new()
        .level_filter(level.to_level_filter())
        .default(debug_log)
        .build()
        .start()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format() {
        assert_eq!("json".parse::<Format>(), Ok(Format::Json));
        assert_eq!("table".parse::<Format>(), Ok(Format::Table));
        assert!("yaml".parse::<Format>().is_err());

        for value in Format::VALUES {
            assert!(value.parse::<Format>().is_ok());
        }
    }

    #[test]
    fn verbosity_levels() {
        assert_eq!(verbosity(0), Level::Warn);
        assert_eq!(verbosity(2), Level::Debug);
        assert_eq!(verbosity(9), Level::Trace);
    }
}
