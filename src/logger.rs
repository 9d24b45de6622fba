use log::LevelFilter;

struct DebugLogger;

static LOGGER: DebugLogger = DebugLogger;

impl log::Log for DebugLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            println!("[Debug] {}", record.args());
        }
    }

    fn flush(&self) {}
}

/// Routes `log` records to stdout. Only the first call has an effect.
pub fn init() {
    let _ = log::set_logger(&LOGGER).map(|_| log::set_max_level(LevelFilter::Debug));
}
