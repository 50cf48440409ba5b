use log::{LevelFilter, Log, Metadata, Record};

// ログレベルを指定する環境変数 (error, warn, info, debug, trace, off)
pub const LOG_ENV: &str = "YAKUMATCH_LOG";

// [LEVEL](file:line) message の形式で標準エラー出力に出力
struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        eprintln!(
            "[{}]({}:{}) {}",
            record.level(),
            record.file().unwrap_or("?"),
            record.line().unwrap_or(0),
            record.args()
        );
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

pub fn level_from_env() -> LevelFilter {
    parse_level(std::env::var(LOG_ENV).ok().as_deref())
}

fn parse_level(s: Option<&str>) -> LevelFilter {
    s.and_then(|s| s.parse().ok()).unwrap_or(LevelFilter::Warn)
}

// 2回目以降の呼び出しは無視される
pub fn init(level: LevelFilter) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

#[test]
fn test_parse_level() {
    assert_eq!(parse_level(None), LevelFilter::Warn);
    assert_eq!(parse_level(Some("debug")), LevelFilter::Debug);
    assert_eq!(parse_level(Some("OFF")), LevelFilter::Off);
    assert_eq!(parse_level(Some("verbose")), LevelFilter::Warn);
}
