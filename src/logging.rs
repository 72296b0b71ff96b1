use std::path::Path;

pub const LOG_FILE_BASENAME: &str = "archive-todo";
pub const LOG_FILE_SUFFIX: &str = "log";
pub const LOG_ROTATE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
pub const LOG_ROTATE_KEEP_FILES: usize = 5;
pub const LOG_ENV: &str = "ARCHIVE_TODO_LOG";

/// Logs live next to the stored data.
pub fn log_directory(data_dir: &Path) -> &Path {
    data_dir
}

/// `ARCHIVE_TODO_LOG`, then `RUST_LOG`, then the build-dependent default.
pub fn log_spec(lookup: impl Fn(&str) -> Option<String>) -> String {
    let default_spec = if cfg!(debug_assertions) {
        "warn,archive_todo_lib=debug"
    } else {
        "warn,archive_todo_lib=info"
    };
    lookup(LOG_ENV)
        .filter(|value| !value.trim().is_empty())
        .or_else(|| lookup("RUST_LOG").filter(|value| !value.trim().is_empty()))
        .unwrap_or_else(|| default_spec.to_string())
}

#[cfg(all(feature = "app", not(test)))]
pub fn init_logging(data_dir: &Path) -> Result<(), flexi_logger::FlexiLoggerError> {
    use flexi_logger::{detailed_format, Cleanup, Criterion, FileSpec, Logger, Naming, WriteMode};

    std::fs::create_dir_all(data_dir)?;

    let spec = log_spec(|key| std::env::var(key).ok());

    // The terminal is the UI, so logs only go to the file.
    Logger::try_with_str(spec)?
        .log_to_file(
            FileSpec::default()
                .directory(log_directory(data_dir))
                .basename(LOG_FILE_BASENAME)
                .suffix(LOG_FILE_SUFFIX),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .format_for_files(detailed_format)
        .rotate(
            Criterion::Size(LOG_ROTATE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(LOG_ROTATE_KEEP_FILES),
        )
        .start()?;

    install_panic_hook();

    log::info!(
        "logger initialized dir={} rotate_size_bytes={} keep_files={}",
        log_directory(data_dir).display(),
        LOG_ROTATE_SIZE_BYTES,
        LOG_ROTATE_KEEP_FILES
    );
    Ok(())
}

#[cfg(all(feature = "app", not(test)))]
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info: &std::panic::PanicHookInfo<'_>| {
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| info.payload().downcast_ref::<String>().map(|s| s.as_str()))
            .unwrap_or("<non-string panic payload>");
        let location = info
            .location()
            .map(|loc| format!("{loc}"))
            .unwrap_or_else(|| "<unknown>".to_string());
        let backtrace = std::backtrace::Backtrace::force_capture();

        log::error!("panic: payload={payload} location={location}\nbacktrace:\n{backtrace}");
        default_hook(info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_spec_prefers_app_variable_then_rust_log() {
        let spec = log_spec(|key| match key {
            LOG_ENV => Some("trace".to_string()),
            "RUST_LOG" => Some("error".to_string()),
            _ => None,
        });
        assert_eq!(spec, "trace");

        let spec = log_spec(|key| match key {
            LOG_ENV => Some("  ".to_string()),
            "RUST_LOG" => Some("error".to_string()),
            _ => None,
        });
        assert_eq!(spec, "error");

        let spec = log_spec(|_| None);
        assert!(spec.starts_with("warn,archive_todo_lib="));
    }

    #[test]
    fn logs_share_the_data_directory() {
        let dir = Path::new("/tmp/archive-todo");
        assert_eq!(log_directory(dir), dir);
    }
}
