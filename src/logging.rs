use cfg_if::cfg_if;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LogConfig;

fn env_filter(config: &LogConfig) -> EnvFilter {
    // RUST_LOG wins over the configured default
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.default_filter))
}

cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        pub fn init(config: &LogConfig) {
            let wasm_layer = tracing_wasm::WASMLayer::new(tracing_wasm::WASMLayerConfig::default());

            let _ = tracing_subscriber::registry()
                .with(env_filter(config))
                .with(wasm_layer)
                .try_init();

            #[cfg(feature = "console_error_panic_hook")]
            console_error_panic_hook::set_once();
        }
    } else {
        use tracing_appender::non_blocking::WorkerGuard;
        use tracing_subscriber::fmt;
        use std::ffi::OsStr;
        use std::io;
        use std::path::Path;
        use once_cell::sync::OnceCell;

        static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

        /// Installs the global subscriber. Calling it twice is harmless.
        pub fn init(config: &LogConfig) {
            let console_layer = fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_level(true)
                .compact();

            let file_layer = config.file.as_deref().map(|log_path| {
                let (nb_writer, guard) = tracing_appender::non_blocking(
                    tracing_appender::rolling::daily(
                        log_path.parent().unwrap_or(Path::new(".")),
                        log_path.file_name().unwrap_or(OsStr::new("escher.log")),
                    )
                );
                let _ = FILE_GUARD.set(guard);

                fmt::layer()
                    .with_writer(nb_writer)
                    .with_ansi(false)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_level(true)
                    .compact()
            });

            if tracing_subscriber::registry()
                .with(env_filter(config))
                .with(console_layer)
                .with(file_layer)
                .try_init()
                .is_err()
            {
                return;
            }

            std::panic::set_hook(Box::new(log_panic));
        }

        /// Routes panics through tracing so they reach the log file too.
        fn log_panic(info: &std::panic::PanicHookInfo<'_>) {
            let payload = info
                .payload()
                .downcast_ref::<&str>()
                .copied()
                .or_else(|| info.payload().downcast_ref::<String>().map(String::as_str))
                .unwrap_or("<non-string panic>");
            let location = info
                .location()
                .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
                .unwrap_or_else(|| "<unknown>".to_owned());
            tracing::error!(
                "panic at {location}: {payload}\n{}",
                std::backtrace::Backtrace::force_capture()
            );
        }
    }
}
