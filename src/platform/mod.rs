//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Logger backend (console on web, env_logger on native)
//! - Panic reporting on web

/// Install the platform logger. Safe to call more than once.
#[cfg(target_arch = "wasm32")]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    // Second init returns an error we can ignore
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Install the platform logger. Safe to call more than once.
///
/// Defaults to `info`; override with `RUST_LOG`.
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_twice() {
        init_logging();
        init_logging();
        log::info!("logger ready");
    }
}
