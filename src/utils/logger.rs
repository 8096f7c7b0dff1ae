use once_cell::sync::OnceCell;
use tracing_subscriber::{
    fmt, fmt::time::UtcTime, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

const DEFAULT_LOG_DIRECTIVES: &str =
    "info,engine::tz=debug,engine::proposal=debug,engine::planning=debug";

/// Install the global tracing subscriber. Safe to call more than once; only
/// the first call takes effect. `RUST_LOG` overrides the default directives.
pub fn init_logging() {
    LOGGER_INIT.get_or_init(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVES));

        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(UtcTime::rfc_3339()),
            )
            .init();
    });
}
