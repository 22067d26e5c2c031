use crate::Result;

/// Initialize the tracing subscriber for the bot process.
///
/// Compiled to a no-op unless the `tracing` feature is on; the bracketed
/// `[TICKET]`/`[REMIND]`/`[STORE]` diagnostics in the engine print
/// regardless, so a bare build still reports best-effort failures.
pub fn init(service_name: &str) -> Result<()> {
    let _ = service_name;

    #[cfg(feature = "tracing")]
    {
        use tracing_subscriber::{fmt, EnvFilter};

        // `RUST_LOG` wins when set. Otherwise: our crates at info, the
        // gateway/HTTP stack at warn (reconnect chatter drowns everything
        // at info).
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "warn,{service_name}=info,mkt_core=info,mkt_discord=info,mkt_jsonbin=info"
            ))
        });

        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }

    Ok(())
}
