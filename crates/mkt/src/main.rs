use std::sync::Arc;

use serenity::http::Http;

use mkt_core::{
    config::Config,
    reminders::ReminderRegistry,
    store::{DocumentStore, FallbackStore, LocalFileStore, ShopStore},
    ticket::Shop,
};
use mkt_discord::DiscordHost;
use mkt_jsonbin::JsonBinStore;

#[tokio::main]
async fn main() -> Result<(), mkt_core::Error> {
    mkt_core::logging::init("mkt")?;

    let cfg = Arc::new(Config::load()?);

    // Remote store only when fully configured; local JSON files otherwise.
    let remote: Option<Arc<dyn DocumentStore>> = match (
        &cfg.jsonbin_api_key,
        &cfg.listings_bin_id,
        &cfg.config_bin_id,
    ) {
        (Some(key), Some(listings), Some(config)) => {
            Some(Arc::new(JsonBinStore::new(key, listings, config)))
        }
        _ => {
            println!("[STORE] JSONBin not configured; using local files only");
            None
        }
    };
    let local = LocalFileStore::new(cfg.data_dir.clone());
    let store = ShopStore::new(Arc::new(FallbackStore::new(remote, local)));

    let http = Arc::new(Http::new(&cfg.discord_bot_token));
    let host = Arc::new(DiscordHost::new(http));
    let reminders = ReminderRegistry::new(host.clone(), cfg.reminder_interval);
    let shop = Arc::new(Shop::new(cfg.clone(), store, host, reminders));

    mkt_discord::handler::run_gateway(&cfg.discord_bot_token, shop)
        .await
        .map_err(|e| mkt_core::Error::Platform(format!("discord bot failed: {e}")))?;

    Ok(())
}
