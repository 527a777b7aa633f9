use anyhow::{anyhow, bail, Result};
use radar_client::{ErrorState, ServiceConfig};
use std::sync::{Arc, Mutex};

const USAGE: &str = "usage: radar-fetch <suburb> <state> [timespan] [custom-start] [custom-end]";

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let suburb = args.next().ok_or_else(|| anyhow!(USAGE))?;
    let state = args.next().ok_or_else(|| anyhow!(USAGE))?;
    let timespan = args.next();
    let custom_start = args.next();
    let custom_end = args.next();

    let config = ServiceConfig::from_env()?;
    let client = config.client();

    let reported: Arc<Mutex<Option<ErrorState>>> = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&reported);
    let options = config.fetch_options(&suburb, &state, move |err| {
        log::error!("[{}] {}", err.kind, err.message);
        if let Ok(mut slot) = sink.lock() {
            *slot = Some(err);
        }
    });

    let response = match timespan.as_deref() {
        None => client.fetch_latest_frames(&options).await,
        Some(radar_client::options::CUSTOM_TIMESPAN) => {
            let options = options.custom_range(custom_start.as_deref(), custom_end.as_deref());
            client.fetch_historical_frames(&options).await
        }
        Some(selector) => client.fetch_historical_frames(&options.timespan(selector)).await,
    };

    match response {
        Some(radar) => {
            println!("{}", serde_json::to_string_pretty(&radar)?);
            Ok(())
        }
        None => {
            let err = reported.lock().ok().and_then(|mut slot| slot.take());
            match err {
                Some(err) => match err.retry_after {
                    Some(secs) => bail!("{} (retry in {}s)", err.message, secs),
                    None => bail!("{}", err.message),
                },
                None => bail!("no radar data returned"),
            }
        }
    }
}
