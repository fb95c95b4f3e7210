use serde_json::json;
use then_notify::templates::FormatTemplate;
use then_notify::{Dispatch, Error, LIB_LOG_TARGET, NotifyConfiguration};
use tracing::{Level, error, info};

const CONFIG: &str = r#"
    [[component]]
    type = "homeassistant"
    name = "house"
    url = "127.0.0.1"
    access = "ha_password"
"#;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_max_level(Level::DEBUG).with_target(true).init();

    if let Err(error) = run().await {
        error!(target: LIB_LOG_TARGET, "{}", error)
    }
}

async fn run() -> Result<(), Error> {
    let config = match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| Error::validation(format!("Unable to read configuration {}: {}", path, e)))?;
            NotifyConfiguration::try_from(text.as_str())?
        }
        None => NotifyConfiguration::try_from(CONFIG)?,
    };

    for component in config.components() {
        info!(target: LIB_LOG_TARGET, "Sending test message with {}", component.name());
        let template = FormatTemplate::from([("body", "Test message from {sender}"), ("event", "then_notify_{kind}")]);
        let dispatch = Dispatch::new(component.clone(), template);
        dispatch.send(&json!({"sender": "send_message demo", "kind": "test"})).await?;
    }

    Ok(())
}
