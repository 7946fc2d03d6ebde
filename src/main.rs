use std::sync::{Arc, Mutex};

use streampub::broker::Broker;
use streampub::config::load_config;
use streampub::transport::websocket::start_websocket_server;
use streampub::utils::logging;

#[tokio::main]
async fn main() {
    let config = load_config().expect("failed to load configuration");
    logging::init(&config.log.level);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let broker = Arc::new(Mutex::new(Broker::new()));
    start_websocket_server(&addr, broker).await;
}
