use thiserror::Error;

/// Failures a client stub can surface to the application.
///
/// The broker side deliberately has no counterpart to this: per-subscriber
/// delivery failures are absorbed inside the fan-out pass and only ever
/// reach a publisher as an aggregate `success=false` ack.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("websocket transport error: {0}")]
    Transport(#[from] tungstenite::Error),

    #[error("broker closed the connection before answering")]
    ConnectionClosed,

    #[error("failed to encode frame: {0}")]
    Encode(#[from] serde_json::Error),
}
