//! JSON-RPC frames used on the push connection.
//!
//! Outbound: one `logsSubscribe` request per tracked address.
//! Inbound: subscription confirmations, error replies, and
//! `logsNotification` frames carrying `params.result.value.signature`.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::core::dispatcher::EventNotification;

/// Builds the `logsSubscribe` request for one address.
pub fn logs_subscribe(id: u64, address: &str, commitment: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "logsSubscribe",
        "params": [
            { "mentions": [address] },
            { "commitment": commitment }
        ]
    })
}

/// Any text frame the node may send.
#[derive(Debug, Deserialize)]
pub struct InboundMessage {
    pub id: Option<u64>,
    pub result: Option<Value>,
    pub error: Option<RpcError>,
    pub params: Option<NotificationParams>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct NotificationParams {
    pub subscription: Option<u64>,
    pub result: NotificationResult,
}

#[derive(Debug, Deserialize)]
pub struct NotificationResult {
    pub value: LogsValue,
}

#[derive(Debug, Deserialize)]
pub struct LogsValue {
    pub signature: String,
}

/// What an inbound frame means to the subscription manager.
#[derive(Debug, PartialEq)]
pub enum Inbound {
    /// The node accepted request `request_id` as subscription `subscription_id`.
    Confirmed { request_id: u64, subscription_id: u64 },
    /// The node rejected request `request_id`.
    Rejected { request_id: Option<u64>, code: i64, message: String },
    /// New activity for a tracked address.
    Notification(EventNotification),
    /// Valid JSON that needs no action.
    Ignored,
}

/// Classifies a text frame.
///
/// # Errors
/// Returns the decode error when the frame is not JSON of a known shape.
pub fn classify(text: &str) -> Result<Inbound, serde_json::Error> {
    let message: InboundMessage = serde_json::from_str(text)?;

    if let Some(params) = message.params {
        return Ok(Inbound::Notification(EventNotification {
            subscription_id: params.subscription,
            signature: params.result.value.signature,
        }));
    }

    if let Some(err) = message.error {
        return Ok(Inbound::Rejected {
            request_id: message.id,
            code: err.code,
            message: err.message,
        });
    }

    match (message.id, message.result.as_ref().and_then(Value::as_u64)) {
        (Some(request_id), Some(subscription_id)) => Ok(Inbound::Confirmed {
            request_id,
            subscription_id,
        }),
        _ => Ok(Inbound::Ignored),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_request_shape() {
        let req = logs_subscribe(2, "Addr", "confirmed");
        assert_eq!(
            req,
            json!({
                "jsonrpc": "2.0",
                "id": 2,
                "method": "logsSubscribe",
                "params": [{ "mentions": ["Addr"] }, { "commitment": "confirmed" }]
            })
        );
    }

    #[test]
    fn test_notification_is_extracted() {
        let text = crate::test_support::notification(42, "sig123");
        assert_eq!(
            classify(&text).unwrap(),
            Inbound::Notification(EventNotification {
                subscription_id: Some(42),
                signature: "sig123".to_string(),
            })
        );
    }

    #[test]
    fn test_confirmation_and_rejection() {
        assert_eq!(
            classify(r#"{"jsonrpc":"2.0","result":24040,"id":1}"#).unwrap(),
            Inbound::Confirmed { request_id: 1, subscription_id: 24040 }
        );
        let rejection =
            r#"{"jsonrpc":"2.0","error":{"code":-32602,"message":"Invalid param"},"id":2}"#;
        assert_eq!(
            classify(rejection).unwrap(),
            Inbound::Rejected {
                request_id: Some(2),
                code: -32602,
                message: "Invalid param".to_string(),
            }
        );
    }

    #[test]
    fn test_unrelated_json_is_ignored() {
        let ack = r#"{"jsonrpc":"2.0","result":true,"id":9}"#;
        assert_eq!(classify(ack).unwrap(), Inbound::Ignored);
    }

    #[test]
    fn test_malformed_frames_are_errors() {
        assert!(classify("not json").is_err());
        // A notification without a signature is not something we can dispatch.
        assert!(classify(r#"{"params":{"result":{"value":{}}}}"#).is_err());
    }
}
