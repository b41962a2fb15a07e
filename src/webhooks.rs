//! Ad-hoc webhooks attached to a single run.
//!
//! The API takes them as a `webhooks` query parameter holding base64-encoded JSON.

use crate::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// Event that triggers a webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WebhookEventType {
    #[serde(rename = "ACTOR.RUN.CREATED")]
    RunCreated,
    #[serde(rename = "ACTOR.RUN.SUCCEEDED")]
    RunSucceeded,
    #[serde(rename = "ACTOR.RUN.FAILED")]
    RunFailed,
    #[serde(rename = "ACTOR.RUN.TIMED_OUT")]
    RunTimedOut,
    #[serde(rename = "ACTOR.RUN.ABORTED")]
    RunAborted,
}

/// A webhook definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Webhook {
    /// Events that fire the webhook.
    pub event_types: Vec<WebhookEventType>,
    /// URL the API will POST to.
    pub request_url: String,
    /// Optional template for the POST body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_template: Option<String>,
}

impl Webhook {
    /// A webhook firing on `event_types` and posting to `request_url`.
    pub fn new(event_types: impl IntoIterator<Item = WebhookEventType>, request_url: impl Into<String>) -> Self {
        Self {
            event_types: event_types.into_iter().collect(),
            request_url: request_url.into(),
            payload_template: None,
        }
    }
}

/// Encodes webhooks for the `webhooks` query parameter.
///
/// # Errors
///
/// Returns [`Error::Validation`] for webhooks without events or with an
/// unparsable `request_url`.
pub fn encode_webhooks(webhooks: &[Webhook]) -> Result<String> {
    for webhook in webhooks {
        if webhook.event_types.is_empty() {
            return Err(Error::Validation(
                "webhook must have at least one event type".to_string(),
            ));
        }
        url::Url::parse(&webhook.request_url).map_err(|e| {
            Error::Validation(format!("invalid webhook URL `{}`: {}", webhook.request_url, e))
        })?;
    }

    let json = serde_json::to_vec(webhooks).map_err(|e| Error::SerializationFailed(e.to_string()))?;
    Ok(STANDARD.encode(json))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoded_webhooks_decode_to_json() {
        let webhooks = vec![Webhook::new(
            [WebhookEventType::RunSucceeded],
            "https://example.com/hook",
        )];

        let encoded = encode_webhooks(&webhooks).unwrap();
        let decoded: serde_json::Value =
            serde_json::from_slice(&STANDARD.decode(encoded).unwrap()).unwrap();

        assert_eq!(
            decoded,
            serde_json::json!([{
                "eventTypes": ["ACTOR.RUN.SUCCEEDED"],
                "requestUrl": "https://example.com/hook",
            }])
        );
    }

    #[test]
    fn test_invalid_webhooks_rejected() {
        let no_events = Webhook::new([], "https://example.com");
        assert!(matches!(encode_webhooks(&[no_events]), Err(Error::Validation(_))));

        let bad_url = Webhook::new([WebhookEventType::RunFailed], "not a url");
        assert!(matches!(encode_webhooks(&[bad_url]), Err(Error::Validation(_))));
    }
}
