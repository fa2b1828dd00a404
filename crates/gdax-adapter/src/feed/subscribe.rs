/*
[INPUT]:  Product ids, channel names and optional pre-computed auth fields
[OUTPUT]: Subscribe / unsubscribe frames in the feed's JSON shape
[POS]:    Feed layer - outbound control messages
[UPDATE]: When the feed changes its subscription format
*/

use serde::{Deserialize, Serialize};

use super::message::MessageChannel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscribeAction {
    Subscribe,
    Unsubscribe,
}

/// Authentication fields for private channels.
///
/// The values are produced by the caller's signer over
/// `timestamp + "GET" + "/users/self/verify"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionAuth {
    pub key: String,
    pub passphrase: String,
    pub timestamp: String,
    pub signature: String,
}

/// Control frame sent to the feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribeRequest {
    #[serde(rename = "type")]
    pub action: SubscribeAction,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub product_ids: Vec<String>,
    pub channels: Vec<MessageChannel>,
    #[serde(flatten)]
    pub auth: Option<SubscriptionAuth>,
}

impl SubscribeRequest {
    pub fn subscribe<I, S>(product_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(SubscribeAction::Subscribe, product_ids)
    }

    pub fn unsubscribe<I, S>(product_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(SubscribeAction::Unsubscribe, product_ids)
    }

    fn new<I, S>(action: SubscribeAction, product_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            action,
            product_ids: product_ids.into_iter().map(Into::into).collect(),
            channels: Vec::new(),
            auth: None,
        }
    }

    /// Add a channel that applies to the request's top-level `product_ids`
    pub fn with_channel(mut self, name: impl Into<String>) -> Self {
        self.channels.push(MessageChannel {
            name: name.into(),
            product_ids: Vec::new(),
        });
        self
    }

    /// Add a channel restricted to its own product list
    pub fn with_channel_for<I, S>(mut self, name: impl Into<String>, product_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.channels.push(MessageChannel {
            name: name.into(),
            product_ids: product_ids.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn with_auth(mut self, auth: SubscriptionAuth) -> Self {
        self.auth = Some(auth);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn subscribe_serializes_to_feed_shape() {
        let request = SubscribeRequest::subscribe(["ETH-USD", "ETH-EUR"])
            .with_channel("level2")
            .with_channel("heartbeat")
            .with_channel_for("ticker", ["ETH-BTC"]);

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "subscribe",
                "product_ids": ["ETH-USD", "ETH-EUR"],
                "channels": [
                    {"name": "level2"},
                    {"name": "heartbeat"},
                    {"name": "ticker", "product_ids": ["ETH-BTC"]}
                ]
            })
        );
    }

    #[test]
    fn auth_fields_are_flattened() {
        let request = SubscribeRequest::subscribe(["BTC-USD"])
            .with_channel("user")
            .with_auth(SubscriptionAuth {
                key: "k".to_string(),
                passphrase: "p".to_string(),
                timestamp: "1500000000".to_string(),
                signature: "s".to_string(),
            });

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["key"], "k");
        assert_eq!(value["timestamp"], "1500000000");
        assert!(value.get("auth").is_none());
    }

    #[test]
    fn unsubscribe_without_products() {
        let request = SubscribeRequest::unsubscribe(Vec::<String>::new()).with_channel("heartbeat");

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value, json!({"type": "unsubscribe", "channels": [{"name": "heartbeat"}]}));
    }
}
