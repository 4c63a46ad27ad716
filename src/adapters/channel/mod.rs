//! Channel transport: activity wire types, inbound webhook, outbound connector.

pub mod activity;
pub mod connector;
pub mod webhook;

pub use activity::{Activity, activity_to_turn, reply_activity};
pub use connector::ConnectorClient;
pub use webhook::{Capabilities, WebhookState, router};
