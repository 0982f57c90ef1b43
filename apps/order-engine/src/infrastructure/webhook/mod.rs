//! Outbound webhook adapter.

mod sender;

pub use sender::ReqwestWebhookSender;
