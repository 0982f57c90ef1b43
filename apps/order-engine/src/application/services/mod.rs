//! Application Services
//!
//! Collaborators shared by several use cases: the manager-hierarchy walk
//! and the outbound webhook fan-out, with its delivery queue and dead letters.

mod dead_letters;
mod delivery_queue;
mod reportee_resolver;
mod webhook_dispatcher;

pub use dead_letters::{DEFAULT_DEAD_LETTER_CAPACITY, DeadLetter, DeadLetterQueue};
pub use delivery_queue::{DEFAULT_QUEUE_CAPACITY, QueuedEventPublisher};
pub use reportee_resolver::{MAX_REPORTEE_DEPTH, ReporteeResolver};
pub use webhook_dispatcher::{DeliveryMode, WebhookFanoutDispatcher};
