//! Order Lifecycle Value Objects

mod external_status;
mod gateway_event;
mod order_status;
mod saga_step;
mod snapshots;

pub use external_status::ExternalOrderStatus;
pub use gateway_event::{EventTarget, GatewayEvent, KycStatus};
pub use order_status::OrderStatus;
pub use saga_step::OrderSagaStep;
pub use snapshots::{CustomerSnapshot, ProductSnapshot, ProductType};
