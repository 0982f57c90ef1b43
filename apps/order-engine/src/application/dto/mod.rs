//! Data Transfer Objects (DTOs)
//!
//! DTOs are used for API boundaries and use case inputs/outputs.

mod commission_dto;
mod ipo_dto;
mod order_dto;
mod session;
mod webhook_dto;

pub use commission_dto::{CommissionLineDto, CommissionSummaryDto};
pub use ipo_dto::{CancelIpoBidDto, CreateIpoBidDto, IpoBidDto, IpoSeriesDto};
pub use order_dto::{CreateOrderDto, OrderDto};
pub use session::Session;
pub use webhook_dto::{
    DeadLetterDto, InboundWebhookDto, IngestOutcome, RegisterSubscriptionDto, SubscriptionDto,
};
