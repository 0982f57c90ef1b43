//! Commission Bounded Context
//!
//! Rate caps and the spread rules that turn processed orders into account
//! and advisor commission. Nothing here is persisted; totals are computed
//! on read.

pub mod errors;
pub mod rate_cap;
pub mod repository;
pub mod services;

pub use errors::RateCapError;
pub use rate_cap::{RateCap, RateCapOwner};
pub use repository::RateCapRepository;
pub use services::{MLD_SPREAD, SPREAD_FLOOR, SpreadCalculator};
