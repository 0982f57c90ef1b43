//! Commission Domain Services

mod spread;

pub use spread::{MLD_SPREAD, SPREAD_FLOOR, SpreadCalculator};
