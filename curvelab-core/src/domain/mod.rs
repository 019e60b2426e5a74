//! Domain types for CurveLab

pub mod bar;
pub mod equity;
pub mod fill;
pub mod ids;
pub mod order;
pub mod portfolio;
pub mod position;
pub mod trade;

pub use bar::Bar;
pub use equity::{EquityCurve, EquityPoint};
pub use fill::Fill;
pub use ids::{DatasetHash, OrderId, RunId};
pub use order::{Order, OrderError, OrderSide, OrderStatus};
pub use portfolio::Portfolio;
pub use position::Position;
pub use trade::TradeRecord;
