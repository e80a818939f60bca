// =============================================================================
// Technical Indicator Engine
// =============================================================================
//
// Pure, side-effect-free indicator functions over chronologically ordered
// price data. Every series output has the same length as its input; positions
// without enough history, or with an undefined value, hold `None`.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod error;
pub mod frame;
pub mod macd;
pub mod mfi;
pub mod obv;
pub mod rsi;
pub mod sma;
pub mod stochastic;
pub mod window;
pub mod wma;

pub use adx::adx;
pub use atr::{atr, true_range};
pub use bollinger::{bollinger_bands, BollingerBands};
pub use ema::{ema, ema_of};
pub use error::IndicatorError;
pub use frame::{calculate_all, IndicatorFrame, TechnicalSummary};
pub use macd::{macd, MacdOutput};
pub use mfi::mfi;
pub use obv::obv;
pub use rsi::rsi;
pub use sma::sma;
pub use stochastic::{stochastic, Stochastic};
pub use window::rolling_mean;
pub use wma::wma;
