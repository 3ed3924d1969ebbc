//! HTTP adapters for the market ports: `YahooProvider` implements
//! `PriceSource`, `MoneycontrolProvider` implements `PivotSource`.
//!
//! The process must install a rustls crypto provider before building either
//! provider (reqwest is compiled without a default one).

mod http;
pub mod moneycontrol;
pub mod yahoo;
