//! Network layer of the CTP dashboard.
//!
//! `MerchantCenterClient` implements `ctp_core::api::DashboardApi` over the
//! Merchant Center REST API.

pub mod merchant_center_client;
pub mod response;
pub mod statistics_query;

pub use merchant_center_client::MerchantCenterClient;
