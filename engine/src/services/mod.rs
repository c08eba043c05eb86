pub mod rsi_service;

pub use rsi_service::RsiService;
