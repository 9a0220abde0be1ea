//! Infrastructure layer - HTTP data sources and history storage

pub mod market_data;
pub mod storage;
