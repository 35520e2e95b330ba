pub mod ads_service;
pub mod gaql;
pub mod token_service;
