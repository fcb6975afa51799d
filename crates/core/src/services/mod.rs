pub mod aggregator_service;
pub mod chart_service;
pub mod portfolio_service;
pub mod trend_service;
