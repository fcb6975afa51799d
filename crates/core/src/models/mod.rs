pub mod chart;
pub mod coin;
pub mod portfolio;
pub mod price;
pub mod settings;
pub mod state;
pub mod trend;
pub mod window;
