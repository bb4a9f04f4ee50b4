pub mod config;
pub mod engine;
pub mod model;
pub mod person;
pub mod region;
pub mod results;
pub mod rng;
pub mod scenario;
pub mod settlement;
pub mod systems;
pub mod world;

pub use config::{ConfigError, ModelConfig};
pub use model::{Model, ModelError, ModelState};
pub use results::{ResultsTable, TickRecord};
pub use rng::RngManager;
