pub mod name_resolver;
pub mod player_analytics;
pub mod predictor;
pub mod team_analytics;
pub mod venue_analytics;

pub use name_resolver::*;
pub use player_analytics::*;
pub use predictor::*;
pub use team_analytics::*;
pub use venue_analytics::*;
