pub mod anomaly;
pub mod baseline;
pub mod complaint;
pub mod insight;
pub mod repeat;
pub mod resolution;
pub mod surge;
pub mod trend;
pub mod variation;
