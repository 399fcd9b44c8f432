pub mod model;

pub use model::{Detection, DetectionModel, DetectionResult};
