pub mod crnn;
pub mod estimator;
pub mod state;

pub use crnn::DroneAudioCrnn;
pub use estimator::StateEstimator;
pub use state::ActivityState;
