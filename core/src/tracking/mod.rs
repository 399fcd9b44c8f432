pub mod table;
pub mod track;

pub use table::{CorrectionOutcome, TrackTable};
pub use track::DroneTrack;
