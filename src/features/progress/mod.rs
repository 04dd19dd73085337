pub mod tracker;

pub use tracker::ProgressState;
