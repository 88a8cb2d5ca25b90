/// Training options and their validation
pub mod config;
/// Validation-loss monitor used for early stopping
pub mod early_stopping;
/// Per-epoch training report
pub mod history;
/// Mini-batch training loop and its state machine
pub mod trainer;

pub use config::*;
pub use early_stopping::*;
pub use history::*;
pub use trainer::*;
