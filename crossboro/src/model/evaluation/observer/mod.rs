mod evaluation_observer;
mod file_log_observer;
mod log_observer;
mod progress_observer;

pub use evaluation_observer::EvaluationObserver;
pub use file_log_observer::FileLogObserver;
pub use log_observer::LogObserver;
pub use progress_observer::ProgressObserver;
