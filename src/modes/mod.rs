pub mod headless;
pub mod watch;

pub use headless::{HeadlessMode, SimulationConfig};
pub use watch::WatchMode;
