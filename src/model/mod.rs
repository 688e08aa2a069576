pub mod task;
pub mod category;
pub mod position;
pub mod prefs;
pub mod config;

pub use task::*;
pub use category::*;
pub use position::*;
pub use prefs::*;
pub use config::*;
