mod config_gen;
mod visits;

pub use config_gen::config_generate;
pub use visits::{record_visit, show_stats};
