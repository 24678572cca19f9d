//! Storm impact report: loads the NOAA storm event table and ranks event
//! types by harm to population health and by economic damage.

pub mod charts;
pub mod config;
pub mod error;
pub mod loader;
pub mod logging;
pub mod magnitude;
pub mod output;
pub mod pipeline;
pub mod reports;
pub mod types;
pub mod util;
