mod domain;
mod gateway;

pub use domain::*;
pub use gateway::*;
