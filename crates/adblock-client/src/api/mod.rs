//! API endpoint modules.

mod lists;
mod rules;

pub use lists::ListsApi;
pub use rules::RulesApi;
