pub mod documents;
pub mod helpers;
pub mod results;
pub mod session;
