pub mod acquire;
pub mod emergency;
