pub mod duration;
pub mod evaluation;
pub mod route;
