pub mod runner;
pub mod scenarios;
