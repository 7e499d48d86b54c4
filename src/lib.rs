pub mod app;
pub mod cli;
pub mod config;
pub mod disclosure;
pub mod output;
pub mod payload;
pub mod runner;
pub mod status;
pub mod utils;

#[cfg(test)]
mod tests;
