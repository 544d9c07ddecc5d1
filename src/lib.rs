pub mod config;
pub mod events;
pub mod feed;
pub mod scheduler;
pub mod state;
pub mod status;

#[cfg(test)]
mod testing;
