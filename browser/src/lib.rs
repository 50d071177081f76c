pub mod config;
pub mod functions;
pub mod render;

#[cfg(test)]
mod testing;
