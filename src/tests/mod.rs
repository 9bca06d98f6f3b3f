#[cfg(test)]
pub mod common;

mod reporting_client;
