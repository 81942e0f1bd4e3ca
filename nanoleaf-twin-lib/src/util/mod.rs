#[cfg(test)]
pub(crate) mod mock;
pub mod traits;
