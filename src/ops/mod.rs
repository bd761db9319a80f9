//! High-level operations

pub mod dispatch;

pub use dispatch::{DispatchState, Dispatcher, Settings};
