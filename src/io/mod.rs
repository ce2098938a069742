// IO layer - flat file export.

pub mod export;

pub use export::*;
