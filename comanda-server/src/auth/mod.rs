pub mod extractor;

pub use extractor::Waiter;
