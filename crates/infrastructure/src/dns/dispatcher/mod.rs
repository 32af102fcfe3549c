pub mod parallel;
pub mod slot;

pub use parallel::ParallelDispatcher;
pub use slot::ResultSlot;
