pub mod lookup;

pub use lookup::{ResolveIpUseCase, ResolveMxUseCase, ResolvePtrUseCase, ResolveTxtUseCase};
