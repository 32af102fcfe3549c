mod resolve_ip;
mod resolve_mx;
mod resolve_ptr;
mod resolve_txt;

pub use resolve_ip::ResolveIpUseCase;
pub use resolve_mx::ResolveMxUseCase;
pub use resolve_ptr::ResolvePtrUseCase;
pub use resolve_txt::ResolveTxtUseCase;
