pub mod bootstrap;
pub mod cname_chase;
pub mod config;
pub mod engine;
pub mod name_servers;
pub mod recursive;
pub mod root_servers;
pub mod stack;
pub mod stub;

pub use cname_chase::CnameChaser;
pub use config::{ResolverContext, ResolverOptions};
pub use engine::RecursiveEngine;
pub use recursive::RecursiveResolver;
pub use stack::{ResolverStack, StackFrame};
pub use stub::StubResolver;
