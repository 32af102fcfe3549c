mod resolver;

pub use resolver::build_resolver;
