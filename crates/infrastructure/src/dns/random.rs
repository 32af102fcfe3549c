use ferrous_resolver_application::ports::RandomSource;
use ferrous_resolver_domain::NameServerAddress;

/// [`RandomSource`] backed by the thread-local `fastrand` generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct FastRandom;

impl RandomSource for FastRandom {
    fn shuffle(&self, servers: &mut [NameServerAddress]) {
        fastrand::shuffle(servers);
    }

    fn query_id(&self) -> u16 {
        fastrand::u16(..)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shuffle_keeps_every_server() {
        let mut servers: Vec<NameServerAddress> = (1..=8)
            .map(|i| format!("192.0.2.{}", i).parse().unwrap())
            .collect();
        let original = servers.clone();

        FastRandom.shuffle(&mut servers);

        assert_eq!(servers.len(), original.len());
        assert!(original.iter().all(|s| servers.contains(s)));
    }
}
