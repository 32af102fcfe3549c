use ferrous_resolver_domain::{DnsQuestion, DomainError, NameServerAddress};
use tracing::{debug, warn};

/// One suspended level of the delegation walk.
///
/// The walk itself is also described by a frame: the question being
/// resolved, the servers tried at this level, where to resume in that list
/// and how many referrals have been followed so far.
#[derive(Debug, Clone)]
pub struct StackFrame {
    pub question: DnsQuestion,
    pub name_servers: Vec<NameServerAddress>,
    pub index: usize,
    pub hop_count: usize,
}

impl StackFrame {
    pub fn new(question: DnsQuestion) -> Self {
        Self {
            question,
            name_servers: Vec::new(),
            index: 0,
            hop_count: 0,
        }
    }

    pub fn with_name_servers(mut self, name_servers: Vec<NameServerAddress>) -> Self {
        self.name_servers = name_servers;
        self
    }
}

/// Explicit resolution stack with a hard depth limit.
#[derive(Debug)]
pub struct ResolverStack {
    frames: Vec<StackFrame>,
    max_depth: usize,
}

impl ResolverStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            frames: Vec::with_capacity(max_depth.min(16)),
            max_depth,
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Suspends `frame`. Growing past the limit drains the whole stack and
    /// fails with the name of the question the walk started from.
    pub fn push(&mut self, frame: StackFrame) -> Result<(), DomainError> {
        if self.frames.len() >= self.max_depth {
            let domain = self
                .frames
                .drain(..)
                .next()
                .map(|bottom| bottom.question.name)
                .unwrap_or(frame.question.name);
            warn!(domain = %domain, max = self.max_depth, "Recursive resolution stack depth exceeded");
            return Err(DomainError::StackDepthExceeded {
                domain,
                max: self.max_depth,
            });
        }

        debug!(
            domain = %frame.question.name,
            stack_depth = self.frames.len() + 1,
            "Suspending resolution to resolve a name server address"
        );
        self.frames.push(frame);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<StackFrame> {
        let frame = self.frames.pop()?;
        debug!(
            domain = %frame.question.name,
            stack_depth = self.frames.len(),
            "Resuming suspended resolution"
        );
        Some(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrous_resolver_domain::RecordType;

    fn frame(name: &str) -> StackFrame {
        StackFrame::new(DnsQuestion::new(name, RecordType::A))
    }

    #[test]
    fn test_push_pop_is_lifo() {
        let mut stack = ResolverStack::new(4);
        stack.push(frame("first.test")).unwrap();
        stack.push(frame("second.test")).unwrap();

        assert_eq!(stack.pop().unwrap().question.name, "second.test");
        assert_eq!(stack.pop().unwrap().question.name, "first.test");
        assert!(stack.pop().is_none());
    }

    #[test]
    fn test_overflow_drains_and_names_the_original_question() {
        let mut stack = ResolverStack::new(2);
        stack.push(frame("origin.test")).unwrap();
        stack.push(frame("ns1.origin.test")).unwrap();

        let err = stack.push(frame("ns2.origin.test")).unwrap_err();

        assert!(stack.is_empty());
        match err {
            DomainError::StackDepthExceeded { domain, max } => {
                assert_eq!(domain, "origin.test");
                assert_eq!(max, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
