//! Handlers that record what they were invoked with.

use slcmd::{CommandContext, CommandHandler, HandlerResult};
use std::sync::{Arc, Mutex};

/// One recorded handler call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: String,
    pub executor: String,
    pub prefix: String,
    pub arguments: String,
    pub author: String,
}

/// Shared log of handler calls across every handler built from it.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<Invocation>>>,
}

#[allow(dead_code)]
impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handler that records the call and succeeds.
    pub fn handler(&self) -> Arc<dyn CommandHandler> {
        Arc::new(Recording {
            calls: Arc::clone(&self.calls),
            behaviour: Behaviour::Succeed,
        })
    }

    /// Handler that records the call and returns an error.
    pub fn failing(&self, message: &'static str) -> Arc<dyn CommandHandler> {
        Arc::new(Recording {
            calls: Arc::clone(&self.calls),
            behaviour: Behaviour::Fail(message),
        })
    }

    /// Handler that records the call and panics.
    pub fn panicking(&self, message: &'static str) -> Arc<dyn CommandHandler> {
        Arc::new(Recording {
            calls: Arc::clone(&self.calls),
            behaviour: Behaviour::Panic(message),
        })
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().expect("recorder lock").clone()
    }

    pub fn count(&self) -> usize {
        self.calls.lock().expect("recorder lock").len()
    }

    pub fn count_for(&self, command: &str) -> usize {
        self.calls
            .lock()
            .expect("recorder lock")
            .iter()
            .filter(|c| c.command == command)
            .count()
    }

    /// The only recorded call; panics unless exactly one happened.
    pub fn single(&self) -> Invocation {
        let calls = self.calls();
        assert_eq!(calls.len(), 1, "expected exactly one invocation, got {calls:?}");
        calls.into_iter().next().expect("one call")
    }
}

enum Behaviour {
    Succeed,
    Fail(&'static str),
    Panic(&'static str),
}

struct Recording {
    calls: Arc<Mutex<Vec<Invocation>>>,
    behaviour: Behaviour,
}

#[async_trait::async_trait]
impl CommandHandler for Recording {
    async fn handle(&self, ctx: CommandContext) -> HandlerResult {
        self.calls.lock().expect("recorder lock").push(Invocation {
            command: ctx.command().name().to_string(),
            executor: ctx.executor().to_string(),
            prefix: ctx.prefix().to_string(),
            arguments: ctx.arguments().to_string(),
            author: ctx.author_id().to_string(),
        });

        match self.behaviour {
            Behaviour::Succeed => Ok(()),
            Behaviour::Fail(message) => Err(anyhow::anyhow!(message)),
            Behaviour::Panic(message) => panic!("{message}"),
        }
    }
}
