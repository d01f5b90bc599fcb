// src/provider/mock.rs

//! Scripted provider for tests and offline runs
//!
//! Answers requests through a caller-supplied closure and records every
//! request it receives, so conversion flows can be exercised without
//! network access.

use super::{AiProvider, CompletionRequest, ProviderKind};
use crate::error::Result;
use std::cell::{Cell, RefCell};

type Responder = Box<dyn Fn(&CompletionRequest, usize) -> Result<String>>;

/// Provider whose answers come from a closure
///
/// The closure receives the request and the zero-based call index.
pub struct MockProvider {
    kind: ProviderKind,
    responder: Responder,
    calls: Cell<usize>,
    requests: RefCell<Vec<CompletionRequest>>,
}

impl MockProvider {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&CompletionRequest, usize) -> Result<String> + 'static,
    {
        Self {
            kind: ProviderKind::Mistral,
            responder: Box::new(responder),
            calls: Cell::new(0),
            requests: RefCell::new(Vec::new()),
        }
    }

    /// Always answer with the same text
    pub fn fixed(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(move |_, _| Ok(text.clone()))
    }

    pub fn with_kind(mut self, kind: ProviderKind) -> Self {
        self.kind = kind;
        self
    }

    /// Number of `complete` calls so far
    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    /// Copies of all requests received
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.borrow().clone()
    }
}

impl AiProvider for MockProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let index = self.calls.get();
        self.calls.set(index + 1);
        self.requests.borrow_mut().push(request.clone());
        (self.responder)(request, index)
    }
}
