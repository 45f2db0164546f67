// SPDX-License-Identifier: Apache-2.0

//! Change notifications for structural edits.
//!
//! Handlers run synchronously in registration order. A cloned network starts
//! with no subscribers: the handlers close over state tied to the original.

use std::fmt;

use super::NodeRef;

pub type AddHandler = Box<dyn FnMut(NodeRef)>;
pub type ModifiedHandler<S> = Box<dyn FnMut(NodeRef, &[S])>;

pub struct Events<S> {
    on_add: Vec<AddHandler>,
    on_modified: Vec<ModifiedHandler<S>>,
}

impl<S> Default for Events<S> {
    fn default() -> Self {
        Self {
            on_add: Vec::new(),
            on_modified: Vec::new(),
        }
    }
}

impl<S> Clone for Events<S> {
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl<S> fmt::Debug for Events<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Events")
            .field("on_add", &self.on_add.len())
            .field("on_modified", &self.on_modified.len())
            .finish()
    }
}

impl<S> Events<S> {
    pub fn subscribe_add(&mut self, handler: impl FnMut(NodeRef) + 'static) {
        self.on_add.push(Box::new(handler));
    }

    /// The handler receives the modified node and its fanins as they were
    /// before the edit.
    pub fn subscribe_modified(&mut self, handler: impl FnMut(NodeRef, &[S]) + 'static) {
        self.on_modified.push(Box::new(handler));
    }

    pub fn clear(&mut self) {
        self.on_add.clear();
        self.on_modified.clear();
    }

    pub(crate) fn notify_add(&mut self, node: NodeRef) {
        for handler in self.on_add.iter_mut() {
            handler(node);
        }
    }

    pub(crate) fn notify_modified(&mut self, node: NodeRef, old_children: &[S]) {
        for handler in self.on_modified.iter_mut() {
            handler(node, old_children);
        }
    }
}
