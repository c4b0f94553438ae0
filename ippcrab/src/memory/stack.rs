//! LIFO stacks used by the interpreter.
//!
//! The data stack (`PUSHS`/`POPS`), the call stack (`CALL`/`RETURN`) and the
//! local frame stack (`PUSHFRAME`/`POPFRAME`) share this implementation.

use std::fmt;

/// Last-in first-out stack. The top is the last pushed element.
#[derive(Debug, Clone, PartialEq)]
pub struct Stack<T> {
    items: Vec<T>,
}

impl<T> Default for Stack<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Stack<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    pub fn top(&self) -> Option<&T> {
        self.items.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut T> {
        self.items.last_mut()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates from the bottom of the stack to the top.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

/// Renders as `[bottom, ..., top]` using `render` for each element.
pub struct DisplayStack<'a, T, F> {
    stack: &'a Stack<T>,
    render: F,
}

impl<T> Stack<T> {
    pub fn display_with<F>(&self, render: F) -> DisplayStack<'_, T, F>
    where
        F: Fn(&T) -> String,
    {
        DisplayStack {
            stack: self,
            render,
        }
    }
}

impl<T, F> fmt::Display for DisplayStack<'_, T, F>
where
    F: Fn(&T) -> String,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items: Vec<String> = self.stack.iter().map(&self.render).collect();
        write!(f, "[{}]", items.join(", "))
    }
}
