//! Parse-trace debug dump
//!
//! Records the tree of visited nonterminals and the tokens consumed under
//! each, for the `-d` debug dump. Guards pop their nonterminal on drop so
//! error paths unwind the tree correctly.

use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug)]
enum Item {
    Token(String),
    Nonterminal(usize),
}

#[derive(Debug)]
struct Node {
    name: String,
    items: Vec<Item>,
}

#[derive(Debug, Default)]
struct TraceTree {
    nodes: Vec<Node>,
    root: Vec<Item>,
    stack: Vec<usize>,
}

impl TraceTree {
    fn push_item(&mut self, item: Item) {
        match self.stack.last() {
            Some(&parent) => self.nodes[parent].items.push(item),
            None => self.root.push(item),
        }
    }
}

/// Shared handle to the trace being recorded
#[derive(Debug, Clone, Default)]
pub struct ParseTrace {
    inner: Rc<RefCell<TraceTree>>,
}

impl ParseTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a nonterminal; it closes when the returned guard drops
    pub fn enter(&self, name: &str) -> TraceGuard {
        let mut tree = self.inner.borrow_mut();
        let idx = tree.nodes.len();
        tree.nodes.push(Node { name: name.to_owned(), items: Vec::new() });
        tree.push_item(Item::Nonterminal(idx));
        tree.stack.push(idx);
        TraceGuard { inner: Rc::clone(&self.inner) }
    }

    /// Record a consumed token under the current nonterminal
    pub fn token(&self, text: impl Into<String>) {
        self.inner.borrow_mut().push_item(Item::Token(text.into()));
    }

    /// Render the indented tree
    pub fn render(&self) -> String {
        let tree = self.inner.borrow();
        let mut out = String::new();
        render_items(&tree, &tree.root, 0, &mut out);
        out
    }
}

fn render_items(tree: &TraceTree, items: &[Item], indent: usize, out: &mut String) {
    for item in items {
        match item {
            Item::Token(text) => {
                out.push_str(&"| ".repeat(indent));
                out.push_str(text);
                out.push('\n');
            }
            Item::Nonterminal(idx) => {
                let node = &tree.nodes[*idx];
                out.push_str(&"| ".repeat(indent));
                out.push_str("NT:");
                out.push_str(&node.name);
                out.push('\n');
                render_items(tree, &node.items, indent + 1, out);
            }
        }
    }
}

/// Closes the nonterminal opened by `ParseTrace::enter` when dropped
pub struct TraceGuard {
    inner: Rc<RefCell<TraceTree>>,
}

impl Drop for TraceGuard {
    fn drop(&mut self) {
        self.inner.borrow_mut().stack.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_nonterminals_render_indented() {
        let trace = ParseTrace::new();
        {
            let _outer = trace.enter("computation");
            trace.token("\"main\"");
            {
                let _inner = trace.enter("varDecl");
                trace.token("\"var\"");
            }
            trace.token("\"{\"");
        }
        assert_eq!(
            trace.render(),
            "NT:computation\n| \"main\"\n| NT:varDecl\n| | \"var\"\n| \"{\"\n"
        );
    }

    #[test]
    fn guard_pops_on_early_exit() {
        let trace = ParseTrace::new();
        {
            let _g = trace.enter("statement");
            // error path: guard dropped without explicit close
        }
        trace.token("\"fi\"");
        assert_eq!(trace.render(), "NT:statement\n\"fi\"\n");
    }
}
