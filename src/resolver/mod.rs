//! Dependency expansion for one structural position.
//!
//! [`resolve`] turns an ordered list of module names into the concatenated
//! text of those modules and their transitive dependencies, dependencies
//! first, each module at most once. Only modules whose own
//! [`Position`] matches the requested one contribute text; the rest are still
//! walked so their dependencies at that position are emitted.
//!
//! # Traversal
//!
//! The walk is a depth-first search with the usual three colors, driven by an
//! explicit stack of list frames instead of recursion, so deep dependency
//! chains cannot overflow the thread stack. Each frame is a dependency list
//! being iterated, plus the module that owns it (none for the top-level
//! list). When a frame is exhausted the owner's text is emitted and the owner
//! turns [`Color::Black`].
//!
//! Invalid references are handled the way existing manifests rely on:
//!
//! - a module already emitted is skipped;
//! - a name with no module is logged, remembered as done, and **ends the
//!   list it appears in**;
//! - a reference back to a module still being expanded (a cycle) is logged
//!   and **ends the list it appears in**.
//!
//! ```text
//! 5.js -> [6.js]          resolve(["5.js"])      = "6\n5\n"
//! 6.js -> [5.js]          resolve(["5.js", "x"]) = "6\n5\n"
//! ```

use crate::manifest::Position;
use crate::version::Variant;
use std::collections::HashSet;

/// Visit state of a module during one [`resolve`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// Not yet reached.
    White,
    /// Dependencies are being expanded.
    Gray,
    /// Emitted (or skipped because of its position).
    Black,
}

/// A dependency list being iterated.
struct Frame<'a> {
    names: &'a [String],
    next: usize,
    /// Module whose dependency list this is; `None` for the caller's list.
    owner: Option<usize>,
}

impl<'a> Frame<'a> {
    fn new(names: &'a [String], owner: Option<usize>) -> Self {
        Self {
            names,
            next: 0,
            owner,
        }
    }

    fn stop(&mut self) {
        self.next = self.names.len();
    }
}

/// Expand `names` at `position` against `variant`.
///
/// Visit state is local to the call, so a module emitted by one call is
/// emitted again by the next. The stitcher calls this once per position.
///
/// # Examples
///
/// ```rust
/// use quilt::manifest::Position;
/// use quilt::resolver::resolve;
/// use quilt::version::{Module, Variant};
///
/// let variant = Variant::new()
///     .with_module(Module::new("a.js", "a\n").with_dependencies(["b.js"]))
///     .with_module(Module::new("b.js", "b\n"));
///
/// let names = vec!["a.js".to_string()];
/// assert_eq!(resolve(Position::Optional, &names, &variant), "b\na\n");
/// ```
pub fn resolve(position: Position, names: &[String], variant: &Variant) -> String {
    let modules = variant.modules();
    let mut colors = vec![Color::White; modules.len()];
    let mut missing: HashSet<&str> = HashSet::new();
    let mut output = String::new();

    let mut stack = vec![Frame::new(names, None)];

    while let Some(frame) = stack.last_mut() {
        let list = frame.names;
        let Some(name) = list.get(frame.next) else {
            // List exhausted: the owner's dependencies are all out
            let finished = stack.pop();
            if let Some(id) = finished.and_then(|f| f.owner) {
                let module = &modules[id];
                if module.position() == position {
                    output.push_str(module.source());
                }
                colors[id] = Color::Black;
            }
            continue;
        };
        frame.next += 1;

        let Some(id) = variant.module_id(name) else {
            if missing.insert(name.as_str()) {
                tracing::warn!(
                    target: "quilt::resolver",
                    "Invalid module: {}, skipping the rest of its list",
                    name
                );
                frame.stop();
            }
            continue;
        };

        match colors[id] {
            Color::Black => {}
            Color::Gray => {
                tracing::warn!(
                    target: "quilt::resolver",
                    "Circular dependency on {}, skipping the rest of its list",
                    name
                );
                frame.stop();
            }
            Color::White => {
                colors[id] = Color::Gray;
                stack.push(Frame::new(modules[id].dependencies(), Some(id)));
            }
        }
    }

    output
}
