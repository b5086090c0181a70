mod expr;
mod set_expr;
mod table;

use crate::error::{AppResult, tree_depth_error};

/// Lowers sqlparser nodes into the operator-tagged tree, bounding recursion.
pub struct Lowering {
    max_depth: usize,
    depth:     usize
}

impl Lowering {
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            depth: 0
        }
    }

    /// Run `f` one nesting level deeper, failing past `max_depth`.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> AppResult<T>) -> AppResult<T> {
        if self.depth >= self.max_depth {
            return Err(tree_depth_error(self.max_depth));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }
}
