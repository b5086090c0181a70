//! Signal extraction over a lowered `SELECT` tree.
//!
//! [`SelectTreeAnalyzer`] walks a statement and everything reachable from it
//! (compound predecessors, sub-selects, derived tables and CTE bodies). It
//! records which statements reference each table and accumulates the
//! [`Signals`] that checkers consume.
//!
//! # Example
//!
//! ```
//! use sqlite_lint::{
//!     analyzer::SelectTreeAnalyzer,
//!     tree::{SqlDialect, parse_selects}
//! };
//!
//! let selects =
//!     parse_selects("SELECT * FROM t WHERE a = 1 AND b = 2", SqlDialect::SQLite, 64).unwrap();
//! let mut analyzer = SelectTreeAnalyzer::new(&selects[0]);
//! analyzer.process();
//!
//! assert!(analyzer.has_and());
//! assert_eq!(analyzer.and_column_groups()[0].as_slice(), ["a", "b"]);
//! ```

use std::collections::VecDeque;

use compact_str::CompactString;
use indexmap::IndexMap;
use serde::Serialize;
use smallvec::SmallVec;

use crate::tree::{Expr, Op, Select, SrcItem};

/// Columns joined by one top-level `AND` chain.
pub type ColumnGroup = SmallVec<[CompactString; 4]>;

/// Nesting depth walked before a subtree is skipped.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Snapshot of everything one analysis pass found.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Signals {
    pub has_using_or_on:    bool,
    pub has_bit_operation:  bool,
    pub has_fuzzy_matching: bool,
    pub has_and:            bool,
    pub has_or:             bool,
    pub has_in:             bool,
    pub and_column_groups:  Vec<ColumnGroup>,
    /// Tables referenced as direct sources, in first-seen order
    pub tables:             Vec<CompactString>,
    /// Source aliases mapped to the table they name
    pub aliases:            IndexMap<CompactString, CompactString>,
    pub truncated:          bool
}

impl Signals {
    /// Table a qualifier (alias or table name) refers to.
    pub fn resolve_table(&self, qualifier: &str) -> Option<&CompactString> {
        if let Some(table) = self.aliases.get(qualifier) {
            return Some(table);
        }
        self.tables
            .iter()
            .find(|t| t.eq_ignore_ascii_case(qualifier))
    }
}

/// Walks one statement tree and extracts index-worthiness and risk signals.
///
/// An analyzer is meant for a single [`process`](Self::process) call. A second
/// call walks the tree again, so flags stay set but table entries and column
/// groups are appended twice.
pub struct SelectTreeAnalyzer<'a> {
    root:                &'a Select,
    max_depth:           usize,
    depth:               usize,
    table_to_statements: IndexMap<CompactString, VecDeque<&'a Select>>,
    aliases:             IndexMap<CompactString, CompactString>,
    has_using_or_on:     bool,
    has_bit_operation:   bool,
    has_fuzzy_matching:  bool,
    has_and:             bool,
    has_or:              bool,
    has_in:              bool,
    and_column_groups:   Vec<ColumnGroup>,
    truncated:           bool
}

impl<'a> SelectTreeAnalyzer<'a> {
    pub fn new(root: &'a Select) -> Self {
        Self::with_max_depth(root, DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(root: &'a Select, max_depth: usize) -> Self {
        Self {
            root,
            max_depth,
            depth: 0,
            table_to_statements: IndexMap::new(),
            aliases: IndexMap::new(),
            has_using_or_on: false,
            has_bit_operation: false,
            has_fuzzy_matching: false,
            has_and: false,
            has_or: false,
            has_in: false,
            and_column_groups: Vec::new(),
            truncated: false
        }
    }

    /// Walk the whole tree reachable from the root statement.
    pub fn process(&mut self) {
        let root = self.root;
        self.process_select(root);
        tracing::trace!(
            tables = self.table_to_statements.len(),
            groups = self.and_column_groups.len(),
            truncated = self.truncated,
            "select tree processed"
        );
    }

    /// Remove and return the next statement that references `table`.
    ///
    /// Statements come back in the order the walk met them; once every
    /// occurrence has been popped the table yields `None`.
    pub fn pop_statement_for_table(&mut self, table: &str) -> Option<&'a Select> {
        let select = self
            .table_to_statements
            .get_mut(table)
            .and_then(VecDeque::pop_front);
        if select.is_none() {
            tracing::debug!(table, "no select tree left for table");
        }
        select
    }

    /// Tables indexed by the walk, in first-seen order.
    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.table_to_statements.keys().map(CompactString::as_str)
    }

    pub fn has_using_or_on(&self) -> bool {
        self.has_using_or_on
    }

    pub fn has_bit_operation(&self) -> bool {
        self.has_bit_operation
    }

    pub fn has_fuzzy_matching(&self) -> bool {
        self.has_fuzzy_matching
    }

    pub fn has_and(&self) -> bool {
        self.has_and
    }

    pub fn has_or(&self) -> bool {
        self.has_or
    }

    pub fn has_in(&self) -> bool {
        self.has_in
    }

    pub fn and_column_groups(&self) -> &[ColumnGroup] {
        &self.and_column_groups
    }

    /// Whether some subtree was skipped for exceeding the depth limit.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn signals(&self) -> Signals {
        Signals {
            has_using_or_on:    self.has_using_or_on,
            has_bit_operation:  self.has_bit_operation,
            has_fuzzy_matching: self.has_fuzzy_matching,
            has_and:            self.has_and,
            has_or:             self.has_or,
            has_in:             self.has_in,
            and_column_groups:  self.and_column_groups.clone(),
            tables:             self.table_to_statements.keys().cloned().collect(),
            aliases:            self.aliases.clone(),
            truncated:          self.truncated
        }
    }

    fn enter(&mut self) -> bool {
        if self.depth >= self.max_depth {
            self.truncated = true;
            return false;
        }
        self.depth += 1;
        true
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn process_select(&mut self, select: &'a Select) {
        if !self.enter() {
            return;
        }
        for cte in &select.ctes {
            self.process_select(cte);
        }
        if let Some(prior) = &select.prior {
            self.process_select(prior);
        }
        self.process_expr_list(&select.projection, None);
        if !select.from.is_empty() {
            self.process_src_list(&select.from, select);
        }
        if let Some(selection) = &select.selection {
            self.process_expr(selection, None);
        }
        self.process_expr_list(&select.group_by, None);
        self.process_expr_list(&select.order_by, None);
        if let Some(having) = &select.having {
            self.process_expr(having, None);
        }
        if let Some(limit) = &select.limit {
            self.process_expr(limit, None);
        }
        if let Some(offset) = &select.offset {
            self.process_expr(offset, None);
        }
        self.leave();
    }

    fn process_src_list(&mut self, list: &'a [SrcItem], owner: &'a Select) {
        for item in list {
            if let Some(name) = &item.name {
                self.table_to_statements
                    .entry(name.clone())
                    .or_default()
                    .push_back(owner);
                if let Some(alias) = &item.alias {
                    self.aliases.insert(alias.clone(), name.clone());
                }
            }
            if let Some(select) = &item.select {
                self.process_select(select);
            }
            if item.using.is_some() {
                self.has_using_or_on = true;
            }
            if let Some(on) = &item.on {
                self.has_using_or_on = true;
                self.process_expr(on, None);
            }
        }
    }

    fn process_expr_list(&mut self, list: &'a [Expr], parent: Option<Op>) {
        for expr in list {
            self.process_expr(expr, parent);
        }
    }

    /// `parent` is the operator of the node this one hangs from, if any.
    fn process_expr(&mut self, expr: &'a Expr, parent: Option<Op>) {
        if !self.enter() {
            return;
        }
        if let Some(left) = &expr.left {
            self.process_expr(left, Some(expr.op));
        }
        self.classify(expr, parent);
        if let Some(right) = &expr.right {
            self.process_expr(right, Some(expr.op));
        }
        if let Some(select) = &expr.select {
            self.process_select(select);
        }
        self.process_expr_list(&expr.list, Some(expr.op));
        self.leave();
    }

    fn classify(&mut self, expr: &Expr, parent: Option<Op>) {
        match expr.op {
            op if op.is_bitwise() => self.has_bit_operation = true,
            Op::Like => self.has_fuzzy_matching = true,
            // Only the top of a maximal AND chain collects; any non-AND
            // parent, NOT included, starts a new chain.
            Op::And if parent != Some(Op::And) => {
                let group = collect_and_chain(expr);
                if group.len() > 1 {
                    self.and_column_groups.push(group);
                    self.has_and = true;
                }
            }
            Op::Or => self.has_or = true,
            Op::In => self.has_in = true,
            _ => {}
        }
    }
}

/// Left operands of the comparisons joined by the `AND` chain rooted at
/// `root`, in left-to-right order. Unresolvable operands count as `""`.
fn collect_and_chain(root: &Expr) -> ColumnGroup {
    let mut group = ColumnGroup::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.op == Op::And {
            stack.extend(node.right.as_deref());
            stack.extend(node.left.as_deref());
        } else if node.op.is_index_comparison()
            && let Some(left) = &node.left
        {
            group.push(left.identifier());
        }
    }
    group
}
