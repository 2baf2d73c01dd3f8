//! CFG construction logic.
//!
//! Lowers one function's syntax tree into an annotated [`CfgGraph`]. The
//! walk is a single recursive pass: statements allocate nodes and wire
//! straight-line edges as they go, while conditionals and switches
//! introduce branch structure. Every variable reference lands in the def
//! or use set of the node under construction. Scope handling renames each
//! declared variable after the binding scope that owns it, so shadowed
//! names stay distinct for the whole analysis.

use tracing::{debug, trace, warn};

use crate::ast::{Decl, Expr, FunctionDef, LabelId, Ty};
use crate::cfg::types::{CfgGraph, NodeId, NodeKind, MAX_CASE_TARGETS, MAX_LABELS};
use crate::error::{ColdreadError, Result};
use crate::intern::{Interner, Sym};

/// Root scope identifier; nested scopes append `#<ordinal>` per level.
const ROOT_SCOPE: &str = "#0";

/// Role an expression plays at its point of use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    /// Whole statement: side-effecting expressions get their own node.
    Stmt,
    /// Left of an assignment: names become defs.
    Write,
    /// Everything else: names become uses.
    Read,
}

/// An open switch statement.
struct SwitchFrame {
    /// The switch head owning the case fan-out table.
    entry: NodeId,
    /// Where control continues after the switch.
    exit: NodeId,
    /// Label right after the switch, if any; gotos to it are breaks.
    exit_label: Option<LabelId>,
    /// Binding scope opening the switch body, once seen.
    bound_scope: Option<NodeId>,
    /// Whether a default case label was lowered.
    has_default: bool,
}

/// Everything lowering produces for one function.
#[derive(Debug)]
pub struct LoweredFunction {
    pub graph: CfgGraph,
    /// Interner holding every scope-renamed variable of the function.
    pub names: Interner,
    /// Gotos whose target label never appeared.
    pub unresolved_gotos: usize,
}

/// Per-function lowering context.
///
/// Owns the graph under construction plus the label and switch books
/// the walk needs: parked forward gotos, registered labels, and the
/// stack of open switch statements.
pub struct CfgBuilder {
    graph: CfgGraph,
    names: Interner,
    labels: Vec<(LabelId, NodeId)>,
    pending_gotos: Vec<(LabelId, NodeId)>,
    switches: Vec<SwitchFrame>,
}

impl CfgBuilder {
    fn new(function_name: &str) -> Self {
        CfgBuilder {
            graph: CfgGraph::new(function_name),
            names: Interner::new(),
            labels: Vec::new(),
            pending_gotos: Vec::new(),
            switches: Vec::new(),
        }
    }

    /// Lower a function body into its control-flow graph.
    ///
    /// # Arguments
    /// * `func` - The function definition to lower
    ///
    /// # Returns
    /// * `Result<LoweredFunction>` - Graph, interned names and goto stats
    ///
    /// # Errors
    /// * `ColdreadError::CaseOutsideSwitch` - Case label with no open switch
    /// * `ColdreadError::TooManyCaseTargets` - Switch fan-out table overflow
    /// * `ColdreadError::TooManyLabels` - Label or parked-goto table overflow
    /// * `ColdreadError::MalformedTree` - Tree violated frontend structure
    ///
    /// # Examples
    /// ```
    /// use coldread::ast::{Expr, FunctionDef};
    /// use coldread::cfg::CfgBuilder;
    ///
    /// let func = FunctionDef {
    ///     name: "f".to_string(),
    ///     body: Expr::bind(&["x"], Expr::ret(Some(Expr::name("x")))),
    /// };
    /// let lowered = CfgBuilder::lower_function(&func).unwrap();
    /// assert_eq!(lowered.unresolved_gotos, 0);
    /// ```
    pub fn lower_function(func: &FunctionDef) -> Result<LoweredFunction> {
        let mut builder = CfgBuilder::new(&func.name);
        let entry = builder.graph.add_node(NodeKind::Normal, "Entry");
        builder.graph.entry = entry;

        builder.lower(&func.body, None, entry, Role::Stmt, None)?;

        if !builder.pending_gotos.is_empty() {
            warn!(
                function = %func.name,
                unresolved = builder.pending_gotos.len(),
                "gotos with no matching label leave dangling edges"
            );
        }
        debug!(
            function = %func.name,
            nodes = builder.graph.len(),
            names = builder.names.len(),
            "lowered function body"
        );

        let unresolved_gotos = builder.pending_gotos.len();
        Ok(LoweredFunction {
            graph: builder.graph,
            names: builder.names,
            unresolved_gotos,
        })
    }

    /// Wire `to` as the straight successor of `from`. A goto keeps the
    /// successor it already jumped to; control never falls through it.
    fn link(&mut self, from: NodeId, to: NodeId) {
        let node = self.graph.node_mut(from);
        if node.kind != NodeKind::Goto {
            node.succ = Some(to);
        }
    }

    /// Expression in statement position gets its own node; in operand
    /// position its reads land on the node already under construction.
    fn stmt_node(&mut self, role: Role, prev: NodeId, info: &str) -> NodeId {
        if role == Role::Stmt {
            let node = self.graph.add_node(NodeKind::Normal, info);
            self.link(prev, node);
            node
        } else {
            prev
        }
    }

    /// Recursive lowering step.
    ///
    /// `next` is a one-statement lookahead inside statement lists; only
    /// switches consume it, to spot their trailing break label. `prev` is
    /// the node new statements chain onto, `scope` the innermost binding
    /// scope for name resolution.
    fn lower(
        &mut self,
        expr: &Expr,
        next: Option<&Expr>,
        prev: NodeId,
        role: Role,
        scope: Option<NodeId>,
    ) -> Result<NodeId> {
        match expr {
            Expr::Stmts(stmts) => {
                let mut current = prev;
                for (i, stmt) in stmts.iter().enumerate() {
                    current = self.lower(stmt, stmts.get(i + 1), current, Role::Stmt, scope)?;
                }
                Ok(current)
            }

            Expr::Convert(inner) | Expr::AddrOf(inner) => {
                self.lower(inner, next, prev, role, scope)
            }

            Expr::Bind { decls, body } => self.lower_bind(decls, body, prev, scope),

            Expr::Decl { name, init } => match init {
                Some(init) => {
                    let node = self.graph.add_node(NodeKind::Normal, "decl");
                    self.link(prev, node);
                    let sym = self.resolve_name(name, scope);
                    self.graph.node_mut(node).defs.insert(sym);
                    self.lower(init, None, node, Role::Read, scope)?;
                    Ok(node)
                }
                // Uninitialized declarations are already listed by their scope.
                None => Ok(prev),
            },

            Expr::Assign { target, value } => {
                let node = self.stmt_node(role, prev, "assign");
                self.lower(target, None, node, Role::Write, scope)?;
                self.lower(value, None, node, Role::Read, scope)?;
                Ok(node)
            }

            Expr::Cond {
                ty,
                cond,
                then_branch,
                else_branch,
            } => self.lower_cond(
                *ty,
                cond,
                then_branch.as_deref(),
                else_branch.as_deref(),
                prev,
                scope,
            ),

            Expr::Call { callee, args } => {
                let (node, arg_role) = if role == Role::Stmt {
                    let node = self
                        .graph
                        .add_node(NodeKind::Normal, format!("call {callee}"));
                    self.link(prev, node);
                    // scanf writes through every argument it receives.
                    let arg_role = if callee == "scanf" { Role::Write } else { Role::Read };
                    (node, arg_role)
                } else {
                    (prev, role)
                };
                for arg in args {
                    self.lower(arg, None, node, arg_role, scope)?;
                }
                Ok(node)
            }

            Expr::Return { value } => {
                let node = self.graph.add_node(NodeKind::Normal, "return");
                self.link(prev, node);
                if let Some(value) = value {
                    self.lower(value, None, node, Role::Read, scope)?;
                }
                Ok(node)
            }

            Expr::Seq { first, rest } => {
                self.lower(first, None, prev, Role::Read, scope)?;
                self.lower(rest, None, prev, Role::Read, scope)?;
                Ok(prev)
            }

            Expr::Switch { cond, body } => self.lower_switch(cond, body, next, prev, scope),

            Expr::Goto { target } => self.lower_goto(*target, prev),

            Expr::Label { id } => self.lower_label(*id, prev),

            Expr::Case { default } => self.lower_case(*default, prev),

            Expr::Unary { op, operand } => {
                let node = self.stmt_node(role, prev, op.as_str());
                self.lower(operand, None, node, Role::Read, scope)?;
                Ok(node)
            }

            Expr::Binary { op, lhs, rhs } => {
                let node = self.stmt_node(role, prev, op.as_str());
                self.lower(lhs, None, node, Role::Read, scope)?;
                self.lower(rhs, None, node, Role::Read, scope)?;
                Ok(node)
            }

            Expr::Name(name) => {
                match role {
                    Role::Write => {
                        let sym = self.resolve_name(name, scope);
                        self.graph.node_mut(prev).defs.insert(sym);
                    }
                    Role::Read => {
                        let sym = self.resolve_name(name, scope);
                        self.graph.node_mut(prev).uses.insert(sym);
                    }
                    // A bare identifier as a whole statement touches nothing.
                    Role::Stmt => {
                        trace!(identifier = name.as_str(), "bare identifier statement ignored");
                    }
                }
                Ok(prev)
            }

            Expr::Int(_) => Ok(prev),
        }
    }

    fn lower_bind(
        &mut self,
        decls: &[Decl],
        body: &Expr,
        prev: NodeId,
        scope: Option<NodeId>,
    ) -> Result<NodeId> {
        let head = self.graph.add_node(NodeKind::Bind, "BIND");
        let tail = self.graph.add_node(NodeKind::Normal, "BIND_END");
        self.link(prev, head);

        // A scope opening a switch body absorbs that switch's case
        // fan-out once the switch arm finishes (see lower_switch).
        if self.graph.node(prev).kind == NodeKind::Switch {
            if let Some(frame) = self.switches.last_mut() {
                if frame.entry == prev {
                    frame.bound_scope = Some(head);
                }
            }
        }

        self.graph.node_mut(head).decls = decls.iter().map(|decl| decl.name.clone()).collect();
        self.assign_scope_id(head, scope);

        let last = self.lower(body, None, head, Role::Stmt, Some(head))?;
        self.link(last, tail);
        Ok(tail)
    }

    /// The root scope gets [`ROOT_SCOPE`]; nested scopes append their
    /// ordinal under the parent, in the order they open.
    fn assign_scope_id(&mut self, bind: NodeId, parent: Option<NodeId>) {
        match parent {
            None => self.graph.node_mut(bind).scope_id = ROOT_SCOPE.to_string(),
            Some(parent) => {
                let ordinal = {
                    let parent_node = self.graph.node_mut(parent);
                    let ordinal = parent_node.child_count;
                    parent_node.child_count += 1;
                    ordinal
                };
                let scope_id = format!("{}#{}", self.graph.node(parent).scope_id, ordinal);
                let node = self.graph.node_mut(bind);
                node.scope_id = scope_id;
                node.parent_scope = Some(parent);
            }
        }
    }

    /// Resolve a bare identifier against the scope chain.
    ///
    /// The innermost scope declaring the name renames it to
    /// `name + scope_id + "-" + declaration index`, so every declaration
    /// site owns a distinct tracked name. Names no scope declares
    /// (parameters, globals) intern as-is.
    fn resolve_name(&mut self, name: &str, scope: Option<NodeId>) -> Sym {
        let mut cursor = scope;
        while let Some(bind) = cursor {
            let node = self.graph.node(bind);
            if let Some(index) = node.decls.iter().position(|decl| decl == name) {
                let renamed = format!("{}{}-{}", name, node.scope_id, index);
                return self.names.intern(&renamed);
            }
            cursor = node.parent_scope;
        }
        self.names.intern(name)
    }

    fn lower_cond(
        &mut self,
        ty: Ty,
        cond: &Expr,
        then_branch: Option<&Expr>,
        else_branch: Option<&Expr>,
        prev: NodeId,
        scope: Option<NodeId>,
    ) -> Result<NodeId> {
        // A conditional in value position evaluates all three parts for
        // their reads; only statement conditionals branch.
        if ty != Ty::Void {
            self.lower(cond, None, prev, Role::Read, scope)?;
            if let Some(then_branch) = then_branch {
                self.lower(then_branch, None, prev, Role::Read, scope)?;
            }
            if let Some(else_branch) = else_branch {
                self.lower(else_branch, None, prev, Role::Read, scope)?;
            }
            return Ok(prev);
        }

        let head = self.graph.add_node(NodeKind::If, "IF_BEG");
        let end = self.graph.add_node(NodeKind::Normal, "IF_END");
        self.link(prev, head);
        self.lower(cond, None, head, Role::Read, scope)?;

        if let Some(then_branch) = then_branch {
            let arm = self.graph.add_node(NodeKind::Normal, "IF_TRUE");
            let last = self.lower(then_branch, None, arm, Role::Stmt, scope)?;
            self.link(last, end);
            self.graph.node_mut(head).branch_true = Some(arm);
        }
        match else_branch {
            Some(else_branch) => {
                let arm = self.graph.add_node(NodeKind::Normal, "IF_FALSE");
                let last = self.lower(else_branch, None, arm, Role::Stmt, scope)?;
                self.link(last, end);
                self.graph.node_mut(head).branch_false = Some(arm);
            }
            None => self.graph.node_mut(head).branch_false = Some(end),
        }
        Ok(end)
    }

    fn lower_switch(
        &mut self,
        cond: &Expr,
        body: &Expr,
        next: Option<&Expr>,
        prev: NodeId,
        scope: Option<NodeId>,
    ) -> Result<NodeId> {
        let head = self.graph.add_node(NodeKind::Switch, "SWITCH_COND");
        let end = self.graph.add_node(NodeKind::Normal, "SWITCH_END");
        self.link(prev, head);

        // A label directly after the switch is its break target.
        let exit_label = match next {
            Some(Expr::Label { id }) => Some(*id),
            _ => None,
        };
        self.switches.push(SwitchFrame {
            entry: head,
            exit: end,
            exit_label,
            bound_scope: None,
            has_default: false,
        });

        self.lower(cond, None, head, Role::Read, scope)?;
        let last = self.lower(body, None, head, Role::Stmt, scope)?;
        self.link(last, end);

        let (has_default, bound_scope) = match self.switches.last() {
            Some(frame) if frame.entry == head => (frame.has_default, frame.bound_scope),
            _ => {
                return Err(ColdreadError::MalformedTree(
                    "switch context closed inside its own body",
                ))
            }
        };

        // Without a default case, control may skip every case.
        if !has_default {
            self.push_case_target(head, end)?;
        }

        // Hand the fan-out to the body scope; the switch then flows
        // into the scope, which fans out to the cases.
        if let Some(bind) = bound_scope {
            let cases = std::mem::take(&mut self.graph.node_mut(head).cases);
            self.graph.node_mut(head).succ = Some(bind);
            self.graph.node_mut(bind).cases = cases;
        }

        // A pending break target keeps the frame open until its label
        // statement shows up right after us.
        if exit_label.is_none() {
            self.switches.pop();
        }
        Ok(end)
    }

    /// Append one target to a switch head's fan-out table.
    fn push_case_target(&mut self, switch: NodeId, target: NodeId) -> Result<()> {
        let cases = &mut self.graph.node_mut(switch).cases;
        if cases.len() >= MAX_CASE_TARGETS {
            return Err(ColdreadError::TooManyCaseTargets {
                limit: MAX_CASE_TARGETS,
            });
        }
        cases.push(target);
        Ok(())
    }

    fn lower_goto(&mut self, target: LabelId, prev: NodeId) -> Result<NodeId> {
        let node = self
            .graph
            .add_node(NodeKind::Goto, format!("GOTO <L{}>", target.0));
        self.graph.node_mut(node).label_id = Some(target);
        self.link(prev, node);

        // A goto to the innermost break target is a break: jump straight
        // to the switch end, whose label may never materialize.
        match self.switches.last() {
            Some(frame) if frame.exit_label == Some(target) => {
                let exit = frame.exit;
                self.graph.node_mut(node).succ = Some(exit);
            }
            _ => self.record_goto(target, node)?,
        }
        Ok(node)
    }

    fn lower_label(&mut self, id: LabelId, prev: NodeId) -> Result<NodeId> {
        // The trailing break label of the innermost switch closes that
        // switch instead of materializing a node.
        if let Some(frame) = self.switches.last() {
            if frame.exit_label == Some(id) {
                self.switches.pop();
                return Ok(prev);
            }
        }

        let node = self.graph.add_node(NodeKind::Label, format!("<L{}>", id.0));
        self.graph.node_mut(node).label_id = Some(id);
        self.link(prev, node);
        self.record_label(id, node)?;
        Ok(node)
    }

    fn lower_case(&mut self, default: bool, prev: NodeId) -> Result<NodeId> {
        let entry = match self.switches.last_mut() {
            Some(frame) => {
                if default {
                    frame.has_default = true;
                }
                frame.entry
            }
            None => return Err(ColdreadError::CaseOutsideSwitch),
        };

        let node = self.graph.add_node(NodeKind::Normal, "CASE");
        self.push_case_target(entry, node)?;
        // Fallthrough from the previous case body.
        self.link(prev, node);
        Ok(node)
    }

    /// Wire a goto to an already-registered label, or park it.
    fn record_goto(&mut self, target: LabelId, node: NodeId) -> Result<()> {
        for &(id, label_node) in &self.labels {
            if id == target {
                self.graph.node_mut(node).succ = Some(label_node);
                return Ok(());
            }
        }
        if self.pending_gotos.len() >= MAX_LABELS {
            return Err(ColdreadError::TooManyLabels { limit: MAX_LABELS });
        }
        self.pending_gotos.push((target, node));
        Ok(())
    }

    /// Register a label and resolve every goto parked on it.
    fn record_label(&mut self, id: LabelId, node: NodeId) -> Result<()> {
        if self.labels.len() >= MAX_LABELS {
            return Err(ColdreadError::TooManyLabels { limit: MAX_LABELS });
        }
        self.labels.push((id, node));

        let graph = &mut self.graph;
        self.pending_gotos.retain(|&(target, goto_node)| {
            if target == id {
                graph.node_mut(goto_node).succ = Some(node);
                false
            } else {
                true
            }
        });
        Ok(())
    }
}
