//! Undefined-variable checks for conditions.
//!
//! Tera already fails on undefined variables in `{{ }}` output, `for` containers,
//! comparisons and math. Conditions are the exception: in `{% if x %}`, `a and b`,
//! `a or b` and `not x` an undefined name silently counts as false. This module walks
//! the parsed template and reports such names before anything is rendered.
//!
//! A name in a condition is accepted when it:
//! - exists in the render context (every dotted segment),
//! - is bound by `set` or `for`,
//! - carries a `default` filter, or
//! - is guarded by an `is defined` test that must hold for the condition to be
//!   evaluated (`x is defined and x.enabled`, or the body of `{% if x is defined %}`).
//!
//! Macro bodies are not checked.

use tera::Context as TeraContext;
use tera::ast::{Expr, ExprVal, LogicOperator, Node};

/// Magic variable Tera exposes in every template.
const TERA_CONTEXT: &str = "__tera_context";

/// Find the first variable used in a condition that is undefined in `context`.
pub(crate) fn undefined_condition_variable(ast: &[Node], context: &TeraContext) -> Option<String> {
    let mut checker = ConditionChecker {
        context,
        globals: Vec::new(),
        locals: Vec::new(),
        guards: Vec::new(),
    };
    checker.nodes(ast).err()
}

struct ConditionChecker<'a> {
    context: &'a TeraContext,
    /// `set_global` names
    globals: Vec<String>,
    /// `set` names and `for` variables, dropped when their loop ends
    locals: Vec<String>,
    /// Names proven defined by an enclosing condition
    guards: Vec<String>,
}

impl ConditionChecker<'_> {
    fn nodes(&mut self, nodes: &[Node]) -> Result<(), String> {
        nodes.iter().try_for_each(|node| self.node(node))
    }

    fn node(&mut self, node: &Node) -> Result<(), String> {
        match node {
            Node::VariableBlock(_, expr) => self.expr(expr, false),
            Node::Set(_, set) => {
                self.expr(&set.value, false)?;
                if set.global {
                    self.globals.push(set.key.clone());
                } else {
                    self.locals.push(set.key.clone());
                }
                Ok(())
            }
            Node::Forloop(_, forloop, _) => {
                self.expr(&forloop.container, false)?;

                let mark = self.locals.len();
                self.locals.extend(forloop.key.iter().cloned());
                self.locals.push(forloop.value.clone());
                self.locals.push("loop".to_string());
                let result = self.nodes(&forloop.body);
                self.locals.truncate(mark);
                result?;

                match &forloop.empty_body {
                    Some(body) => self.nodes(body),
                    None => Ok(()),
                }
            }
            Node::If(branches, _) => {
                // guards from earlier branches that must have been false
                let mut previous = Vec::new();
                for (_, condition, body) in &branches.conditions {
                    self.guarded(&previous, |checker| checker.expr(condition, true))?;

                    let mut in_branch = previous.clone();
                    in_branch.extend(defined_when(condition, true));
                    self.guarded(&in_branch, |checker| checker.nodes(body))?;

                    previous.extend(defined_when(condition, false));
                }
                match &branches.otherwise {
                    Some((_, body)) => self.guarded(&previous, |checker| checker.nodes(body)),
                    None => Ok(()),
                }
            }
            Node::FilterSection(_, section, _) => self.nodes(&section.body),
            Node::Block(_, block, _) => self.nodes(&block.body),
            _ => Ok(()),
        }
    }

    /// Check `expr`; `condition` marks a position Tera evaluates leniently.
    fn expr(&mut self, expr: &Expr, condition: bool) -> Result<(), String> {
        if expr.filters.iter().any(|filter| filter.name == "default") {
            return Ok(());
        }
        for filter in &expr.filters {
            filter.args.values().try_for_each(|arg| self.expr(arg, false))?;
        }

        match &expr.val {
            ExprVal::Ident(name) if condition => self.check(name),
            ExprVal::Logic(logic) => match logic.operator {
                LogicOperator::And | LogicOperator::Or => {
                    self.expr(&logic.lhs, true)?;
                    // `and` evaluates its right side only when the left is true, `or` only
                    // when it is false
                    let reached = defined_when(&logic.lhs, logic.operator == LogicOperator::And);
                    self.guarded(&reached, |checker| checker.expr(&logic.rhs, true))
                }
                _ => {
                    self.expr(&logic.lhs, false)?;
                    self.expr(&logic.rhs, false)
                }
            },
            ExprVal::Math(math) => {
                self.expr(&math.lhs, false)?;
                self.expr(&math.rhs, false)
            }
            ExprVal::In(within) => {
                self.expr(&within.lhs, false)?;
                self.expr(&within.rhs, false)
            }
            ExprVal::Test(test) => test.args.iter().try_for_each(|arg| self.expr(arg, false)),
            ExprVal::FunctionCall(call) => call.args.values().try_for_each(|arg| self.expr(arg, false)),
            ExprVal::MacroCall(call) => call.args.values().try_for_each(|arg| self.expr(arg, false)),
            ExprVal::Array(items) => items.iter().try_for_each(|item| self.expr(item, false)),
            _ => Ok(()),
        }
    }

    fn guarded<F>(&mut self, names: &[String], check: F) -> Result<(), String>
    where
        F: FnOnce(&mut Self) -> Result<(), String>,
    {
        let mark = self.guards.len();
        self.guards.extend(names.iter().cloned());
        let result = check(self);
        self.guards.truncate(mark);
        result
    }

    fn check(&self, name: &str) -> Result<(), String> {
        let bound = |names: &[String]| names.iter().any(|bound| covers(bound, name));
        if bound(&self.globals)
            || bound(&self.locals)
            || bound(&self.guards)
            || is_defined(self.context, name)
        {
            Ok(())
        } else {
            Err(name.to_string())
        }
    }
}

/// Names an expression proves defined when it evaluates to `outcome`.
fn defined_when(expr: &Expr, outcome: bool) -> Vec<String> {
    match &expr.val {
        ExprVal::Test(test) if test.name == "defined" || test.name == "undefined" => {
            let asserts_defined = ((test.name == "defined") != test.negated) != expr.negated;
            if asserts_defined == outcome {
                vec![test.ident.clone()]
            } else {
                Vec::new()
            }
        }
        ExprVal::Logic(logic) if !expr.negated => {
            let combines = match logic.operator {
                LogicOperator::And => outcome,
                LogicOperator::Or => !outcome,
                _ => false,
            };
            if combines {
                let mut names = defined_when(&logic.lhs, outcome);
                names.extend(defined_when(&logic.rhs, outcome));
                names
            } else {
                Vec::new()
            }
        }
        _ => Vec::new(),
    }
}

/// Whether a binding of `bound` makes `name` (itself or a path below it) available.
fn covers(bound: &str, name: &str) -> bool {
    name.strip_prefix(bound).is_some_and(|rest| rest.is_empty() || rest.starts_with(['.', '[']))
}

fn root_of(name: &str) -> &str {
    name.split(['.', '[']).next().unwrap_or(name)
}

/// Whether the dotted variable `name` resolves in `context`.
///
/// Bracket lookups (`env["X"]`, `items[i]`) are only checked up to the bracket; Tera
/// reports the rest at render time.
fn is_defined(context: &TeraContext, name: &str) -> bool {
    let root = root_of(name);
    if root == TERA_CONTEXT {
        return true;
    }
    let Some(mut current) = context.get(root) else {
        return false;
    };

    let path = &name[root.len()..];
    if path.starts_with('[') {
        return true;
    }

    for segment in path.split('.').skip(1) {
        if segment.contains('[') {
            return true;
        }
        current = match current {
            serde_json::Value::Object(map) => match map.get(segment) {
                Some(value) => value,
                None => return false,
            },
            serde_json::Value::Array(items) => match segment.parse::<usize>().ok().and_then(|i| items.get(i)) {
                Some(value) => value,
                None => return false,
            },
            _ => return false,
        };
    }
    true
}
