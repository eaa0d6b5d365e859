//! Type checking and lowering of parsed source into an executable program.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::metrics::{Averaging, Statistic};

use super::super::{LoadError, OutputKind};
use super::parse::{Expr, Module, StatementKind};

/// Static type of a script value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Labels,
    Scores,
    Classes,
    Averaging,
    Score,
    Text,
    Unit,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueType::Labels => "labels",
            ValueType::Scores => "scores",
            ValueType::Classes => "classes",
            ValueType::Averaging => "averaging",
            ValueType::Score => "score",
            ValueType::Text => "text",
            ValueType::Unit => "nothing",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Op {
    Unique,
    CheckShape,
    Project,
    Strategy,
    Stat(Statistic),
}

struct Builtin {
    op: Op,
    params: &'static [ValueType],
    /// Trailing parameter that may be omitted.
    optional: Option<ValueType>,
    returns: ValueType,
}

fn builtin(name: &str) -> Option<Builtin> {
    use ValueType as T;
    fn sig(
        op: Op,
        params: &'static [ValueType],
        optional: Option<ValueType>,
        returns: ValueType,
    ) -> Builtin {
        Builtin {
            op,
            params,
            optional,
            returns,
        }
    }
    let found = match name {
        "unique" => sig(Op::Unique, &[T::Labels], None, T::Classes),
        "check_shape" => sig(Op::CheckShape, &[T::Classes, T::Scores], None, T::Unit),
        "project" => sig(Op::Project, &[T::Classes, T::Scores], None, T::Labels),
        "strategy" => sig(Op::Strategy, &[T::Classes], None, T::Averaging),
        "accuracy" => sig(
            Op::Stat(Statistic::Accuracy),
            &[T::Labels, T::Labels],
            None,
            T::Score,
        ),
        "recall" => sig(
            Op::Stat(Statistic::Recall),
            &[T::Labels, T::Labels],
            Some(T::Averaging),
            T::Score,
        ),
        "precision" => sig(
            Op::Stat(Statistic::Precision),
            &[T::Labels, T::Labels],
            Some(T::Averaging),
            T::Score,
        ),
        "f1" => sig(
            Op::Stat(Statistic::F1),
            &[T::Labels, T::Labels],
            Some(T::Averaging),
            T::Score,
        ),
        _ => return None,
    };
    Some(found)
}

/// Lowered expression.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum Node {
    Slot(usize),
    Averaging(Averaging),
    Call { op: Op, args: Vec<Node> },
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct Step {
    pub target: Option<usize>,
    pub node: Node,
}

/// Type-checked program. Slots 0 and 1 hold `y_true` and `y_output`.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Program {
    pub entry: String,
    pub output: OutputKind,
    pub slot_count: usize,
    pub steps: Vec<Step>,
    pub ret: Node,
}

struct Scope {
    names: HashMap<String, (usize, ValueType)>,
    /// `(classes slot, scores slot)` pairs that passed `check_shape`.
    checked_scores: HashSet<(usize, usize)>,
}

impl Scope {
    fn bind(&mut self, name: &str, ty: ValueType, line: usize) -> Result<usize, LoadError> {
        if self.names.contains_key(name) || builtin(name).is_some() {
            return Err(LoadError::Redefinition {
                line,
                name: name.to_string(),
            });
        }
        let slot = self.names.len();
        self.names.insert(name.to_string(), (slot, ty));
        Ok(slot)
    }
}

pub(super) fn compile(module: Module, output: OutputKind) -> Result<Program, LoadError> {
    let entry = module.entry;
    if entry.params.len() != 2 {
        return Err(LoadError::EntryPointArity {
            line: entry.line,
            found: entry.params.len(),
        });
    }
    let output_type = match output {
        OutputKind::Scores => ValueType::Scores,
        OutputKind::Predictions => ValueType::Labels,
    };
    let mut scope = Scope {
        names: HashMap::new(),
        checked_scores: HashSet::new(),
    };
    scope.bind(&entry.params[0], ValueType::Labels, entry.line)?;
    scope.bind(&entry.params[1], output_type, entry.line)?;

    let mut steps = Vec::new();
    let mut ret: Option<Node> = None;
    for statement in module.body {
        let line = statement.line;
        if ret.is_some() {
            return Err(LoadError::StatementAfterReturn { line });
        }
        match statement.kind {
            StatementKind::Assign { target, expr } => {
                let (node, ty) = lower(&expr, &mut scope, line)?;
                if ty == ValueType::Unit || ty == ValueType::Text {
                    return Err(LoadError::Syntax {
                        line,
                        message: format!("cannot assign {ty} to `{target}`"),
                    });
                }
                let slot = scope.bind(&target, ty, line)?;
                steps.push(Step {
                    target: Some(slot),
                    node,
                });
            }
            StatementKind::Expr(expr) => {
                let (node, _) = lower(&expr, &mut scope, line)?;
                steps.push(Step { target: None, node });
            }
            StatementKind::Return(expr) => {
                let (node, ty) = lower(&expr, &mut scope, line)?;
                if ty != ValueType::Score {
                    return Err(LoadError::ReturnType { line, found: ty });
                }
                ret = Some(node);
            }
        }
    }
    let ret = ret.ok_or(LoadError::MissingReturn)?;

    Ok(Program {
        entry: entry.name,
        output,
        slot_count: scope.names.len(),
        steps,
        ret,
    })
}

fn lower(expr: &Expr, scope: &mut Scope, line: usize) -> Result<(Node, ValueType), LoadError> {
    match expr {
        Expr::Ident(name) => scope
            .names
            .get(name)
            .map(|&(slot, ty)| (Node::Slot(slot), ty))
            .ok_or_else(|| LoadError::UndefinedVariable {
                line,
                name: name.clone(),
            }),
        // Only meaningful as an averaging argument; see `lower_arg`.
        Expr::Text(_) => Ok((Node::Averaging(Averaging::Binary), ValueType::Text)),
        Expr::Call { name, args } => {
            let signature = builtin(name).ok_or_else(|| LoadError::UnknownFunction {
                line,
                name: name.clone(),
            })?;
            let max = signature.params.len() + usize::from(signature.optional.is_some());
            if args.len() < signature.params.len() || args.len() > max {
                let expected = if max == signature.params.len() {
                    max.to_string()
                } else {
                    format!("{} or {}", signature.params.len(), max)
                };
                return Err(LoadError::ArgumentCount {
                    line,
                    function: name.clone(),
                    expected,
                    found: args.len(),
                });
            }

            let mut lowered = Vec::with_capacity(max);
            for (idx, arg) in args.iter().enumerate() {
                let expected = signature
                    .params
                    .get(idx)
                    .copied()
                    .or(signature.optional)
                    .unwrap_or(ValueType::Unit);
                lowered.push(lower_arg(arg, expected, name, idx + 1, scope, line)?);
            }

            match signature.op {
                Op::CheckShape => {
                    if let (Node::Slot(classes), Node::Slot(scores)) = (&lowered[0], &lowered[1]) {
                        scope.checked_scores.insert((*classes, *scores));
                    }
                }
                Op::Project => {
                    let checked = matches!(
                        (&lowered[0], &lowered[1]),
                        (Node::Slot(classes), Node::Slot(scores))
                            if scope.checked_scores.contains(&(*classes, *scores))
                    );
                    if !checked {
                        return Err(LoadError::UncheckedScores {
                            line,
                            name: describe(&args[1]),
                            classes: describe(&args[0]),
                        });
                    }
                }
                Op::Stat(_)
                    if signature.optional.is_some() && lowered.len() == signature.params.len() =>
                {
                    // Default averaging follows the classes found in the first argument.
                    lowered.push(Node::Call {
                        op: Op::Strategy,
                        args: vec![Node::Call {
                            op: Op::Unique,
                            args: vec![lowered[0].clone()],
                        }],
                    });
                }
                _ => {}
            }

            Ok((
                Node::Call {
                    op: signature.op,
                    args: lowered,
                },
                signature.returns,
            ))
        }
    }
}

fn lower_arg(
    arg: &Expr,
    expected: ValueType,
    function: &str,
    position: usize,
    scope: &mut Scope,
    line: usize,
) -> Result<Node, LoadError> {
    if let (Expr::Text(value), ValueType::Averaging) = (arg, expected) {
        return value
            .parse::<Averaging>()
            .map(Node::Averaging)
            .map_err(|_| LoadError::UnknownAveraging {
                line,
                value: value.clone(),
            });
    }
    let (node, found) = lower(arg, scope, line)?;
    if found != expected {
        return Err(LoadError::TypeMismatch {
            line,
            function: function.to_string(),
            position,
            expected,
            found,
        });
    }
    Ok(node)
}

fn describe(expr: &Expr) -> String {
    match expr {
        Expr::Ident(name) => name.clone(),
        Expr::Text(text) => format!("\"{text}\""),
        Expr::Call { name, .. } => format!("{name}(...)"),
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse::parse_module;
    use super::*;

    fn compile_src(source: &str, output: OutputKind) -> Result<Program, LoadError> {
        compile(parse_module(source)?, output)
    }

    const SCORES_SRC: &str = "\
def metric_generator(y_true, y_probas):
    classes = unique(y_true)
    check_shape(classes, y_probas)
    y_preds = project(classes, y_probas)
    return accuracy(y_true, y_preds)
";

    #[test]
    fn lowers_score_pipeline_into_slots() {
        let program = compile_src(SCORES_SRC, OutputKind::Scores).unwrap();
        assert_eq!(program.entry, "metric_generator");
        assert_eq!(program.slot_count, 4);
        assert_eq!(program.steps.len(), 3);
        assert_eq!(program.steps[0].target, Some(2));
        assert_eq!(program.steps[1].target, None);
        assert_eq!(
            program.ret,
            Node::Call {
                op: Op::Stat(Statistic::Accuracy),
                args: vec![Node::Slot(0), Node::Slot(3)]
            }
        );
    }

    #[test]
    fn declared_output_kind_types_second_parameter() {
        let err = compile_src(SCORES_SRC, OutputKind::Predictions).unwrap_err();
        assert_eq!(
            err,
            LoadError::TypeMismatch {
                line: 3,
                function: "check_shape".into(),
                position: 2,
                expected: ValueType::Scores,
                found: ValueType::Labels,
            }
        );
    }

    #[test]
    fn projecting_without_shape_check_is_rejected() {
        let src = "\
def g(y_true, y_probas):
    classes = unique(y_true)
    y_preds = project(classes, y_probas)
    return accuracy(y_true, y_preds)
";
        let err = compile_src(src, OutputKind::Scores).unwrap_err();
        assert_eq!(
            err,
            LoadError::UncheckedScores {
                line: 3,
                name: "y_probas".into(),
                classes: "classes".into()
            }
        );
    }

    #[test]
    fn projection_must_use_the_classes_the_shape_was_checked_against() {
        let src = "\
def g(y_true, y_probas):
    classes = unique(y_true)
    check_shape(classes, y_probas)
    seen = unique(project(classes, y_probas))
    return accuracy(y_true, project(seen, y_probas))
";
        let err = compile_src(src, OutputKind::Scores).unwrap_err();
        assert_eq!(
            err,
            LoadError::UncheckedScores {
                line: 5,
                name: "y_probas".into(),
                classes: "seen".into()
            }
        );

        let src = "\
def g(y_true, y_probas):
    classes = unique(y_true)
    check_shape(classes, y_probas)
    return accuracy(y_true, project(unique(y_true), y_probas))
";
        assert!(matches!(
            compile_src(src, OutputKind::Scores),
            Err(LoadError::UncheckedScores { line: 4, .. })
        ));
    }

    #[test]
    fn omitted_averaging_defaults_to_strategy_of_truth() {
        let src = "def g(y_true, y_preds):\n    return recall(y_true, y_preds)\n";
        let program = compile_src(src, OutputKind::Predictions).unwrap();
        let Node::Call { args, .. } = &program.ret else {
            panic!("expected call");
        };
        assert_eq!(
            args[2],
            Node::Call {
                op: Op::Strategy,
                args: vec![Node::Call {
                    op: Op::Unique,
                    args: vec![Node::Slot(0)]
                }]
            }
        );
    }

    #[test]
    fn averaging_literals_are_resolved_at_load_time() {
        let src = "def g(y_true, y_preds):\n    return f1(y_true, y_preds, \"macro\")\n";
        let program = compile_src(src, OutputKind::Predictions).unwrap();
        let Node::Call { args, .. } = &program.ret else {
            panic!("expected call");
        };
        assert_eq!(args[2], Node::Averaging(Averaging::Macro));

        let src = "def g(y_true, y_preds):\n    return f1(y_true, y_preds, \"weighted\")\n";
        assert_eq!(
            compile_src(src, OutputKind::Predictions).unwrap_err(),
            LoadError::UnknownAveraging {
                line: 2,
                value: "weighted".into()
            }
        );
    }

    #[test]
    fn entry_point_needs_two_parameters() {
        let src = "def g(y_true):\n    return accuracy(y_true, y_true)\n";
        assert_eq!(
            compile_src(src, OutputKind::Predictions).unwrap_err(),
            LoadError::EntryPointArity { line: 1, found: 1 }
        );
    }

    #[test]
    fn unknown_functions_and_names_are_rejected() {
        let src = "def g(a, b):\n    return auc(a, b)\n";
        assert!(matches!(
            compile_src(src, OutputKind::Predictions),
            Err(LoadError::UnknownFunction { line: 2, .. })
        ));
        let src = "def g(a, b):\n    return accuracy(a, c)\n";
        assert_eq!(
            compile_src(src, OutputKind::Predictions).unwrap_err(),
            LoadError::UndefinedVariable {
                line: 2,
                name: "c".into()
            }
        );
    }

    #[test]
    fn argument_count_is_checked() {
        let src = "def g(a, b):\n    return recall(a)\n";
        assert_eq!(
            compile_src(src, OutputKind::Predictions).unwrap_err(),
            LoadError::ArgumentCount {
                line: 2,
                function: "recall".into(),
                expected: "2 or 3".into(),
                found: 1
            }
        );
    }

    #[test]
    fn return_must_be_last_and_a_score() {
        let src = "def g(a, b):\n    return unique(a)\n";
        assert_eq!(
            compile_src(src, OutputKind::Predictions).unwrap_err(),
            LoadError::ReturnType {
                line: 2,
                found: ValueType::Classes
            }
        );
        let src = "def g(a, b):\n    return accuracy(a, b)\n    x = unique(a)\n";
        assert_eq!(
            compile_src(src, OutputKind::Predictions).unwrap_err(),
            LoadError::StatementAfterReturn { line: 3 }
        );
        let src = "def g(a, b):\n    x = unique(a)\n";
        assert_eq!(
            compile_src(src, OutputKind::Predictions).unwrap_err(),
            LoadError::MissingReturn
        );
    }

    #[test]
    fn names_bind_once() {
        let src = "def g(a, b):\n    a = unique(b)\n    return accuracy(a, b)\n";
        assert_eq!(
            compile_src(src, OutputKind::Predictions).unwrap_err(),
            LoadError::Redefinition {
                line: 2,
                name: "a".into()
            }
        );
    }
}
