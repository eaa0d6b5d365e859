use std::borrow::Cow;

use ndarray::ArrayView2;

use crate::metrics::{
    Averaging, ClassIndex, ClassLabel, MetricError, project, select_strategy, validate_shape,
};

use super::compile::{Node, Op, Program};

#[derive(Debug, Clone)]
enum Value<'a, L: Clone> {
    Labels(Cow<'a, [L]>),
    Scores(ArrayView2<'a, f64>),
    Classes(ClassIndex<L>),
    Averaging(Averaging),
    Score(f64),
    Unit,
}

pub(super) enum Input<'a, L> {
    Scores(ArrayView2<'a, f64>),
    Labels(&'a [L]),
}

/// Run a compiled program against one batch.
pub(super) fn run<'a, L: ClassLabel>(
    program: &Program,
    y_true: &'a [L],
    y_output: Input<'a, L>,
) -> Result<f64, MetricError> {
    let mut slots: Vec<Option<Value<'a, L>>> = vec![None; program.slot_count];
    slots[0] = Some(Value::Labels(Cow::Borrowed(y_true)));
    slots[1] = Some(match y_output {
        Input::Scores(scores) => Value::Scores(scores),
        Input::Labels(labels) => Value::Labels(Cow::Borrowed(labels)),
    });

    for step in &program.steps {
        let value = eval(&step.node, &slots)?;
        if let Some(target) = step.target {
            slots[target] = Some(value);
        }
    }
    match eval(&program.ret, &slots)? {
        Value::Score(score) => Ok(score),
        other => unreachable!("return type checked at load time, got {other:?}"),
    }
}

fn eval<'a, L: ClassLabel>(
    node: &Node,
    slots: &[Option<Value<'a, L>>],
) -> Result<Value<'a, L>, MetricError> {
    match node {
        Node::Slot(slot) => Ok(slots[*slot]
            .clone()
            .unwrap_or_else(|| unreachable!("slot {slot} read before assignment"))),
        Node::Averaging(averaging) => Ok(Value::Averaging(*averaging)),
        Node::Call { op, args } => {
            let args = args
                .iter()
                .map(|arg| eval(arg, slots))
                .collect::<Result<Vec<_>, _>>()?;
            apply(*op, args)
        }
    }
}

fn apply<'a, L: ClassLabel>(op: Op, args: Vec<Value<'a, L>>) -> Result<Value<'a, L>, MetricError> {
    let value = match (op, args.as_slice()) {
        (Op::Unique, [Value::Labels(labels)]) => Value::Classes(ClassIndex::resolve(&**labels)),
        (Op::CheckShape, [Value::Classes(classes), Value::Scores(scores)]) => {
            validate_shape(classes, *scores)?;
            Value::Unit
        }
        (Op::Project, [Value::Classes(classes), Value::Scores(scores)]) => {
            validate_shape(classes, *scores)?;
            Value::Labels(Cow::Owned(project(classes, *scores)))
        }
        (Op::Strategy, [Value::Classes(classes)]) => Value::Averaging(select_strategy(classes)),
        (Op::Stat(stat), [Value::Labels(y_true), Value::Labels(y_pred)]) => {
            Value::Score(stat.compute(&**y_true, &**y_pred, Averaging::Binary)?)
        }
        (
            Op::Stat(stat),
            [
                Value::Labels(y_true),
                Value::Labels(y_pred),
                Value::Averaging(averaging),
            ],
        ) => Value::Score(stat.compute(&**y_true, &**y_pred, *averaging)?),
        (op, args) => unreachable!("{op:?} applied to ill-typed arguments {args:?}"),
    };
    Ok(value)
}
