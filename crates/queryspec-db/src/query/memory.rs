//! An in-memory query backend.
//!
//! [`MemoryQueryProvider`] executes a [`Query`] against a vector of records
//! by folding its operations left to right. It ignores includes, tracking,
//! and cache hints, since in-memory records already carry their related data.

use queryspec_core::{SpecError, SpecResult};

use super::ast::{Query, QueryOp};
use super::sequence;
use crate::expr::Lambda;
use crate::record::Record;
use crate::value::{FromValue, Value};

/// Executes a translated query.
pub trait QueryProvider<T> {
    /// Runs `query` and returns the matching items.
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be executed by this provider.
    fn execute(&self, query: &Query<T>) -> SpecResult<Vec<T>>;
}

/// Executes queries over an owned set of records.
///
/// # Examples
///
/// ```
/// use queryspec_db::expr::Lambda;
/// use queryspec_db::query::{MemoryQueryProvider, Query, QueryProvider};
/// use queryspec_db::record::Row;
/// use queryspec_db::value::Value;
///
/// let rows: Vec<Row> = (1..=5).map(|n| Row::from_pairs([("n", Value::Int(n))])).collect();
/// let provider = MemoryQueryProvider::new(rows);
/// let q = Query::<Row>::new().filter(Lambda::new(|x| x.member("n").ge(4)));
/// assert_eq!(provider.execute(&q).unwrap().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct MemoryQueryProvider<T> {
    items: Vec<T>,
}

/// Ordering keys collected since the last `OrderBy`.
#[derive(Default)]
struct OrderState {
    keys: Vec<(Lambda, bool)>,
}

impl OrderState {
    fn primary(&mut self, key: &Lambda, descending: bool) {
        self.keys.clear();
        self.keys.push((key.clone(), descending));
    }

    fn secondary(&mut self, key: &Lambda, descending: bool) -> SpecResult<()> {
        if self.keys.is_empty() {
            return Err(SpecError::MissingPrimaryOrder);
        }
        self.keys.push((key.clone(), descending));
        Ok(())
    }

    fn sort<I>(&self, items: Vec<I>, eval: sequence::Eval<'_, I>) -> SpecResult<Vec<I>> {
        let keys: Vec<(&Lambda, bool)> = self.keys.iter().map(|(k, d)| (k, *d)).collect();
        sequence::sort(items, &keys, eval)
    }
}

fn eval_record<T: Record>(item: &T, lambda: &Lambda) -> SpecResult<Value> {
    lambda.invoke(item)
}

fn eval_value(item: &Value, lambda: &Lambda) -> SpecResult<Value> {
    lambda.invoke_with(item.clone())
}

/// Applies one non-projecting op.
fn apply_op<I>(
    items: Vec<I>,
    op: &QueryOp,
    order: &mut OrderState,
    eval: sequence::Eval<'_, I>,
) -> SpecResult<Vec<I>> {
    match op {
        QueryOp::Filter(predicate) => sequence::filter(items, predicate, eval),
        QueryOp::OrderBy { key, descending } => {
            order.primary(key, *descending);
            order.sort(items, eval)
        }
        QueryOp::ThenBy { key, descending } => {
            order.secondary(key, *descending)?;
            order.sort(items, eval)
        }
        QueryOp::GroupFlatten(key) => sequence::group_flatten(items, key, eval),
        QueryOp::Skip(n) => Ok(sequence::page(items, *n, None)),
        QueryOp::Take(n) => Ok(sequence::page(items, 0, Some(*n))),
        QueryOp::Select(_) | QueryOp::SelectMany(_) => Err(SpecError::Unsupported(
            "projection applied to an already projected sequence".to_string(),
        )),
    }
}

impl<T: Record + Clone> MemoryQueryProvider<T> {
    /// Creates a provider over `items`.
    pub const fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    /// Returns the backing items.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Runs a projected query, converting the selected values into `R`.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::Unsupported`] when the query has no projection,
    /// and propagates evaluation and conversion errors.
    pub fn execute_projected<R: FromValue>(&self, query: &Query<R>) -> SpecResult<Vec<R>> {
        let ops = query.ops();
        let (split, selector, flatten) = ops
            .iter()
            .enumerate()
            .find_map(|(i, op)| match op {
                QueryOp::Select(s) => Some((i, s, false)),
                QueryOp::SelectMany(s) => Some((i, s, true)),
                _ => None,
            })
            .ok_or_else(|| SpecError::Unsupported("query has no projection".to_string()))?;

        let mut order = OrderState::default();
        let mut records = self.items.clone();
        for op in &ops[..split] {
            records = apply_op(records, op, &mut order, &eval_record::<T>)?;
        }

        let mut values = Vec::with_capacity(records.len());
        for record in &records {
            let selected = selector.invoke(record)?;
            if flatten {
                sequence::flatten_selected(selected, &mut values)?;
            } else {
                values.push(selected);
            }
        }

        let mut order = OrderState::default();
        for op in &ops[split + 1..] {
            values = apply_op(values, op, &mut order, &eval_value)?;
        }
        values.iter().map(R::from_value).collect()
    }
}

impl<T: Record + Clone> QueryProvider<T> for MemoryQueryProvider<T> {
    fn execute(&self, query: &Query<T>) -> SpecResult<Vec<T>> {
        tracing::trace!(entity = query.entity(), ops = query.ops().len(), "Executing in-memory query");
        let mut order = OrderState::default();
        let mut items = self.items.clone();
        for op in query.ops() {
            items = apply_op(items, op, &mut order, &eval_record::<T>)?;
        }
        Ok(items)
    }
}
