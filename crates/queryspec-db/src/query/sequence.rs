//! Sequence operators shared by every in-memory code path.
//!
//! The in-memory evaluators and [`MemoryQueryProvider`](super::MemoryQueryProvider)
//! both run through these helpers, which is what makes query-mode and
//! in-memory results coincide. Each helper takes an `eval` callback that
//! invokes a lambda on one item, so the same code serves records and
//! projected values.

use std::collections::HashMap;

use queryspec_core::{SpecError, SpecResult};

use crate::expr::interpret::as_condition;
use crate::expr::Lambda;
use crate::value::Value;

/// Invokes a lambda on one item.
pub(crate) type Eval<'a, I> = &'a dyn Fn(&I, &Lambda) -> SpecResult<Value>;

/// Keeps the items for which `predicate` holds.
pub(crate) fn filter<I>(items: Vec<I>, predicate: &Lambda, eval: Eval<'_, I>) -> SpecResult<Vec<I>> {
    let mut kept = Vec::with_capacity(items.len());
    for item in items {
        if as_condition(eval(&item, predicate)?)? {
            kept.push(item);
        }
    }
    Ok(kept)
}

/// Stable multi-key sort. `keys` is `(key, descending)` from most to least
/// significant.
pub(crate) fn sort<I>(items: Vec<I>, keys: &[(&Lambda, bool)], eval: Eval<'_, I>) -> SpecResult<Vec<I>> {
    if keys.is_empty() {
        return Ok(items);
    }
    let mut keyed = items
        .into_iter()
        .map(|item| {
            let values = keys
                .iter()
                .map(|(key, _)| eval(&item, key))
                .collect::<SpecResult<Vec<_>>>()?;
            Ok((values, item))
        })
        .collect::<SpecResult<Vec<_>>>()?;

    keyed.sort_by(|(a, _), (b, _)| {
        keys.iter()
            .enumerate()
            .map(|(i, (_, descending))| {
                let ord = a[i].sort_cmp(&b[i]);
                if *descending {
                    ord.reverse()
                } else {
                    ord
                }
            })
            .find(|ord| ord.is_ne())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    Ok(keyed.into_iter().map(|(_, item)| item).collect())
}

/// Groups by key in first-appearance order and flattens the groups back,
/// keeping the original order inside each group.
pub(crate) fn group_flatten<I>(items: Vec<I>, key: &Lambda, eval: Eval<'_, I>) -> SpecResult<Vec<I>> {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<Vec<I>> = Vec::new();
    for item in items {
        let group_key = eval(&item, key)?.group_key()?;
        let slot = *slots.entry(group_key).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(item);
    }
    Ok(groups.into_iter().flatten().collect())
}

/// Appends one `select_many` result to `out`. A null contributes nothing.
pub(crate) fn flatten_selected(selected: Value, out: &mut Vec<Value>) -> SpecResult<()> {
    match selected {
        Value::List(list) => out.extend(list),
        Value::Null => {}
        other => {
            return Err(SpecError::Evaluation(format!(
                "select_many selector must return a list, got {}",
                other.type_name()
            )))
        }
    }
    Ok(())
}

/// Skips `skip` items and keeps at most `take` of the rest.
pub(crate) fn page<I>(items: Vec<I>, skip: usize, take: Option<usize>) -> Vec<I> {
    let rest = items.into_iter().skip(skip);
    match take {
        Some(n) => rest.take(n).collect(),
        None => rest.collect(),
    }
}
