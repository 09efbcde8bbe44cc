//! Change-tracking flags.

use queryspec_core::SpecResult;

use super::QueryEvaluator;
use crate::query::{Query, TrackingMode};
use crate::record::Record;
use crate::specification::Specification;

macro_rules! tracking_evaluator {
    ($(#[$doc:meta])* $name:ident, $label:literal, $flag:ident, $mode:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl<T: Record + 'static> QueryEvaluator<T> for $name {
            fn name(&self) -> &'static str {
                $label
            }

            fn is_criteria_evaluator(&self) -> bool {
                true
            }

            fn apply(&self, query: Query<T>, spec: &Specification<T>) -> SpecResult<Query<T>> {
                Ok(if spec.$flag() { query.with_tracking($mode) } else { query })
            }
        }
    };
}

tracking_evaluator!(
    /// Requests read-only results.
    AsNoTrackingEvaluator,
    "as_no_tracking",
    is_as_no_tracking,
    TrackingMode::NoTracking
);

tracking_evaluator!(
    /// Requests change-tracked results.
    AsTrackingEvaluator,
    "as_tracking",
    is_as_tracking,
    TrackingMode::Tracking
);

tracking_evaluator!(
    /// Requests read-only results with one instance per identity.
    AsNoTrackingWithIdentityResolutionEvaluator,
    "as_no_tracking_with_identity_resolution",
    is_as_no_tracking_with_identity_resolution,
    TrackingMode::NoTrackingWithIdentityResolution
);
