use polars::prelude::*;

use crate::error::PipelineError;
use crate::frame::require_column;

/// Suffix given to right-hand columns whose names clash with left-hand ones
pub const RIGHT_SUFFIX: &str = "_right";

/// Which unmatched rows a join keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// Only rows with a match on both sides
    Inner,
    /// Every left row; right columns are null where nothing matched
    Left,
    /// Every row from both sides, with key columns coalesced
    Outer,
}

impl JoinKind {
    fn args(self) -> JoinArgs {
        let (how, coalesce) = match self {
            JoinKind::Inner => (JoinType::Inner, JoinCoalesce::JoinSpecific),
            JoinKind::Left => (JoinType::Left, JoinCoalesce::JoinSpecific),
            JoinKind::Outer => (JoinType::Full, JoinCoalesce::CoalesceColumns),
        };
        JoinArgs {
            how,
            suffix: Some(RIGHT_SUFFIX.into()),
            coalesce,
            ..Default::default()
        }
    }
}

/// Join two frames on `(left_column, right_column)` key pairs.
///
/// Key columns must exist on both sides. Rows with a null key never match.
/// Row order of the result is unspecified; callers sort where it matters.
pub fn join(
    left: &DataFrame,
    right: &DataFrame,
    on: &[(&str, &str)],
    kind: JoinKind,
) -> Result<DataFrame, PipelineError> {
    for (left_key, right_key) in on {
        require_column(left, left_key)?;
        require_column(right, right_key)?;
    }

    let left_on: Vec<Expr> = on.iter().map(|(l, _)| col(*l)).collect();
    let right_on: Vec<Expr> = on.iter().map(|(_, r)| col(*r)).collect();

    let joined = left
        .clone()
        .lazy()
        .join(right.clone().lazy(), left_on, right_on, kind.args())
        .collect()?;
    Ok(joined)
}
