//! Ordinal move resolution.
//!
//! FortiOS only understands relative moves (`before=<id>` / `after=<id>`).
//! A 1-based slot, `top` or `bottom` is translated into one of those by
//! reading the current order first. The order may change between that read
//! and the move itself; nothing here can prevent that.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, ValidationError};

/// Where to move an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovePosition {
    /// First slot.
    Top,
    /// Last slot.
    Bottom,
    /// Directly before a given reference.
    Before,
    /// Directly after a given reference.
    After,
    /// A 1-based slot; `len + 1` appends.
    Ordinal(i64),
}

impl fmt::Display for MovePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MovePosition::Top => f.write_str("top"),
            MovePosition::Bottom => f.write_str("bottom"),
            MovePosition::Before => f.write_str("before"),
            MovePosition::After => f.write_str("after"),
            MovePosition::Ordinal(n) => write!(f, "{n}"),
        }
    }
}

impl FromStr for MovePosition {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(MovePosition::Top),
            "bottom" => Ok(MovePosition::Bottom),
            "before" => Ok(MovePosition::Before),
            "after" => Ok(MovePosition::After),
            other => other.parse::<i64>().map(MovePosition::Ordinal).map_err(|_| {
                format!("invalid position '{s}': expected top, bottom, before, after, or a number")
            }),
        }
    }
}

/// Side of the reference entry the moved entry lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    Before,
    After,
}

impl Anchor {
    /// Query key used by the move action.
    pub fn as_str(self) -> &'static str {
        match self {
            Anchor::Before => "before",
            Anchor::After => "after",
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A relative move the device can execute.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveTarget {
    pub anchor: Anchor,
    pub reference: Value,
}

/// Translate `position` into a relative move.
///
/// `fetch_ordered` returns the identifiers of the collection in its current
/// order. It is only called for `Top`, `Bottom` and `Ordinal` positions.
///
/// # Errors
///
/// - [`ValidationError::InvalidPosition`] for ordinals below 1
/// - [`ValidationError::MissingReference`] for `Before`/`After` without a reference
/// - [`ValidationError::EmptyCollection`] when there is nothing to anchor to
/// - [`ValidationError::PositionOutOfRange`] for ordinals past `len + 1`
/// - whatever `fetch_ordered` returns
pub async fn resolve_move<F, Fut>(
    position: MovePosition,
    reference: Option<Value>,
    fetch_ordered: F,
) -> Result<MoveTarget>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<Value>>>,
{
    let relative = |anchor: Anchor| match reference.clone() {
        Some(reference) => Ok(MoveTarget { anchor, reference }),
        None => Err(ValidationError::MissingReference { anchor }),
    };

    let slot = match position {
        MovePosition::Before => return Ok(relative(Anchor::Before)?),
        MovePosition::After => return Ok(relative(Anchor::After)?),
        MovePosition::Ordinal(n) if n < 1 => {
            return Err(ValidationError::InvalidPosition { position: n }.into());
        }
        MovePosition::Top | MovePosition::Ordinal(1) => Slot::First,
        MovePosition::Bottom => Slot::Last,
        MovePosition::Ordinal(n) => Slot::Ordinal(n),
    };

    let collection = fetch_ordered().await?;
    let target = anchor_at(collection, slot)?;

    tracing::debug!(%position, anchor = %target.anchor, reference = %target.reference, "resolved move");
    Ok(target)
}

/// A position that needs the current order to resolve.
#[derive(Debug, Clone, Copy)]
enum Slot {
    First,
    Last,
    /// 1-based, at least 2.
    Ordinal(i64),
}

fn anchor_at(mut collection: Vec<Value>, slot: Slot) -> std::result::Result<MoveTarget, ValidationError> {
    let len = collection.len() as i64;
    if len == 0 {
        return Err(ValidationError::EmptyCollection);
    }

    let (anchor, index) = match slot {
        Slot::First => (Anchor::Before, 0),
        Slot::Last => (Anchor::After, len - 1),
        Slot::Ordinal(n) if n > len + 1 => {
            return Err(ValidationError::PositionOutOfRange {
                position: n,
                max: len + 1,
            });
        }
        Slot::Ordinal(n) if n > len => (Anchor::After, len - 1),
        Slot::Ordinal(n) => (Anchor::Before, n - 1),
    };

    Ok(MoveTarget {
        anchor,
        reference: collection.swap_remove(index as usize),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FortiError;
    use serde_json::json;
    use std::cell::Cell;

    fn three() -> Vec<Value> {
        vec![json!(10), json!(20), json!(30)]
    }

    async fn resolve(position: MovePosition, collection: Vec<Value>) -> Result<MoveTarget> {
        resolve_move(position, None, || async move { Ok::<_, FortiError>(collection) }).await
    }

    fn validation(err: FortiError) -> ValidationError {
        match err {
            FortiError::Validation(err) => err,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_first_slot_matches_top() {
        let top = resolve(MovePosition::Top, three()).await.unwrap();
        let first = resolve(MovePosition::Ordinal(1), three()).await.unwrap();
        assert_eq!(top, first);
        assert_eq!(top.anchor, Anchor::Before);
        assert_eq!(top.reference, json!(10));
    }

    #[tokio::test]
    async fn test_append_slot_matches_bottom() {
        let bottom = resolve(MovePosition::Bottom, three()).await.unwrap();
        let append = resolve(MovePosition::Ordinal(4), three()).await.unwrap();
        assert_eq!(bottom, append);
        assert_eq!(bottom.anchor, Anchor::After);
        assert_eq!(bottom.reference, json!(30));
    }

    #[tokio::test]
    async fn test_middle_slot_anchors_before_occupant() {
        let target = resolve(MovePosition::Ordinal(2), three()).await.unwrap();
        assert_eq!(
            target,
            MoveTarget {
                anchor: Anchor::Before,
                reference: json!(20),
            }
        );

        let target = resolve(MovePosition::Ordinal(3), three()).await.unwrap();
        assert_eq!(target.reference, json!(30));
        assert_eq!(target.anchor, Anchor::Before);
    }

    #[tokio::test]
    async fn test_single_entry_collection() {
        let one = || vec![json!(10)];

        let second = resolve(MovePosition::Ordinal(2), one()).await.unwrap();
        assert_eq!(second.anchor, Anchor::After);
        assert_eq!(second.reference, json!(10));

        let top = resolve(MovePosition::Top, one()).await.unwrap();
        assert_eq!(top.anchor, Anchor::Before);

        let err = resolve(MovePosition::Ordinal(3), one()).await.unwrap_err();
        assert_eq!(
            validation(err),
            ValidationError::PositionOutOfRange {
                position: 3,
                max: 2,
            }
        );
    }

    #[tokio::test]
    async fn test_past_append_slot_is_out_of_range() {
        let err = resolve(MovePosition::Ordinal(5), three()).await.unwrap_err();
        assert_eq!(
            validation(err),
            ValidationError::PositionOutOfRange {
                position: 5,
                max: 4,
            }
        );
    }

    #[tokio::test]
    async fn test_non_positive_positions_are_invalid_without_fetch() {
        let fetched = Cell::new(false);
        for n in [0, -1] {
            let err = resolve_move(MovePosition::Ordinal(n), None, || async {
                fetched.set(true);
                Ok::<_, FortiError>(three())
            })
            .await
            .unwrap_err();
            assert_eq!(
                validation(err),
                ValidationError::InvalidPosition { position: n }
            );
        }
        assert!(!fetched.get());
    }

    #[tokio::test]
    async fn test_empty_collection() {
        for position in [MovePosition::Top, MovePosition::Bottom, MovePosition::Ordinal(1)] {
            let err = resolve(position, vec![]).await.unwrap_err();
            assert_eq!(validation(err), ValidationError::EmptyCollection);
        }
    }

    #[tokio::test]
    async fn test_relative_moves_require_reference() {
        let err = resolve(MovePosition::Before, three()).await.unwrap_err();
        assert_eq!(
            validation(err),
            ValidationError::MissingReference {
                anchor: Anchor::Before
            }
        );

        let fetched = Cell::new(false);
        let target = resolve_move(MovePosition::After, Some(json!("web")), || async {
            fetched.set(true);
            Ok::<_, FortiError>(three())
        })
        .await
        .unwrap();
        assert_eq!(target.anchor, Anchor::After);
        assert_eq!(target.reference, json!("web"));
        assert!(!fetched.get());
    }

    #[tokio::test]
    async fn test_fetch_errors_propagate() {
        let err = resolve_move(MovePosition::Top, None, || async {
            Err::<Vec<Value>, _>(FortiError::ApiError {
                message: "internal".to_string(),
                status_code: Some(500),
                error_code: None,
            })
        })
        .await
        .unwrap_err();
        assert!(matches!(err, FortiError::ApiError { .. }));
    }

    #[test]
    fn test_position_parsing() {
        assert_eq!("top".parse::<MovePosition>(), Ok(MovePosition::Top));
        assert_eq!("Bottom".parse::<MovePosition>(), Ok(MovePosition::Bottom));
        assert_eq!("after".parse::<MovePosition>(), Ok(MovePosition::After));
        assert_eq!("3".parse::<MovePosition>(), Ok(MovePosition::Ordinal(3)));
        assert_eq!("0".parse::<MovePosition>(), Ok(MovePosition::Ordinal(0)));
        assert!("middle".parse::<MovePosition>().is_err());
    }
}
