//! Error types returned by [crate::game_state::GameState].

use thiserror::Error;

use crate::{PieceType, Square};

/// Errors returned when attempting to make or undo a move.
///
/// These are all precondition violations (programmer error), not semantic
/// rejections: an empty or wrong-colour `valid_moves` query returns an
/// empty set rather than an error. On any `Err` here, `GameState` is left
/// unchanged — the history push and subsequent mutation are only
/// performed once every precondition below has already passed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoveError
{
    /// `from` and `to` were the same square.
    #[error("move `from` and `to` were both {0}")]
    FromEqualsTo(Square),
    /// There was no piece on the `from` square.
    #[error("no piece at {0}")]
    NoPieceAtSource(Square),
    /// The destination requires a promotion selection and none was given.
    #[error("move to {0} is a promotion and requires a promotion piece type")]
    PromotionRequired(Square),
    /// A promotion selection of pawn or king was supplied.
    #[error("{0:?} is not a valid promotion target")]
    InvalidPromotionSelection(PieceType),
    /// A promotion selection was supplied for a move that is not a promotion.
    #[error("move to {0} is not a promotion, but a promotion piece type was supplied")]
    NotAPromotion(Square),
    /// [`undo_previous_move`](crate::GameState::undo_previous_move) was
    /// called with an empty history stack.
    #[error("no previous move to undo")]
    EmptyHistory,
}
