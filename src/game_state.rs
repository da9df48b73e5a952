//! Game state: placement plus the bits of history that affect legality —
//! whose turn it is, castling rights, and the en passant target square.
//!
//! [`GameState`] is the crate's entry point: [`standard_start_position`]
//! builds one, [`GameState::valid_moves`] enumerates legal destinations for
//! a square, and [`GameState::make_move`]/[`GameState::undo_previous_move`]
//! apply and reverse moves.

use getset::CopyGetters;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::bitboard::Bitboard;
use crate::error::MoveError;
use crate::piece::{Piece, PieceColour, PieceType};
use crate::piece_placement::PiecePlacement;
use crate::square::Square;

/// A move from one square to another. Carries no information about what
/// piece is moving or what (if anything) it captures — that is derived from
/// the [`GameState`] the move is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move
{
    /// The square the moving piece starts on.
    pub from: Square,
    /// The square the moving piece ends on.
    pub to: Square,
}

impl Move
{
    /// Creates a new move.
    pub fn new(from: Square, to: Square) -> Self
    {
        Self { from, to }
    }
}

/// One side of the board, for castling bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CastleSide
{
    Kingside,
    Queenside,
}

/// Which rank is `colour`'s back rank.
fn back_rank(colour: PieceColour) -> u8
{
    match colour
    {
        PieceColour::White => 7,
        PieceColour::Black => 0,
    }
}

/// If `square` is one of the four rook home squares, the colour/side whose
/// castling right it gates.
fn home_square_right(square: Square) -> Option<(PieceColour, CastleSide)>
{
    match (square.rank, square.file)
    {
        (7, 7) => Some((PieceColour::White, CastleSide::Kingside)),
        (7, 0) => Some((PieceColour::White, CastleSide::Queenside)),
        (0, 7) => Some((PieceColour::Black, CastleSide::Kingside)),
        (0, 0) => Some((PieceColour::Black, CastleSide::Queenside)),
        _ => None,
    }
}

/// A snapshot of everything [`GameState::make_move`] can change, used both
/// to undo a move and to persist/restore a position. Deliberately excludes
/// the undo history itself, so it cannot nest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStateSnapshot
{
    placement: PiecePlacement,
    side_to_move: PieceColour,
    en_passant_target: Option<Square>,
    white_kingside_castle: bool,
    white_queenside_castle: bool,
    black_kingside_castle: bool,
    black_queenside_castle: bool,
}

/// A complete chess position plus enough history to undo moves.
///
/// Cloning a `GameState` clones its whole undo history too; most callers
/// that want a cheap "try a move and see" should use
/// [`GameState::make_move`] followed by [`GameState::undo_previous_move`]
/// rather than cloning.
#[derive(Debug, Clone, PartialEq, Eq, CopyGetters, Serialize, Deserialize)]
pub struct GameState
{
    placement: PiecePlacement,
    /// The colour whose turn it is to move.
    #[getset(get_copy = "pub")]
    side_to_move: PieceColour,
    /// The square a pawn just double-pushed past, capturable en passant
    /// this move only.
    #[getset(get_copy = "pub")]
    en_passant_target: Option<Square>,
    #[getset(get_copy = "pub")]
    white_kingside_castle: bool,
    #[getset(get_copy = "pub")]
    white_queenside_castle: bool,
    #[getset(get_copy = "pub")]
    black_kingside_castle: bool,
    #[getset(get_copy = "pub")]
    black_queenside_castle: bool,
    history: Vec<GameStateSnapshot>,
}

/// The standard chess starting position, white to move, all castling
/// rights intact, no en passant target.
pub fn standard_start_position() -> GameState
{
    GameState
    {
        placement: PiecePlacement::standard_start(),
        side_to_move: PieceColour::White,
        en_passant_target: None,
        white_kingside_castle: true,
        white_queenside_castle: true,
        black_kingside_castle: true,
        black_queenside_castle: true,
        history: Vec::new(),
    }
}

impl GameState
{
    /// The piece occupying `square`, if any.
    pub fn piece_at(&self, square: Square) -> Option<Piece>
    {
        self.placement.piece_at(square)
    }

    fn castle_right(&self, colour: PieceColour, side: CastleSide) -> bool
    {
        match (colour, side)
        {
            (PieceColour::White, CastleSide::Kingside) => self.white_kingside_castle,
            (PieceColour::White, CastleSide::Queenside) => self.white_queenside_castle,
            (PieceColour::Black, CastleSide::Kingside) => self.black_kingside_castle,
            (PieceColour::Black, CastleSide::Queenside) => self.black_queenside_castle,
        }
    }

    fn castle_right_mut(&mut self, colour: PieceColour, side: CastleSide) -> &mut bool
    {
        match (colour, side)
        {
            (PieceColour::White, CastleSide::Kingside) => &mut self.white_kingside_castle,
            (PieceColour::White, CastleSide::Queenside) => &mut self.white_queenside_castle,
            (PieceColour::Black, CastleSide::Kingside) => &mut self.black_kingside_castle,
            (PieceColour::Black, CastleSide::Queenside) => &mut self.black_queenside_castle,
        }
    }

    /// The destination square of a legal kingside castle for `colour`, if
    /// the right is held, the path is clear, and neither the king's start,
    /// transit, nor destination square is attacked.
    fn castle_kingside_target(&self, colour: PieceColour) -> Option<Square>
    {
        if !self.castle_right(colour, CastleSide::Kingside)
        {
            return None;
        }
        let rank = back_rank(colour);
        let rook_from = Square::new(rank, 7);
        if self.placement.piece_at(rook_from) != Some(Piece::new(colour, PieceType::Rook))
        {
            return None;
        }
        let transit = [Square::new(rank, 5), Square::new(rank, 6)];
        if transit.iter().any(|&sq| self.placement.piece_at(sq).is_some())
        {
            return None;
        }
        let king_path = [Square::new(rank, 4), Square::new(rank, 5), Square::new(rank, 6)];
        let opponent_attacks = self.placement.attacked_by(colour.opposite());
        if king_path.iter().any(|&sq| opponent_attacks.test(sq))
        {
            return None;
        }
        Some(Square::new(rank, 6))
    }

    /// As [`Self::castle_kingside_target`], for the queenside castle. The
    /// knight's-file square (file `b`) must be empty but need not be
    /// check-free; only the king's own path does.
    fn castle_queenside_target(&self, colour: PieceColour) -> Option<Square>
    {
        if !self.castle_right(colour, CastleSide::Queenside)
        {
            return None;
        }
        let rank = back_rank(colour);
        let rook_from = Square::new(rank, 0);
        if self.placement.piece_at(rook_from) != Some(Piece::new(colour, PieceType::Rook))
        {
            return None;
        }
        let must_be_empty = [Square::new(rank, 1), Square::new(rank, 2), Square::new(rank, 3)];
        if must_be_empty.iter().any(|&sq| self.placement.piece_at(sq).is_some())
        {
            return None;
        }
        let king_path = [Square::new(rank, 4), Square::new(rank, 3), Square::new(rank, 2)];
        let opponent_attacks = self.placement.attacked_by(colour.opposite());
        if king_path.iter().any(|&sq| opponent_attacks.test(sq))
        {
            return None;
        }
        Some(Square::new(rank, 2))
    }

    fn castle_targets(&self, colour: PieceColour) -> Bitboard
    {
        [self.castle_kingside_target(colour), self.castle_queenside_target(colour)]
            .into_iter()
            .flatten()
            .fold(Bitboard::EMPTY, |acc, square| acc.set(square))
    }

    /// Every square `from` could move to, ignoring whether the move would
    /// leave the mover's own king in check.
    fn pseudo_legal_destinations(&self, from: Square, piece: Piece) -> Bitboard
    {
        use crate::bitboard::Direction;

        match piece.piece_type
        {
            PieceType::Pawn => {
                let mut targets = self.placement.pawn_pushes(from, piece.colour) | self.placement.pawn_captures(from, piece.colour);
                if let Some(en_passant_target) = self.en_passant_target
                {
                    if PiecePlacement::pawn_capture_targets(from, piece.colour).test(en_passant_target)
                    {
                        targets = targets.set(en_passant_target);
                    }
                }
                targets
            }
            PieceType::Knight => self.placement.knight_moves(from, piece.colour),
            PieceType::Bishop => self.placement.sliding_moves(from, piece.colour, &Direction::DIAGONAL),
            PieceType::Rook => self.placement.sliding_moves(from, piece.colour, &Direction::CARDINAL),
            PieceType::Queen => self.placement.sliding_moves(from, piece.colour, &Direction::ALL),
            PieceType::King => self.placement.king_moves(from, piece.colour) | self.castle_targets(piece.colour),
        }
    }

    /// Applies a move's effect (including en passant capture and the
    /// castling rook hop) to a standalone placement, without touching
    /// `self`. Used both by the legality filter (on a throwaway clone) and
    /// by [`Self::make_move`] (on `self.placement`).
    fn apply_raw_move(placement: &mut PiecePlacement, from: Square, to: Square, piece: Piece, en_passant_target: Option<Square>)
    {
        if piece.piece_type == PieceType::Pawn && Some(to) == en_passant_target && from.file != to.file
        {
            let captured_square = Square::new(from.rank, to.file);
            placement.clear(captured_square);
        }
        if piece.piece_type == PieceType::King && Square::chebyshev_distance(from, to) == 2
        {
            let rank = from.rank;
            let (rook_from, rook_to) =
                if to.file > from.file { (Square::new(rank, 7), Square::new(rank, 5)) } else { (Square::new(rank, 0), Square::new(rank, 3)) };
            placement.relocate(rook_from, rook_to);
        }
        placement.relocate(from, to);
    }

    /// Whether moving `piece` from `from` to `to` is legal: it leaves the
    /// mover's own king safe from attack. `PiecePlacement` never calls this
    /// (or anything layered on top of it) — the legality filter lives here,
    /// one layer above attack generation, so the two cannot recurse into
    /// each other.
    fn is_legal(&self, from: Square, to: Square, piece: Piece) -> bool
    {
        let mut placement = self.placement;
        Self::apply_raw_move(&mut placement, from, to, piece, self.en_passant_target);
        let king_square = (placement.colour_board(piece.colour) & placement.type_board(PieceType::King))
            .single_square()
            .expect("the side to move always has exactly one king");
        !placement.attacked_by(piece.colour.opposite()).test(king_square)
    }

    /// The legal destination squares for the piece on `from`. Empty if
    /// `from` is empty or holds a piece of the side not to move.
    pub fn valid_moves(&self, from: Square) -> Bitboard
    {
        let Some(piece) = self.placement.piece_at(from) else
        {
            return Bitboard::EMPTY;
        };
        if piece.colour != self.side_to_move
        {
            return Bitboard::EMPTY;
        }
        self.pseudo_legal_destinations(from, piece)
            .squares()
            .filter(|&to| self.is_legal(from, to, piece))
            .fold(Bitboard::EMPTY, |acc, square| acc.set(square))
    }

    /// Whether moving the piece on `from` to `to` would be a promotion
    /// (a pawn reaching the back rank).
    pub fn is_promotion_move(&self, from: Square, to: Square) -> bool
    {
        match self.placement.piece_at(from)
        {
            Some(piece) if piece.piece_type == PieceType::Pawn => to.rank == PiecePlacement::pawn_promotion_rank(piece.colour),
            _ => false,
        }
    }

    fn snapshot(&self) -> GameStateSnapshot
    {
        GameStateSnapshot
        {
            placement: self.placement,
            side_to_move: self.side_to_move,
            en_passant_target: self.en_passant_target,
            white_kingside_castle: self.white_kingside_castle,
            white_queenside_castle: self.white_queenside_castle,
            black_kingside_castle: self.black_kingside_castle,
            black_queenside_castle: self.black_queenside_castle,
        }
    }

    fn restore(&mut self, snapshot: GameStateSnapshot)
    {
        self.placement = snapshot.placement;
        self.side_to_move = snapshot.side_to_move;
        self.en_passant_target = snapshot.en_passant_target;
        self.white_kingside_castle = snapshot.white_kingside_castle;
        self.white_queenside_castle = snapshot.white_queenside_castle;
        self.black_kingside_castle = snapshot.black_kingside_castle;
        self.black_queenside_castle = snapshot.black_queenside_castle;
    }

    /// Captures the current position (not the undo history) for
    /// persistence. Round-trip through [`Self::from_snapshot`].
    pub fn to_snapshot(&self) -> GameStateSnapshot
    {
        self.snapshot()
    }

    /// Rebuilds a `GameState` from a snapshot produced by
    /// [`Self::to_snapshot`], with an empty undo history.
    pub fn from_snapshot(snapshot: GameStateSnapshot) -> Self
    {
        GameState
        {
            placement: snapshot.placement,
            side_to_move: snapshot.side_to_move,
            en_passant_target: snapshot.en_passant_target,
            white_kingside_castle: snapshot.white_kingside_castle,
            white_queenside_castle: snapshot.white_queenside_castle,
            black_kingside_castle: snapshot.black_kingside_castle,
            black_queenside_castle: snapshot.black_queenside_castle,
            history: Vec::new(),
        }
    }

    /// Applies `mv`, requiring a promotion selection exactly when
    /// [`Self::is_promotion_move`] says one is needed. On `Err`, `self` is
    /// left completely unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError::FromEqualsTo`] if `mv.from == mv.to`,
    /// [`MoveError::NoPieceAtSource`] if `mv.from` is empty,
    /// [`MoveError::PromotionRequired`] if `mv` promotes and `promotion` is
    /// `None`, [`MoveError::InvalidPromotionSelection`] if `promotion` is
    /// `Some(Pawn)` or `Some(King)`, and [`MoveError::NotAPromotion`] if
    /// `promotion` is `Some` for a non-promoting move.
    ///
    /// Destination legality (`mv.to` must be in
    /// [`Self::valid_moves`]`(mv.from)`) is a precondition checked with
    /// `debug_assert!`, not an `Err` variant: callers are expected to only
    /// ever pass moves drawn from `valid_moves`.
    pub fn make_move(&mut self, mv: Move, promotion: Option<PieceType>) -> Result<(), MoveError>
    {
        if mv.from == mv.to
        {
            return Err(MoveError::FromEqualsTo(mv.from));
        }
        let piece = self.placement.piece_at(mv.from).ok_or(MoveError::NoPieceAtSource(mv.from))?;

        let is_promotion = self.is_promotion_move(mv.from, mv.to);
        match (is_promotion, promotion)
        {
            (true, None) => return Err(MoveError::PromotionRequired(mv.to)),
            (true, Some(piece_type)) if !piece_type.is_valid_promotion() => {
                return Err(MoveError::InvalidPromotionSelection(piece_type))
            }
            (false, Some(_)) => return Err(MoveError::NotAPromotion(mv.to)),
            _ => {}
        }

        debug_assert!(
            self.valid_moves(mv.from).test(mv.to),
            "make_move called with {mv:?}, which is not in valid_moves({:?})",
            mv.from
        );

        self.history.push(self.snapshot());

        let new_en_passant_target = if piece.piece_type == PieceType::Pawn && Square::chebyshev_distance(mv.from, mv.to) == 2
        {
            Some(Square::midpoint(mv.from, mv.to))
        }
        else
        {
            None
        };

        for square in [mv.from, mv.to]
        {
            if let Some((colour, side)) = home_square_right(square)
            {
                *self.castle_right_mut(colour, side) = false;
            }
        }
        if piece.piece_type == PieceType::King
        {
            *self.castle_right_mut(piece.colour, CastleSide::Kingside) = false;
            *self.castle_right_mut(piece.colour, CastleSide::Queenside) = false;
        }

        Self::apply_raw_move(&mut self.placement, mv.from, mv.to, piece, self.en_passant_target);
        if is_promotion
        {
            let promotion_type = promotion.expect("checked above");
            self.placement.set(mv.to, Piece::new(piece.colour, promotion_type));
            trace!("{:?} promoted to {:?} on {}", piece.colour, promotion_type, mv.to);
        }

        self.en_passant_target = new_en_passant_target;
        self.side_to_move = self.side_to_move.opposite();

        debug!("{:?} played {:?} -> {:?} ({:?})", piece.colour, mv.from, mv.to, piece.piece_type);
        Ok(())
    }

    /// Reverses the most recent [`Self::make_move`] call.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError::EmptyHistory`] if no move has been made (or
    /// every made move has already been undone).
    pub fn undo_previous_move(&mut self) -> Result<(), MoveError>
    {
        let snapshot = self.history.pop().ok_or(MoveError::EmptyHistory)?;
        self.restore(snapshot);
        trace!("undid last move, {} remaining in history", self.history.len());
        Ok(())
    }

    fn king_square(&self, colour: PieceColour) -> Square
    {
        (self.placement.colour_board(colour) & self.placement.type_board(PieceType::King))
            .single_square()
            .expect("every colour always has exactly one king")
    }

    /// The square the side to move's king is on.
    pub fn active_king_square(&self) -> Square
    {
        self.king_square(self.side_to_move)
    }

    /// Whether `colour`'s king is currently attacked, independent of whose
    /// turn it is.
    pub fn is_in_check(&self, colour: PieceColour) -> bool
    {
        self.placement.attacked_by(colour.opposite()).test(self.king_square(colour))
    }

    fn has_any_legal_move(&self) -> bool
    {
        self.placement.colour_board(self.side_to_move).squares().any(|square| !self.valid_moves(square).is_empty())
    }

    /// Whether the side to move is checkmated: in check, with no legal
    /// move.
    pub fn is_checkmate(&self) -> bool
    {
        self.is_in_check(self.side_to_move) && !self.has_any_legal_move()
    }

    /// Whether the side to move is stalemated: not in check, but with no
    /// legal move.
    pub fn is_stalemate(&self) -> bool
    {
        !self.is_in_check(self.side_to_move) && !self.has_any_legal_move()
    }
}
