//! Where the pieces are.
//!
//! [`PiecePlacement`] stores the board as eight bitboards: one per colour
//! and one per piece type. A square's occupant is the intersection of
//! whichever colour board and whichever type board both contain it — every
//! mutation keeps that intersection well-defined (each square is in at most
//! one colour board and at most one type board).

use serde::{Deserialize, Serialize};

use crate::bitboard::{Bitboard, Direction};
use crate::piece::{Piece, PieceColour, PieceType};
use crate::square::Square;

/// The placement of every piece on the board, as eight bitboards.
///
/// # Invariants
///
/// - `white` and `black` are disjoint.
/// - The six type boards (`pawns`, `knights`, ..., `kings`) are pairwise
///   disjoint.
/// - `white | black == pawns | knights | bishops | rooks | queens | kings`
///   (every occupied square has exactly one colour and exactly one type).
///
/// These are checked with `debug_assert!` after every mutator; they are
/// internal consistency checks, not user-facing validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PiecePlacement
{
    white: Bitboard,
    black: Bitboard,
    pawns: Bitboard,
    knights: Bitboard,
    bishops: Bitboard,
    rooks: Bitboard,
    queens: Bitboard,
    kings: Bitboard,
}

impl PiecePlacement
{
    /// An empty board.
    pub fn empty() -> Self
    {
        Self::default()
    }

    /// The standard chess starting position. White occupies ranks 6-7,
    /// black occupies ranks 0-1 (rank 7 is white's back rank, rank 0 is
    /// black's).
    pub fn standard_start() -> Self
    {
        let mut placement = Self::empty();
        let back_rank = [
            PieceType::Rook,
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Queen,
            PieceType::King,
            PieceType::Bishop,
            PieceType::Knight,
            PieceType::Rook,
        ];
        for (file, piece_type) in back_rank.into_iter().enumerate()
        {
            placement.set(Square::new(7, file as u8), Piece::new(PieceColour::White, piece_type));
            placement.set(Square::new(0, file as u8), Piece::new(PieceColour::Black, piece_type));
        }
        for file in 0..8
        {
            placement.set(Square::new(6, file), Piece::new(PieceColour::White, PieceType::Pawn));
            placement.set(Square::new(1, file), Piece::new(PieceColour::Black, PieceType::Pawn));
        }
        placement
    }

    fn check_invariants(&self)
    {
        debug_assert!(!self.white.test_any(self.black), "white and black occupy the same square");
        let type_boards = [self.pawns, self.knights, self.bishops, self.rooks, self.queens, self.kings];
        for (i, a) in type_boards.iter().enumerate()
        {
            for b in &type_boards[i + 1..]
            {
                debug_assert!(!a.test_any(*b), "two piece types occupy the same square");
            }
        }
        let by_colour = self.white | self.black;
        let by_type = self.pawns | self.knights | self.bishops | self.rooks | self.queens | self.kings;
        debug_assert_eq!(by_colour, by_type, "colour and type boards disagree on occupancy");
    }

    /// The bitboard of every square occupied by `colour`.
    pub fn colour_board(&self, colour: PieceColour) -> Bitboard
    {
        match colour
        {
            PieceColour::White => self.white,
            PieceColour::Black => self.black,
        }
    }

    /// The bitboard of every square occupied by a piece of `piece_type`,
    /// regardless of colour.
    pub fn type_board(&self, piece_type: PieceType) -> Bitboard
    {
        match piece_type
        {
            PieceType::Pawn => self.pawns,
            PieceType::Knight => self.knights,
            PieceType::Bishop => self.bishops,
            PieceType::Rook => self.rooks,
            PieceType::Queen => self.queens,
            PieceType::King => self.kings,
        }
    }

    /// The bitboard of every square occupied by `piece` exactly.
    pub fn piece_board(&self, piece: Piece) -> Bitboard
    {
        self.colour_board(piece.colour) & self.type_board(piece.piece_type)
    }

    /// Every occupied square, either colour.
    pub fn occupied(&self) -> Bitboard
    {
        self.white | self.black
    }

    /// The piece occupying `square`, if any.
    pub fn piece_at(&self, square: Square) -> Option<Piece>
    {
        let colour = self.colour_at(square)?;
        let piece_type = self.type_at(square)?;
        Some(Piece::new(colour, piece_type))
    }

    /// The colour occupying `square`, if any.
    pub fn colour_at(&self, square: Square) -> Option<PieceColour>
    {
        if self.white.test(square)
        {
            Some(PieceColour::White)
        }
        else if self.black.test(square)
        {
            Some(PieceColour::Black)
        }
        else
        {
            None
        }
    }

    /// The piece type occupying `square`, if any.
    pub fn type_at(&self, square: Square) -> Option<PieceType>
    {
        PieceType::ALL.into_iter().find(|&piece_type| self.type_board(piece_type).test(square))
    }

    fn type_board_mut(&mut self, piece_type: PieceType) -> &mut Bitboard
    {
        match piece_type
        {
            PieceType::Pawn => &mut self.pawns,
            PieceType::Knight => &mut self.knights,
            PieceType::Bishop => &mut self.bishops,
            PieceType::Rook => &mut self.rooks,
            PieceType::Queen => &mut self.queens,
            PieceType::King => &mut self.kings,
        }
    }

    fn colour_board_mut(&mut self, colour: PieceColour) -> &mut Bitboard
    {
        match colour
        {
            PieceColour::White => &mut self.white,
            PieceColour::Black => &mut self.black,
        }
    }

    /// Removes whatever piece (if any) occupies `square`.
    pub fn clear(&mut self, square: Square)
    {
        self.white = self.white.clear(square);
        self.black = self.black.clear(square);
        for piece_type in PieceType::ALL
        {
            let board = self.type_board_mut(piece_type);
            *board = board.clear(square);
        }
        self.check_invariants();
    }

    /// Places `piece` on `square`, clearing any prior occupant first.
    pub fn set(&mut self, square: Square, piece: Piece)
    {
        self.clear(square);
        *self.colour_board_mut(piece.colour) = self.colour_board_mut(piece.colour).set(square);
        *self.type_board_mut(piece.piece_type) = self.type_board_mut(piece.piece_type).set(square);
        self.check_invariants();
    }

    /// Moves whatever occupies `from` to `to`, overwriting (capturing)
    /// whatever occupied `to`. Does nothing if `from` is empty.
    pub fn relocate(&mut self, from: Square, to: Square)
    {
        if let Some(piece) = self.piece_at(from)
        {
            self.clear(from);
            self.set(to, piece);
        }
    }

    /// The squares a sliding piece on `square` attacks along `directions`,
    /// stopping at (and including) the first occupied square in each ray.
    /// Does not filter by colour; callers subtract their own occupancy to
    /// get legal destinations.
    ///
    /// Grows each ray one [`Bitboard::dilate`] step at a time: the newly
    /// dilated square is the step's "front", and the ray stops as soon as a
    /// step adds no new square (edge reached) or its front is occupied.
    pub fn sliding_attacks(&self, square: Square, directions: &[Direction]) -> Bitboard
    {
        let occupied = self.occupied();
        let mut attacks = Bitboard::EMPTY;
        for &direction in directions
        {
            let mut ray = Bitboard::from_square(square);
            loop
            {
                let dilated = ray.dilate(direction, 1);
                let front = dilated & !ray;
                if front.is_empty()
                {
                    break;
                }
                ray = dilated;
                attacks |= front;
                if front.test_any(occupied)
                {
                    break;
                }
            }
        }
        attacks
    }

    /// The squares a sliding piece on `square` may move to: attacked
    /// squares minus those occupied by its own colour.
    pub fn sliding_moves(&self, square: Square, colour: PieceColour, directions: &[Direction]) -> Bitboard
    {
        self.sliding_attacks(square, directions) & !self.colour_board(colour)
    }

    /// The fixed-shape attack set of a knight on `square` (ignoring
    /// occupancy).
    pub fn knight_attacks(square: Square) -> Bitboard
    {
        const HOPS: [(Direction, u8, Direction, u8); 8] = [
            (Direction::Up, 2, Direction::Right, 1),
            (Direction::Up, 2, Direction::Left, 1),
            (Direction::Down, 2, Direction::Right, 1),
            (Direction::Down, 2, Direction::Left, 1),
            (Direction::Right, 2, Direction::Up, 1),
            (Direction::Right, 2, Direction::Down, 1),
            (Direction::Left, 2, Direction::Up, 1),
            (Direction::Left, 2, Direction::Down, 1),
        ];
        let origin = Bitboard::from_square(square);
        HOPS.into_iter().fold(Bitboard::EMPTY, |acc, (d1, n1, d2, n2)| acc | origin.shift(d1, n1).shift(d2, n2))
    }

    /// The squares a knight on `square` may move to.
    pub fn knight_moves(&self, square: Square, colour: PieceColour) -> Bitboard
    {
        Self::knight_attacks(square) & !self.colour_board(colour)
    }

    /// The squares a king on `square` attacks (its eight neighbours,
    /// ignoring occupancy and check).
    pub fn king_attacks(square: Square) -> Bitboard
    {
        Bitboard::neighbours_all(square)
    }

    /// The squares a king on `square` may step to, ignoring castling and
    /// check (those live one layer up, in `GameState`).
    pub fn king_moves(&self, square: Square, colour: PieceColour) -> Bitboard
    {
        Self::king_attacks(square) & !self.colour_board(colour)
    }

    /// A pawn's forward direction for `colour`: white advances toward rank
    /// 0, black toward rank 7.
    pub fn pawn_forward(colour: PieceColour) -> Direction
    {
        match colour
        {
            PieceColour::White => Direction::Down,
            PieceColour::Black => Direction::Up,
        }
    }

    /// The rank a `colour` pawn starts on (where a double push is legal).
    pub fn pawn_start_rank(colour: PieceColour) -> u8
    {
        match colour
        {
            PieceColour::White => 6,
            PieceColour::Black => 1,
        }
    }

    /// The rank a `colour` pawn promotes on.
    pub fn pawn_promotion_rank(colour: PieceColour) -> u8
    {
        match colour
        {
            PieceColour::White => 0,
            PieceColour::Black => 7,
        }
    }

    /// The non-capturing forward pushes available to a pawn on `square`:
    /// one step, plus a second step from the start rank, both requiring an
    /// empty destination (and, for the double push, an empty intervening
    /// square).
    pub fn pawn_pushes(&self, square: Square, colour: PieceColour) -> Bitboard
    {
        let forward = Self::pawn_forward(colour);
        let occupied = self.occupied();
        let origin = Bitboard::from_square(square);
        let one_step = origin.shift(forward, 1);
        if one_step.test_any(occupied) || one_step.is_empty()
        {
            return Bitboard::EMPTY;
        }
        let mut pushes = one_step;
        if square.rank == Self::pawn_start_rank(colour)
        {
            let two_step = one_step.shift(forward, 1);
            if !two_step.is_empty() && !two_step.test_any(occupied)
            {
                pushes |= two_step;
            }
        }
        pushes
    }

    /// The diagonal squares a pawn on `square` could capture on, regardless
    /// of whether an enemy piece actually occupies them (en passant and
    /// real-occupancy filtering happen in `GameState`).
    pub fn pawn_capture_targets(square: Square, colour: PieceColour) -> Bitboard
    {
        let forward = Self::pawn_forward(colour);
        let origin = Bitboard::from_square(square);
        let diagonals = match forward
        {
            Direction::Down => [Direction::DownLeft, Direction::DownRight],
            Direction::Up => [Direction::UpLeft, Direction::UpRight],
            _ => unreachable!("pawn forward direction is always Up or Down"),
        };
        diagonals.into_iter().fold(Bitboard::EMPTY, |acc, dir| acc | origin.shift(dir, 1))
    }

    /// The squares a pawn on `square` actually attacks (captures including
    /// en passant), given the opponent's occupancy.
    pub fn pawn_captures(&self, square: Square, colour: PieceColour) -> Bitboard
    {
        Self::pawn_capture_targets(square, colour) & self.colour_board(colour.opposite())
    }

    /// Every square attacked by `colour`'s pieces. This is the attack-set
    /// layer: it never consults whether a move would leave either king in
    /// check, which is what lets `GameState`'s legality filter call this
    /// (to test if a simulated move leaves a king attacked) without the two
    /// layers recursing into each other.
    pub fn attacked_by(&self, colour: PieceColour) -> Bitboard
    {
        self.colour_board(colour).squares().fold(Bitboard::EMPTY, |acc, square| {
            let piece_type = self.type_at(square).expect("occupied square has a piece type");
            let attacks = match piece_type
            {
                PieceType::Pawn => Self::pawn_capture_targets(square, colour),
                PieceType::Knight => Self::knight_attacks(square),
                PieceType::Bishop => self.sliding_attacks(square, &Direction::DIAGONAL),
                PieceType::Rook => self.sliding_attacks(square, &Direction::CARDINAL),
                PieceType::Queen => self.sliding_attacks(square, &Direction::ALL),
                PieceType::King => Self::king_attacks(square),
            };
            acc | attacks
        })
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn standard_start_has_sixteen_pieces_per_side()
    {
        let placement = PiecePlacement::standard_start();
        assert_eq!(placement.colour_board(PieceColour::White).count(), 16);
        assert_eq!(placement.colour_board(PieceColour::Black).count(), 16);
        assert_eq!(placement.occupied().count(), 32);
    }

    #[test]
    fn standard_start_kings_on_correct_squares()
    {
        let placement = PiecePlacement::standard_start();
        assert_eq!(placement.piece_at(Square::new(7, 4)), Some(Piece::new(PieceColour::White, PieceType::King)));
        assert_eq!(placement.piece_at(Square::new(0, 4)), Some(Piece::new(PieceColour::Black, PieceType::King)));
    }

    #[test]
    fn set_then_clear_leaves_square_empty()
    {
        let mut placement = PiecePlacement::empty();
        let square = Square::new(3, 3);
        placement.set(square, Piece::new(PieceColour::White, PieceType::Queen));
        assert!(placement.piece_at(square).is_some());
        placement.clear(square);
        assert_eq!(placement.piece_at(square), None);
    }

    #[test]
    fn set_overwrites_prior_occupant_without_violating_invariants()
    {
        let mut placement = PiecePlacement::empty();
        let square = Square::new(3, 3);
        placement.set(square, Piece::new(PieceColour::White, PieceType::Queen));
        placement.set(square, Piece::new(PieceColour::Black, PieceType::Knight));
        assert_eq!(placement.piece_at(square), Some(Piece::new(PieceColour::Black, PieceType::Knight)));
        assert_eq!(placement.occupied().count(), 1);
    }

    #[test]
    fn relocate_moves_the_piece_and_captures_the_destination()
    {
        let mut placement = PiecePlacement::empty();
        let from = Square::new(1, 0);
        let to = Square::new(2, 0);
        placement.set(from, Piece::new(PieceColour::White, PieceType::Pawn));
        placement.set(to, Piece::new(PieceColour::Black, PieceType::Pawn));
        placement.relocate(from, to);
        assert_eq!(placement.piece_at(from), None);
        assert_eq!(placement.piece_at(to), Some(Piece::new(PieceColour::White, PieceType::Pawn)));
    }

    #[test]
    fn rook_on_empty_board_attacks_full_cross()
    {
        let mut placement = PiecePlacement::empty();
        let square = Square::new(3, 3);
        placement.set(square, Piece::new(PieceColour::White, PieceType::Rook));
        let moves = placement.sliding_moves(square, PieceColour::White, &Direction::CARDINAL);
        assert_eq!(moves.count(), 14);
    }

    #[test]
    fn rook_move_stops_at_first_blocker_and_excludes_own_piece()
    {
        let mut placement = PiecePlacement::empty();
        let rook_square = Square::new(0, 0);
        let own_blocker = Square::new(0, 3);
        placement.set(rook_square, Piece::new(PieceColour::White, PieceType::Rook));
        placement.set(own_blocker, Piece::new(PieceColour::White, PieceType::Pawn));
        let moves = placement.sliding_moves(rook_square, PieceColour::White, &Direction::CARDINAL);
        assert!(moves.test(Square::new(0, 2)));
        assert!(!moves.test(Square::new(0, 3)));
        assert!(!moves.test(Square::new(0, 4)));
    }

    #[test]
    fn rook_move_includes_capturable_enemy_blocker()
    {
        let mut placement = PiecePlacement::empty();
        let rook_square = Square::new(0, 0);
        let enemy = Square::new(0, 3);
        placement.set(rook_square, Piece::new(PieceColour::White, PieceType::Rook));
        placement.set(enemy, Piece::new(PieceColour::Black, PieceType::Pawn));
        let moves = placement.sliding_moves(rook_square, PieceColour::White, &Direction::CARDINAL);
        assert!(moves.test(Square::new(0, 2)));
        assert!(moves.test(enemy));
        assert!(!moves.test(Square::new(0, 4)));
    }

    #[test]
    fn knight_in_the_corner_has_two_moves()
    {
        let placement = PiecePlacement::empty();
        let moves = placement.knight_moves(Square::new(0, 0), PieceColour::White);
        assert_eq!(moves.count(), 2);
    }

    #[test]
    fn knight_in_the_centre_has_eight_moves()
    {
        let placement = PiecePlacement::empty();
        let moves = placement.knight_moves(Square::new(4, 4), PieceColour::White);
        assert_eq!(moves.count(), 8);
    }

    #[test]
    fn white_pawn_double_push_from_start_rank()
    {
        let mut placement = PiecePlacement::empty();
        let square = Square::new(6, 4);
        placement.set(square, Piece::new(PieceColour::White, PieceType::Pawn));
        let pushes = placement.pawn_pushes(square, PieceColour::White);
        assert!(pushes.test(Square::new(5, 4)));
        assert!(pushes.test(Square::new(4, 4)));
        assert_eq!(pushes.count(), 2);
    }

    #[test]
    fn pawn_push_blocked_by_any_piece_yields_no_moves()
    {
        let mut placement = PiecePlacement::empty();
        let square = Square::new(6, 4);
        placement.set(square, Piece::new(PieceColour::White, PieceType::Pawn));
        placement.set(Square::new(5, 4), Piece::new(PieceColour::Black, PieceType::Knight));
        let pushes = placement.pawn_pushes(square, PieceColour::White);
        assert!(pushes.is_empty());
    }

    #[test]
    fn pawn_double_push_blocked_by_intervening_piece()
    {
        let mut placement = PiecePlacement::empty();
        let square = Square::new(6, 4);
        placement.set(square, Piece::new(PieceColour::White, PieceType::Pawn));
        placement.set(Square::new(4, 4), Piece::new(PieceColour::Black, PieceType::Knight));
        let pushes = placement.pawn_pushes(square, PieceColour::White);
        assert_eq!(pushes, Bitboard::from_square(Square::new(5, 4)));
    }

    #[test]
    fn pawn_captures_only_occupied_enemy_diagonals()
    {
        let mut placement = PiecePlacement::empty();
        let square = Square::new(4, 4);
        placement.set(square, Piece::new(PieceColour::White, PieceType::Pawn));
        placement.set(Square::new(3, 5), Piece::new(PieceColour::Black, PieceType::Knight));
        placement.set(Square::new(3, 3), Piece::new(PieceColour::White, PieceType::Knight));
        let captures = placement.pawn_captures(square, PieceColour::White);
        assert_eq!(captures, Bitboard::from_square(Square::new(3, 5)));
    }
}
