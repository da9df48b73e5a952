//! A minimal interactive driver for exercising `chess_rules_engine` by hand.
//!
//! Reads moves as two algebraic squares separated by whitespace (`e2 e4`),
//! optionally followed by a promotion letter (`e7 e8 q`). Not a notation
//! parser in any generality — just enough glue to drive the engine from a
//! terminal and see `env_logger` output for each move.

use std::io::{self, BufRead, Write};

use chess_rules_engine::{standard_start_position, GameState, Move, MoveError, PieceType, Square};

fn parse_square(text: &str) -> Option<Square>
{
    let mut chars = text.chars();
    let file = chars.next()?;
    let rank = chars.next()?;
    if chars.next().is_some()
    {
        return None;
    }
    if !('a'..='h').contains(&file) || !('1'..='8').contains(&rank)
    {
        return None;
    }
    let file = file as u8 - b'a';
    let rank = rank as u8 - b'1';
    Some(Square::new(rank, file))
}

fn parse_promotion(text: &str) -> Option<PieceType>
{
    match text
    {
        "q" => Some(PieceType::Queen),
        "r" => Some(PieceType::Rook),
        "b" => Some(PieceType::Bishop),
        "n" => Some(PieceType::Knight),
        _ => None,
    }
}

fn print_board(state: &GameState)
{
    for rank in (0..8).rev()
    {
        for file in 0..8
        {
            let square = Square::new(rank, file);
            match state.piece_at(square)
            {
                Some(piece) => print!("{piece} "),
                None => print!(". "),
            }
        }
        println!();
    }
}

fn apply_line(state: &mut GameState, line: &str) -> Result<(), String>
{
    let mut tokens = line.split_whitespace();
    let from = tokens.next().and_then(parse_square).ok_or("expected a `from` square like e2")?;
    let to = tokens.next().and_then(parse_square).ok_or("expected a `to` square like e4")?;
    let promotion = match tokens.next()
    {
        Some(text) => Some(parse_promotion(text).ok_or("expected a promotion letter: q, r, b, or n")?),
        None => None,
    };
    state.make_move(Move::new(from, to), promotion).map_err(|err: MoveError| err.to_string())
}

fn main()
{
    env_logger::init();
    let mut state = standard_start_position();
    let stdin = io::stdin();
    print_board(&state);
    for line in stdin.lock().lines()
    {
        let line = match line
        {
            Ok(line) => line,
            Err(err) => {
                log::error!("failed to read a line: {err}");
                break;
            }
        };
        let line = line.trim();
        if line.is_empty()
        {
            continue;
        }
        if line == "undo"
        {
            if let Err(err) = state.undo_previous_move()
            {
                println!("{err}");
            }
        }
        else
        {
            match apply_line(&mut state, line)
            {
                Ok(()) => {}
                Err(message) => println!("{message}"),
            }
        }
        print_board(&state);
        if state.is_checkmate()
        {
            println!("checkmate, {:?} wins", state.side_to_move().opposite());
            break;
        }
        if state.is_stalemate()
        {
            println!("stalemate");
            break;
        }
        print!("> ");
        io::stdout().flush().ok();
    }
}
