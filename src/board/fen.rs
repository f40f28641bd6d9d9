use crate::{error::EngineError, prelude::*};

/// Parses a FEN string.
///
/// Fields are validated one by one and each failure names the offending
/// field. Missing halfmove and fullmove fields default to `0 1`, which some
/// GUIs omit.
pub fn parse_fen(fen: &str) -> Result<Position, EngineError> {
    let parts: Vec<&str> = fen.split_whitespace().collect();
    if parts.len() != 6 && parts.len() != 4 {
        return Err(EngineError::fen(
            fen,
            format!("expected 6 fields, found {}", parts.len()),
        ));
    }

    let state = parse_placement(parts[0]).map_err(|reason| EngineError::fen(fen, reason))?;
    let stm = parse_stm(parts[1]).map_err(|reason| EngineError::fen(fen, reason))?;
    let castling_rights =
        parse_castle(parts[2]).map_err(|reason| EngineError::fen(fen, reason))?;
    let enpassant_square =
        parse_enpassant(parts[3]).map_err(|reason| EngineError::fen(fen, reason))?;

    let (halfmove_clock, fullmove_number) = if parts.len() == 6 {
        let half = parts[4]
            .parse::<u16>()
            .map_err(|e| EngineError::fen(fen, format!("halfmove clock '{}': {e}", parts[4])))?;
        let full = parts[5]
            .parse::<u16>()
            .map_err(|e| EngineError::fen(fen, format!("fullmove number '{}': {e}", parts[5])))?;
        (half, full.max(1))
    } else {
        (0, 1)
    };

    for side in Side::SIDES {
        let kings = state.piece_bb(side, Piece::King).pop_count();
        if kings != 1 {
            return Err(EngineError::fen(
                fen,
                format!("{side} has {kings} kings, expected exactly one"),
            ));
        }
    }

    let position = Position::from_parts(
        state,
        stm,
        castling_rights,
        enpassant_square,
        halfmove_clock,
        fullmove_number,
    );

    if position.is_in_check(stm.flip()) {
        return Err(EngineError::fen(
            fen,
            format!("{} is in check but it is {stm}'s move", stm.flip()),
        ));
    }

    Ok(position)
}

pub fn to_fen(position: &Position) -> String {
    let stm = match position.stm {
        Side::White => "w",
        Side::Black => "b",
    };
    let ep = position
        .enpassant_square
        .map(|sq| sq.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{} {stm} {} {ep} {} {}",
        position.state.to_fen_pieces(),
        position.castling_rights,
        position.halfmove_clock,
        position.fullmove_number
    )
}

fn parse_placement(placement: &str) -> Result<BoardState, String> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(format!("placement has {} ranks, expected 8", ranks.len()));
    }

    let mut state = BoardState::default();
    for (i, rank_str) in ranks.iter().enumerate() {
        let rank = 7 - i;
        let mut file = 0usize;
        for c in rank_str.chars() {
            if let Some(skip) = c.to_digit(10) {
                if !(1..=8).contains(&skip) {
                    return Err(format!("bad empty-square count '{c}'"));
                }
                file += skip as usize;
            } else {
                let (piece, side) =
                    Piece::from_char(c).ok_or_else(|| format!("unknown piece '{c}'"))?;
                if file >= 8 {
                    return Err(format!("rank {} overflows", rank + 1));
                }
                if piece == Piece::Pawn && (rank == 0 || rank == 7) {
                    return Err(format!("pawn on back rank {}", rank + 1));
                }
                state
                    .place(side, piece, rank * 8 + file)
                    .map_err(|e| e.to_string())?;
                file += 1;
            }
        }
        if file != 8 {
            return Err(format!("rank {} describes {file} files", rank + 1));
        }
    }
    Ok(state)
}

fn parse_stm(stm: &str) -> Result<Side, String> {
    match stm {
        "w" => Ok(Side::White),
        "b" => Ok(Side::Black),
        _ => Err(format!("invalid side to move '{stm}'")),
    }
}

fn parse_castle(castle: &str) -> Result<CastlingRights, String> {
    if castle == "-" {
        return Ok(CastlingRights::empty());
    }
    let mut rights = CastlingRights::empty();
    for c in castle.chars() {
        let bit = match c {
            'K' => CastlingRights::WHITE_00,
            'Q' => CastlingRights::WHITE_000,
            'k' => CastlingRights::BLACK_00,
            'q' => CastlingRights::BLACK_000,
            _ => return Err(format!("unexpected castling character '{c}'")),
        };
        rights.add_right(bit);
    }
    Ok(rights)
}

fn parse_enpassant(enpassant: &str) -> Result<Option<Square>, String> {
    if enpassant == "-" {
        return Ok(None);
    }
    let square: Square = enpassant.parse().map_err(|e: EngineError| e.to_string())?;
    if square.row() != 2 && square.row() != 5 {
        return Err(format!(
            "en passant square {square} must be on rank 3 or 6"
        ));
    }
    Ok(Some(square))
}
