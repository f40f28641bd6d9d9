//! Standard algebraic notation, resolved against the legal moves of a position.

use crate::prelude::*;

/// Strips check/mate markers and annotation glyphs (`+`, `#`, `!`, `?`).
fn strip_suffixes(text: &str) -> &str {
    text.trim_end_matches(['+', '#', '!', '?'])
}

/// Resolves `text` (e.g. `Nf3`, `exd5`, `O-O`, `e8=Q`, `Rad1`) to the unique
/// legal move it names.
pub fn parse_san(position: &Position, text: &str) -> Result<Move, EngineError> {
    let san = strip_suffixes(text.trim());
    let invalid = || EngineError::InvalidMoveNotation(text.to_string());

    let mut legal = MoveBuffer::new();
    generate_legal_moves(position, &mut legal);

    let castle = match san {
        "O-O" | "0-0" => Some(MoveKind::CastleKingside),
        "O-O-O" | "0-0-0" => Some(MoveKind::CastleQueenside),
        _ => None,
    };
    if let Some(kind) = castle {
        return legal
            .iter()
            .find(|m| m.kind == kind)
            .copied()
            .ok_or_else(|| illegal(position, text));
    }

    let mut body = san;
    let piece = match body.chars().next() {
        Some(c @ ('N' | 'B' | 'R' | 'Q' | 'K')) => {
            body = &body[1..];
            Piece::from_char(c).map(|(piece, _)| piece).ok_or_else(invalid)?
        }
        Some('a'..='h') => Piece::Pawn,
        _ => return Err(invalid()),
    };

    // Promotion suffix, with or without '='
    let mut promotion = None;
    if let Some(last) = body.chars().last()
        && matches!(last, 'Q' | 'R' | 'B' | 'N')
    {
        promotion = Piece::from_char(last).map(|(p, _)| p);
        body = body[..body.len() - 1].trim_end_matches('=');
    }

    if body.len() < 2 || !body.is_ascii() {
        return Err(invalid());
    }
    let (qualifier, target) = body.split_at(body.len() - 2);
    let to: Square = target.parse()?;

    let mut from_file = None;
    let mut from_rank = None;
    for c in qualifier.chars() {
        match c {
            'a'..='h' => from_file = Some(c as usize - 'a' as usize),
            '1'..='8' => from_rank = Some(c as usize - '1' as usize),
            'x' | '-' => {}
            _ => return Err(invalid()),
        }
    }

    let mut candidates = legal.iter().filter(|m| {
        m.piece == piece
            && m.to == to
            && m.promotion == promotion
            && from_file.is_none_or(|f| m.from.col() == f)
            && from_rank.is_none_or(|r| m.from.row() == r)
    });

    match (candidates.next(), candidates.next()) {
        (Some(&mv), None) => Ok(mv),
        (Some(_), Some(_)) => Err(invalid()),
        (None, _) => Err(illegal(position, text)),
    }
}

fn illegal(position: &Position, text: &str) -> EngineError {
    EngineError::IllegalMove {
        mv: text.to_string(),
        fen: position.to_fen(),
    }
}

/// Renders a legal move in standard algebraic notation, without check markers.
pub fn to_san(position: &Position, mv: Move) -> String {
    match mv.kind {
        MoveKind::CastleKingside => return "O-O".to_string(),
        MoveKind::CastleQueenside => return "O-O-O".to_string(),
        _ => {}
    }

    let mut out = String::new();
    match mv.piece.san_letter() {
        Some(letter) => {
            out.push(letter);

            let mut legal = MoveBuffer::new();
            generate_legal_moves(position, &mut legal);
            let rivals: Vec<&Move> = legal
                .iter()
                .filter(|m| m.piece == mv.piece && m.to == mv.to && m.from != mv.from)
                .collect();
            if !rivals.is_empty() {
                let file_clash = rivals.iter().any(|m| m.from.col() == mv.from.col());
                let rank_clash = rivals.iter().any(|m| m.from.row() == mv.from.row());
                let square = mv.from.to_string();
                if !file_clash {
                    out.push_str(&square[..1]);
                } else if !rank_clash {
                    out.push_str(&square[1..]);
                } else {
                    out.push_str(&square);
                }
            }
        }
        None if mv.is_capture() => out.push_str(&mv.from.to_string()[..1]),
        None => {}
    }

    if mv.is_capture() {
        out.push('x');
    }
    out.push_str(&mv.to.to_string());
    if let Some(promo) = mv.promotion {
        out.push('=');
        out.push(promo.to_char(Side::White));
    }
    out
}
