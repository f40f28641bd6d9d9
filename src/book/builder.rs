//! Builds an [`OpeningBook`] from a corpus of games by counting how often
//! each continuation follows each move prefix.

use std::collections::HashMap;

use super::OpeningBook;
use crate::prelude::*;

const RESULT_TOKENS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];

#[derive(Debug, Default, Clone)]
struct PrefixStats {
    games: u32,
    next: Vec<(String, u32)>,
}

#[derive(Debug, Clone)]
pub struct BookBuilder {
    /// Deepest prefix (in plies) recorded
    pub max_depth: usize,
    /// Prefixes seen in fewer games are dropped
    pub min_games: u32,
    /// Continuations below this share of a prefix's games are dropped
    pub min_share: f64,
    prefixes: HashMap<Vec<String>, PrefixStats>,
    games_seen: usize,
    games_used: usize,
}

impl Default for BookBuilder {
    fn default() -> Self {
        Self {
            max_depth: 15,
            min_games: 3,
            min_share: 0.15,
            prefixes: HashMap::new(),
            games_seen: 0,
            games_used: 0,
        }
    }
}

impl BookBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one game given as SAN moves. Games under four plies are ignored.
    pub fn add_game<S: AsRef<str>>(&mut self, moves: &[S]) {
        self.games_seen += 1;
        if moves.len() < 4 {
            return;
        }
        self.games_used += 1;

        let moves: Vec<String> = moves
            .iter()
            .map(|m| m.as_ref().trim_end_matches(['+', '#', '!', '?']).to_string())
            .collect();

        // The empty prefix holds first moves
        self.record(&[], moves.first());
        for end in 1..=moves.len().min(self.max_depth) {
            self.record(&moves[..end], moves.get(end));
        }
    }

    /// Counts a game reaching `prefix`, whether or not it continues past it
    fn record(&mut self, prefix: &[String], next: Option<&String>) {
        let stats = self.prefixes.entry(prefix.to_vec()).or_default();
        stats.games += 1;
        let Some(next) = next else {
            return;
        };
        match stats.next.iter_mut().find(|(san, _)| san == next) {
            Some((_, count)) => *count += 1,
            None => stats.next.push((next.clone(), 1)),
        }
    }

    /// Records every game found in PGN text. Returns the number of games read.
    pub fn add_pgn(&mut self, pgn: &str) -> usize {
        let games = parse_pgn_games(pgn);
        for game in &games {
            self.add_game(game);
        }
        info!("Read {} games from PGN", games.len());
        games.len()
    }

    /// (games seen, games long enough to use)
    pub fn games(&self) -> (usize, usize) {
        (self.games_seen, self.games_used)
    }

    pub fn build(&self) -> OpeningBook {
        let mut book = OpeningBook::new();
        let mut dropped = 0;

        for (prefix, stats) in &self.prefixes {
            if stats.games < self.min_games {
                dropped += 1;
                continue;
            }
            let min_count = ((f64::from(stats.games) * self.min_share) as u32).max(1);
            let kept: Vec<(String, u32)> = stats
                .next
                .iter()
                .filter(|(_, count)| *count >= min_count)
                .cloned()
                .collect();
            if kept.is_empty() {
                dropped += 1;
                continue;
            }

            if let Err(e) = book.insert_line(prefix, &kept) {
                warn!("Corpus line '{}' skipped: {e}", prefix.join(" "));
            }
        }

        info!(
            "Built opening book: {} prefixes kept, {} dropped",
            book.len(),
            dropped
        );
        book
    }
}

/// Splits PGN text into games of SAN tokens. Tag pairs, comments, variations,
/// NAGs, move numbers and result tokens are removed.
pub fn parse_pgn_games(pgn: &str) -> Vec<Vec<String>> {
    let mut games = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut comment_depth = 0usize;
    let mut variation_depth = 0usize;

    let mut finish = |current: &mut Vec<String>| {
        if !current.is_empty() {
            games.push(std::mem::take(current));
        }
    };

    for line in pgn.lines() {
        let line = line.trim();
        if comment_depth == 0 && variation_depth == 0 && line.starts_with('[') {
            finish(&mut current);
            continue;
        }

        let mut token = String::new();
        let mut chars = line.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '{' => comment_depth += 1,
                '}' => comment_depth = comment_depth.saturating_sub(1),
                _ if comment_depth > 0 => {}
                ';' => break,
                '(' => variation_depth += 1,
                ')' => variation_depth = variation_depth.saturating_sub(1),
                _ if variation_depth > 0 => {}
                c if c.is_whitespace() => {
                    push_token(&mut token, &mut current, &mut finish);
                }
                c => {
                    token.push(c);
                    // "1.e4" carries the move number glued to the move
                    if c == '.' && chars.peek().is_some_and(|n| *n != '.') {
                        push_token(&mut token, &mut current, &mut finish);
                    }
                }
            }
        }
        push_token(&mut token, &mut current, &mut finish);
    }
    finish(&mut current);
    games
}

fn push_token(
    token: &mut String,
    current: &mut Vec<String>,
    finish: &mut impl FnMut(&mut Vec<String>),
) {
    let raw = std::mem::take(token);
    if raw.is_empty() || raw.starts_with('$') {
        return;
    }
    if RESULT_TOKENS.contains(&raw.as_str()) {
        finish(current);
        return;
    }
    // Move numbers: "12." or "12..."
    if raw.trim_end_matches('.').chars().all(|c| c.is_ascii_digit()) {
        return;
    }
    let san = raw.trim_end_matches(['+', '#', '!', '?']);
    if looks_like_san(san) {
        current.push(san.to_string());
    }
}

fn looks_like_san(san: &str) -> bool {
    matches!(san, "O-O" | "O-O-O" | "0-0" | "0-0-0")
        || (san.len() >= 2
            && san.starts_with(|c: char| matches!(c, 'a'..='h' | 'N' | 'B' | 'R' | 'Q' | 'K'))
            && san
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == 'x' || c == '='))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PGN: &str = r#"[Event "Casual"]
[White "A"]
[Black "B"]

1. e4 e5 2. Nf3 {main line} Nc6 3. Bb5 a6 (3... Nf6 4. O-O) 4. Ba4 1-0

[Event "Casual"]
[Result "0-1"]

1.e4 e5 2.Nf3 Nc6 3.Bc4 $1 Bc5 0-1

[Event "Casual"]

1. e4 c5 2. Nf3 d6 3. d4+ cxd4 1/2-1/2

[Event "Short"]

1. d4 d5 *
"#;

    #[test]
    fn test_pgn_parsing_strips_noise() {
        let games = parse_pgn_games(PGN);
        assert_eq!(games.len(), 4);
        assert_eq!(
            games[0],
            vec!["e4", "e5", "Nf3", "Nc6", "Bb5", "a6", "Ba4"]
        );
        assert_eq!(games[1], vec!["e4", "e5", "Nf3", "Nc6", "Bc4", "Bc5"]);
        assert_eq!(games[2][4], "d4");
        assert_eq!(games[3], vec!["d4", "d5"]);
    }

    #[test]
    fn test_short_games_are_ignored() {
        let mut builder = BookBuilder::new();
        assert_eq!(builder.add_pgn(PGN), 4);
        assert_eq!(builder.games(), (4, 3));
    }

    #[test]
    fn test_frequency_filters() {
        let mut builder = BookBuilder::new();
        for _ in 0..9 {
            builder.add_game(&["e4", "e5", "Nf3", "Nc6"]);
        }
        for _ in 0..4 {
            builder.add_game(&["e4", "c5", "Nf3", "d6"]);
        }
        // One-off below the 15% share
        builder.add_game(&["e4", "g6", "d4", "Bg7"]);
        builder.add_game(&["d4", "d5", "c4", "e6"]);

        let book = builder.build();
        let first = book.continuations(&[]);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].san, "e4");
        assert_eq!(first[0].weight, 14);

        let mut position = Position::new();
        position.try_uci_move("e2e4").unwrap();
        let replies: Vec<&str> = book
            .continuations(&position.played_moves())
            .iter()
            .map(|b| b.san.as_str())
            .collect();
        assert_eq!(replies, vec!["e5", "c5"]);

        // Seen in only one game
        position.try_uci_move("g7g6").unwrap();
        assert!(book.continuations(&position.played_moves()).is_empty());
    }

    #[test]
    fn test_depth_limit() {
        let mut builder = BookBuilder {
            max_depth: 2,
            min_games: 1,
            ..BookBuilder::new()
        };
        builder.add_game(&["e4", "e5", "Nf3", "Nc6"]);
        let book = builder.build();
        // First move, then prefixes of one and two plies
        assert_eq!(book.len(), 3);

        let mut position = Position::new();
        for mv in ["e2e4", "e7e5"] {
            position.try_uci_move(mv).unwrap();
        }
        let replies = book.continuations(&position.played_moves());
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].san, "Nf3");

        position.try_uci_move("g1f3").unwrap();
        assert!(book.continuations(&position.played_moves()).is_empty());
    }

    #[test]
    fn test_games_ending_at_a_prefix_still_count() {
        let mut builder = BookBuilder::new();
        builder.add_game(&["e4", "e5", "Nf3", "Nc6"]);
        builder.add_game(&["e4", "e5", "Nf3", "Nc6"]);
        builder.add_game(&["e4", "e5", "Nf3", "Nc6", "Bc4"]);

        let key: Vec<String> = ["e4", "e5", "Nf3", "Nc6"].map(String::from).to_vec();
        let stats = &builder.prefixes[&key];
        assert_eq!(stats.games, 3);
        assert_eq!(stats.next, vec![("Bc4".to_string(), 1)]);

        // Reaches min_games only through the games that stopped there
        let book = builder.build();
        let mut position = Position::new();
        for mv in ["e2e4", "e7e5", "g1f3", "b8c6"] {
            position.try_uci_move(mv).unwrap();
        }
        let replies = book.continuations(&position.played_moves());
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].san, "Bc4");
    }
}
