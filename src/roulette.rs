use std::fmt;

use rand::Rng;
use thiserror::Error;

/// The three pockets a bet can land on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Black,
    Green,
}

impl Color {
    pub const ALL: [Color; 3] = [Color::Red, Color::Black, Color::Green];

    /// Gross payout multiplier for a winning bet on this color.
    pub const fn multiplier(self) -> i64 {
        match self {
            Color::Red | Color::Black => 2,
            Color::Green => 14,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Color::Red => "Red",
            Color::Black => "Black",
            Color::Green => "Green",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Static multiplier table, one entry per color.
pub const MULTIPLIERS: [(Color, i64); 3] = [
    (Color::Red, Color::Red.multiplier()),
    (Color::Black, Color::Black.multiplier()),
    (Color::Green, Color::Green.multiplier()),
];

/// Legend lines for a multiplier table, colors sharing a payout on one line.
pub fn multiplier_legend(table: &[(Color, i64)]) -> Vec<String> {
    let mut groups: Vec<(Vec<&str>, i64)> = Vec::new();
    for (color, multiplier) in table {
        match groups.iter_mut().find(|(_, m)| m == multiplier) {
            Some((names, _)) => names.push(color.name()),
            None => groups.push((vec![color.name()], *multiplier)),
        }
    }
    groups
        .into_iter()
        .map(|(names, multiplier)| format!("{}: {}x", names.join("/"), multiplier))
        .collect()
}

/// Why a bet was refused before any spin happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BetRejection {
    #[error("Please enter a valid bet amount")]
    InvalidAmount,
    #[error("Insufficient balance")]
    InsufficientBalance,
    #[error("Please select a color")]
    NoColorSelected,
}

/// A wager that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BetRequest {
    pub amount: i64,
    pub chosen_color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpinOutcome {
    pub drawn_color: Color,
}

/// Settled result of one spin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub won: bool,
    /// Net winnings on a win, 0 on a loss.
    pub payout: i64,
    pub drawn_color: Color,
    pub stake: i64,
}

impl Resolution {
    /// Signed change to apply to the balance.
    pub fn balance_delta(&self) -> i64 {
        if self.won {
            self.payout
        } else {
            -self.stake
        }
    }
}

/// What the table shows after the last bet attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundResult {
    Settled(Resolution),
    Rejected(BetRejection),
}

/// How a result should be colored by whoever renders it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Pocket(Color),
    Warning,
}

impl RoundResult {
    pub fn tone(&self) -> Tone {
        match self {
            RoundResult::Settled(resolution) => Tone::Pocket(resolution.drawn_color),
            RoundResult::Rejected(_) => Tone::Warning,
        }
    }
}

impl fmt::Display for RoundResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundResult::Settled(r) if r.won => write!(
                f,
                "You won ${}! ({})",
                r.payout,
                r.drawn_color.name().to_uppercase()
            ),
            RoundResult::Settled(r) => write!(
                f,
                "You lost ${}! ({})",
                r.stake,
                r.drawn_color.name().to_uppercase()
            ),
            RoundResult::Rejected(reason) => write!(f, "{reason}"),
        }
    }
}

/// Checks a proposed wager against the current balance.
pub fn validate(
    amount: i64,
    chosen_color: Option<Color>,
    balance: i64,
) -> Result<BetRequest, BetRejection> {
    if amount <= 0 {
        return Err(BetRejection::InvalidAmount);
    }
    if amount > balance {
        return Err(BetRejection::InsufficientBalance);
    }
    let chosen_color = chosen_color.ok_or(BetRejection::NoColorSelected)?;
    Ok(BetRequest {
        amount,
        chosen_color,
    })
}

/// Uniform draw over the three colors.
pub fn draw<R: Rng>(rng: &mut R) -> SpinOutcome {
    let index = rng.gen_range(0..Color::ALL.len());
    SpinOutcome {
        drawn_color: Color::ALL[index],
    }
}

pub fn resolve(request: &BetRequest, drawn_color: Color) -> Resolution {
    let won = drawn_color == request.chosen_color;
    let payout = if won {
        request
            .amount
            .saturating_mul(drawn_color.multiplier())
            .saturating_sub(request.amount)
    } else {
        0
    };
    Resolution {
        won,
        payout,
        drawn_color,
        stake: request.amount,
    }
}
