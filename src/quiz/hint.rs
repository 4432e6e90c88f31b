use crate::model::{HintLevel, Test};
use rand::Rng;
use rand::seq::SliceRandom;

pub const DEFAULT_HINT_PERCENTAGE: u32 = 30;
pub const DEFAULT_TRIES_BEFORE_REVEAL: u32 = 3;
pub const MASK: char = '_';

const STEP_PER_HINT: u32 = 15;
const MAX_PERCENTAGE: u32 = 80;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HintPolicy {
    None,
    Partial { percentage: u32 },
    FullAfterTries { tries: u32 },
}

impl HintPolicy {
    pub fn from_test(test: &Test) -> Self {
        match test.hint_level {
            HintLevel::None => HintPolicy::None,
            HintLevel::Partial => HintPolicy::Partial {
                percentage: test.hint_percentage.unwrap_or(DEFAULT_HINT_PERCENTAGE),
            },
            HintLevel::FullAfterTries => HintPolicy::FullAfterTries {
                tries: test
                    .hint_tries_before_reveal
                    .unwrap_or(DEFAULT_TRIES_BEFORE_REVEAL),
            },
        }
    }

    pub fn allows_requests(self) -> bool {
        matches!(self, HintPolicy::Partial { .. })
    }
}

pub fn effective_percentage(base_pct: u32, hints_used: u32) -> u32 {
    base_pct
        .saturating_add(STEP_PER_HINT.saturating_mul(hints_used))
        .min(MAX_PERCENTAGE)
}

/// Caracteres a destapar sobre `len` letras (sin contar espacios).
pub fn revealed_count(len: usize, base_pct: u32, hints_used: u32) -> usize {
    if len == 0 {
        return 0;
    }
    let pct = effective_percentage(base_pct, hints_used) as usize;
    (len * pct).div_ceil(100).clamp(1, len)
}

/// Pista parcial: la primera letra siempre, el resto al azar entre las que
/// no son espacio. Dos llamadas con el mismo `hints_used` destapan las mismas
/// cantidades pero no necesariamente las mismas posiciones.
pub fn partial_hint<R: Rng + ?Sized>(
    answer: &str,
    base_pct: u32,
    hints_used: u32,
    rng: &mut R,
) -> String {
    let chars: Vec<char> = answer.trim().chars().collect();
    let letters = chars.iter().filter(|c| !c.is_whitespace()).count();
    let quota = revealed_count(letters, base_pct, hints_used);
    if quota == 0 {
        return String::new();
    }

    let mut revealed = vec![false; chars.len()];
    revealed[0] = true;
    let candidates: Vec<usize> = (1..chars.len())
        .filter(|&i| !chars[i].is_whitespace())
        .collect();
    for &i in candidates.choose_multiple(rng, quota - 1) {
        revealed[i] = true;
    }

    chars
        .iter()
        .zip(revealed)
        .map(|(&c, shown)| match (c.is_whitespace(), shown) {
            (true, _) => ' ',
            (false, true) => c,
            (false, false) => MASK,
        })
        .collect()
}

pub fn full_hint(answer: &str, attempts: u32, tries: u32) -> Option<String> {
    (attempts >= tries).then(|| answer.trim().to_string())
}
