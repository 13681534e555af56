use std::fmt::{self, Display};
use std::str::FromStr;
use std::sync::OnceLock;
use regex::Regex;
use crate::error::{Error, Result};

/// Birth and survival conditions of a two-state Life-like rule.
///
/// Bit `n` of a mask is set when `n` live neighbors trigger the transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rule {
  birth: NeighborMask,
  survival: NeighborMask,
}

pub(crate) type NeighborMask = u16;

pub const GAME_OF_LIFE: Rule = Rule {
  birth: 0b000001000,
  survival: 0b000001100,
};

/// Number of distinct 4x4 neighborhoods handled by the base case.
pub(crate) const BASE_PATTERNS: usize = 1 << 16;

/// The four cells of a 4x4 square whose next state is fully determined by
/// the square, in the order NW, NE, SW, SE. Cell `(x, y)` is bit `y * 4 + x`.
const CENTER_CELLS: [(usize, usize); 4] = [(1, 1), (2, 1), (1, 2), (2, 2)];

impl Rule {
  pub fn new(birth: &[u8], survival: &[u8]) -> Result<Self> {
    let mut rule = Self::default();
    for &n in birth {
      rule.set_birth(n)?;
    }
    for &n in survival {
      rule.set_survival(n)?;
    }
    Ok(rule)
  }

  fn set_birth(&mut self, num: u8) -> Result<()> {
    if num > 8 {
      return Err(Error::Rule(format!("birth count {} out of range", num)));
    }
    if num == 0 {
      return Err(Error::Rule("B0 is not allowed for HashLife".to_owned()));
    }
    self.birth |= 1 << num;
    Ok(())
  }

  fn set_survival(&mut self, num: u8) -> Result<()> {
    if num > 8 {
      return Err(Error::Rule(format!("survival count {} out of range", num)));
    }
    self.survival |= 1 << num;
    Ok(())
  }

  pub fn birth(&self, neighbors: u32) -> bool {
    self.birth >> neighbors & 1 != 0
  }

  pub fn survival(&self, neighbors: u32) -> bool {
    self.survival >> neighbors & 1 != 0
  }

  pub fn next_state(&self, alive: bool, neighbors: u32) -> bool {
    if alive {
      self.survival(neighbors)
    } else {
      self.birth(neighbors)
    }
  }
}

static RULE_RE: OnceLock<Regex> = OnceLock::new();

impl FromStr for Rule {
  type Err = Error;

  /// Accepts `B<digits>/S<digits>`, `S<digits>/B<digits>` and the bare
  /// `<birth>/<survival>` form. The letters are case-insensitive.
  fn from_str(src: &str) -> Result<Self> {
    let re = RULE_RE.get_or_init(|| {
      Regex::new(r"(?i)^(?:B([0-9]+)/S([0-9]+)|S([0-9]+)/B([0-9]+)|([0-9]+)/([0-9]+))$").unwrap()
    });
    let caps = re.captures(src).ok_or_else(|| Error::format(src, 0))?;

    let pick = |ixs: [usize; 3]| {
      ixs.iter()
        .find_map(|&i| caps.get(i))
        .map(|m| m.as_str())
        .unwrap_or("")
    };
    let birth = pick([1, 4, 5]);
    let survival = pick([2, 3, 6]);

    let digits = |s: &str| s.bytes().map(|b| b - b'0').collect::<Vec<_>>();
    Rule::new(&digits(birth), &digits(survival))
  }
}

impl Display for Rule {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "B")?;
    let mut b = self.birth;
    while b != 0 {
      write!(f, "{}", b.trailing_zeros())?;
      b &= b - 1;
    }
    write!(f, "/S")?;
    let mut s = self.survival;
    while s != 0 {
      write!(f, "{}", s.trailing_zeros())?;
      s &= s - 1;
    }
    Ok(())
  }
}

/// For every 4x4 square, the state of its central 2x2 square one generation
/// later.
///
/// ```ignored
/// bit  3  2  1  0
///     SE SW NE NW
/// ```
pub(crate) fn compute_base_results(rule: Rule) -> Box<[u8]> {
  let masks = CENTER_CELLS.map(|(x, y)| neighborhood_mask(x, y));

  let mut result = vec![0u8; BASE_PATTERNS];
  for (i, out) in result.iter_mut().enumerate() {
    let bits = i as u16;
    for (j, &(x, y)) in CENTER_CELLS.iter().enumerate() {
      let alive = bits >> (y * 4 + x) & 1 != 0;
      let count = (bits & masks[j]).count_ones();
      if rule.next_state(alive, count) {
        *out |= 1 << j;
      }
    }
  }
  result.into_boxed_slice()
}

fn neighborhood_mask(x: usize, y: usize) -> u16 {
  let mut mask = 0;
  for ny in y - 1..=y + 1 {
    for nx in x - 1..=x + 1 {
      if (nx, ny) != (x, y) {
        mask |= 1 << (ny * 4 + nx);
      }
    }
  }
  mask
}
