//! Reading and writing Life patterns in the RLE format.
//!
//! RLE format: <https://www.conwaylife.com/wiki/Run_Length_Encoded>.

use std::sync::OnceLock;
use itertools::Itertools;
use regex::Regex;
use tracing::debug;
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::rule::{Rule, GAME_OF_LIFE};
use crate::universe::Universe;

const LINE_WIDTH: usize = 70;

static TOKEN_RE: OnceLock<Regex> = OnceLock::new();

/// A loaded pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
  pub universe: Universe,
  pub metadata: Metadata,
}

/// Information carried by the `#` lines of a pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
  /// `#N`
  pub name: Option<String>,
  /// `#O`
  pub author: Option<String>,
  /// `#C` and `#c`, in order of appearance.
  pub comments: Vec<String>,
}

/// Read a Life pattern from a RLE string.
///
/// The rule of the header line (B3/S23 when there is none) is installed in
/// `engine` before any cell is placed. The returned universe is at
/// generation 0 and has no history.
pub fn read(engine: &mut Engine, src: &str) -> Result<Pattern> {
  let token = TOKEN_RE.get_or_init(|| Regex::new(concat!(
    r"^\s*(?:",
    r"#(.)[ \t]*([^\r\n]*)|",
    r"(x[^\r\n]*)\r?\n|",
    r"([0-9\s]*)([bo$!])|",
    r"\r|\n",
    r")",
  )).unwrap());

  let mut metadata = Metadata::default();
  let mut universe: Option<Universe> = None;
  let (mut x, mut y) = (0i64, 0i64);
  let mut pos = 0;

  loop {
    let caps = match token.captures(&src[pos..]) {
      Some(caps) => caps,
      None => return Err(Error::format(src, pos)),
    };
    let start = pos;
    pos += caps.get(0).map_or(0, |m| m.end());

    if let Some(kind) = caps.get(1) {
      let text = caps.get(2).map_or("", |m| m.as_str()).trim_end().to_owned();
      match kind.as_str() {
        "N" => metadata.name = Some(text),
        "O" => metadata.author = Some(text),
        "C" | "c" => metadata.comments.push(text),
        _ => {}
      }
    } else if let Some(header) = caps.get(3) {
      let header = header.as_str().split_whitespace().join("");
      for attr in header.split(',') {
        let mut kv = attr.splitn(2, '=');
        if let (Some("rule"), Some(rule)) = (kv.next(), kv.next()) {
          engine.set_rule(rule.parse::<Rule>()?);
          universe = Some(Universe::new(engine));
        }
      }
    } else if let Some(op) = caps.get(5) {
      let mut u = match universe.take() {
        Some(u) => u,
        None => {
          engine.set_rule(GAME_OF_LIFE);
          Universe::new(engine)
        }
      };

      let digits = caps.get(4).map_or("", |m| m.as_str()).split_whitespace().join("");
      let len = if digits.is_empty() {
        1
      } else {
        match digits.parse::<i64>() {
          Ok(0) => 1,
          Ok(len) => len,
          Err(_) => return Err(Error::format(src, start)),
        }
      };
      let overflow = || Error::format(src, start);

      match op.as_str() {
        "o" => {
          for _ in 0..len {
            u = u.set(engine, x, y, true)?;
            x = x.checked_add(1).ok_or_else(overflow)?;
          }
        }
        "b" => x = x.checked_add(len).ok_or_else(overflow)?,
        "$" => {
          x = 0;
          y = y.checked_add(len).ok_or_else(overflow)?;
        }
        _ => {
          let universe = finish(engine, u);
          debug!(
            name = ?metadata.name,
            population = universe.population(),
            rule = %engine.rule(),
            "pattern loaded"
          );
          return Ok(Pattern { universe, metadata });
        }
      }
      universe = Some(u);
    }
  }
}

fn finish(engine: &mut Engine, universe: Universe) -> Universe {
  let (cx, cy) = universe.center();
  let (root, cx, cy) = engine.store.shrink(universe.root(), cx, cy);
  Universe::with_root(&engine.store, root, cx, cy, 0, None)
}

/// Write a Life pattern to a RLE string.
///
/// RLE format: <https://www.conwaylife.com/wiki/Run_Length_Encoded>.
pub fn write(engine: &Engine, universe: &Universe) -> String {
  let bbox = universe.bounding_box(engine);
  let mut output = format!(
    "x = {}, y = {}, rule = {}\n", bbox.width(), bbox.height(), engine.rule());

  let rows = universe.cells(engine).into_iter()
    .map(|(x, y)| (y, x))
    .into_group_map();

  let mut last_row = bbox.north;
  for (y, xs) in rows.into_iter().sorted_by_key(|&(y, _)| y) {
    if y > last_row {
      RleUnit::NextRow.write((y - last_row) as u64, &mut output);
    }
    last_row = y;

    let mut x = bbox.west;
    let runs = xs.into_iter()
      .sorted()
      .enumerate()
      .group_by(|&(i, cx)| cx - i as i64);
    for (_, run) in &runs {
      let run = run.map(|(_, cx)| cx).collect_vec();
      let start = run[0];
      if start > x {
        RleUnit::Dead.write((start - x) as u64, &mut output);
      }
      RleUnit::Alive.write(run.len() as u64, &mut output);
      x = start + run.len() as i64;
    }
  }

  RleUnit::End.write(1, &mut output);
  output.push('\n');
  output
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum RleUnit {
  Dead,
  Alive,
  NextRow,
  End,
}

impl RleUnit {
  fn write(&self, num: u64, s: &mut String) {
    let c = match self {
      Self::Dead => 'b',
      Self::Alive => 'o',
      Self::NextRow => '$',
      Self::End => '!',
    };

    let buf = if num == 1 {
      c.to_string()
    } else {
      format!("{}{}", num, c)
    };

    let line_start = s.rfind('\n').map_or(0, |i| i + 1);
    if s.len() - line_start + buf.len() > LINE_WIDTH {
      s.push('\n');
    }

    s.push_str(&buf);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;

  #[test]
  fn read_glider() {
    let mut engine = Engine::new();
    let src = "#N Glider\n#O Richard K. Guy\n#C The smallest spaceship.\n#c Period 4.\n\
      x = 3, y = 3, rule = B3/S23\nbo$2bo$3o!";
    let pattern = read(&mut engine, src).unwrap();

    assert_eq!(pattern.metadata, Metadata {
      name: Some("Glider".to_owned()),
      author: Some("Richard K. Guy".to_owned()),
      comments: vec!["The smallest spaceship.".to_owned(), "Period 4.".to_owned()],
    });
    let universe = pattern.universe;
    assert_eq!(universe.generation(), 0);
    assert!(universe.previous().is_none());
    assert_eq!(universe.cells(&engine), vec![(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)]);
    assert_eq!(engine.store().size(universe.root()), 8);
  }

  #[test]
  fn read_installs_rule() {
    let mut engine = Engine::new();
    read(&mut engine, "x = 1, y = 1, rule = S23/B36\no!").unwrap();
    assert_eq!(engine.rule().to_string(), "B36/S23");

    read(&mut engine, "3o$\r\n2b\n o!\n").unwrap();
    assert_eq!(engine.rule(), GAME_OF_LIFE);
  }

  #[test]
  fn read_counts_with_spaces() {
    let mut engine = Engine::new();
    let pattern = read(&mut engine, "x = 0, y = 0\n1 2o$0bo!").unwrap();
    assert_eq!(pattern.universe.population(), 13);
    assert!(pattern.universe.get(&engine, 11, 0));
    assert!(pattern.universe.get(&engine, 1, 1));
    assert!(!pattern.universe.get(&engine, 0, 1));
  }

  #[test]
  fn read_errors() {
    let mut engine = Engine::new();
    assert_eq!(
      read(&mut engine, "x = 3, y = 3\nbo$2bo$3q!").unwrap_err(),
      Error::Format { position: 20, remainder: "3q!".to_owned() },
    );
    assert_eq!(
      read(&mut engine, "bo$2bo").unwrap_err(),
      Error::Format { position: 6, remainder: String::new() },
    );
    assert!(matches!(
      read(&mut engine, "x = 1, y = 1, rule = B3S23\no!"),
      Err(Error::Format { position: 0, .. })
    ));
    assert!(matches!(
      read(&mut engine, "x = 1, y = 1, rule = B0/S23\no!"),
      Err(Error::Rule(_))
    ));
  }

  #[test]
  fn write_glider() {
    let mut engine = Engine::new();
    let glider = "x = 3, y = 3, rule = B3/S23\nbo$2bo$3o!\n";
    let pattern = read(&mut engine, glider).unwrap();
    assert_eq!(write(&engine, &pattern.universe), glider);
  }

  #[test]
  fn write_empty() {
    let mut engine = Engine::new();
    let universe = Universe::new(&mut engine);
    assert_eq!(write(&engine, &universe), "x = 0, y = 0, rule = B3/S23\n!\n");
  }

  #[test]
  fn write_skips_blank_rows_and_wraps() {
    let mut engine = Engine::new();
    let pattern = read(&mut engine, "o$$$3bo!").unwrap();
    assert_eq!(write(&engine, &pattern.universe), "x = 4, y = 4, rule = B3/S23\no3$3bo!\n");

    let row = (0..40).map(|_| "ob").join("");
    let pattern = read(&mut engine, &format!("{}!", row)).unwrap();
    let output = write(&engine, &pattern.universe);
    let lines = output.lines().collect_vec();
    assert_eq!(lines.len(), 3);
    assert!(lines.iter().all(|line| line.len() <= LINE_WIDTH));
    assert_eq!(lines[1..].join(""), format!("{}o!", "ob".repeat(39)));
  }

  #[test]
  fn write_wraps_before_terminator() {
    let mut engine = Engine::new();
    let row = format!("2o{}", "bo".repeat(34));
    assert_eq!(row.len(), LINE_WIDTH);
    let pattern = read(&mut engine, &format!("{}!", row)).unwrap();
    let output = write(&engine, &pattern.universe);
    assert_eq!(output, format!("x = 70, y = 1, rule = B3/S23\n{}\n!\n", row));
    assert!(output.lines().all(|line| line.len() <= LINE_WIDTH));
  }
}
