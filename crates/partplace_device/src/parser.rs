//! Reader for the plain-text design format.
//!
//! A design file is line oriented:
//!
//! ```text
//! <design id>
//! <max score> <area weight> <wire weight>
//! <clb weight> <bram weight> <dsp weight>
//! <rows> <cols>
//! <tile height>
//! <one line of cols cell characters per row>
//! <cols left-boundary flags, 0 = false>
//! <cols right-boundary flags, 0 = false>
//! <region count N>
//! N x { <S|R> <clb> <bram> <dsp> <io count K>
//!       K lines of <col> <row> <wires>, one-based }
//! <N lines of N wire counts>
//! ```
//!
//! Cell rows may be written space-separated (`C C B D`) or as one unbroken
//! token (`CCBD`). Blank lines are skipped.

use crate::block::{BlockType, Resources};
use crate::board::Board;
use crate::costs::Costs;
use crate::design::Design;
use crate::error::DesignParseError;
use crate::ids::RegionId;
use crate::region::{IoConn, Region, RegionKind};
use partplace_common::GridPoint;
use std::path::Path;
use std::str::FromStr;

/// Reads and parses a design file.
pub fn load_design(path: &Path) -> Result<Design, DesignParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_design(&content)
}

/// Parses a design from its textual form.
pub fn parse_design(content: &str) -> Result<Design, DesignParseError> {
    let mut lines = Lines::new(content);

    let (_, id) = lines.next_line("design id")?;
    let id = id.trim().to_string();

    let [max_score, area_weight, wire_weight] = lines.numbers::<i64, 3>("score and weights")?;
    let [clb_weight, bram_weight, dsp_weight] = lines.numbers::<i64, 3>("resource weights")?;
    let costs = Costs {
        max_score,
        area_weight,
        wire_weight,
        clb_weight,
        bram_weight,
        dsp_weight,
    };

    let [rows, cols] = lines.numbers::<usize, 2>("board dimensions")?;
    let [tile_height] = lines.numbers::<usize, 1>("tile height")?;

    let mut cells = Vec::with_capacity(rows);
    for _ in 0..rows {
        cells.push(lines.cell_row(cols)?);
    }
    let left = lines.flags(cols, "left boundary flags")?;
    let right = lines.flags(cols, "right boundary flags")?;
    let board = Board::new(cells, tile_height, left, right)?;

    let [count] = lines.numbers::<usize, 1>("region count")?;
    let mut regions = Vec::with_capacity(count);
    for index in 0..count {
        regions.push(lines.region(index)?);
    }

    let mut wires = Vec::with_capacity(count);
    for _ in 0..count {
        wires.push(lines.list::<u32>(count, "wire matrix row")?);
    }

    Ok(Design::new(id, board, costs, regions, wires)?)
}

/// Non-blank lines with their one-based numbers.
struct Lines<'a> {
    inner: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> Lines<'a> {
    fn new(content: &'a str) -> Self {
        Self {
            inner: content.lines().enumerate(),
        }
    }

    fn next_line(&mut self, expected: &'static str) -> Result<(usize, &'a str), DesignParseError> {
        self.inner
            .by_ref()
            .find(|(_, l)| !l.trim().is_empty())
            .map(|(i, l)| (i + 1, l))
            .ok_or(DesignParseError::UnexpectedEof { expected })
    }

    fn list<T: FromStr>(
        &mut self,
        len: usize,
        expected: &'static str,
    ) -> Result<Vec<T>, DesignParseError> {
        let (line, text) = self.next_line(expected)?;
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.len() != len {
            return Err(syntax(
                line,
                format!("expected {len} values for {expected}, found {}", tokens.len()),
            ));
        }
        tokens
            .into_iter()
            .map(|t| {
                t.parse::<T>()
                    .map_err(|_| syntax(line, format!("invalid number '{t}' in {expected}")))
            })
            .collect()
    }

    fn numbers<T: FromStr + Copy + Default, const N: usize>(
        &mut self,
        expected: &'static str,
    ) -> Result<[T; N], DesignParseError> {
        let values = self.list::<T>(N, expected)?;
        let mut out = [T::default(); N];
        out.copy_from_slice(&values);
        Ok(out)
    }

    fn cell_row(&mut self, cols: usize) -> Result<Vec<BlockType>, DesignParseError> {
        let (line, text) = self.next_line("board row")?;
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let chars: Vec<char> = if tokens.len() == cols && tokens.iter().all(|t| t.chars().count() == 1) {
            tokens.iter().filter_map(|t| t.chars().next()).collect()
        } else if tokens.len() == 1 && tokens[0].chars().count() == cols {
            tokens[0].chars().collect()
        } else {
            return Err(syntax(line, format!("expected a row of {cols} cells")));
        };
        chars
            .into_iter()
            .map(|c| {
                BlockType::from_char(c).ok_or_else(|| syntax(line, format!("unknown cell '{c}'")))
            })
            .collect()
    }

    fn flags(&mut self, cols: usize, expected: &'static str) -> Result<Vec<bool>, DesignParseError> {
        let (line, text) = self.next_line(expected)?;
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.len() != cols {
            return Err(syntax(
                line,
                format!("expected {cols} {expected}, found {}", tokens.len()),
            ));
        }
        Ok(tokens.into_iter().map(|t| t != "0").collect())
    }

    fn region(&mut self, index: usize) -> Result<Region, DesignParseError> {
        let (line, text) = self.next_line("region header")?;
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.len() != 5 {
            return Err(syntax(
                line,
                "expected region header '<S|R> <clb> <bram> <dsp> <io count>'".to_string(),
            ));
        }
        let kind = tokens[0]
            .chars()
            .next()
            .filter(|_| tokens[0].len() == 1)
            .and_then(RegionKind::from_char)
            .ok_or_else(|| syntax(line, format!("unknown region kind '{}'", tokens[0])))?;
        let mut counts = [0u32; 4];
        for (slot, token) in counts.iter_mut().zip(&tokens[1..]) {
            *slot = token
                .parse()
                .map_err(|_| syntax(line, format!("invalid number '{token}' in region header")))?;
        }
        let [clb, bram, dsp, io_count] = counts;

        let mut io = Vec::with_capacity(io_count as usize);
        for _ in 0..io_count {
            io.push(self.io_conn()?);
        }

        Ok(Region {
            id: RegionId::from_raw(index as u32),
            kind,
            resources: Resources::logic(clb, bram, dsp),
            io,
        })
    }

    fn io_conn(&mut self) -> Result<IoConn, DesignParseError> {
        let (line, text) = self.next_line("io connection")?;
        let values: Vec<usize> = text
            .split_whitespace()
            .map(|t| t.parse::<usize>())
            .collect::<Result<_, _>>()
            .map_err(|_| syntax(line, "invalid io connection".to_string()))?;
        let &[col, row, wires] = values.as_slice() else {
            return Err(syntax(line, "expected '<col> <row> <wires>'".to_string()));
        };
        if col == 0 || row == 0 {
            return Err(syntax(line, "io coordinates are one-based".to_string()));
        }
        Ok(IoConn {
            point: GridPoint::new(col - 1, row - 1),
            wires: u32::try_from(wires)
                .map_err(|_| syntax(line, format!("wire count {wires} is too large")))?,
        })
    }
}

fn syntax(line: usize, message: String) -> DesignParseError {
    DesignParseError::Syntax { line, message }
}
