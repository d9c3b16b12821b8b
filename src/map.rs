use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};

/// Four-connected grid loaded from a MovingAI `.map` file. Cells are linear
/// indices in row-major order; all planner tables key on them.
#[derive(Debug, Clone)]
pub struct Map {
    pub num_of_rows: usize,
    pub num_of_cols: usize,
    passable: Vec<bool>,
    neighbors: Vec<Vec<usize>>, // precomputed move neighbors per passable cell
}

impl Map {
    pub fn from_file(path: &str) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("cannot open map file {path}"))?;
        Self::parse(BufReader::new(file))
    }

    fn parse<R: BufRead>(reader: R) -> Result<Self> {
        let mut lines = reader.lines();

        let _type = lines.next().context("missing type line")??;
        let num_of_rows = lines
            .next()
            .context("missing height line")??
            .split_whitespace()
            .last()
            .context("malformed height line")?
            .parse::<usize>()?;
        let num_of_cols = lines
            .next()
            .context("missing width line")??
            .split_whitespace()
            .last()
            .context("malformed width line")?
            .parse::<usize>()?;
        let _map = lines.next().context("missing map line")??;

        let mut passable = Vec::with_capacity(num_of_rows * num_of_cols);
        for line in lines.take(num_of_rows) {
            let line = line?;
            let row: Vec<bool> = line.chars().map(|ch| ch == '.').collect();
            if row.len() != num_of_cols {
                bail!("map row has {} cells, expected {}", row.len(), num_of_cols);
            }
            passable.extend(row);
        }
        if passable.len() != num_of_rows * num_of_cols {
            bail!(
                "map has {} cells, expected {}",
                passable.len(),
                num_of_rows * num_of_cols
            );
        }

        let mut map = Map {
            num_of_rows,
            num_of_cols,
            passable,
            neighbors: Vec::new(),
        };
        map.initialize_neighbors();
        Ok(map)
    }

    fn initialize_neighbors(&mut self) {
        let mut neighbors = vec![Vec::new(); self.map_size()];
        for cell in 0..self.map_size() {
            if !self.passable[cell] {
                continue;
            }
            let row = self.get_row_coordinate(cell) as i64;
            let col = self.get_col_coordinate(cell) as i64;
            for (dr, dc) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
                let (nr, nc) = (row + dr, col + dc);
                if nr >= 0
                    && nc >= 0
                    && nr < self.num_of_rows as i64
                    && nc < self.num_of_cols as i64
                {
                    let next = self.linearize_coordinate(nr as usize, nc as usize);
                    if self.passable[next] {
                        neighbors[cell].push(next);
                    }
                }
            }
        }
        self.neighbors = neighbors;
    }

    pub fn map_size(&self) -> usize {
        self.num_of_rows * self.num_of_cols
    }

    pub fn is_obstacle(&self, cell: usize) -> bool {
        !self.passable[cell]
    }

    pub fn get_neighbors(&self, cell: usize) -> &[usize] {
        &self.neighbors[cell]
    }

    pub fn get_row_coordinate(&self, cell: usize) -> usize {
        cell / self.num_of_cols
    }

    pub fn get_col_coordinate(&self, cell: usize) -> usize {
        cell % self.num_of_cols
    }

    pub fn linearize_coordinate(&self, row: usize, col: usize) -> usize {
        row * self.num_of_cols + col
    }

    pub fn get_manhattan_distance(&self, a: usize, b: usize) -> usize {
        self.get_row_coordinate(a).abs_diff(self.get_row_coordinate(b))
            + self.get_col_coordinate(a).abs_diff(self.get_col_coordinate(b))
    }
}
