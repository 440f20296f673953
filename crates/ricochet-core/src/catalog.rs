//! Tile catalog loading.
//!
//! The catalog is plain configuration: a YAML map of tile name to eight comma-separated rows.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::tile::{Cell, Tile, TILE_SIZE};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("utf-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("tile {tile}: expected 8 rows, found {found}")]
    RowCount { tile: String, found: usize },
    #[error("tile {tile} row {row}: expected 8 cells, found {found}")]
    ColumnCount {
        tile: String,
        row: usize,
        found: usize,
    },
    #[error("tile {tile} row {row} column {column}: invalid cell {token:?}")]
    InvalidCell {
        tile: String,
        row: usize,
        column: usize,
        token: String,
    },
    #[error("catalog contains no tiles")]
    Empty,
}

pub enum CatalogSource<'a> {
    Embedded,
    Path(String),
    Bytes(&'a [u8]),
}

/// Non-empty set of tiles boards are drawn from.
#[derive(Clone, Debug)]
pub struct TileCatalog {
    tiles: Vec<Tile>,
}

impl TileCatalog {
    pub fn new(tiles: Vec<Tile>) -> Result<Self, CatalogError> {
        if tiles.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self { tiles })
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Tile> {
        self.tiles.iter().find(|t| t.name == name)
    }
}

pub fn load_catalog(source: CatalogSource<'_>) -> Result<TileCatalog, CatalogError> {
    let raw: BTreeMap<String, Vec<String>> = match source {
        CatalogSource::Embedded => serde_yaml::from_str(include_str!("../data/tiles.yaml"))?,
        CatalogSource::Path(path) => serde_yaml::from_str(&std::fs::read_to_string(path)?)?,
        CatalogSource::Bytes(bytes) => serde_yaml::from_str(std::str::from_utf8(bytes)?)?,
    };

    let tiles = raw
        .into_iter()
        .map(|(name, rows)| parse_tile(name, &rows))
        .collect::<Result<Vec<_>, _>>()?;
    TileCatalog::new(tiles)
}

fn parse_tile(name: String, rows: &[String]) -> Result<Tile, CatalogError> {
    if rows.len() != TILE_SIZE {
        return Err(CatalogError::RowCount {
            tile: name,
            found: rows.len(),
        });
    }

    let mut cells = [[Cell::EMPTY; TILE_SIZE]; TILE_SIZE];
    for (row, line) in rows.iter().enumerate() {
        let tokens: Vec<&str> = line.split(',').collect();
        if tokens.len() != TILE_SIZE {
            return Err(CatalogError::ColumnCount {
                tile: name,
                row,
                found: tokens.len(),
            });
        }
        for (column, token) in tokens.into_iter().enumerate() {
            cells[row][column] = Cell::parse(token).ok_or_else(|| CatalogError::InvalidCell {
                tile: name.clone(),
                row,
                column,
                token: token.to_string(),
            })?;
        }
    }

    Ok(Tile::new(name, cells))
}
