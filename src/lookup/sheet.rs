use crate::{
    error::RirmapError,
    net::{cache::NetworkCache, registry::RegistryClient, reverse::ReverseResolver},
};

use super::batch::{BatchDriver, BatchStats};

/// Column 1 value marking the first row of address lists
pub const ENTRIES_MARKER: &str = "Entries";
/// The marker is searched in rows `1..MARKER_SEARCH_ROWS`
pub const MARKER_SEARCH_ROWS: u32 = 10;
/// Address lists live in columns `2..MAX_COLUMNS`
pub const MAX_COLUMNS: u32 = 100;
pub const NOT_FOUND_MARKER: &str = "NOT FOUND";

pub const DEFAULT_SHEETS: [&str; 2] = ["SSL Dest Groups", "SSL Custom Categories"];

/// Cell access of one worksheet, 1-based like spreadsheet coordinates
pub trait Grid {
    fn value(&self, row: u32, col: u32) -> Option<String>;
    fn set_value(&mut self, row: u32, col: u32, value: &str);
    fn wrap_text(&mut self, row: u32, col: u32);
    /// Mark the cell as holding a resolved address
    fn highlight(&mut self, row: u32, col: u32);
}

pub trait Workbook {
    type Sheet: Grid;

    fn sheet_mut(&mut self, name: &str) -> Option<&mut Self::Sheet>;
}

/// Roughly select values that look like an IPv4 address or subnet
fn looks_like_address(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.' || c == '/')
}

fn find_marker_row<G: Grid>(grid: &G) -> Option<u32> {
    (1..MARKER_SEARCH_ROWS).find(|&row| grid.value(row, 1).as_deref() == Some(ENTRIES_MARKER))
}

impl<R: RegistryClient, D: ReverseResolver> BatchDriver<R, D> {
    /// Resolve the address lists of the named sheets in place
    ///
    /// Each sheet carries an `Entries` marker in column 1; lists start on
    /// that row in every column up to [`MAX_COLUMNS`], labeled or not, and
    /// end at the first empty cell. Resolved cells are replaced by the record text and
    /// highlighted; unresolved ones get a `NOT FOUND` suffix.
    pub async fn run_workbook<W: Workbook>(
        &self,
        cache: &mut NetworkCache,
        book: &mut W,
        sheets: &[String],
    ) -> Result<BatchStats, RirmapError> {
        let initial_size = cache.len();
        let mut stats = BatchStats::default();

        for name in sheets {
            let Some(grid) = book.sheet_mut(name) else {
                log::warn!("Sheet {name} not found, skipping");
                continue;
            };
            log::info!("Processing sheet {name}");
            self.run_grid(cache, grid, &mut stats).await?;
        }

        self.finish(cache, initial_size, &stats)?;
        Ok(stats)
    }

    async fn run_grid<G: Grid>(
        &self,
        cache: &mut NetworkCache,
        grid: &mut G,
        stats: &mut BatchStats,
    ) -> Result<(), RirmapError> {
        let Some(start_row) = find_marker_row(grid) else {
            log::info!("No {ENTRIES_MARKER} marker found");
            return Ok(());
        };

        for col in 2..MAX_COLUMNS {
            for row in start_row.. {
                let Some(entry) = grid.value(row, col).filter(|value| !value.is_empty()) else {
                    break;
                };
                grid.wrap_text(row, col);

                let address = entry.replace('\n', "");
                if !looks_like_address(&address) {
                    continue;
                }

                let resolution = self.step(cache, &address, stats).await?;
                grid.highlight(row, col);
                match resolution.record() {
                    Some(record) => grid.set_value(row, col, &record.to_string()),
                    None => grid.set_value(row, col, &format!("{entry}\n\n{NOT_FOUND_MARKER}")),
                }
            }
        }

        Ok(())
    }
}
