//! Table element
//!
//! Rows are the `tr` elements that hold `td` cells; header cells are `th`.
//! Searches inside a row are always relative to that row.

use futures::future::try_join_all;
use std::collections::HashMap;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use super::element::PageElement;
use super::selector::Selector;
use crate::webdriver::{ElementHandle, Locator, LocatorStrategy, SessionHandle};
use crate::config::Configuration;
use crate::{Error, Result};

/// Data rows, relative to the table
pub const ROW_XPATH: &str = ".//tr[td]";
/// Header cells, relative to the table
pub const HEADER_XPATH: &str = ".//th";
/// Data cells, relative to a row
pub const CELL_XPATH: &str = ".//td";

/// How to recognise the row to act on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowMatch {
    /// The row's text contains this string
    Text(String),
    /// The row contains an element matching this locator
    Locator(Locator),
}

/// Header and cell text captured by [`Table::store_table`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredPage {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// A table on the page
#[derive(Debug, Clone)]
pub struct Table {
    element: PageElement,
    pages: Arc<Mutex<HashMap<u32, StoredPage>>>,
}

impl Table {
    pub fn new(selector: Selector, session: SessionHandle) -> Self {
        Self {
            element: PageElement::new(selector, session).with_element_type("Table"),
            pages: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.element = self.element.with_timeout(timeout);
        self
    }

    async fn rows(&self, table: &ElementHandle) -> Result<Vec<ElementHandle>> {
        self.session()
            .find_elements_from(table, &Locator::xpath(ROW_XPATH))
            .await
    }

    async fn texts(&self, handles: &[ElementHandle]) -> Result<Vec<String>> {
        try_join_all(handles.iter().map(|handle| self.session().text(handle))).await
    }

    async fn row_matches(&self, row: &ElementHandle, wanted: &RowMatch) -> Result<bool> {
        match wanted {
            RowMatch::Text(text) => Ok(self.session().text(row).await?.contains(text.as_str())),
            RowMatch::Locator(locator) => Ok(!self
                .session()
                .find_elements_from(row, &row_relative(locator))
                .await?
                .is_empty()),
        }
    }

    async fn click_in_row(&self, row: &ElementHandle, target: &Locator) -> Result<bool> {
        let found = self
            .session()
            .find_elements_from(row, &row_relative(target))
            .await?;
        match found.first() {
            Some(handle) => {
                self.session().click(handle).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Header cell text
    pub async fn headers(&self) -> Result<Vec<String>> {
        let table = self.resolve().await?;
        let cells = self
            .session()
            .find_elements_from(&table, &Locator::xpath(HEADER_XPATH))
            .await?;
        self.texts(&cells).await
    }

    /// Number of data rows
    pub async fn row_count(&self) -> Result<usize> {
        let table = self.resolve().await?;
        Ok(self.rows(&table).await?.len())
    }

    /// Click `target` in the first row that matches `wanted` and contains it
    #[instrument(skip(self))]
    pub async fn click_element_in_row_that_contains(&self, wanted: RowMatch, target: Locator) -> Result<()> {
        let table = self.resolve().await?;
        for row in self.rows(&table).await? {
            if self.row_matches(&row, &wanted).await? && self.click_in_row(&row, &target).await? {
                info!("Clicked {} in row {}", target, row);
                return Ok(());
            }
        }
        Err(Error::table_row_not_found(format!(
            "no row of {} matching {:?} contains {}",
            self.selector(),
            wanted,
            target
        )))
    }

    /// Click `target` in the row at a 1-based `ordinal`; `-1` is the last row
    #[instrument(skip(self))]
    pub async fn click_element_in_row_at(&self, ordinal: i32, target: Locator) -> Result<()> {
        let table = self.resolve().await?;
        let rows = self.rows(&table).await?;

        let index = match ordinal {
            -1 if !rows.is_empty() => rows.len() - 1,
            n if n >= 1 && (n as usize) <= rows.len() => n as usize - 1,
            _ => {
                return Err(Error::table_row_not_found(format!(
                    "row {} of {} (table has {} rows)",
                    ordinal,
                    self.selector(),
                    rows.len()
                )))
            }
        };

        if self.click_in_row(&rows[index], &target).await? {
            Ok(())
        } else {
            Err(Error::table_row_not_found(format!(
                "row {} of {} does not contain {}",
                ordinal,
                self.selector(),
                target
            )))
        }
    }

    /// Capture the current header and cell text as `page_number`
    #[instrument(skip(self))]
    pub async fn store_table(&self, page_number: u32) -> Result<()> {
        let headers = self.headers().await?;
        let table = self.resolve().await?;

        let mut rows = Vec::new();
        for row in self.rows(&table).await? {
            let cells = self
                .session()
                .find_elements_from(&row, &Locator::xpath(CELL_XPATH))
                .await?;
            rows.push(self.texts(&cells).await?);
        }

        debug!("Storing page {} with {} rows", page_number, rows.len());
        self.pages
            .lock()
            .await
            .insert(page_number, StoredPage { headers, rows });
        Ok(())
    }

    /// A page captured earlier by [`store_table`](Self::store_table)
    pub async fn stored_page(&self, page_number: u32) -> Option<StoredPage> {
        self.pages.lock().await.get(&page_number).cloned()
    }
}

impl Deref for Table {
    type Target = PageElement;

    fn deref(&self) -> &PageElement {
        &self.element
    }
}

/// Anchor an absolute XPath to the current row
fn row_relative(locator: &Locator) -> Locator {
    if locator.using == LocatorStrategy::XPath && locator.value.starts_with('/') {
        Locator::xpath(format!(".{}", locator.value))
    } else {
        locator.clone()
    }
}

/// Quote a string as an XPath literal
fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        format!("'{}'", value)
    } else if !value.contains('"') {
        format!("\"{}\"", value)
    } else {
        let parts: Vec<String> = value.split('\'').map(|p| format!("'{}'", p)).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

/// Locator from a step argument pair such as `("text", "Edit")`
pub fn step_locator(kind: &str, value: &str) -> Result<Locator> {
    match kind.trim().to_lowercase().as_str() {
        "xpath" => Ok(Locator::xpath(value)),
        "text" => Ok(Locator::xpath(format!(
            ".//*[contains(text(),{})]",
            xpath_literal(value)
        ))),
        _ => Err(Error::UnsupportedSelector(kind.to_string())),
    }
}

/// Like [`step_locator`], plus `"value for"`, which looks the text up by key in `config`
pub fn configured_step_locator(kind: &str, value: &str, config: &Configuration) -> Result<Locator> {
    match kind.trim().to_lowercase().as_str() {
        "value for" => {
            let stored = config.get_property(value)?;
            debug!("Value for {} is {:?}", value, stored);
            step_locator("text", &stored)
        }
        _ => step_locator(kind, value),
    }
}

/// Row ordinal from a step argument: `"la"` (last) is `-1`, digits are 1-based
pub fn parse_ordinal(raw: &str) -> Result<i32> {
    match raw.trim().to_lowercase().as_str() {
        "la" | "last" => Ok(-1),
        digits => digits
            .parse::<i32>()
            .ok()
            .filter(|n| *n >= 1)
            .ok_or_else(|| Error::table_row_not_found(format!("invalid row ordinal '{}'", raw))),
    }
}
