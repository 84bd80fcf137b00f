//! # Page elements
//!
//! Page objects are built from late-binding elements. An element holds a
//! selector and a session handle and finds itself again for every operation.
//!
//! ## Module structure
//! - `selector`: selector strategies and their W3C locators
//! - `wait`: bounded polling and stale-element retries
//! - `element`: `PageElement`
//! - `variants`: `Checkbox`, `Radiobutton`, `Textbox`, `Button`, `Link`
//! - `table`: `Table` and the table step helpers
//!
//! ## Example
//! ```rust,no_run
//! use sentinel::elements::{Checkbox, PageElement, Selector};
//! use sentinel::webdriver::SessionHandle;
//!
//! # async fn example(session: SessionHandle) -> sentinel::Result<()> {
//! let terms = Checkbox::new(Selector::id("terms"), session.clone());
//! terms.check().await?;
//!
//! let submit = PageElement::new(Selector::css("button[type=submit]"), session);
//! if submit.is_enabled_default().await {
//!     submit.click().await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod selector;
pub mod wait;
pub mod element;
pub mod variants;
pub mod table;


pub use selector::{css_escape, Selector, SelectorType};
pub use wait::{
    retry_on_stale, FluentWait, Probe, WaitOutcome, ABSENCE_TIMEOUT, RESOLVE_POLL_INTERVAL,
    STALE_RETRIES, STATE_POLL_INTERVAL,
};
pub use element::{PageElement, DEFAULT_KEY_DELAY, DEFAULT_STATE_TIMEOUT_SECS};
pub use variants::{Button, Checkbox, Link, Radiobutton, Textbox};
pub use table::{configured_step_locator, parse_ordinal, step_locator, RowMatch, StoredPage, Table};
