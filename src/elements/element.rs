//! Late-binding page element
//!
//! A [`PageElement`] stores how to find an element, never the element itself.
//! Every operation looks it up again against the session it was created with,
//! so a page object can be declared before the page exists.

use serde_json::json;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, instrument, warn};

use super::selector::Selector;
use super::wait::{
    retry_on_stale, FluentWait, Probe, WaitOutcome, ABSENCE_TIMEOUT, RESOLVE_POLL_INTERVAL,
    STALE_RETRIES, STATE_POLL_INTERVAL,
};
use crate::config::{Configuration, DEFAULT_TIMEOUT_SECS};
use crate::webdriver::{ElementHandle, InputSource, KeyAction, PointerAction, PointerParameters, SessionHandle};
use crate::{Error, Result};

/// Timeout used by `is_enabled_default` and `is_displayed_default`
pub const DEFAULT_STATE_TIMEOUT_SECS: u64 = 10;

/// Pause between simulated key events
pub const DEFAULT_KEY_DELAY: Duration = Duration::from_millis(1000);

const SCRIPTED_CLICK: &str = "arguments[0].click();";
const SCRIPTED_VALUE: &str = "arguments[0].value = arguments[1];";

/// Fold a protocol result into a probe
fn probe<T>(result: Result<T>) -> Result<Probe<T>> {
    match result {
        Ok(value) => Ok(Probe::Found(value)),
        Err(e) if e.is_stale_element() => Ok(Probe::Stale),
        Err(e) if e.is_no_such_element() => Ok(Probe::NotFound),
        Err(e) => Err(e),
    }
}

/// An element on a page, found afresh for every operation
#[derive(Debug, Clone)]
pub struct PageElement {
    selector: Selector,
    session: SessionHandle,
    element_type: &'static str,
    timeout: Duration,
    key_delay: Duration,
}

impl PageElement {
    pub fn new(selector: Selector, session: SessionHandle) -> Self {
        Self {
            selector,
            session,
            element_type: "PageElement",
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            key_delay: DEFAULT_KEY_DELAY,
        }
    }

    /// Element whose timeout comes from the `timeout` configuration key
    pub fn configured(selector: Selector, session: SessionHandle, config: &Configuration) -> Self {
        Self::new(selector, session).with_timeout(config.default_timeout())
    }

    /// How long resolution and clickability waits may take
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_key_delay(mut self, delay: Duration) -> Self {
        self.key_delay = delay;
        self
    }

    pub(crate) fn with_element_type(mut self, element_type: &'static str) -> Self {
        self.element_type = element_type;
        self
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Logical type reported in diagnostics, e.g. `Checkbox`
    pub fn element_type(&self) -> &'static str {
        self.element_type
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn key_delay(&self) -> Duration {
        self.key_delay
    }

    fn not_found(&self) -> Error {
        Error::ElementNotFound {
            element_type: self.element_type.to_string(),
            strategy: self.selector.strategy().to_string(),
            value: self.selector.value().to_string(),
        }
    }

    fn not_clickable(&self, waited: Duration) -> Error {
        Error::ElementNotClickable {
            element_type: self.element_type.to_string(),
            strategy: self.selector.strategy().to_string(),
            value: self.selector.value().to_string(),
            waited_secs: waited.as_secs_f64(),
        }
    }

    /// One lookup, no waiting
    async fn find_now(&self) -> Result<Probe<ElementHandle>> {
        let found = probe(self.session.find_elements(&self.selector.to_locator()).await)?;
        Ok(match found {
            Probe::Found(handles) => handles.into_iter().next().map_or(Probe::NotFound, Probe::Found),
            Probe::NotFound => Probe::NotFound,
            Probe::Stale => Probe::Stale,
        })
    }

    /// Find the element, waiting up to the element timeout
    #[instrument(skip(self), fields(element = self.element_type, selector = %self.selector))]
    pub(crate) async fn resolve(&self) -> Result<ElementHandle> {
        let outcome = FluentWait::new(self.timeout)
            .polling_every(RESOLVE_POLL_INTERVAL)
            .until(move || async move {
                Ok(match self.find_now().await? {
                    Probe::Stale => Probe::NotFound,
                    other => other,
                })
            })
            .await?;

        match outcome {
            WaitOutcome::Found(handle) => Ok(handle),
            _ => {
                let err = self.not_found();
                debug!("{}", err);
                Err(err)
            }
        }
    }

    /// Found, displayed and enabled
    async fn probe_clickable(&self) -> Result<Probe<ElementHandle>> {
        let handle = match self.find_now().await? {
            Probe::Found(handle) => handle,
            Probe::NotFound => return Ok(Probe::NotFound),
            Probe::Stale => return Ok(Probe::Stale),
        };
        match probe(self.session.is_displayed(&handle).await)? {
            Probe::Found(true) => {}
            Probe::Found(false) | Probe::NotFound => return Ok(Probe::NotFound),
            Probe::Stale => return Ok(Probe::Stale),
        }
        Ok(match probe(self.session.is_enabled(&handle).await)? {
            Probe::Found(true) => Probe::Found(handle),
            Probe::Found(false) | Probe::NotFound => Probe::NotFound,
            Probe::Stale => Probe::Stale,
        })
    }

    /// Found and displayed
    async fn probe_visible(&self) -> Result<Probe<ElementHandle>> {
        let handle = match self.find_now().await? {
            Probe::Found(handle) => handle,
            Probe::NotFound => return Ok(Probe::NotFound),
            Probe::Stale => return Ok(Probe::Stale),
        };
        Ok(match probe(self.session.is_displayed(&handle).await)? {
            Probe::Found(true) => Probe::Found(handle),
            Probe::Found(false) | Probe::NotFound => Probe::NotFound,
            Probe::Stale => Probe::Stale,
        })
    }

    /// Absent, detached or hidden
    async fn probe_absent(&self) -> Result<Probe<()>> {
        let handle = match self.find_now().await? {
            Probe::Found(handle) => handle,
            Probe::NotFound | Probe::Stale => return Ok(Probe::Found(())),
        };
        Ok(match probe(self.session.is_displayed(&handle).await)? {
            Probe::Found(true) => Probe::NotFound,
            _ => Probe::Found(()),
        })
    }

    /// Click, clear, then type `text`
    #[instrument(skip(self, text), fields(element = self.element_type, selector = %self.selector))]
    pub async fn send_keys(&self, text: &str) -> Result<()> {
        self.session.click(&self.resolve().await?).await?;
        self.session.clear(&self.resolve().await?).await?;
        self.session.send_keys(&self.resolve().await?, text).await?;
        Ok(())
    }

    /// Set the element's value by script, bypassing key events
    pub async fn scripted_send_keys(&self, text: &str) -> Result<()> {
        let handle = self.resolve().await?;
        self.session
            .execute_script(SCRIPTED_VALUE, vec![handle.to_json(), json!(text)])
            .await?;
        Ok(())
    }

    /// Focus the element and press each character as a key down/up pair
    ///
    /// For fields that mask input or listen for individual key events, where
    /// [`send_keys`](Self::send_keys) does not work.
    #[instrument(skip(self, text), fields(element = self.element_type, selector = %self.selector))]
    pub async fn press_keys(&self, text: &str) -> Result<()> {
        let handle = self.resolve().await?;
        if self.session.tag_name(&handle).await? == "input" {
            self.session.send_keys(&handle, "").await?;
        } else {
            let hover = InputSource::Pointer {
                id: "mouse".to_string(),
                parameters: PointerParameters::default(),
                actions: vec![PointerAction::move_to(&handle)],
            };
            self.session
                .perform_actions(vec![hover])
                .await
                .map_err(|e| Error::key_press(format!("could not focus element: {}", e)))?;
        }

        tokio::time::sleep(self.key_delay).await;

        let pressed = self.press_each(text).await;

        // Release even after a failed press so no key stays down
        let released = self.session.release_actions().await;
        pressed?;
        released
    }

    async fn press_each(&self, text: &str) -> Result<()> {
        let pause = self.key_delay.as_millis() as u64;
        for c in text.chars() {
            debug!("Pressing {:?}", c);
            let key = InputSource::Key {
                id: "keyboard".to_string(),
                actions: vec![
                    KeyAction::KeyDown { value: c.to_string() },
                    KeyAction::Pause { duration: pause },
                    KeyAction::KeyUp { value: c.to_string() },
                    KeyAction::Pause { duration: pause },
                ],
            };
            self.session
                .perform_actions(vec![key])
                .await
                .map_err(|e| Error::key_press(format!("could not press {:?}: {}", c, e)))?;
        }
        Ok(())
    }

    /// Click once the element is displayed and enabled
    ///
    /// Waits up to the element timeout in 500 ms steps. If the wait runs out
    /// or the native click fails, a scripted click is tried once.
    #[instrument(skip(self), fields(element = self.element_type, selector = %self.selector))]
    pub async fn click(&self) -> Result<()> {
        let start = Instant::now();
        self.resolve().await?;

        let clickable = FluentWait::new(self.timeout)
            .polling_every(STATE_POLL_INTERVAL)
            .until(move || self.probe_clickable())
            .await;

        let reason = match clickable {
            Ok(WaitOutcome::Found(handle)) => match self.session.click(&handle).await {
                Ok(()) => return Ok(()),
                Err(e) => e.to_string(),
            },
            Ok(WaitOutcome::TimedOut) => "not clickable before the timeout".to_string(),
            Ok(WaitOutcome::Stale) => "element went stale".to_string(),
            Err(e) => e.to_string(),
        };
        warn!("Native click failed ({}), trying a scripted click", reason);

        let scripted = match self.find_now().await {
            Ok(Probe::Found(handle)) => self
                .session
                .execute_script(SCRIPTED_CLICK, vec![handle.to_json()])
                .await
                .map(|_| ()),
            Ok(_) => Err(self.not_found()),
            Err(e) => Err(e),
        };

        scripted.map_err(|e| {
            let err = self.not_clickable(start.elapsed());
            error!("{} Cause: {}", err, e);
            err
        })
    }

    /// Native clear; unchecks checkboxes and empties text fields
    pub async fn clear(&self) -> Result<()> {
        let handle = self.resolve().await?;
        self.session.clear(&handle).await
    }

    /// Whether the element becomes displayed and enabled within `secs`
    ///
    /// Never fails: a timeout, a lookup error, or more than five stale
    /// retries all give `false`.
    pub async fn is_enabled(&self, secs: u64) -> bool {
        let wait = FluentWait::new(Duration::from_secs(secs)).polling_every(STATE_POLL_INTERVAL);
        let outcome = retry_on_stale(STALE_RETRIES, move || {
            wait.until(move || self.probe_clickable())
        })
        .await;
        self.settle("enabled", outcome)
    }

    pub async fn is_enabled_default(&self) -> bool {
        self.is_enabled(DEFAULT_STATE_TIMEOUT_SECS).await
    }

    /// Whether the element becomes displayed within `secs`; never fails
    pub async fn is_displayed(&self, secs: u64) -> bool {
        let wait = FluentWait::new(Duration::from_secs(secs)).polling_every(STATE_POLL_INTERVAL);
        let outcome = retry_on_stale(STALE_RETRIES, move || {
            wait.until(move || self.probe_visible())
        })
        .await;
        self.settle("displayed", outcome)
    }

    pub async fn is_displayed_default(&self) -> bool {
        self.is_displayed(DEFAULT_STATE_TIMEOUT_SECS).await
    }

    fn settle<T>(&self, state: &str, outcome: Result<WaitOutcome<T>>) -> bool {
        match outcome {
            Ok(WaitOutcome::Found(_)) => true,
            Ok(WaitOutcome::TimedOut) => {
                debug!("{} {} not {} before the timeout", self.element_type, self.selector, state);
                false
            }
            Ok(WaitOutcome::Stale) => {
                debug!("{} {} stayed stale", self.element_type, self.selector);
                false
            }
            Err(e) => {
                debug!("{} {} check failed: {}", self.element_type, self.selector, e);
                false
            }
        }
    }

    /// True when the element is absent or hidden within 250 ms
    pub async fn does_not_exist(&self) -> bool {
        let outcome = FluentWait::new(ABSENCE_TIMEOUT)
            .polling_every(RESOLVE_POLL_INTERVAL)
            .until(move || self.probe_absent())
            .await;
        let absent = matches!(outcome, Ok(WaitOutcome::Found(())));
        debug!("{} {} absent: {}", self.element_type, self.selector, absent);
        absent
    }

    /// Visible text
    pub async fn get_text(&self) -> Result<String> {
        let handle = self.resolve().await?;
        self.session.text(&handle).await
    }

    pub async fn is_selected(&self) -> Result<bool> {
        let handle = self.resolve().await?;
        self.session.is_selected(&handle).await
    }

    /// Whether `class` contains exactly the token `name`
    pub async fn has_class(&self, name: &str) -> Result<bool> {
        let handle = self.resolve().await?;
        let classes = self.session.attribute(&handle, "class").await?;
        debug!("Classes on {} {}: {:?}", self.element_type, self.selector, classes);
        Ok(classes
            .map(|classes| classes.split_whitespace().any(|c| c == name))
            .unwrap_or(false))
    }

    /// Whether `attribute` equals `value`, or contains it as a space-separated token
    pub async fn attribute_equals(&self, attribute: &str, value: &str) -> Result<bool> {
        let handle = self.resolve().await?;
        let actual = self.session.attribute(&handle, attribute).await?;
        debug!(
            "Values of {} on {} {}: {:?}",
            attribute, self.element_type, self.selector, actual
        );
        Ok(match actual {
            Some(actual) => actual == value || actual.split_whitespace().any(|token| token == value),
            None => false,
        })
    }

    /// Resolve and hand out the raw element reference
    pub async fn to_element_handle(&self) -> Result<ElementHandle> {
        self.resolve().await
    }
}
