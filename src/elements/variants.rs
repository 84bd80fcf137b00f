//! Typed page elements
//!
//! Thin wrappers that name what an element is on the page. They deref to
//! [`PageElement`] and report their own type in error messages.

use std::ops::Deref;
use std::time::Duration;

use super::element::PageElement;
use super::selector::Selector;
use crate::config::Configuration;
use crate::webdriver::SessionHandle;
use crate::Result;

macro_rules! element_variant {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name(PageElement);

        impl $name {
            pub fn new(selector: Selector, session: SessionHandle) -> Self {
                Self(PageElement::new(selector, session).with_element_type(stringify!($name)))
            }

            pub fn configured(selector: Selector, session: SessionHandle, config: &Configuration) -> Self {
                Self(
                    PageElement::configured(selector, session, config)
                        .with_element_type(stringify!($name)),
                )
            }

            pub fn with_timeout(self, timeout: Duration) -> Self {
                Self(self.0.with_timeout(timeout))
            }

            pub fn with_key_delay(self, delay: Duration) -> Self {
                Self(self.0.with_key_delay(delay))
            }

            pub fn into_inner(self) -> PageElement {
                self.0
            }
        }

        impl Deref for $name {
            type Target = PageElement;

            fn deref(&self) -> &PageElement {
                &self.0
            }
        }

        impl From<$name> for PageElement {
            fn from(element: $name) -> PageElement {
                element.0
            }
        }
    };
}

element_variant!(
    /// A check box
    Checkbox
);

element_variant!(
    /// A radio button
    Radiobutton
);

element_variant!(
    /// A text input or text area
    Textbox
);

element_variant!(Button);

element_variant!(Link);

impl Checkbox {
    /// Same as [`PageElement::click`]
    pub async fn check(&self) -> Result<()> {
        self.click().await
    }

    /// Same as [`PageElement::clear`]
    pub async fn uncheck(&self) -> Result<()> {
        self.clear().await
    }
}

impl Radiobutton {
    /// Same as [`PageElement::click`]
    pub async fn select(&self) -> Result<()> {
        self.click().await
    }
}

impl Textbox {
    /// Same as [`PageElement::send_keys`]
    pub async fn type_text(&self, text: &str) -> Result<()> {
        self.send_keys(text).await
    }
}
