//! Selector model
//!
//! Page objects describe elements as a strategy name plus a value. Each
//! strategy maps to exactly one W3C locator.

use std::fmt;
use std::str::FromStr;

use crate::webdriver::Locator;
use crate::{Error, Result};

/// How a page object identifies an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectorType {
    Id,
    Name,
    ClassName,
    CssSelector,
    Xpath,
    LinkText,
    PartialLinkText,
}

impl SelectorType {
    /// Name used in page object definitions and error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectorType::Id => "ID",
            SelectorType::Name => "NAME",
            SelectorType::ClassName => "CLASS",
            SelectorType::CssSelector => "CSS",
            SelectorType::Xpath => "XPATH",
            SelectorType::LinkText => "TEXT",
            SelectorType::PartialLinkText => "PARTIALTEXT",
        }
    }
}

impl FromStr for SelectorType {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        let name: String = raw
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .collect::<String>()
            .to_lowercase();
        match name.as_str() {
            "id" => Ok(SelectorType::Id),
            "name" => Ok(SelectorType::Name),
            "class" | "classname" => Ok(SelectorType::ClassName),
            "css" | "cssselector" => Ok(SelectorType::CssSelector),
            "xpath" => Ok(SelectorType::Xpath),
            "text" | "linktext" => Ok(SelectorType::LinkText),
            "partialtext" | "partiallinktext" => Ok(SelectorType::PartialLinkText),
            _ => Err(Error::UnsupportedSelector(raw.to_string())),
        }
    }
}

impl fmt::Display for SelectorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strategy plus value; fixed once created
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selector {
    strategy: SelectorType,
    value: String,
}

impl Selector {
    pub fn new<S: Into<String>>(strategy: SelectorType, value: S) -> Self {
        Self {
            strategy,
            value: value.into(),
        }
    }

    /// Build from a strategy name such as `"id"` or `"xpath"`
    pub fn parse<S: Into<String>>(strategy: &str, value: S) -> Result<Self> {
        Ok(Self::new(strategy.parse()?, value))
    }

    pub fn id<S: Into<String>>(value: S) -> Self {
        Self::new(SelectorType::Id, value)
    }

    pub fn name<S: Into<String>>(value: S) -> Self {
        Self::new(SelectorType::Name, value)
    }

    pub fn class_name<S: Into<String>>(value: S) -> Self {
        Self::new(SelectorType::ClassName, value)
    }

    pub fn css<S: Into<String>>(value: S) -> Self {
        Self::new(SelectorType::CssSelector, value)
    }

    pub fn xpath<S: Into<String>>(value: S) -> Self {
        Self::new(SelectorType::Xpath, value)
    }

    pub fn link_text<S: Into<String>>(value: S) -> Self {
        Self::new(SelectorType::LinkText, value)
    }

    pub fn partial_link_text<S: Into<String>>(value: S) -> Self {
        Self::new(SelectorType::PartialLinkText, value)
    }

    pub fn strategy(&self) -> SelectorType {
        self.strategy
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// The W3C locator for this selector
    ///
    /// `id`, `name` and `class` have no W3C strategy of their own and become
    /// CSS selectors.
    pub fn to_locator(&self) -> Locator {
        match self.strategy {
            SelectorType::Id => Locator::css(format!("#{}", css_escape(&self.value))),
            SelectorType::Name => {
                Locator::css(format!("*[name=\"{}\"]", self.value.replace('"', "\\\"")))
            }
            SelectorType::ClassName => Locator::css(format!(".{}", css_escape(&self.value))),
            SelectorType::CssSelector => Locator::css(self.value.clone()),
            SelectorType::Xpath => Locator::xpath(self.value.clone()),
            SelectorType::LinkText => Locator::link_text(self.value.clone()),
            SelectorType::PartialLinkText => Locator::partial_link_text(self.value.clone()),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} \"{}\"", self.strategy, self.value)
    }
}

/// Escape a string for use as a CSS identifier
pub fn css_escape(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len());
    for (i, c) in ident.chars().enumerate() {
        match c {
            '0'..='9' if i == 0 => out.push_str(&format!("\\{:x} ", c as u32)),
            '-' if i == 0 && ident.len() == 1 => out.push_str("\\-"),
            c if c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() => out.push(c),
            c => {
                out.push('\\');
                out.push(c);
            }
        }
    }
    out
}
