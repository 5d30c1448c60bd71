//! Selector strategies for locating storefront elements.
//!
//! A [`Selector`] is one matching rule: by CSS, by ARIA role and
//! accessible name, by text content, by test id, or CSS narrowed by text.
//! Selectors are stateless descriptors; ordering and fallback live in
//! [`crate::locator::FallbackLocator`].

use serde::{Deserialize, Serialize};

/// One strategy for matching a UI element
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selector {
    /// CSS selector (e.g., `button.primary`)
    Css(String),
    /// ARIA role plus accessible name (e.g., role `button`, name `Logout`)
    Role {
        /// ARIA role
        role: String,
        /// Accessible name
        name: String,
    },
    /// Text content substring
    Text(String),
    /// Test ID selector (`data-testid` attribute)
    TestId(String),
    /// CSS selector narrowed to elements containing the given text
    CssWithText {
        /// Base CSS selector
        css: String,
        /// Text content to match
        text: String,
    },
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a role+name selector
    #[must_use]
    pub fn role(role: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Role {
            role: role.into(),
            name: name.into(),
        }
    }

    /// Create a text selector
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Create a test ID selector
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::TestId(id.into())
    }

    /// Create a CSS selector narrowed by text content
    #[must_use]
    pub fn css_with_text(css: impl Into<String>, text: impl Into<String>) -> Self {
        Self::CssWithText {
            css: css.into(),
            text: text.into(),
        }
    }

    /// Convert to a JavaScript expression returning the first match
    #[must_use]
    pub fn to_query(&self) -> String {
        match self {
            Self::Css(s) => format!("document.querySelector({s:?})"),
            Self::Role { role, name } => format!(
                "Array.from(document.querySelectorAll('[role={role:?}], {role}')).find(el => (el.getAttribute('aria-label') || el.textContent || '').includes({name:?}))"
            ),
            Self::Text(t) => format!(
                "Array.from(document.querySelectorAll('*')).find(el => el.textContent.includes({t:?}))"
            ),
            Self::TestId(id) => format!("document.querySelector('[data-testid={id:?}]')"),
            Self::CssWithText { css, text } => format!(
                "Array.from(document.querySelectorAll({css:?})).find(el => el.textContent.includes({text:?}))"
            ),
        }
    }

    /// Convert to a JavaScript expression returning all matches as an array
    #[must_use]
    pub fn to_query_all(&self) -> String {
        match self {
            Self::Css(s) => format!("Array.from(document.querySelectorAll({s:?}))"),
            Self::Role { role, name } => format!(
                "Array.from(document.querySelectorAll('[role={role:?}], {role}')).filter(el => (el.getAttribute('aria-label') || el.textContent || '').includes({name:?}))"
            ),
            Self::Text(t) => format!(
                "Array.from(document.querySelectorAll('*')).filter(el => el.textContent.includes({t:?}))"
            ),
            Self::TestId(id) => {
                format!("Array.from(document.querySelectorAll('[data-testid={id:?}]'))")
            }
            Self::CssWithText { css, text } => format!(
                "Array.from(document.querySelectorAll({css:?})).filter(el => el.textContent.includes({text:?}))"
            ),
        }
    }

    /// Convert to a JavaScript expression returning the match count
    #[must_use]
    pub fn to_count_query(&self) -> String {
        match self {
            Self::Css(s) => format!("document.querySelectorAll({s:?}).length"),
            Self::Role { role, name } => format!(
                "Array.from(document.querySelectorAll('[role={role:?}], {role}')).filter(el => (el.getAttribute('aria-label') || el.textContent || '').includes({name:?})).length"
            ),
            Self::Text(t) => format!(
                "Array.from(document.querySelectorAll('*')).filter(el => el.textContent.includes({t:?})).length"
            ),
            Self::TestId(id) => format!("document.querySelectorAll('[data-testid={id:?}]').length"),
            Self::CssWithText { css, text } => format!(
                "Array.from(document.querySelectorAll({css:?})).filter(el => el.textContent.includes({text:?})).length"
            ),
        }
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Css(s) => write!(f, "css={s}"),
            Self::Role { role, name } => write!(f, "role={role}[name={name}]"),
            Self::Text(t) => write!(f, "text={t}"),
            Self::TestId(id) => write!(f, "testid={id}"),
            Self::CssWithText { css, text } => write!(f, "css={css}[text={text}]"),
        }
    }
}
