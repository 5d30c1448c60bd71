//! Page objects for the storefront under test.
//!
//! Each page encapsulates the selectors and flows of one storefront
//! screen. Selector knowledge lives in one place — the [`tables`] module
//! — keyed by logical concept and parameterized by [`SelectorRev`], so a
//! markup change lands as a new table revision instead of a parallel
//! page-object hierarchy.

use std::collections::HashMap;

mod admin;
mod cart;
mod login;
mod orders;
mod products;

pub use admin::{AdminPage, DashboardTotals};
pub use cart::{CartItem, CartPage};
pub use login::LoginPage;
pub use orders::{OrderPage, OrderSummary, OrderTab};
pub use products::{ProductCard, ProductsPage};

/// Trait for page objects representing a storefront screen
pub trait PageObject {
    /// URL pattern that matches this page (e.g., `/web/orders`)
    fn url_pattern(&self) -> &str;

    /// Page name for logging
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// URL pattern matcher for page objects.
///
/// Patterns support literal segments (`/web/orders`), wildcards
/// (`/web/products/*`), and named parameters (`/web/products/:id`).
#[derive(Debug, Clone)]
pub struct UrlMatcher {
    pattern: String,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Wildcard,
    Param(String),
}

impl UrlMatcher {
    /// Create a matcher from a pattern
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| {
                if s == "*" {
                    Segment::Wildcard
                } else if let Some(name) = s.strip_prefix(':') {
                    Segment::Param(name.to_string())
                } else {
                    Segment::Literal(s.to_string())
                }
            })
            .collect();
        Self {
            pattern: pattern.to_string(),
            segments,
        }
    }

    /// Whether a URL path matches the pattern.
    ///
    /// Wildcards and parameters each consume exactly one segment.
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        let path = Self::path_of(url);
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if parts.len() != self.segments.len() {
            return false;
        }
        self.segments
            .iter()
            .zip(&parts)
            .all(|(segment, part)| match segment {
                Segment::Literal(lit) => lit == part,
                Segment::Wildcard | Segment::Param(_) => true,
            })
    }

    /// Extract named parameters from a matching URL
    #[must_use]
    pub fn params(&self, url: &str) -> HashMap<String, String> {
        let path = Self::path_of(url);
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        self.segments
            .iter()
            .zip(&parts)
            .filter_map(|(segment, part)| match segment {
                Segment::Param(name) => Some((name.clone(), (*part).to_string())),
                Segment::Literal(_) | Segment::Wildcard => None,
            })
            .collect()
    }

    /// The original pattern
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    // Strip scheme and host so full URLs match path patterns.
    fn path_of(url: &str) -> &str {
        url.find("://")
            .and_then(|idx| url[idx + 3..].find('/').map(|p| &url[idx + 3 + p..]))
            .unwrap_or(url)
    }
}

/// Revision of the selector-candidate tables.
///
/// The storefront's markup has drifted across versions; rather than
/// forking page objects, each logical concept carries one candidate chain
/// per revision. `V2` extends `V1`'s chains with the class/id fallbacks
/// later markup needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectorRev {
    /// Original markup: role/text strategies only
    V1,
    /// Current markup: adds class and id-substring fallbacks
    #[default]
    V2,
}

/// Selector-candidate tables shared by the page objects (and the seeded
/// mock storefront, which stubs the same primary candidates).
pub mod tables {
    use super::SelectorRev;
    use crate::locator::FallbackLocator;
    use crate::selector::Selector;

    /// Logout button in the nav bar
    #[must_use]
    pub fn logout_button(_rev: SelectorRev) -> FallbackLocator {
        FallbackLocator::new("logout button", Selector::role("button", "Logout"))
    }

    /// Cart link in the nav bar (badge text carries the item count)
    #[must_use]
    pub fn cart_link(_rev: SelectorRev) -> FallbackLocator {
        FallbackLocator::new("cart link", Selector::role("link", "cart"))
            .or(Selector::css("a[href=\"/web/cart\"]"))
    }

    /// Page heading with the given text
    #[must_use]
    pub fn page_heading(text: &str) -> FallbackLocator {
        FallbackLocator::new(
            format!("heading '{text}'"),
            Selector::css_with_text("h1", text),
        )
    }

    /// Inline alert containing the given text
    #[must_use]
    pub fn alert(text: &str) -> FallbackLocator {
        FallbackLocator::new(
            format!("alert '{text}'"),
            Selector::css_with_text(".alert", text),
        )
    }

    /// Email input on the login form
    #[must_use]
    pub fn email_input(rev: SelectorRev) -> FallbackLocator {
        let locator = FallbackLocator::new("email input", Selector::css("input[type=\"email\"]"));
        match rev {
            SelectorRev::V1 => locator,
            SelectorRev::V2 => locator
                .or(Selector::css("#email"))
                .or(Selector::css("input[name=\"email\"]")),
        }
    }

    /// Password input on the login form
    #[must_use]
    pub fn password_input(rev: SelectorRev) -> FallbackLocator {
        let locator =
            FallbackLocator::new("password input", Selector::css("input[type=\"password\"]"));
        match rev {
            SelectorRev::V1 => locator,
            SelectorRev::V2 => locator.or(Selector::css("#password")),
        }
    }

    /// Submit button on the login form
    #[must_use]
    pub fn login_button(rev: SelectorRev) -> FallbackLocator {
        let locator = FallbackLocator::new("login button", Selector::role("button", "Login"));
        match rev {
            SelectorRev::V1 => locator,
            SelectorRev::V2 => locator.or(Selector::css("button[type=\"submit\"]")),
        }
    }

    /// Product cards on the products page
    #[must_use]
    pub fn product_card(rev: SelectorRev) -> FallbackLocator {
        let locator = FallbackLocator::new("product card", Selector::css(".product-card"));
        match rev {
            SelectorRev::V1 => locator,
            SelectorRev::V2 => locator.or(Selector::css("#products-grid > div")),
        }
    }

    /// Add-to-cart buttons on product cards
    #[must_use]
    pub fn add_to_cart_button(_rev: SelectorRev) -> FallbackLocator {
        FallbackLocator::new(
            "add to cart button",
            Selector::css_with_text("button", "Add to Cart"),
        )
    }

    /// Empty-cart label
    #[must_use]
    pub fn cart_empty_label(_rev: SelectorRev) -> FallbackLocator {
        FallbackLocator::new("cart empty label", Selector::text("Your cart is empty"))
    }

    /// Cart item rows
    #[must_use]
    pub fn cart_item_card(rev: SelectorRev) -> FallbackLocator {
        let locator = FallbackLocator::new("cart item", Selector::css(".cart-item"));
        match rev {
            SelectorRev::V1 => locator,
            SelectorRev::V2 => locator.or(Selector::css("#cart-items > div")),
        }
    }

    /// Per-item remove buttons in the cart
    #[must_use]
    pub fn remove_button(rev: SelectorRev) -> FallbackLocator {
        let locator = FallbackLocator::new("remove button", Selector::role("button", "Remove"))
            .or(Selector::css_with_text("button", "Remove"));
        match rev {
            SelectorRev::V1 => locator,
            SelectorRev::V2 => locator
                .or(Selector::css(".remove-btn"))
                .or(Selector::css("button[class*=\"remove\"]"))
                .or(Selector::css("button[id*=\"btn-remove\"]")),
        }
    }

    /// Quantity inputs on cart rows
    #[must_use]
    pub fn quantity_input(rev: SelectorRev) -> FallbackLocator {
        let locator = FallbackLocator::new("quantity input", Selector::css("input.qty-input"));
        match rev {
            SelectorRev::V1 => locator,
            SelectorRev::V2 => locator
                .or(Selector::css("input[id*=\"qty-input\"]"))
                .or(Selector::css("input[type=\"number\"]")),
        }
    }

    /// Quantity increase buttons on cart rows
    #[must_use]
    pub fn increase_button(rev: SelectorRev) -> FallbackLocator {
        let locator =
            FallbackLocator::new("increase button", Selector::css_with_text("button", "+"));
        match rev {
            SelectorRev::V1 => locator,
            SelectorRev::V2 => locator
                .or(Selector::css(".btn-increase"))
                .or(Selector::css("button[id*=\"btn-increase\"]")),
        }
    }

    /// Quantity decrease buttons on cart rows
    #[must_use]
    pub fn decrease_button(rev: SelectorRev) -> FallbackLocator {
        let locator =
            FallbackLocator::new("decrease button", Selector::css_with_text("button", "-"));
        match rev {
            SelectorRev::V1 => locator,
            SelectorRev::V2 => locator
                .or(Selector::css(".btn-decrease"))
                .or(Selector::css("button[id*=\"btn-decrease\"]")),
        }
    }

    /// Cart subtotal display
    #[must_use]
    pub fn cart_subtotal(_rev: SelectorRev) -> FallbackLocator {
        FallbackLocator::new("cart subtotal", Selector::css("#cart-subtotal"))
    }

    /// Cart total display
    #[must_use]
    pub fn cart_total(_rev: SelectorRev) -> FallbackLocator {
        FallbackLocator::new("cart total", Selector::css("#cart-total"))
    }

    /// Checkout button (raises the shipping-address prompt)
    #[must_use]
    pub fn checkout_button(rev: SelectorRev) -> FallbackLocator {
        let locator = FallbackLocator::new(
            "checkout button",
            Selector::css_with_text("button", "Proceed to Checkout"),
        )
        .or(Selector::css_with_text("button", "Checkout"));
        match rev {
            SelectorRev::V1 => locator,
            SelectorRev::V2 => locator
                .or(Selector::css("#btn-checkout"))
                .or(Selector::css("[class*=\"checkout\"]")),
        }
    }

    /// Clear-cart button
    #[must_use]
    pub fn clear_cart_button(rev: SelectorRev) -> FallbackLocator {
        let locator = FallbackLocator::new(
            "clear cart button",
            Selector::css_with_text("button", "Clear Cart"),
        );
        match rev {
            SelectorRev::V1 => locator,
            SelectorRev::V2 => locator
                .or(Selector::css(".clear-cart"))
                .or(Selector::css("#btn-clear-cart")),
        }
    }

    /// Order cards on the orders page
    #[must_use]
    pub fn order_card(_rev: SelectorRev) -> FallbackLocator {
        FallbackLocator::new(
            "order card",
            Selector::css_with_text("main > div > div:last-child > div", "Order #"),
        )
    }

    /// Cancel-order buttons on pending order cards
    #[must_use]
    pub fn cancel_order_button(_rev: SelectorRev) -> FallbackLocator {
        FallbackLocator::new(
            "cancel order button",
            Selector::css_with_text("button", "Cancel Order"),
        )
    }

    /// Inline confirmation after a cancellation (both spellings ship)
    #[must_use]
    pub fn order_cancelled_banner(_rev: SelectorRev) -> FallbackLocator {
        FallbackLocator::new(
            "order cancelled banner",
            Selector::css_with_text(".alert", "Order cancelled"),
        )
        .or(Selector::css_with_text(".alert", "Order canceled"))
    }

    /// Empty-state label on the orders page
    #[must_use]
    pub fn no_orders_label(_rev: SelectorRev) -> FallbackLocator {
        FallbackLocator::new("no orders label", Selector::text("No orders found"))
    }

    /// Status filter tab on the orders page
    #[must_use]
    pub fn order_tab(label: &str) -> FallbackLocator {
        FallbackLocator::new(
            format!("{label} tab"),
            Selector::css_with_text("button", label),
        )
    }

    /// Total-orders stat on the admin dashboard
    #[must_use]
    pub fn admin_total_orders(rev: SelectorRev) -> FallbackLocator {
        let locator = FallbackLocator::new("total orders stat", Selector::css("#total-orders"));
        match rev {
            SelectorRev::V1 => locator,
            SelectorRev::V2 => locator.or(Selector::css_with_text(".stat", "Total Orders")),
        }
    }

    /// Total-revenue stat on the admin dashboard
    #[must_use]
    pub fn admin_total_revenue(rev: SelectorRev) -> FallbackLocator {
        let locator = FallbackLocator::new("total revenue stat", Selector::css("#total-revenue"));
        match rev {
            SelectorRev::V1 => locator,
            SelectorRev::V2 => locator.or(Selector::css_with_text(".stat", "Total Revenue")),
        }
    }
}
