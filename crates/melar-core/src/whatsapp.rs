//! # WhatsApp Confirmation
//!
//! Checkout ends by handing the buyer a `wa.me` link with a prefilled message
//! to the shop (or to the platform admin when the cart spans several shops).
//!
//! ```text
//! cart lines ──► build_message() ──► text
//! shop phone ──► pick_target()   ──► 62xxxxxxxxxx
//!                                        │
//!                     wa_link(number, text)
//!                                        ▼
//!              https://wa.me/62xxxxxxxxxx?text=Hello%2C%0A...
//! ```

use std::fmt::Write;

use url::form_urlencoded::byte_serialize;

use crate::cart::CartLineItem;
use crate::forms::BillingDetails;
use crate::money::Money;

/// Normalizes a phone number to the `62…` international form.
///
/// Non-digits are stripped. A leading `0` becomes `62`, and `62` is prefixed
/// when missing. Returns `None` when no digits remain.
///
/// ```rust
/// use melar_core::whatsapp::normalize_phone;
///
/// assert_eq!(normalize_phone("0812-3456-789").as_deref(), Some("628123456789"));
/// assert_eq!(normalize_phone("+62 812 3456 789").as_deref(), Some("628123456789"));
/// assert_eq!(normalize_phone("812 3456 789").as_deref(), Some("628123456789"));
/// assert_eq!(normalize_phone("n/a"), None);
/// ```
pub fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    if let Some(rest) = digits.strip_prefix('0') {
        return Some(format!("62{}", rest));
    }
    if digits.starts_with("62") {
        return Some(digits);
    }
    Some(format!("62{}", digits))
}

/// Chooses who receives the confirmation.
///
/// `shop_phone` is the phone of the single shop every line belongs to, or
/// `None` when the cart spans several shops or that shop has no phone.
pub fn pick_target(shop_phone: Option<&str>, admin_number: &str) -> String {
    shop_phone
        .and_then(normalize_phone)
        .or_else(|| normalize_phone(admin_number))
        .unwrap_or_else(|| admin_number.to_string())
}

/// Everything the confirmation text mentions.
#[derive(Debug, Clone, Copy)]
pub struct ConfirmationInput<'a> {
    /// Backend ids of the orders just created.
    pub order_refs: &'a [String],
    pub billing: &'a BillingDetails,
    pub items: &'a [CartLineItem],
    /// Sum of the created orders' totals, as reported by the backend.
    pub estimated_total: Money,
    pub currency_symbol: &'a str,
}

/// Builds the prefilled message text.
pub fn build_message(input: &ConfirmationInput<'_>) -> String {
    let symbol = input.currency_symbol;
    let mut text = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(text, "Hello,");
    let _ = writeln!(text, "I would like to confirm my Melar order:");
    let _ = writeln!(text, "Order ref: {}", input.order_refs.join(", "));
    let _ = writeln!(text, "Name: {}", input.billing.full_name());
    let _ = writeln!(text, "Email: {}", input.billing.email.trim());
    let _ = writeln!(text, "Phone/WA: {}", input.billing.phone.trim());
    let _ = writeln!(text, "Shipping address: {}", input.billing.address_line());
    let _ = writeln!(text);
    let _ = writeln!(text, "Order details:");

    for (index, line) in input.items.iter().enumerate() {
        let days = line.day_count();
        let _ = writeln!(
            text,
            "{}. {} (Shop: {})",
            index + 1,
            line.product_name,
            line.seller_name.as_deref().unwrap_or("N/A")
        );
        let _ = writeln!(text, "   Quantity: {}", line.quantity);
        let _ = writeln!(
            text,
            "   Period: {} ({} {})",
            line.period(),
            days,
            if days == 1 { "day" } else { "days" }
        );
        let _ = writeln!(text, "   Subtotal: {}", line.line_total().format_with(symbol));
        if index + 1 < input.items.len() {
            let _ = writeln!(text);
        }
    }

    let _ = writeln!(text);
    let _ = writeln!(
        text,
        "Estimated total (before delivery or other fees): {}",
        input.estimated_total.format_with(symbol)
    );
    let _ = writeln!(text);
    let _ = writeln!(text, "Please confirm availability and the payment instructions.");
    text.push_str("Thank you!");
    text
}

/// `https://wa.me/<number>?text=<urlencoded>`
pub fn wa_link(number: &str, text: &str) -> String {
    let encoded: String = byte_serialize(text.as_bytes()).collect();
    format!("https://wa.me/{}?text={}", number, encoded)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_ADMIN_WHATSAPP;
    use chrono::{NaiveDate, Utc};

    fn item() -> CartLineItem {
        CartLineItem {
            line_id: "l1".into(),
            product_id: "7".into(),
            product_name: "Sony A7 III".into(),
            unit_price_per_day: Money::from_cents(4599),
            quantity: 1,
            rental_start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            rental_end: NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            seller_id: Some("3".into()),
            seller_name: Some("Kamera Bandung".into()),
            image: None,
            added_at: Utc::now(),
        }
    }

    fn billing() -> BillingDetails {
        BillingDetails {
            first_name: "Rina".into(),
            last_name: "Wijaya".into(),
            email: "rina@example.com".into(),
            phone: "081234567890".into(),
            address: "Jl. Merdeka 1".into(),
            city: "Bandung".into(),
            state: "Jawa Barat".into(),
            zip: "40111".into(),
        }
    }

    #[test]
    fn test_pick_target() {
        assert_eq!(
            pick_target(Some("0811-222-333"), DEFAULT_ADMIN_WHATSAPP),
            "62811222333"
        );
        assert_eq!(pick_target(None, DEFAULT_ADMIN_WHATSAPP), DEFAULT_ADMIN_WHATSAPP);
        // a phone field with no digits falls back to the admin
        assert_eq!(pick_target(Some("-"), DEFAULT_ADMIN_WHATSAPP), DEFAULT_ADMIN_WHATSAPP);
    }

    #[test]
    fn test_message_content() {
        let items = vec![item()];
        let refs = vec!["99".to_string(), "100".to_string()];
        let billing = billing();
        let text = build_message(&ConfirmationInput {
            order_refs: &refs,
            billing: &billing,
            items: &items,
            estimated_total: Money::from_cents(13797),
            currency_symbol: "$",
        });

        assert!(text.contains("Order ref: 99, 100"));
        assert!(text.contains("Name: Rina Wijaya"));
        assert!(text.contains("Shipping address: Jl. Merdeka 1, Bandung, Jawa Barat, 40111"));
        assert!(text.contains("1. Sony A7 III (Shop: Kamera Bandung)"));
        assert!(text.contains("(3 days)"));
        assert!(text.contains("Subtotal: $137.97"));
        assert!(text.contains("Estimated total (before delivery or other fees): $137.97"));
        assert!(text.ends_with("Thank you!"));
    }

    #[test]
    fn test_link_is_encoded() {
        let link = wa_link("628123", "Hello,\nOrder ref: 1 & 2");
        assert!(link.starts_with("https://wa.me/628123?text="));
        let query = link.split_once("?text=").unwrap().1;
        assert!(!query.contains(' '));
        assert!(!query.contains('\n'));
        assert!(!query.contains('&'));
        assert!(query.contains("%0A"));
    }
}
