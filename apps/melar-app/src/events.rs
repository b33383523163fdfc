//! # Navigation Events
//!
//! A completed action tells the next view what happened by handing it a
//! `NavigationEvent`. The view's initializer asks the event whether it must
//! reload its data.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  checkout ──► OrderPlaced ──► Profile(Rentals)     refresh rentals,     │
//! │                                                    cart, shop orders    │
//! │  edit product ──► ProductSaved ──► Dashboard(Products)                  │
//! │  create shop ──► ShopCreated ──► Dashboard(Products)                    │
//! │  protected view, no session ──► LoginRequired ──► Login ──► return_to   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardTab {
    Overview,
    Products,
    Orders,
    Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileTab {
    Rentals,
    Settings,
}

/// Screens of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "view", content = "tab", rename_all = "snake_case")]
pub enum View {
    Products,
    ProductDetail,
    Shops,
    ShopDetail,
    Cart,
    Checkout,
    Login,
    Profile(ProfileTab),
    Dashboard(DashboardTab),
    CreateShop,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NavigationEvent {
    OrderPlaced {
        order_ids: Vec<String>,
        whatsapp_url: Option<String>,
    },
    ProductSaved {
        product_id: String,
    },
    ProductsDeleted,
    ShopCreated {
        shop_id: String,
    },
    ProfileUpdated,
    LoginRequired {
        return_to: View,
    },
}

impl NavigationEvent {
    /// Where the application goes next.
    pub fn target(&self) -> View {
        match self {
            NavigationEvent::OrderPlaced { .. } => View::Profile(ProfileTab::Rentals),
            NavigationEvent::ProductSaved { .. }
            | NavigationEvent::ProductsDeleted
            | NavigationEvent::ShopCreated { .. } => View::Dashboard(DashboardTab::Products),
            NavigationEvent::ProfileUpdated => View::Profile(ProfileTab::Settings),
            NavigationEvent::LoginRequired { .. } => View::Login,
        }
    }

    /// Views whose cached data this event makes stale.
    pub fn refreshes(&self) -> &'static [View] {
        match self {
            NavigationEvent::OrderPlaced { .. } => &[
                View::Profile(ProfileTab::Rentals),
                View::Cart,
                View::Dashboard(DashboardTab::Orders),
                View::Dashboard(DashboardTab::Overview),
            ],
            NavigationEvent::ProductSaved { .. } | NavigationEvent::ProductsDeleted => &[
                View::Dashboard(DashboardTab::Products),
                View::Dashboard(DashboardTab::Overview),
                View::Products,
                View::ShopDetail,
            ],
            NavigationEvent::ShopCreated { .. } => &[
                View::Dashboard(DashboardTab::Overview),
                View::Dashboard(DashboardTab::Products),
                View::Dashboard(DashboardTab::Settings),
                View::Shops,
            ],
            NavigationEvent::ProfileUpdated => &[View::Profile(ProfileTab::Settings)],
            NavigationEvent::LoginRequired { .. } => &[],
        }
    }

    pub fn should_refresh(&self, view: View) -> bool {
        self.refreshes().contains(&view)
    }

    /// One-line notice for the next view.
    pub fn notice(&self) -> Option<String> {
        match self {
            NavigationEvent::OrderPlaced { order_ids, .. } if order_ids.len() == 1 => {
                Some(format!("Order #{} placed", order_ids[0]))
            }
            NavigationEvent::OrderPlaced { order_ids, .. } => {
                Some(format!("{} orders placed", order_ids.len()))
            }
            NavigationEvent::ProductSaved { .. } => Some("Product saved".to_string()),
            NavigationEvent::ProductsDeleted => Some("Products deleted".to_string()),
            NavigationEvent::ShopCreated { .. } => Some("Your shop is ready".to_string()),
            NavigationEvent::ProfileUpdated => Some("Profile updated".to_string()),
            NavigationEvent::LoginRequired { .. } => Some("Please log in to continue".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_placed_refreshes_rentals_and_cart() {
        let event = NavigationEvent::OrderPlaced {
            order_ids: vec!["41".into(), "42".into()],
            whatsapp_url: None,
        };
        assert_eq!(event.target(), View::Profile(ProfileTab::Rentals));
        assert!(event.should_refresh(View::Cart));
        assert!(event.should_refresh(View::Profile(ProfileTab::Rentals)));
        assert!(!event.should_refresh(View::Products));
        assert_eq!(event.notice().as_deref(), Some("2 orders placed"));
    }

    #[test]
    fn test_login_required_refreshes_nothing() {
        let event = NavigationEvent::LoginRequired {
            return_to: View::Checkout,
        };
        assert_eq!(event.target(), View::Login);
        assert!(event.refreshes().is_empty());
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(NavigationEvent::ProductSaved {
            product_id: "7".into(),
        })
        .unwrap();
        assert_eq!(json["event"], "product_saved");
        assert_eq!(json["product_id"], "7");
    }
}
