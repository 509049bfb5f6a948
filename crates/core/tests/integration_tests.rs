// ═══════════════════════════════════════════════════════════════════
// Integration Tests — PortfolioDashboard facade (no network required)
// ═══════════════════════════════════════════════════════════════════

use std::sync::Arc;

use portfolio_dashboard_core::errors::CoreError;
use portfolio_dashboard_core::models::theme::Theme;
use portfolio_dashboard_core::models::transaction::Transaction;
use portfolio_dashboard_core::session::GuardOutcome;
use portfolio_dashboard_core::storage::{KeyValueStore, MemoryStore};
use portfolio_dashboard_core::PortfolioDashboard;

const BASE_URL: &str = "http://localhost:8080";

fn dashboard_with(store: Arc<MemoryStore>) -> PortfolioDashboard {
    PortfolioDashboard::new(BASE_URL, store as Arc<dyn KeyValueStore>).unwrap()
}

fn dashboard() -> PortfolioDashboard {
    dashboard_with(Arc::new(MemoryStore::new()))
}

fn sample_transaction() -> Transaction {
    Transaction {
        id: 0,
        symbol: "XTB".into(),
        profit_percentage: String::new(),
        date: "2025-01-15".into(),
        purchase_price: 100.0,
        current_price: String::new(),
        quantity: 2.0,
    }
}

// ── Construction & session restore ──────────────────────────────────

#[test]
fn fresh_dashboard_is_unauthenticated() {
    let dashboard = dashboard();
    assert!(!dashboard.is_authenticated());
}

#[test]
fn persisted_session_is_restored_on_construction() {
    let store = Arc::new(MemoryStore::new());
    store.set("token", "persisted-access").unwrap();
    store.set("refreshToken", "persisted-refresh").unwrap();

    let dashboard = dashboard_with(store);
    assert!(dashboard.is_authenticated());
    assert_eq!(dashboard.session().token(), Some("persisted-access"));
    assert_eq!(
        dashboard.session().refresh_token(),
        Some("persisted-refresh")
    );
}

#[test]
fn logout_clears_restored_session() {
    let store = Arc::new(MemoryStore::new());
    store.set("token", "persisted-access").unwrap();
    let mut dashboard = dashboard_with(Arc::clone(&store));

    dashboard.logout().unwrap();

    assert!(!dashboard.is_authenticated());
    assert_eq!(store.get("token").unwrap(), None);
}

// ── Operations without a session ────────────────────────────────────

#[tokio::test]
async fn transaction_calls_require_a_session() {
    let dashboard = dashboard();

    let add = dashboard.add_transaction(1, &sample_transaction()).await;
    assert!(matches!(add, Err(CoreError::Unauthenticated)));

    let delete = dashboard.delete_transaction(42).await;
    assert!(matches!(delete, Err(CoreError::Unauthenticated)));

    let list = dashboard.transactions_for_item(1, "XTB").await;
    assert!(matches!(list, Err(CoreError::Unauthenticated)));
}

#[tokio::test]
async fn bind_portfolio_requires_a_session() {
    let mut dashboard = dashboard();
    let bound = dashboard.bind_portfolio(1).await;
    assert!(matches!(bound, Err(CoreError::Unauthenticated)));
    assert!(dashboard.synchronizer().is_none());
}

#[tokio::test]
async fn guard_redirects_without_touching_the_network_when_logged_out() {
    // No token ⇒ the guard must decide locally; a network attempt against
    // the (unreachable) test base URL would error differently.
    let mut dashboard = dashboard();
    assert_eq!(dashboard.guard().await, GuardOutcome::RedirectToLogin);
}

// ── Unbind ──────────────────────────────────────────────────────────

#[test]
fn unbind_without_binding_is_a_no_op() {
    let mut dashboard = dashboard();
    dashboard.unbind_portfolio();
    assert!(dashboard.synchronizer().is_none());
}

// ── Theme ───────────────────────────────────────────────────────────

#[test]
fn theme_defaults_to_light() {
    let dashboard = dashboard();
    assert_eq!(dashboard.theme().unwrap(), Theme::Light);
}

#[test]
fn set_theme_persists_under_the_theme_key() {
    let store = Arc::new(MemoryStore::new());
    let dashboard = dashboard_with(Arc::clone(&store));

    dashboard.set_theme(Theme::Dark).unwrap();

    assert_eq!(dashboard.theme().unwrap(), Theme::Dark);
    assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
}

#[test]
fn toggle_theme_flips_and_reports_the_new_theme() {
    let dashboard = dashboard();
    assert_eq!(dashboard.toggle_theme().unwrap(), Theme::Dark);
    assert_eq!(dashboard.toggle_theme().unwrap(), Theme::Light);
}

#[test]
fn theme_survives_a_new_dashboard_over_the_same_store() {
    let store = Arc::new(MemoryStore::new());
    dashboard_with(Arc::clone(&store))
        .set_theme(Theme::Dark)
        .unwrap();

    let reopened = dashboard_with(store);
    assert_eq!(reopened.theme().unwrap(), Theme::Dark);
}
