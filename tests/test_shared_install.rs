//! Seeding the process-wide handle with `install`. Separate binary from
//! `test_shared.rs` because the slot can only be filled once per process.

use bugtrack_client::config::{ClientOptions, SupabaseConfig};
use bugtrack_client::{SupabaseClient, client};

fn handle(url: &str, key: &str) -> SupabaseClient {
    SupabaseClient::new(SupabaseConfig::new(url, key), ClientOptions::default()).unwrap()
}

#[test]
fn first_installed_handle_wins() {
    let installed = client::install(handle("https://first.supabase.co", "k1"));
    let again = client::install(handle("https://second.supabase.co", "k2"));
    assert!(std::ptr::eq(installed, again));

    let a = client::shared().unwrap();
    let b = client::shared_with(|| panic!("slot is already filled")).unwrap();
    assert!(std::ptr::eq(a, installed));
    assert!(std::ptr::eq(a, b));
    assert_eq!(a.rest_url(), "https://first.supabase.co/rest/v1");
}
