//! Process-wide client handle built from loaded config. Kept in its own test
//! binary so nothing else touches the slot first.

use std::io::Write;
use std::path::Path;

use bugtrack_client::config::{ANON_KEY_VAR, ClientOptions, SupabaseConfig, URL_VAR, load_from};
use bugtrack_client::{AppError, SupabaseClient, client};

fn env(k: &str) -> Option<String> {
    match k {
        URL_VAR => Some("https://demo.supabase.co/".into()),
        ANON_KEY_VAR => Some("anon-key".into()),
        _ => None,
    }
}

#[test]
fn shared_handle_follows_config_and_is_built_once() {
    // Missing env: error, slot left empty.
    let missing = Path::new("/nonexistent/bugtrack.toml");
    match client::shared_with(|| load_from(missing, false, |_: &str| None)) {
        Err(AppError::Config(msg)) => assert!(msg.contains(URL_VAR)),
        Err(e) => panic!("unexpected error: {e}"),
        Ok(_) => panic!("shared_with must fail without environment"),
    }

    let mut f = tempfile::NamedTempFile::new().unwrap();
    f.write_all(b"[client]\nschema = \"tracker\"\ntimeout_seconds = 5\n").unwrap();

    let built = client::shared_with(|| load_from(f.path(), true, env)).unwrap();
    assert_eq!(built.rest_url(), "https://demo.supabase.co/rest/v1");
    assert_eq!(built.schema(), "tracker");

    // Filled slot: the loader is not consulted again.
    let again = client::shared_with(|| panic!("loader must not run twice")).unwrap();
    assert!(std::ptr::eq(built, again));
    assert!(std::ptr::eq(built, client::shared().unwrap()));

    let other = SupabaseClient::new(
        SupabaseConfig::new("https://other.supabase.co", "k2"),
        ClientOptions::default(),
    )
    .unwrap();
    assert!(std::ptr::eq(built, client::install(other)));
}
