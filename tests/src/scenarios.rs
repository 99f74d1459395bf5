//! End-to-end scenarios for the aggregation engine, driven entirely through
//! mock collaborators.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use keyscout_common::config::Config;
use keyscout_common::model::license::ServiceState;
use keyscout_core::aggregator;
use keyscout_core::sources::registry::{CURRENT_VERSION_PATH, DEFAULT_KEY_PATHS};

use crate::mocks::{self, MockInvoker, MockManagement, MockResolver};

fn missing_tool_path() -> std::path::PathBuf {
    std::env::temp_dir().join("keyscout-no-such-tool.exe")
}

/// A path guaranteed to exist, standing in for a real tool binary.
fn present_tool_path() -> std::path::PathBuf {
    std::env::temp_dir()
}

#[tokio::test]
async fn local_host_end_to_end() {
    let mut client = MockManagement::available();
    client.products = vec![mocks::licensed_product("3V66T")];
    client
        .binary_values
        .insert(CURRENT_VERSION_PATH.to_string(), vec![0u8; 67]);
    client.string_values.insert(
        (CURRENT_VERSION_PATH.to_string(), "ProductName".to_string()),
        "Windows 10 Pro".to_string(),
    );
    let client = Arc::new(client);

    let cfg = Config {
        skip_default_product_keys: true,
        produkey_path: Some(missing_tool_path()),
        ..Config::default()
    };
    let deps = mocks::collaborators(
        MockResolver::local("WORKSTATION01"),
        client.clone(),
        MockInvoker { output: None },
    );

    let records = aggregator::recover_host("localhost", &cfg, &deps).await;

    // One licensing record, one decoded registry record; the missing tool
    // contributes nothing and disturbs nothing.
    assert_eq!(records.len(), 2);

    assert_eq!(records[0].source, "LicensingProductA");
    assert_eq!(records[0].license_status, "Licensed");
    assert_eq!(records[0].product_key, "3V66T");
    assert!(records[0].is_valid());

    assert_eq!(records[1].source, CURRENT_VERSION_PATH);
    assert_eq!(records[1].product_key, "BBBBB-BBBBB-BBBBB-BBBBB-BBBB");
    assert_eq!(records[1].product_name, "Windows 10 Pro");
    assert!(records[1].is_valid());

    // Local hosts never take a service lease.
    assert_eq!(client.service_queries.load(Ordering::SeqCst), 0);
    assert_eq!(client.service_starts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unreachable_remote_yields_one_sentinel() {
    let cfg = Config::default();
    let deps = mocks::collaborators(
        MockResolver::remote("box7", false),
        Arc::new(MockManagement::available()),
        MockInvoker { output: None },
    );

    let records = aggregator::recover_host("box7", &cfg, &deps).await;

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert!(!record.is_valid());
    assert_eq!(record.source, "Unreachable");
    assert_eq!(record.product_key, "Unreachable");
    assert_eq!(record.product_id, "Unreachable");
    assert_eq!(record.manufacturer, "Unreachable");
}

#[tokio::test]
async fn unreachable_remote_is_suppressed_when_filtering() {
    let cfg = Config {
        show_only_valid: true,
        ..Config::default()
    };
    let deps = mocks::collaborators(
        MockResolver::remote("box7", false),
        Arc::new(MockManagement::available()),
        MockInvoker { output: None },
    );

    let records = aggregator::recover_host("box7", &cfg, &deps).await;
    assert!(records.is_empty());
}

#[tokio::test]
async fn management_unavailable_yields_one_sentinel_unless_filtered() {
    let client = Arc::new(MockManagement {
        host_info: None,
        ..MockManagement::default()
    });

    let cfg = Config::default();
    let deps = mocks::collaborators(
        MockResolver::local("WORKSTATION01"),
        client.clone(),
        MockInvoker { output: None },
    );
    let records = aggregator::recover_host("localhost", &cfg, &deps).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].source, "ManagementUnavailable");
    assert!(!records[0].is_valid());

    let cfg = Config {
        show_only_valid: true,
        ..Config::default()
    };
    let deps = mocks::collaborators(
        MockResolver::local("WORKSTATION01"),
        client,
        MockInvoker { output: None },
    );
    let records = aggregator::recover_host("localhost", &cfg, &deps).await;
    assert!(records.is_empty());
}

#[tokio::test]
async fn lease_is_balanced_even_when_a_registry_read_fails() {
    let mut client =
        MockManagement::available().with_service_state(ServiceState::Stopped);
    client
        .binary_values
        .insert(CURRENT_VERSION_PATH.to_string(), vec![0u8; 67]);
    // The first default path raises mid-walk instead of returning absent.
    client.failing_paths.insert(DEFAULT_KEY_PATHS[0].to_string());
    let client = Arc::new(client);

    let cfg = Config {
        skip_produkey: true,
        ..Config::default()
    };
    let deps = mocks::collaborators(
        MockResolver::remote("box1", true),
        client.clone(),
        MockInvoker { output: None },
    );

    let records = aggregator::recover_host("box1", &cfg, &deps).await;

    // One decoded record plus one sentinel per unreadable/absent path.
    assert_eq!(records.len(), 3);
    assert!(records.iter().any(|r| r.source == CURRENT_VERSION_PATH && r.is_valid()));
    assert_eq!(records.iter().filter(|r| !r.is_valid()).count(), 2);

    // Exactly one acquire and one release, despite the mid-walk failure.
    assert_eq!(client.service_queries.load(Ordering::SeqCst), 1);
    assert_eq!(client.service_starts.load(Ordering::SeqCst), 1);
    assert_eq!(client.service_stops.load(Ordering::SeqCst), 1);
    assert_eq!(
        *client.service_state.lock().unwrap(),
        Some(ServiceState::Stopped)
    );
}

#[tokio::test]
async fn lease_respects_the_no_enable_flag() {
    let client = Arc::new(
        MockManagement::available().with_service_state(ServiceState::Stopped),
    );

    let cfg = Config {
        dont_enable_remote_registry: true,
        skip_produkey: true,
        ..Config::default()
    };
    let deps = mocks::collaborators(
        MockResolver::remote("box1", true),
        client.clone(),
        MockInvoker { output: None },
    );

    aggregator::recover_host("box1", &cfg, &deps).await;

    assert_eq!(client.service_queries.load(Ordering::SeqCst), 1);
    assert_eq!(client.service_starts.load(Ordering::SeqCst), 0);
    assert_eq!(client.service_stops.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn valid_only_keeps_real_keys_and_drops_not_found() {
    let mut client = MockManagement::available();
    client.products = vec![mocks::licensed_product("3V66T")];
    // No registry blobs anywhere: three "not found" sentinels pre-filter.
    let client = Arc::new(client);

    let cfg = Config {
        show_only_valid: true,
        skip_produkey: true,
        ..Config::default()
    };
    let deps = mocks::collaborators(
        MockResolver::local("WORKSTATION01"),
        client,
        MockInvoker { output: None },
    );

    let records = aggregator::recover_host("localhost", &cfg, &deps).await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].source, "LicensingProductA");
    assert_eq!(records[0].product_key, "3V66T");
}

#[tokio::test]
async fn oem_fields_are_projected_out_on_request() {
    let mut client = MockManagement::available();
    client.products = vec![mocks::licensed_product("3V66T")];
    let client = Arc::new(client);

    let cfg = Config {
        skip_oem_info: true,
        skip_reg_product_key: true,
        skip_produkey: true,
        ..Config::default()
    };
    let deps = mocks::collaborators(
        MockResolver::local("WORKSTATION01"),
        client,
        MockInvoker { output: None },
    );

    let records = aggregator::recover_host("localhost", &cfg, &deps).await;

    assert_eq!(records.len(), 1);
    assert!(records[0].manufacturer.is_empty());
    assert!(records[0].model.is_empty());
    assert_eq!(records[0].serial_number, "ABC1234");
}

#[tokio::test]
async fn external_tool_rows_survive_a_hostname_mismatch() {
    let client = Arc::new(MockManagement::available());

    let cfg = Config {
        skip_reg_product_key: true,
        produkey_path: Some(present_tool_path()),
        ..Config::default()
    };
    let output =
        "Windows 10 Pro\tid-1\tVK7JG-NPHTM-C97JM-9MPGT-3V66T\tC:\\Windows\t\t19045\tOTHERBOX\t2024-01-05\n";
    let deps = mocks::collaborators(
        MockResolver::local("WORKSTATION01"),
        client,
        MockInvoker {
            output: Some(output.to_string()),
        },
    );

    let records = aggregator::recover_host("localhost", &cfg, &deps).await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].source, "ExternalTool");
    assert_eq!(records[0].product_key, "VK7JG-NPHTM-C97JM-9MPGT-3V66T");
}

#[tokio::test]
async fn hosts_are_aggregated_independently() {
    let mut client = MockManagement::available();
    client.products = vec![mocks::licensed_product("3V66T")];
    let client = Arc::new(client);

    let cfg = Arc::new(Config {
        skip_reg_product_key: true,
        skip_produkey: true,
        ..Config::default()
    });
    let deps = Arc::new(mocks::collaborators(
        MockResolver::local("WORKSTATION01"),
        client,
        MockInvoker { output: None },
    ));

    let records = aggregator::recover_keys(
        vec!["localhost".to_string(), "localhost".to_string()],
        cfg,
        deps,
    )
    .await;

    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.source == "LicensingProductA"));
}
