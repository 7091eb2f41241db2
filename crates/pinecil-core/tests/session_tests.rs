//! Integration tests for the device session
//!
//! These drive a `DeviceSession` over the in-memory IronOS mock and check the
//! exact radio traffic each operation produces.


use pinecil_core::schema::{
    self, Layout, BULK_LIVE_DATA_SLOT, BULK_LIVE_DATA_UUID, INFO_FIELDS, LIVE_DATA_FIELDS,
    SAVE_TO_FLASH, SETTINGS,
};
use pinecil_core::{DeviceSession, ErrorKind, PinecilError};
use test_utils::{bulk_live_record, initial_setting_value, MockTransport, LIVE_VALUES};

async fn connected_session() -> DeviceSession<MockTransport> {
    let _ = tracing_subscriber::fmt::try_init();
    let mut session = DeviceSession::new(MockTransport::pinecil());
    session.connect().await.unwrap();
    session
}

// ----------------------------------------------------------------------------
// Connection Lifecycle
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_not_connected_after_creation() {
    let session = DeviceSession::new(MockTransport::pinecil());
    assert!(!session.is_connected().await);
}

#[tokio::test]
async fn test_connect_is_lazy() {
    let session = connected_session().await;
    assert!(session.is_connected().await);

    let device = session.transport().device();
    assert_eq!(device.connects, 1);
    assert_eq!(device.listings, 0);
    assert!(device.reads.is_empty());
}

#[tokio::test]
async fn test_connect_twice_is_noop() {
    let mut session = connected_session().await;
    session.connect().await.unwrap();
    assert_eq!(session.transport().device().connects, 1);
}

#[tokio::test]
async fn test_unreachable_device_is_not_found() {
    let transport = MockTransport::pinecil();
    transport.device().reachable = false;
    let mut session = DeviceSession::new(transport);

    let err = session.connect().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DeviceNotFound);
    assert!(!session.is_connected().await);
}

#[tokio::test]
async fn test_operations_before_connect_fail_disconnected() {
    let mut session = DeviceSession::new(MockTransport::pinecil());

    assert_eq!(
        session.get_all_settings().await.unwrap_err().kind(),
        ErrorKind::DeviceDisconnected
    );
    assert_eq!(
        session.set_one_setting("SetTemperature", 250).await.unwrap_err().kind(),
        ErrorKind::DeviceDisconnected
    );
    assert_eq!(
        session.save_to_flash().await.unwrap_err().kind(),
        ErrorKind::DeviceDisconnected
    );
    assert_eq!(
        session.get_info().await.unwrap_err().kind(),
        ErrorKind::DeviceDisconnected
    );
    assert_eq!(
        session.get_live_data().await.unwrap_err().kind(),
        ErrorKind::DeviceDisconnected
    );

    let device = session.transport().device();
    assert_eq!(device.connects, 0);
    assert!(device.reads.is_empty());
    assert!(device.writes.is_empty());
}

#[tokio::test]
async fn test_dropped_link_fails_fast_without_reconnecting() {
    let mut session = connected_session().await;
    session.transport().drop_link();

    let err = session.get_live_data().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DeviceDisconnected);
    assert!(!session.is_connected().await);

    // Restoring the radio link does not revive the session on its own
    session.transport().device().link_up = true;
    let err = session.get_live_data().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DeviceDisconnected);
    assert_eq!(session.transport().device().connects, 1);
}

#[tokio::test]
async fn test_explicit_disconnect() {
    let mut session = connected_session().await;
    session.disconnect().await.unwrap();

    assert!(!session.is_connected().await);
    assert!(!session.transport().device().link_up);
    assert_eq!(
        session.get_info().await.unwrap_err().kind(),
        ErrorKind::DeviceDisconnected
    );
}

// ----------------------------------------------------------------------------
// Settings
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_get_all_settings_reads_each_setting_once() {
    let mut session = connected_session().await;
    let settings = session.get_all_settings().await.unwrap();

    assert_eq!(settings.len(), SETTINGS.len());
    for setting in SETTINGS {
        assert_eq!(
            settings[setting.name],
            initial_setting_value(setting.index) as i64,
            "{}",
            setting.name
        );
    }

    let device = session.transport().device();
    assert_eq!(device.reads.len(), SETTINGS.len());
    assert!(!device.reads.contains(&SAVE_TO_FLASH.uuid()));
}

#[tokio::test]
async fn test_get_all_settings_fails_whole_call_on_dropped_read() {
    let mut session = connected_session().await;
    session.transport().device().drop_link_on_read = Some(5);

    let err = session.get_all_settings().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DeviceDisconnected);
    assert_eq!(session.transport().device().reads.len(), 6);
    assert!(!session.is_connected().await);
}

#[tokio::test]
async fn test_set_one_setting_writes_encoded_value() {
    let mut session = connected_session().await;
    session.set_one_setting("SetTemperature", 250).await.unwrap();

    let set_temperature = schema::setting("SetTemperature").unwrap();
    let device = session.transport().device();
    assert_eq!(
        device.writes,
        vec![(set_temperature.uuid(), 250u16.to_le_bytes().to_vec())]
    );
}

#[tokio::test]
async fn test_written_value_is_visible_without_flash_commit() {
    let mut session = connected_session().await;
    session.set_one_setting("SetTemperature", 250).await.unwrap();
    assert!(session.set_one_setting("SetTemperature", 999).await.is_err());

    let settings = session.get_all_settings().await.unwrap();
    assert_eq!(settings["SetTemperature"], 250);
    assert_eq!(session.get_setting("SetTemperature").await.unwrap(), 250);
}

#[tokio::test]
async fn test_out_of_range_values_never_reach_transport() {
    let mut session = connected_session().await;

    for setting in SETTINGS {
        for value in [setting.min - 1, setting.max + 1] {
            let err = session.set_one_setting(setting.name, value).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ValueOutOfRange, "{} = {}", setting.name, value);
        }
    }
    assert!(session.transport().device().writes.is_empty());

    for setting in SETTINGS {
        session.set_one_setting(setting.name, setting.min).await.unwrap();
        session.set_one_setting(setting.name, setting.max).await.unwrap();
    }
    assert_eq!(session.transport().device().writes.len(), SETTINGS.len() * 2);
}

#[tokio::test]
async fn test_specific_out_of_range_values() {
    let mut session = connected_session().await;
    for (name, value) in [("SetTemperature", 0), ("SleepTimeout", 50), ("SetTemperature", 999)] {
        let err = session.set_one_setting(name, value).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueOutOfRange);
    }
}

#[tokio::test]
async fn test_unknown_setting_is_rejected_before_io() {
    let mut session = DeviceSession::new(MockTransport::pinecil());

    let err = session
        .set_one_setting("ThisSettingDoesNotExist", 50)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidSetting);

    session.connect().await.unwrap();
    let err = session
        .set_one_setting("ThisSettingDoesNotExist", 50)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidSetting);

    let device = session.transport().device();
    assert_eq!(device.listings, 0);
    assert!(device.writes.is_empty());
}

#[tokio::test]
async fn test_save_to_flash_writes_commit_command() {
    let mut session = connected_session().await;
    session.save_to_flash().await.unwrap();

    let device = session.transport().device();
    assert_eq!(device.writes, vec![(SAVE_TO_FLASH.uuid(), vec![0x01, 0x00])]);
}

// ----------------------------------------------------------------------------
// Info and Live Data
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_get_info() {
    let mut session = connected_session().await;
    let info = session.get_info().await.unwrap();

    assert_eq!(info["build"], "2.22");
    assert_eq!(info["id"], "1234567F");
    assert_eq!(info["name"], "Pinecil-1234567F");
    assert_eq!(info["serial"], "000000C0FFEE0042");
    assert_eq!(info["accelerometer"], "LIS2DH12");
}

#[tokio::test]
async fn test_get_live_data_is_one_read() {
    let mut session = connected_session().await;
    let live = session.get_live_data().await.unwrap();

    assert_eq!(live.len(), LIVE_DATA_FIELDS.len());
    for field in LIVE_DATA_FIELDS {
        assert_eq!(live[field.name], LIVE_VALUES[field.index] as i64, "{}", field.name);
    }
    assert_eq!(session.transport().device().reads, vec![BULK_LIVE_DATA_UUID]);
}

#[tokio::test]
async fn test_short_live_record_yields_present_fields() {
    let mut session = connected_session().await;
    session.transport().device().values.insert(
        BULK_LIVE_DATA_UUID,
        bulk_live_record(&LIVE_VALUES[..12]),
    );

    let live = session.get_live_data().await.unwrap();
    assert_eq!(live.len(), 12);
    assert!(!live.contains_key("OperatingMode"));
    assert!(!live.contains_key("Watts"));
}

#[tokio::test]
async fn test_malformed_live_record() {
    let mut session = connected_session().await;
    session
        .transport()
        .device()
        .values
        .insert(BULK_LIVE_DATA_UUID, vec![1, 2, 3, 4, 5]);

    let err = session.get_live_data().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Other);
    assert!(session.is_connected().await);
}

#[tokio::test]
async fn test_get_live_value_reads_single_characteristic() {
    let mut session = connected_session().await;
    assert_eq!(session.get_live_value("SetTemp").await.unwrap(), 320);

    let field = schema::live_field("SetTemp").unwrap();
    assert_eq!(session.transport().device().reads, vec![field.uuid()]);

    let err = session.get_live_value("Nope").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidSetting);
}

// ----------------------------------------------------------------------------
// Characteristic Resolution
// ----------------------------------------------------------------------------

#[tokio::test]
async fn test_characteristics_are_resolved_once_per_connection() {
    let mut session = connected_session().await;
    session.get_all_settings().await.unwrap();
    session.set_one_setting("SleepTimeout", 5).await.unwrap();
    assert_eq!(session.transport().device().listings, 1);

    session.get_live_data().await.unwrap();
    session.get_info().await.unwrap();
    assert_eq!(session.transport().device().listings, 2);
}

#[tokio::test]
async fn test_disconnect_invalidates_resolved_characteristics() {
    let mut session = connected_session().await;
    session.get_all_settings().await.unwrap();
    assert_eq!(session.transport().device().listings, 1);

    session.transport().drop_link();
    assert!(session.get_all_settings().await.is_err());

    session.connect().await.unwrap();
    session.get_all_settings().await.unwrap();

    let device = session.transport().device();
    assert_eq!(device.connects, 2);
    assert_eq!(device.listings, 2);
}

#[tokio::test]
async fn test_missing_characteristic() {
    let mut session = connected_session().await;
    let serial = schema::info_field("serial").unwrap().uuid();
    session.transport().device().remove_characteristic(serial);

    let err = session.get_info().await.unwrap_err();
    assert!(matches!(
        err,
        PinecilError::CharacteristicNotFound { uuid } if uuid == serial
    ));
}

#[tokio::test]
async fn test_transport_exposes_ironos_services() {
    use pinecil_core::Transport;

    let session = connected_session().await;
    let mut services = session.transport().services().await.unwrap();
    services.sort();

    let mut expected = vec![
        schema::SETTINGS_SERVICE_UUID,
        schema::BULK_DATA_SERVICE_UUID,
        schema::LIVE_DATA_SERVICE_UUID,
    ];
    expected.sort();
    assert_eq!(services, expected);
}

// ----------------------------------------------------------------------------
// Legacy Firmware Layouts
// ----------------------------------------------------------------------------

async fn connected_with_layout(layout: Layout) -> DeviceSession<MockTransport> {
    let _ = tracing_subscriber::fmt::try_init();
    let mut session = DeviceSession::new(MockTransport::with_layout(layout));
    session.connect().await.unwrap();
    session
}

#[tokio::test]
async fn test_layout_is_detected_from_services() {
    for layout in [Layout::V2_20, Layout::V2_21Beta1, Layout::Current] {
        let mut session = connected_with_layout(layout).await;
        assert_eq!(session.layout().await.unwrap(), layout);
    }
}

#[tokio::test]
async fn test_layout_is_redetected_after_reconnect() {
    let mut session = connected_with_layout(Layout::V2_20).await;
    assert_eq!(session.layout().await.unwrap(), Layout::V2_20);

    session.transport().drop_link();
    assert!(session.layout().await.is_err());

    *session.transport().device() = test_utils::MockDevice::pinecil();
    session.connect().await.unwrap();
    assert_eq!(session.layout().await.unwrap(), Layout::Current);
}

#[tokio::test]
async fn test_read_all_settings_from_legacy_firmware() {
    for layout in [Layout::V2_20, Layout::V2_21Beta1] {
        let mut session = connected_with_layout(layout).await;
        let settings = session.get_all_settings().await.unwrap();

        assert_eq!(settings.len(), SETTINGS.len(), "{:?}", layout);
        for setting in SETTINGS {
            assert_eq!(
                settings[setting.name],
                initial_setting_value(setting.index) as i64
            );
        }
        let device = session.transport().device();
        assert!(device.reads.iter().all(|uuid| *uuid != SETTINGS[0].uuid()));
        assert!(device.reads.contains(&layout.setting(0)));
    }
}

#[tokio::test]
async fn test_legacy_firmware_skips_missing_settings() {
    let mut session = connected_with_layout(Layout::V2_20).await;
    let brightness = schema::setting("Brightness").unwrap();
    session
        .transport()
        .device()
        .remove_characteristic(Layout::V2_20.setting(brightness.index));

    let settings = session.get_all_settings().await.unwrap();
    assert_eq!(settings.len(), SETTINGS.len() - 1);
    assert!(!settings.contains_key("Brightness"));
}

#[tokio::test]
async fn test_write_and_commit_on_legacy_firmware() {
    let mut session = connected_with_layout(Layout::V2_21Beta1).await;
    session.set_one_setting("SetTemperature", 250).await.unwrap();
    session.save_to_flash().await.unwrap();

    let device = session.transport().device();
    assert_eq!(
        device.writes,
        vec![
            (Layout::V2_21Beta1.setting(0), vec![0xFA, 0x00]),
            (
                "0000ffff-0000-1000-8000-00805f9b34fb".parse().unwrap(),
                vec![0x01, 0x00]
            ),
        ]
    );
}

#[tokio::test]
async fn test_get_info_reports_2_20_build_for_older_firmware() {
    let mut session = connected_with_layout(Layout::V2_20).await;
    let info = session.get_info().await.unwrap();

    assert_eq!(info["build"], "2.20");
    assert_eq!(info["id"], "1234567F");
    assert_eq!(info["name"], "Pinecil-1234567F");
}

#[tokio::test]
async fn test_get_info_on_2_21beta1_reads_build() {
    let mut session = connected_with_layout(Layout::V2_21Beta1).await;
    let info = session.get_info().await.unwrap();
    assert_eq!(info["build"], "2.22");
    assert_eq!(info.len(), INFO_FIELDS.len() + 1);
}

#[tokio::test]
async fn test_live_data_on_legacy_firmware() {
    let mut session = connected_with_layout(Layout::V2_20).await;

    let live = session.get_live_data().await.unwrap();
    assert_eq!(live["SetTemp"], 320);
    assert_eq!(live.len(), LIVE_DATA_FIELDS.len());

    assert_eq!(session.get_live_value("Voltage").await.unwrap(), 199);
    let record = Layout::V2_20.bulk(BULK_LIVE_DATA_SLOT);
    assert_eq!(session.transport().device().reads, vec![record, record]);
}
