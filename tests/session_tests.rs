//! Session-level tests against the in-memory mock transport.
//!
//! These drive the public API end to end: discovery, the open handshake,
//! buffered and direct color paths, and the dirty-tracking flush protocol.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use wooting_rgb_hid::mock::{MockBackend, MockTransport};
use wooting_rgb_hid::{checksum, led_index, list_all, Rgb, WootingRgb};

const SERIAL: &str = "A01B5X";

fn open_keyboard() -> (WootingRgb, Arc<MockTransport>) {
    let (backend, transport) = MockBackend::with_keyboard(SERIAL);
    let session = WootingRgb::open(&backend, SERIAL).expect("open mock keyboard");
    (session, transport)
}

#[test]
fn end_to_end_discover_open_and_paint() {
    let (backend, transport) = MockBackend::with_keyboard(SERIAL);

    let ids = list_all(&backend).unwrap();
    assert_eq!(ids, vec![SERIAL.to_string()]);

    let session = WootingRgb::open(&backend, &ids[0]).unwrap();
    assert_eq!(
        transport.feature_reports(),
        vec![vec![0x00, 0xD0, 0xDA, 33, 0, 0, 0, 0]],
        "open must issue the init handshake with zero parameters"
    );

    // Escape is LED 0: bank 0, slot 0, red byte right after the header.
    assert!(session.set_rgb(0, 0, Rgb::new(255, 0, 0)));
    let reports = transport.output_reports();
    assert_eq!(reports.len(), 1, "only bank 0 is dirty");
    let report = &reports[0];
    assert_eq!(report.len(), 128);
    assert_eq!(&report[..5], &[0xD0, 0xDA, 11, 0, 0]);
    assert_eq!(report[5], 0xFF, "red channel of slot 0");
    assert_eq!(report[5 + 0x10], 0x00, "green channel of slot 0");
    assert_eq!(report[5 + 0x20], 0x00, "blue channel of slot 0");

    let crc = checksum(&report[..125]);
    assert_eq!(report[125], crc as u8, "checksum low byte");
    assert_eq!(report[126], (crc >> 8) as u8, "checksum high byte");
}

#[test]
fn repeated_identical_write_transmits_once() {
    let (session, transport) = open_keyboard();

    assert!(session.set_rgb(0, 0, Rgb::new(255, 0, 0)));
    assert_eq!(transport.output_reports().len(), 1);

    // Same color again: no dirty transition, no report.
    assert!(session.set_rgb(0, 0, Rgb::new(255, 0, 0)));
    assert_eq!(transport.output_reports().len(), 1);

    // A different color transmits again.
    assert!(session.set_rgb(0, 0, Rgb::new(254, 0, 0)));
    assert_eq!(transport.output_reports().len(), 2);
}

#[test]
fn left_shift_updates_its_iso_twin() {
    let (session, transport) = open_keyboard();
    let color = Rgb::new(10, 20, 30);

    // Row 4 column 0 is the ANSI Left-Shift, LED 9; its ISO twin is LED 7.
    let primary = led_index(4, 0).unwrap();
    let twin = primary.alias().unwrap();
    assert_eq!((primary.number(), twin.number()), (9, 7));

    assert!(session.set_rgb(4, 0, color));
    assert_eq!(session.buffered_rgb(4, 0), Some(color));
    assert_eq!(session.buffered_led_rgb(twin), color);

    // Both slots appear in the transmitted bank-0 report: slot 9 maps to
    // region offset 0x0B, slot 7 to 0x09.
    let report = transport.output_reports().pop().unwrap();
    for base in [5 + 0x0B, 5 + 0x09] {
        assert_eq!(report[base], 10);
        assert_eq!(report[base + 0x10], 20);
        assert_eq!(report[base + 0x20], 30);
    }
}

#[test]
fn enter_updates_its_iso_twin() {
    let (session, _transport) = open_keyboard();
    let color = Rgb::new(1, 2, 3);

    // Row 3 column 13 is the ANSI Enter, LED 65; its ISO twin is LED 62.
    let primary = led_index(3, 13).unwrap();
    let twin = primary.alias().unwrap();
    assert_eq!((primary.number(), twin.number()), (65, 62));
    assert_eq!(primary.bank(), twin.bank());

    assert!(session.set_rgb(3, 13, color));
    assert_eq!(session.buffered_led_rgb(primary), color);
    assert_eq!(session.buffered_led_rgb(twin), color);
}

#[test]
fn unwired_positions_cause_no_io() {
    let (session, transport) = open_keyboard();
    let handshake_count = transport.feature_reports().len();

    // Row 0 column 1 (right of Escape) has no LED; row 9 is out of range.
    for (row, column) in [(0, 1), (5, 3), (9, 0), (0, 21)] {
        assert!(!session.set_rgb(row, column, Rgb::WHITE));
        assert!(!session.set_direct_rgb(row, column, Rgb::WHITE));
        assert!(!session.reset_direct_rgb(row, column));
        assert_eq!(session.buffered_rgb(row, column), None);
    }
    assert!(transport.output_reports().is_empty());
    assert_eq!(transport.feature_reports().len(), handshake_count);
}

#[test]
fn direct_color_command_wire_layout() {
    let (session, transport) = open_keyboard();

    assert!(session.set_direct_rgb(0, 0, Rgb::new(1, 2, 3)));
    let features = transport.feature_reports();
    // Parameters ride in reversed order: blue, green, red, led.
    assert_eq!(features.last().unwrap(), &vec![0x00, 0xD0, 0xDA, 30, 3, 2, 1, 0]);
    assert!(transport.output_reports().is_empty(), "banks not involved");
}

#[test]
fn direct_commands_fan_out_to_alias_twins() {
    let (session, transport) = open_keyboard();

    assert!(session.set_direct_rgb(4, 0, Rgb::new(9, 9, 9)));
    let features = transport.feature_reports();
    let n = features.len();
    assert_eq!(features[n - 2][7], 9, "ANSI Left-Shift LED first");
    assert_eq!(features[n - 1][7], 7, "ISO twin second");

    assert!(session.reset_direct_rgb(3, 13));
    let features = transport.feature_reports();
    let n = features.len();
    // Reset carries the LED in the last parameter slot (wire byte 4).
    assert_eq!(&features[n - 2][3..5], &[31, 65]);
    assert_eq!(&features[n - 1][3..5], &[31, 62]);
}

#[test]
fn direct_alias_fails_if_either_half_fails() {
    let (session, transport) = open_keyboard();
    assert!(session.set_direct_rgb(4, 0, Rgb::RED));

    // The ANSI half fails, the twin still gets its command; the combined
    // result is failure.
    transport.fail_features.store(1, Ordering::SeqCst);
    let before = transport.feature_reports().len();
    assert!(!session.set_direct_rgb(4, 0, Rgb::GREEN));
    assert_eq!(transport.feature_reports().len(), before + 1);
}

#[test]
fn deferred_updates_flush_on_demand() {
    let (session, transport) = open_keyboard();
    session.set_auto_update(false);
    assert!(!session.auto_update());

    assert!(session.set_rgb(0, 0, Rgb::BLUE));
    assert!(session.set_rgb(1, 0, Rgb::BLUE)); // LED 2, also bank 0
    assert!(session.set_rgb(2, 17, Rgb::BLUE)); // LED 102, bank 4
    assert!(transport.output_reports().is_empty(), "writes are deferred");

    assert!(session.update_keyboard());
    let reports = transport.output_reports();
    assert_eq!(reports.len(), 2, "one report per dirty bank");
    assert_eq!(reports[0][3..5], [0, 0], "bank 0 flushes first");
    assert_eq!(reports[1][3..5], [2, 0], "bank 4 follows in order");
}

#[test]
fn enabling_auto_update_flushes_pending_state() {
    let (session, transport) = open_keyboard();
    session.set_auto_update(false);
    assert!(session.set_rgb(0, 0, Rgb::GREEN));
    assert!(transport.output_reports().is_empty());

    session.set_auto_update(true);
    assert_eq!(transport.output_reports().len(), 1);
    // And subsequent writes flush immediately again.
    assert!(session.set_rgb(0, 2, Rgb::GREEN));
    assert_eq!(transport.output_reports().len(), 2);
}

#[test]
fn failed_flush_retries_with_identical_payload() {
    let (session, transport) = open_keyboard();
    session.set_auto_update(false);
    assert!(session.set_rgb(0, 0, Rgb::new(0x42, 0, 0x42)));

    // A short write is a failure; the bank stays dirty.
    transport.short_outputs.store(1, Ordering::SeqCst);
    assert!(!session.update_keyboard());

    assert!(session.update_keyboard());
    let reports = transport.output_reports();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0], reports[1], "retry resends the identical payload");

    // Once flushed, nothing further to send.
    assert!(session.update_keyboard());
    assert_eq!(transport.output_reports().len(), 2);
}

#[test]
fn transport_error_leaves_bank_dirty() {
    let (session, transport) = open_keyboard();
    session.set_auto_update(false);
    assert!(session.set_rgb(0, 0, Rgb::WHITE));

    transport.fail_outputs.store(1, Ordering::SeqCst);
    assert!(!session.update_keyboard());
    assert!(transport.output_reports().is_empty());

    assert!(session.update_keyboard());
    assert_eq!(transport.output_reports().len(), 1);
}

#[test]
fn force_update_retransmits_every_bank() {
    let (session, transport) = open_keyboard();
    assert!(session.force_update());
    assert_eq!(transport.output_reports().len(), 5);
    let slaves_and_offsets: Vec<(u8, u8)> = transport
        .output_reports()
        .iter()
        .map(|r| (r[3], r[4]))
        .collect();
    assert_eq!(
        slaves_and_offsets,
        vec![(0, 0), (0, 96), (1, 0), (1, 96), (2, 0)]
    );
}

#[test]
fn reset_rgb_leaves_buffers_stale_until_forced() {
    let (session, transport) = open_keyboard();
    assert!(session.set_rgb(0, 0, Rgb::RED));
    assert_eq!(transport.output_reports().len(), 1);

    assert!(session.reset_rgb());
    assert_eq!(
        transport.feature_reports().last().unwrap(),
        &vec![0x00, 0xD0, 0xDA, 32, 0, 0, 0, 0]
    );

    // The buffers still hold red, so re-writing red is a no-op even though
    // the hardware was just cleared. force_update resynchronizes.
    assert!(session.set_rgb(0, 0, Rgb::RED));
    assert_eq!(transport.output_reports().len(), 1);
    assert!(session.force_update());
    assert_eq!(transport.output_reports().len(), 6);
}

#[test]
fn concurrent_writers_land_all_colors() {
    let (session, transport) = open_keyboard();
    session.set_auto_update(false);
    let session = Arc::new(session);

    let keys = [(0u8, 0u8), (1, 0), (2, 0), (3, 0)];
    let mut handles = Vec::new();
    for (row, column) in keys {
        let session = session.clone();
        handles.push(std::thread::spawn(move || {
            for step in 0..50u8 {
                assert!(session.set_rgb(row, column, Rgb::new(step, row, column)));
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    for (row, column) in keys {
        assert_eq!(
            session.buffered_rgb(row, column),
            Some(Rgb::new(49, row, column))
        );
    }
    assert!(session.update_keyboard());
    assert!(!transport.output_reports().is_empty());
}
