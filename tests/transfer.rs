mod common;

use common::{started_radio, Incoming, ENABLE_1, ENABLE_2, FIFO, OP_CONTROL_1, OP_CONTROL_2};
use embassy_futures::block_on;
use si443x::{ChipMode, CrcVariant, Error};

fn payload(len: usize) -> Vec<u8> {
    (0..len as u8).collect()
}

#[test]
fn transmit_sends_payload() {
    let (mut radio, harness) = started_radio();
    let mark = harness.chip().writes.len();
    let data = payload(16);

    radio.transmit(&data).unwrap();

    let chip = harness.chip();
    assert_eq!(chip.writes_to(FIFO, mark), data);
    assert_eq!(chip.writes_to(0x3E, mark), [16]);
    assert_eq!(chip.writes_to(OP_CONTROL_2, mark), [0x01, 0x00]);
    assert_eq!(chip.writes_to(ENABLE_1, mark), [0x04]);
    assert_eq!(chip.writes_to(ENABLE_2, mark), [0x00]);
    assert!(chip.writes_to(OP_CONTROL_1, mark).contains(&0x09));
    assert_eq!(chip.reg(OP_CONTROL_1), 0x01);
    assert_eq!(chip.status, 0);
    drop(chip);
    assert_eq!(radio.mode(), ChipMode::Standby);
}

#[test]
fn transmit_times_out_when_irq_never_fires() {
    let (mut radio, harness) = started_radio();
    harness.chip().tx_polls = None;
    let start = harness.elapsed_ms();

    assert_eq!(radio.tx_timeout_ms(16), 71);
    assert_eq!(radio.transmit(&payload(16)), Err(Error::TxTimeout));

    assert_eq!(harness.elapsed_ms() - start, 71);
    assert_eq!(harness.chip().reg(OP_CONTROL_1), 0x01);
    assert_eq!(radio.mode(), ChipMode::Standby);
}

#[test]
fn oversized_payload_is_rejected_before_any_access() {
    let (mut radio, harness) = started_radio();
    let (writes, reads) = {
        let chip = harness.chip();
        (chip.writes.len(), chip.reads.len())
    };

    assert_eq!(radio.transmit(&payload(65)), Err(Error::PacketTooLong));

    let chip = harness.chip();
    assert_eq!(chip.writes.len(), writes);
    assert_eq!(chip.reads.len(), reads);
}

#[test]
fn fixed_length_limits_payload_and_skips_length_byte() {
    let (mut radio, harness) = started_radio();
    radio.fixed_packet_length_mode(8).unwrap();

    assert_eq!(radio.transmit(&payload(9)), Err(Error::PacketTooLong));

    let mark = harness.chip().writes.len();
    radio.transmit(&payload(8)).unwrap();
    assert!(harness.chip().writes_to(0x3E, mark).is_empty());
}

#[test]
fn receive_copies_packet() {
    let (mut radio, harness) = started_radio();
    let data = payload(10);
    harness.chip().incoming = Some(Incoming::Packet(data.clone()));

    let mut buffer = [0u8; 64];
    assert_eq!(radio.receive(&mut buffer), Ok(10));
    assert_eq!(&buffer[..10], data.as_slice());

    let chip = harness.chip();
    assert_eq!(chip.reg(ENABLE_1), 0x03);
    assert_eq!(chip.reg(OP_CONTROL_1), 0x01);
    assert_eq!(chip.status, 0);
    drop(chip);
    assert_eq!(radio.mode(), ChipMode::Standby);
}

#[test]
fn receive_truncates_and_drains() {
    let (mut radio, harness) = started_radio();
    harness.chip().incoming = Some(Incoming::Packet(payload(12)));

    let mut buffer = [0u8; 4];
    assert_eq!(radio.receive(&mut buffer), Ok(4));
    assert_eq!(buffer, [0, 1, 2, 3]);
    assert!(harness.chip().rx_fifo.is_empty());
}

#[test]
fn fixed_length_receive_uses_programmed_length() {
    let (mut radio, harness) = started_radio();
    radio.fixed_packet_length_mode(6).unwrap();
    harness.chip().incoming = Some(Incoming::Packet(payload(6)));
    harness.chip().reads.clear();

    let mut buffer = [0u8; 64];
    assert_eq!(radio.receive(&mut buffer), Ok(6));

    let chip = harness.chip();
    assert!(chip.reads.contains(&0x3E));
    assert!(!chip.reads.contains(&0x4B));
}

#[test]
fn crc_error_leaves_fifo_untouched() {
    let (mut radio, harness) = started_radio();
    harness.chip().incoming = Some(Incoming::CorruptPacket(vec![0xAA; 8]));
    harness.chip().reads.clear();

    let mut buffer = [0u8; 64];
    assert_eq!(radio.receive(&mut buffer), Err(Error::CrcMismatch));

    let chip = harness.chip();
    assert_eq!(chip.rx_fifo.len(), 8);
    assert!(!chip.reads.contains(&FIFO));
    assert_eq!(chip.reg(OP_CONTROL_1), 0x01);
    drop(chip);
    assert_eq!(radio.mode(), ChipMode::Standby);
}

#[test]
fn receive_timeout_matches_success_end_state() {
    let (mut radio, harness) = started_radio();
    let start = harness.elapsed_ms();

    let mut buffer = [0u8; 64];
    assert_eq!(radio.receive(&mut buffer), Err(Error::RxTimeout));

    assert_eq!(harness.elapsed_ms() - start, u64::from(radio.rx_timeout_ms()));
    {
        let chip = harness.chip();
        assert_eq!(chip.reg(OP_CONTROL_1), 0x01);
        assert_eq!(chip.status, 0);
    }
    assert_eq!(radio.mode(), ChipMode::Standby);
    assert_eq!(radio.chip_version(), Ok(0x06));
}

#[test]
fn crc_setting_selects_receive_interrupts() {
    let (mut radio, harness) = started_radio();

    radio.set_crc(false, CrcVariant::Ibm).unwrap();
    radio.start_receive().unwrap();
    assert_eq!(harness.chip().reg(ENABLE_1), 0x02);

    radio.standby().unwrap();
    radio.set_crc(true, CrcVariant::Ibm).unwrap();
    radio.start_receive().unwrap();
    assert_eq!(harness.chip().reg(ENABLE_1), 0x03);
}

#[test]
fn configuration_rejected_during_transfer() {
    let (mut radio, _harness) = started_radio();
    radio.start_receive().unwrap();

    assert_eq!(radio.set_bit_rate(4.8), Err(Error::Busy));
    assert_eq!(radio.set_frequency(445.0), Err(Error::Busy));
    assert_eq!(radio.start_transmit(&[1, 2, 3]), Err(Error::Busy));
    assert_eq!(radio.mode(), ChipMode::Rx);

    radio.standby().unwrap();
    assert_eq!(radio.set_bit_rate(4.8), Ok(()));
}

#[test]
fn split_receive_reports_length_once() {
    let (mut radio, harness) = started_radio();
    harness.chip().incoming = Some(Incoming::Packet(payload(5)));

    radio.start_receive().unwrap();
    assert_eq!(radio.packet_length(true), Ok(5));
    harness.chip().regs[0x4B] = 99;
    assert_eq!(radio.packet_length(true), Ok(5));

    let mut buffer = [0u8; 64];
    assert_eq!(radio.read_data(&mut buffer), Ok(5));
    assert_eq!(radio.packet_length(false), Ok(5));
}

#[test]
fn async_transmit_completes() {
    let (mut radio, harness) = started_radio();
    let mark = harness.chip().writes.len();
    let data = payload(16);

    assert_eq!(block_on(radio.transmit_async(&data)), Ok(()));
    assert_eq!(harness.chip().writes_to(FIFO, mark), data);
    assert_eq!(radio.mode(), ChipMode::Standby);
}

#[test]
fn async_transmit_times_out() {
    let (mut radio, harness) = started_radio();
    harness.chip().tx_polls = None;
    let start = harness.elapsed_ms();

    assert_eq!(block_on(radio.transmit_async(&payload(16))), Err(Error::TxTimeout));

    assert_eq!(harness.elapsed_ms() - start, u64::from(radio.tx_timeout_ms(16)));
    {
        let chip = harness.chip();
        assert_eq!(chip.reg(OP_CONTROL_1), 0x01);
        assert_eq!(chip.status, 0);
    }
    assert_eq!(radio.mode(), ChipMode::Standby);
}

#[test]
fn async_receive_copies_packet() {
    let (mut radio, harness) = started_radio();
    harness.chip().incoming = Some(Incoming::Packet(payload(3)));

    let mut buffer = [0u8; 8];
    assert_eq!(block_on(radio.receive_async(&mut buffer)), Ok(3));
    assert_eq!(&buffer[..3], &[0, 1, 2]);
}

#[test]
fn async_receive_times_out() {
    let (mut radio, harness) = started_radio();
    let start = harness.elapsed_ms();

    let mut buffer = [0u8; 8];
    assert_eq!(block_on(radio.receive_async(&mut buffer)), Err(Error::RxTimeout));
    assert_eq!(harness.elapsed_ms() - start, u64::from(radio.rx_timeout_ms()));
    assert_eq!(harness.chip().reg(OP_CONTROL_1), 0x01);
}
