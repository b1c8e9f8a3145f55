//! Sensing and actuation nodes over loopback TCP with simulated lines

use std::io::{ErrorKind, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use button_relay::actuation::{CommandClient, SessionEnd};
use button_relay::config::SensorConfig;
use button_relay::device::{IndicatorPair, PushButton};
use button_relay::interfaces::sim_pin::SimulatedBank;
use button_relay::protocol::LogicalState;
use button_relay::sensing::{CommandServer, SensingNode};

const LINE_A: u32 = 5;
const LINE_B: u32 = 6;
const BUTTON: u32 = 17;

fn indicators() -> (SimulatedBank, IndicatorPair) {
    let mut bank = SimulatedBank::new();
    let pair = IndicatorPair::claim(&mut bank, LINE_A, LINE_B).unwrap();
    (bank, pair)
}

/// Sends `writes` from a fake sensing node, each as its own write, then
/// closes the connection. Returns the lines' state after the session.
fn receive(writes: &'static [&'static str], initial: LogicalState) -> (LogicalState, CommandClient) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let sender = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        stream.set_nodelay(true).unwrap();
        for command in writes {
            stream.write_all(command.as_bytes()).unwrap();
            thread::sleep(Duration::from_millis(20));
        }
    });

    let (_bank, mut pair) = indicators();
    pair.apply(initial).unwrap();

    let mut client = CommandClient::connect("127.0.0.1", port, 1024, None).unwrap();
    let end = client.run(&mut pair);
    sender.join().unwrap();

    assert!(matches!(end, SessionEnd::PeerClosed));
    (pair.inspect().unwrap(), client)
}

#[test]
fn test_applies_bare_command() {
    let (state, client) = receive(&["01"], LogicalState::new(true, true));
    assert_eq!(state, LogicalState::new(false, true));
    assert_eq!(client.applied(), 1);
}

#[test]
fn test_strips_trailing_newline() {
    let (state, _) = receive(&["11\n"], LogicalState::new(false, false));
    assert_eq!(state, LogicalState::new(true, true));
}

#[test]
fn test_ignores_invalid_command() {
    let initial = LogicalState::new(true, false);
    let (state, client) = receive(&["xy"], initial);
    assert_eq!(state, initial);
    assert_eq!(client.applied(), 0);
    assert_eq!(client.ignored(), 1);
}

#[test]
fn test_valid_after_invalid_still_applies() {
    let (state, client) = receive(&["xy", "10"], LogicalState::new(false, false));
    assert_eq!(state, LogicalState::new(true, false));
    assert_eq!(client.ignored(), 1);
}

#[test]
fn test_connection_loss_leaves_lines_alone() {
    let initial = LogicalState::new(false, true);
    let (state, client) = receive(&[], initial);
    assert_eq!(state, initial);
    assert_eq!(client.applied(), 0);
}

#[test]
fn test_connect_refused_is_an_error() {
    // Bind then drop to get a port nobody listens on.
    let port = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    assert!(CommandClient::connect("127.0.0.1", port, 1024, None).is_err());
}

#[test]
fn test_read_timeout_ends_session() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let (_bank, mut pair) = indicators();

    let mut client =
        CommandClient::connect("127.0.0.1", port, 1024, Some(Duration::from_millis(50))).unwrap();
    let (_silent_peer, _) = listener.accept().unwrap();

    assert!(matches!(client.run(&mut pair), SessionEnd::Failed(_)));
}

struct Sensing {
    bank: SimulatedBank,
    node: SensingNode,
    peer: TcpStream,
}

fn sensing_node(reconnect: bool) -> Sensing {
    let mut bank = SimulatedBank::new();
    let button = PushButton::claim(&mut bank, BUTTON).unwrap();
    let server = CommandServer::bind("127.0.0.1", 0, false).unwrap();
    let addr = server.local_addr().unwrap();

    let config = SensorConfig {
        reconnect,
        ..SensorConfig::default()
    };
    let mut node = SensingNode::new(button, server, &config);

    let peer = TcpStream::connect(addr).unwrap();
    node.server_mut().accept().unwrap();
    peer.set_read_timeout(Some(Duration::from_millis(100)))
        .unwrap();

    Sensing { bank, node, peer }
}

#[test]
fn test_single_press_sends_single_command() {
    let Sensing {
        bank,
        mut node,
        mut peer,
    } = sensing_node(true);

    assert_eq!(node.poll(0).unwrap(), None);
    bank.drive(BUTTON, false);
    assert_eq!(node.poll(10).unwrap(), Some(LogicalState::new(false, false)));
    bank.drive(BUTTON, true);
    assert_eq!(node.poll(20).unwrap(), None);
    assert_eq!(node.poll(400).unwrap(), None);

    assert_eq!(node.detector().cycle_index(), 1);

    let mut buf = [0u8; 2];
    peer.read_exact(&mut buf).unwrap();
    assert_eq!(&buf, b"00");

    let mut extra = [0u8; 1];
    let err = peer.read(&mut extra).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut));
}

#[test]
fn test_button_read_failure_skips_sample() {
    let Sensing {
        bank, mut node, ..
    } = sensing_node(true);

    bank.break_line(BUTTON);
    bank.drive(BUTTON, false);
    assert_eq!(node.poll(0).unwrap(), None);
    assert_eq!(node.detector().cycle_index(), 0);

    bank.heal(BUTTON);
    assert!(node.poll(10).unwrap().is_some());
}

#[test]
fn test_send_failure_closes_session() {
    let Sensing {
        bank,
        mut node,
        peer,
    } = sensing_node(true);
    drop(peer);

    // The first write after the peer left may still be accepted by the
    // kernel; keep pressing until the reset surfaces.
    let mut now = 0;
    for _ in 0..20 {
        if !node.server().is_connected() {
            break;
        }
        bank.drive(BUTTON, false);
        node.poll(now).unwrap();
        now += 400;
        bank.drive(BUTTON, true);
        node.poll(now).unwrap();
        now += 10;
        thread::sleep(Duration::from_millis(20));
    }

    assert!(!node.server().is_connected());
}

#[test]
fn test_send_failure_fatal_without_reconnect() {
    let Sensing {
        bank,
        mut node,
        peer,
    } = sensing_node(false);
    drop(peer);

    let mut now = 0;
    let mut failed = false;
    for _ in 0..20 {
        bank.drive(BUTTON, false);
        if node.poll(now).is_err() {
            failed = true;
            break;
        }
        now += 400;
        bank.drive(BUTTON, true);
        node.poll(now).unwrap();
        now += 10;
        thread::sleep(Duration::from_millis(20));
    }

    assert!(failed);
}

#[test]
fn test_sensing_to_actuation() {
    let mut bank = SimulatedBank::new();
    let button = PushButton::claim(&mut bank, BUTTON).unwrap();
    let server = CommandServer::bind("127.0.0.1", 0, true).unwrap();
    let port = server.local_addr().unwrap().port();

    let actuator = thread::spawn(move || {
        let (_bank, mut pair) = indicators();
        let mut client = CommandClient::connect("127.0.0.1", port, 1024, None).unwrap();
        client.run(&mut pair);
        (pair.inspect().unwrap(), client.applied())
    });

    let mut node = SensingNode::new(button, server, &SensorConfig::default());
    node.server_mut().accept().unwrap();

    // Three presses: 00, 01, 10.
    let mut now = 0;
    for _ in 0..3 {
        bank.drive(BUTTON, false);
        assert!(node.poll(now).unwrap().is_some());
        now += 400;
        bank.drive(BUTTON, true);
        node.poll(now).unwrap();
        now += 10;
    }
    node.shutdown();

    let (state, applied) = actuator.join().unwrap();
    assert_eq!(applied, 3);
    assert_eq!(state, LogicalState::new(true, false));
}
