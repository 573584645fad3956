//! Feature Helper Tests

mod common;

use common::{MockTarget, Reply};
use xbdm_rpc::{LedState, NotifyLogo, RebootKind, RpcError, TemperatureKind};

// =============================================================================
// Call Agent Features
// =============================================================================

#[test]
fn test_resolve_function() {
    let target = MockTarget::start(|_| Reply::line("200- 82001234"));
    let session = target.session();

    assert_eq!(session.resolve_function("xam.xex", 526).unwrap(), 0x8200_1234);
    assert_eq!(
        target.received(),
        vec!["consolefeatures ver=2 type=9 params=\"A\\0\\A\\2\\2/7\\78616D2E786578\\1\\526\\\""]
    );
}

#[test]
fn test_notify_default_logo() {
    let target = MockTarget::start(|_| Reply::line("200- OK"));
    let session = target.session();

    session.notify(NotifyLogo::default(), "Hi").unwrap();
    assert_eq!(
        target.received(),
        vec!["consolefeatures ver=2 type=12 params=\"A\\0\\A\\2\\2/2\\4869\\1\\34\\\""]
    );
}

#[test]
fn test_set_leds() {
    let target = MockTarget::start(|_| Reply::line("200- OK"));
    let session = target.session();

    session
        .set_leds([LedState::Green, LedState::Off, LedState::Red, LedState::Orange])
        .unwrap();
    assert_eq!(
        target.received(),
        vec!["consolefeatures ver=2 type=14 params=\"A\\0\\A\\4\\1\\128\\1\\0\\1\\8\\1\\136\\\""]
    );
}

#[test]
fn test_temperature_and_title_id() {
    let target = MockTarget::start(|cmd| {
        if cmd.contains("type=15") {
            Reply::line("200- 2D")
        } else {
            Reply::line("200- FFFE07D1")
        }
    });
    let session = target.session();

    assert_eq!(session.temperature(TemperatureKind::Gpu).unwrap(), 45);
    assert!(target.received()[0].ends_with("A\\1\\1\\1\\\""));
    assert_eq!(session.title_id().unwrap(), 0xFFFE_07D1);
}

#[test]
fn test_kernel_version_decimal() {
    let target = MockTarget::start(|_| Reply::line("200- 17559"));
    let session = target.session();

    assert_eq!(session.kernel_version().unwrap(), 17559);
}

#[test]
fn test_constant_memory_set_without_conditions() {
    let target = MockTarget::start(|_| Reply::line("200- OK"));
    let session = target.session();

    session.constant_memory_set(0x8200_0000, 0x6000_0000, None, None).unwrap();
    assert_eq!(
        target.received(),
        vec!["consolefeatures ver=2 type=18 params=\"A\\82000000\\A\\5\\1\\1610612736\\1\\0\\1\\0\\1\\0\\1\\0\\\""]
    );
}

#[test]
fn test_feature_without_agent() {
    let target = MockTarget::start(|_| Reply::line("407- DEBUG unknown command"));
    let session = target.session();

    assert!(matches!(session.cpu_key(), Err(RpcError::AgentNotInstalled)));
}

#[test]
fn test_shutdown_ignores_dropped_link() {
    let target = MockTarget::start(|_| Reply::Hangup);
    let session = target.session();

    session.shutdown();
    assert!(!session.is_connected());
}

// =============================================================================
// Debug Monitor Commands
// =============================================================================

#[test]
fn test_plain_commands() {
    let target = MockTarget::start(|cmd| match cmd {
        "dmversion" => Reply::line("200- 2.0.20353.0"),
        "getconsoleid" => Reply::line("200- consoleid=0123456789AB"),
        "magicboot cold" | "go" | "stop" => Reply::line("200- OK"),
        _ => Reply::line("407- unknown command"),
    });
    let session = target.session();

    assert_eq!(session.dm_version().unwrap(), "2.0.20353.0");
    assert_eq!(session.console_id().unwrap(), "0123456789AB");
    session.reboot(RebootKind::Cold).unwrap();
    session.set_running(false).unwrap();
    session.set_running(true).unwrap();

    assert!(matches!(
        session.reboot(RebootKind::Warm),
        Err(RpcError::Protocol(ref s)) if s == "407- unknown command"
    ));
}

#[test]
fn test_feature_strings_match_call_argument_encoding() {
    let target = MockTarget::start(|_| Reply::line("200- OK"));
    let session = target.session();

    // U+0141 is one character; only its low byte 0x41 goes out
    session.notify(NotifyLogo::XBOX_LOGO, "\u{141}!").unwrap();
    assert_eq!(
        target.received(),
        vec!["consolefeatures ver=2 type=12 params=\"A\\0\\A\\2\\2/2\\4121\\1\\0\\\""]
    );
}
