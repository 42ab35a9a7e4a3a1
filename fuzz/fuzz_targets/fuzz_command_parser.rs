//! Fuzz target: control-topic payloads
//!
//! Pushes arbitrary bytes through the command inbox and the token parser,
//! the same path a broker message takes, and asserts that:
//! - nothing panics on non-UTF-8, oversized or junk payloads
//! - whatever the inbox accepts comes back out trimmed and in bounds
//! - parsing ignores surrounding whitespace
//!
//! cargo fuzz run fuzz_command_parser

#![no_main]

use escaperoom::app::commands::RemoteCommand;
use escaperoom::inbox::{COMMAND_MAX_LEN, CommandInbox};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let inbox = CommandInbox::new();
    if inbox.push(data) {
        let text = inbox.pop().expect("accepted payload is queued");
        assert!(text.len() <= COMMAND_MAX_LEN);
        assert_eq!(text.as_str(), text.trim());
        let _ = RemoteCommand::parse(&text);
    }
    assert!(inbox.pop().is_none(), "inbox must hold at most what was pushed");

    if let Ok(s) = core::str::from_utf8(data) {
        let padded = format!(" {}\n", s);
        assert_eq!(RemoteCommand::parse(s), RemoteCommand::parse(&padded));
    }
});
