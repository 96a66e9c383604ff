//! Minimal clamd stand-in for integration tests.
//!
//! Speaks just enough of the INSTREAM protocol: reads the NUL-terminated
//! command, drains length-prefixed chunks until the zero terminator, and
//! answers with a canned verdict line. Also answers PING. The server runs
//! until the process exits.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;

#[derive(Debug, Clone, Copy)]
pub enum CannedVerdict {
    Clean,
    /// Respond with `stream: Eicar-Test-Signature FOUND`.
    Eicar,
    /// Respond with garbage to exercise the malformed-response path.
    Garbled,
}

/// Starts the fake daemon in a background thread. Returns (host, port).
pub fn start(verdict: CannedVerdict) -> (String, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            thread::spawn(move || handle(stream, verdict));
        }
    });
    ("127.0.0.1".to_string(), port)
}

fn handle(mut stream: std::net::TcpStream, verdict: CannedVerdict) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));

    // Command is NUL-terminated ("zINSTREAM\0", "zPING\0").
    let mut cmd = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        match stream.read(&mut byte) {
            Ok(1) if byte[0] != 0 => cmd.push(byte[0]),
            Ok(1) => break,
            _ => return,
        }
    }

    if cmd == b"zPING" {
        let _ = stream.write_all(b"PONG\0");
        return;
    }
    if cmd != b"zINSTREAM" {
        return;
    }

    // Drain chunks until the zero-length terminator.
    loop {
        let mut len_buf = [0u8; 4];
        if stream.read_exact(&mut len_buf).is_err() {
            return;
        }
        let len = u32::from_be_bytes(len_buf) as usize;
        if len == 0 {
            break;
        }
        let mut chunk = vec![0u8; len];
        if stream.read_exact(&mut chunk).is_err() {
            return;
        }
    }

    let response: &[u8] = match verdict {
        CannedVerdict::Clean => b"stream: OK\0",
        CannedVerdict::Eicar => b"stream: Eicar-Test-Signature FOUND\0",
        CannedVerdict::Garbled => b"????\0",
    };
    let _ = stream.write_all(response);
}
