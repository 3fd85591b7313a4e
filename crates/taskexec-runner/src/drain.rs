//! Pipe drain workers.
//!
//! A child writing to a pipe nobody reads blocks once the OS buffer fills.
//! Each captured pipe therefore gets its own worker thread that reads until
//! end-of-stream, so stdout and stderr empty in parallel.

use std::io::{self, BufRead, BufReader, Read};
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

/// Read `reader` line by line until end-of-stream, appending each line plus
/// `\n` to `accumulator`.
///
/// The line terminator (`\n` or `\r\n`) is normalised to `\n`, and a final
/// unterminated line is terminated. Invalid UTF-8 is replaced lossily.
/// Returns the number of lines read.
///
/// # Errors
///
/// The first read error; text appended before it stays in `accumulator`.
///
/// ```rust
/// use std::io::Cursor;
/// use taskexec_runner::drain::drain_lines;
///
/// let mut acc = String::new();
/// let lines = drain_lines(Cursor::new("one\r\ntwo"), &mut acc).unwrap();
/// assert_eq!(lines, 2);
/// assert_eq!(acc, "one\ntwo\n");
/// ```
pub fn drain_lines<R: BufRead>(mut reader: R, accumulator: &mut String) -> io::Result<usize> {
    let mut line = Vec::new();
    let mut count = 0;
    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line) {
            Ok(0) => return Ok(count),
            Ok(_) => {
                if line.last() == Some(&b'\n') {
                    line.pop();
                    if line.last() == Some(&b'\r') {
                        line.pop();
                    }
                }
                accumulator.push_str(&String::from_utf8_lossy(&line));
                accumulator.push('\n');
                count += 1;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

/// Start a named worker thread draining `pipe`; joining it yields the text.
///
/// # Errors
///
/// Fails only if the OS refuses to create the thread.
pub fn spawn_drain<R>(stream: &'static str, pipe: R) -> io::Result<JoinHandle<io::Result<String>>>
where
    R: Read + Send + 'static,
{
    thread::Builder::new()
        .name(format!("taskexec-drain-{stream}"))
        .spawn(move || {
            let mut text = String::new();
            match drain_lines(BufReader::new(pipe), &mut text) {
                Ok(lines) => {
                    debug!(stream, lines, bytes = text.len(), "stream drained");
                    Ok(text)
                }
                Err(e) => {
                    warn!(stream, error = %e, "stream read failed");
                    Err(e)
                }
            }
        })
}
