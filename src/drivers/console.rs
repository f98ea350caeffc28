//! Diagnostic text over the serial link.
//!
//! `Console` turns a byte sink into a `core::fmt::Write` target so the
//! usual `write!`/`writeln!` macros can be used for terminal output. Bare
//! `\n` is sent as `\r\n`. Output is fire-and-forget: a failing sink drops
//! the text rather than failing the caller.
use core::fmt;

use embedded_io::Write;

pub struct Console<W> {
    tx: W,
}

impl<W: Write> Console<W> {
    pub fn new(tx: W) -> Self {
        Self { tx }
    }

    pub fn into_inner(self) -> W {
        self.tx
    }

    fn put(&mut self, bytes: &[u8]) {
        if self.tx.write_all(bytes).is_err() {
            warn!("console write failed");
        }
    }
}

impl<W: Write> fmt::Write for Console<W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let mut rest = s.as_bytes();
        while let Some(pos) = rest.iter().position(|&b| b == b'\n') {
            self.put(&rest[..pos]);
            self.put(b"\r\n");
            rest = &rest[pos + 1..];
        }
        if !rest.is_empty() {
            self.put(rest);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use core::fmt::Write as _;

    struct Capture(heapless::Vec<u8, 128>);

    impl embedded_io::ErrorType for Capture {
        type Error = Infallible;
    }

    impl embedded_io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            let _ = self.0.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    struct Broken;

    impl embedded_io::ErrorType for Broken {
        type Error = embedded_io::ErrorKind;
    }

    impl embedded_io::Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> Result<usize, Self::Error> {
            Err(embedded_io::ErrorKind::Other)
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[test]
    fn newlines_become_crlf() {
        let mut console = Console::new(Capture(heapless::Vec::new()));
        write!(console, "\nError: {}\n", "bad ADC channel").unwrap();
        assert_eq!(
            console.into_inner().0.as_slice(),
            b"\r\nError: bad ADC channel\r\n"
        );
    }

    #[test]
    fn text_without_newline_passes_through() {
        let mut console = Console::new(Capture(heapless::Vec::new()));
        write!(console, "x={} y={}", 1, 2).unwrap();
        assert_eq!(console.into_inner().0.as_slice(), b"x=1 y=2");
    }

    #[test]
    fn sink_errors_are_swallowed() {
        let mut console = Console::new(Broken);
        assert!(writeln!(console, "lost").is_ok());
    }
}
