//! Yes/no prompt loop.
//!
//! Only `Y` or `N` (any case, surrounding whitespace ignored) is accepted;
//! anything else asks again.

use std::io::{self, BufRead, Write};

/// Parse a single answer line.
pub fn parse_answer(line: &str) -> Option<bool> {
    match line.trim() {
        a if a.eq_ignore_ascii_case("y") => Some(true),
        a if a.eq_ignore_ascii_case("n") => Some(false),
        _ => None,
    }
}

/// Ask `question` until the operator answers Y or N.
///
/// End of input is an `UnexpectedEof` error rather than an endless loop.
pub fn ask_yes_no<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
) -> io::Result<bool> {
    loop {
        write!(output, "{question} [Y/N] ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed before a Y/N answer",
            ));
        }
        if let Some(answer) = parse_answer(&line) {
            return Ok(answer);
        }
    }
}
