use std::io::{self, BufRead, Write};

/// Ask the operator a question on the terminal. Only `yes` is accepted.
pub fn confirm(question: &str) -> io::Result<bool> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    confirm_from(question, &mut stdin.lock(), &mut stdout.lock())
}

pub fn confirm_from<R: BufRead, W: Write>(
    question: &str,
    input: &mut R,
    output: &mut W,
) -> io::Result<bool> {
    write!(output, "{question} (only 'yes' will be accepted) ")?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("yes"))
}
