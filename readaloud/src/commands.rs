use std::str::FromStr;

/// Interactive control typed on stdin while narrating.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Pause,
    Resume,
    Next,
    Back,
    GoTo(usize),
    Stop,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    /// Parse `p`, `r`, `n`, `b`, `g N`, `s` or `q`. Sentence numbers are
    /// 1-based as shown to the user.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let cmd = parts.next().ok_or_else(|| "empty command".to_string())?;
        let command = match cmd {
            "p" | "pause" => Command::Pause,
            "r" | "resume" => Command::Resume,
            "n" | "next" => Command::Next,
            "b" | "back" => Command::Back,
            "s" | "stop" => Command::Stop,
            "q" | "quit" => Command::Quit,
            "g" | "go" => {
                let n: usize = parts
                    .next()
                    .ok_or_else(|| "usage: g <sentence>".to_string())?
                    .parse()
                    .map_err(|e| format!("bad sentence number: {e}"))?;
                Command::GoTo(n.checked_sub(1).ok_or_else(|| "sentences start at 1".to_string())?)
            }
            other => return Err(format!("unknown command `{other}`")),
        };
        match parts.next() {
            Some(extra) => Err(format!("unexpected argument `{extra}`")),
            None => Ok(command),
        }
    }
}

pub const HELP: &str = "commands: p pause, r resume, n next, b back, g N go to sentence, s stop, q quit";
