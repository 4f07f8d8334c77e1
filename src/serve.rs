//! JSON-lines front-end: one request per input line, one response per output line.

use std::io::{BufRead, Write};

use serde::Deserialize;
use serde_json::{Value, json};

use crate::batpu::errors::BatError;
use crate::batpu::session::Session;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "cmd", rename_all = "lowercase")]
pub enum Request {
    Load { code: String },
    #[serde(rename = "load_machine_code")]
    LoadMachineCode { code: String },
    Step,
    Run {
        #[serde(default)]
        max: Option<u64>,
    },
    Reset,
    State,
    Disasm,
    Breakpoint { addr: usize },
    Input { value: u8 },
}

pub fn dispatch(session: &mut Session, req: Request) -> Result<Value, BatError> {
    let value = match req {
        Request::Load { code } => serde_json::to_value(session.load(&code))?,
        Request::LoadMachineCode { code } => serde_json::to_value(session.load_machine_code(&code))?,
        Request::Step => serde_json::to_value(session.step())?,
        Request::Run { max } => serde_json::to_value(session.run(max))?,
        Request::Reset => serde_json::to_value(session.reset())?,
        Request::State => serde_json::to_value(session.state())?,
        Request::Disasm => serde_json::to_value(session.disasm())?,
        Request::Breakpoint { addr } => serde_json::to_value(session.breakpoint(addr))?,
        Request::Input { value } => serde_json::to_value(session.input(value))?,
    };
    Ok(value)
}

/// Answers requests until `input` is exhausted. A malformed line gets an
/// `{"error": ...}` reply and the loop keeps going.
pub fn serve<R: BufRead, W: Write>(session: &mut Session, input: R, mut out: W) -> Result<(), BatError> {
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let reply = match serde_json::from_str::<Request>(&line) {
            Ok(req) => {
                tracing::debug!(?req, "request");
                dispatch(session, req)?
            }
            Err(e) => {
                tracing::warn!(error = %e, "bad request");
                json!({ "error": e.to_string() })
            }
        };
        serde_json::to_writer(&mut out, &reply)?;
        out.write_all(b"\n")?;
        out.flush()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batpu::session::SessionConfig;

    fn talk(lines: &str) -> Vec<Value> {
        let mut session = Session::new(SessionConfig { default_run_limit: 500, rng_seed: Some(1) });
        let mut out = Vec::new();
        serve(&mut session, lines.as_bytes(), &mut out).unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn parses_every_request_shape() {
        let cases = [
            (r#"{"cmd":"step"}"#, Request::Step),
            (r#"{"cmd":"run"}"#, Request::Run { max: None }),
            (r#"{"cmd":"run","max":5}"#, Request::Run { max: Some(5) }),
            (r#"{"cmd":"breakpoint","addr":3}"#, Request::Breakpoint { addr: 3 }),
            (r#"{"cmd":"input","value":9}"#, Request::Input { value: 9 }),
            (r#"{"cmd":"load","code":"hlt"}"#, Request::Load { code: "hlt".into() }),
        ];
        for (text, want) in cases {
            assert_eq!(serde_json::from_str::<Request>(text).unwrap(), want, "{text}");
        }
    }

    #[test]
    fn load_run_and_inspect() {
        let replies = talk(concat!(
            r#"{"cmd":"load","code":"ldi r1 5\nldi r2 3\nadd r1 r2 r3\nhlt"}"#, "\n",
            r#"{"cmd":"breakpoint","addr":2}"#, "\n",
            r#"{"cmd":"run"}"#, "\n",
            r#"{"cmd":"disasm"}"#, "\n",
            r#"{"cmd":"run"}"#, "\n",
        ));
        assert_eq!(replies.len(), 5);
        assert_eq!(replies[0]["success"], true);
        assert_eq!(replies[1]["action"], "added");
        assert_eq!(replies[2]["pc"], 2);
        assert_eq!(replies[2]["stopReason"], "breakpoint");
        assert_eq!(replies[3]["disasm"][2]["current"], true);
        assert_eq!(replies[3]["disasm"][2]["breakpoint"], true);
        assert_eq!(replies[4]["halted"], true);
        assert_eq!(replies[4]["registers"][3], 8);
    }

    #[test]
    fn bad_lines_get_an_error_and_the_loop_continues() {
        let replies = talk("not json\n{\"cmd\":\"fly\"}\n\n{\"cmd\":\"state\"}\n");
        assert_eq!(replies.len(), 3);
        assert!(replies[0]["error"].is_string());
        assert!(replies[1]["error"].is_string());
        assert_eq!(replies[2]["instructions"], 0);
    }

    #[test]
    fn failed_load_reports_diagnostics() {
        let replies = talk(r#"{"cmd":"load","code":"jmp nowhere"}"#);
        assert_eq!(replies[0]["success"], false);
        assert!(replies[0]["message"].as_str().unwrap().starts_with("line 1:"));
    }
}
