//! Interactive station loop.
//!
//! A barcode reader types the code and presses Enter, so any line that is
//! not a command word is treated as a scan.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use lotcheck_core::ClientDirectory;
use lotcheck_report::ReportOptions;
use lotcheck_sync::{CheckStation, ConfirmationSink, OrderSource};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::display;

const HELP: &str = "\
  <code>          check one unit of a lot or item code
  scan <code>     same, for codes that start with a command word
  open <doc>      load a document (number or 44-digit access key)
  lot <code>      select the lot for a quantity confirmation
  qty <n>         confirm n units of the selected lot
  client [name]   list clients or switch client
  status          show progress
  finish          export the report once everything is checked
  reset           discard the loaded order
  help            this text
  quit            leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Scan(String),
    Open(String),
    SelectLot(String),
    Confirm(String),
    Clients,
    SwitchClient(String),
    Status,
    Finish,
    Reset,
    Help,
    Quit,
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };
    let arg = |usage: &str| {
        if rest.is_empty() {
            Err(format!("usage: {usage}"))
        } else {
            Ok(rest.to_string())
        }
    };

    let cmd = match word.to_ascii_lowercase().as_str() {
        "scan" => Command::Scan(arg("scan <code>")?),
        "open" => Command::Open(arg("open <document>")?),
        "lot" => Command::SelectLot(arg("lot <code>")?),
        "qty" => Command::Confirm(arg("qty <n>")?),
        "client" if rest.is_empty() => Command::Clients,
        "client" => Command::SwitchClient(rest.to_string()),
        "status" => Command::Status,
        "finish" => Command::Finish,
        "reset" => Command::Reset,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => Command::Scan(line.to_string()),
    };
    Ok(Some(cmd))
}

pub struct Station<O, L> {
    pub inner: CheckStation<O, L>,
    pub directory: ClientDirectory,
    pub out_dir: PathBuf,
    pub report: ReportOptions,
    pub keep_after_export: bool,
    pub bell: bool,
}

impl<O: OrderSource, L: ConfirmationSink> Station<O, L> {
    pub async fn run(&mut self) -> anyhow::Result<()> {
        let mut editor = DefaultEditor::new().context("starting line editor")?;
        println!("type `help` for commands");

        loop {
            let line = match editor.readline(&display::prompt(self.inner.session())) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
                Err(e) => return Err(e).context("reading input"),
            };
            let command = match parse(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(usage) => {
                    self.fail(&usage);
                    continue;
                }
            };
            let _ = editor.add_history_entry(line.trim());

            if command == Command::Quit {
                break;
            }
            if let Err(e) = self.execute(command).await {
                self.fail(&format!("{e:#}"));
            }
        }
        Ok(())
    }

    pub async fn execute(&mut self, command: Command) -> anyhow::Result<()> {
        match command {
            Command::Scan(code) => {
                let out = self.inner.scan(&code).await?;
                let o = &out.outcome;
                println!(
                    "  ✓ {} ({}), {} left in this lot",
                    o.lot, o.unit, o.outstanding
                );
                self.after_confirmation(out.logged, o.complete);
            }
            Command::Open(document) => self.open(&document).await?,
            Command::SelectLot(code) => {
                let lot = self.inner.select_lot(&code)?;
                println!(
                    "  selected {lot}: {} outstanding. Enter `qty <n>`.",
                    self.inner.session().checklist().outstanding(&lot)
                );
            }
            Command::Confirm(quantity) => {
                let out = self.inner.confirm(&quantity).await?;
                let o = &out.outcome;
                println!(
                    "  ✓ {} x{} confirmed, {} left in this lot",
                    o.lot, o.confirmed, o.outstanding
                );
                self.after_confirmation(out.logged, o.complete);
            }
            Command::Clients => display::print_clients(
                self.directory.clients(),
                Some(self.inner.session().client()),
            ),
            Command::SwitchClient(name) => {
                let client = self.directory.find(&name)?.clone();
                println!("  client: {client}");
                self.inner.session_mut().set_client(client)?;
            }
            Command::Status => display::print_progress(self.inner.session()),
            Command::Finish => self.finish()?,
            Command::Reset => {
                self.inner.session_mut().reset()?;
                println!("  session cleared");
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => {}
        }
        Ok(())
    }

    pub async fn open(&mut self, document: &str) -> anyhow::Result<()> {
        let summary = self.inner.search(document).await?;
        println!(
            "  document {}: {} line(s), {} unit(s) to check",
            summary.document, summary.lines, summary.units
        );
        display::print_progress(self.inner.session());
        Ok(())
    }

    fn finish(&mut self) -> anyhow::Result<()> {
        let report = self.inner.session().finalize()?;
        let path = lotcheck_report::export(&report, &self.out_dir, &self.report)
            .context("exporting report")?;
        self.inner.session_mut().mark_exported();
        println!("  report written to {}", path.display());

        if !self.keep_after_export {
            self.inner.session_mut().reset()?;
            println!("  ready for the next document");
        }
        Ok(())
    }

    fn after_confirmation(&self, logged: bool, complete: bool) {
        if !logged {
            println!("  ! confirmation not recorded remotely");
        }
        if complete {
            println!("  all units checked. Enter `finish` to export the report.");
        }
    }

    fn fail(&self, message: &str) {
        eprintln!("  ✗ {message}");
        if self.bell {
            let mut out = std::io::stdout();
            let _ = out.write_all(b"\x07");
            let _ = out.flush();
        }
    }
}
