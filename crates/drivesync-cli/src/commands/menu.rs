//! Menu command - interactive loop over scan and sync entries

use std::io::{self, BufRead, Write};

use anyhow::Result;
use clap::Args;

use super::scan::{print_scan, run_scan};
use super::GlobalArgs;

const MENU: &str = "\
--------------------------------------------------------------------
1. Scan
2. Sync through Drive
3. Sync through Local
4. Exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Scan,
    SyncThroughDrive,
    SyncThroughLocal,
    Exit,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(MenuChoice::Scan),
            "2" => Some(MenuChoice::SyncThroughDrive),
            "3" => Some(MenuChoice::SyncThroughLocal),
            "4" => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

/// Interactive menu
#[derive(Debug, Args)]
pub struct MenuCommand {}

impl MenuCommand {
    pub async fn execute(&self, args: &GlobalArgs) -> Result<()> {
        let formatter = args.formatter();
        let app = args.connect()?;

        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();

        loop {
            let choice = read_choice(&mut input, &mut output)?;
            match choice {
                Some(MenuChoice::Scan) => {
                    // A failed scan returns to the menu
                    match run_scan(&app, None).await {
                        Ok(result) => print_scan(&result, args.format.is_json(), formatter.as_ref()),
                        Err(e) => formatter.error(&format!("{e:#}")),
                    }
                }
                Some(MenuChoice::SyncThroughDrive) | Some(MenuChoice::SyncThroughLocal) => {
                    formatter.warn(
                        "No write policy is defined for this entry; \
                         use `drivesync sync --remote-only .. --local-only ..`",
                    );
                }
                Some(MenuChoice::Exit) | None => return Ok(()),
            }
        }
    }
}

/// Shows the menu and reads a choice, re-prompting on unknown numbers
///
/// Returns `None` when the input is exhausted.
pub fn read_choice<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> io::Result<Option<MenuChoice>> {
    loop {
        writeln!(output, "{MENU}")?;
        write!(output, "Enter number: ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        writeln!(output)?;
        match MenuChoice::parse(&line) {
            Some(choice) => return Ok(Some(choice)),
            None => writeln!(output, "Wrong number!\n")?,
        }
    }
}
